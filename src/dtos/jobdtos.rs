use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{jobmodel::*, usermodel::*};

// Request bodies arrive camelCased from the browser pages; responses go out
// as the snake_case records themselves.

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobDto {
    pub client_id: Uuid,

    pub trade: TradeCategory,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub job_description: String,

    #[validate(length(min = 5, max = 10, message = "Postcode must be between 5 and 10 characters"))]
    pub postcode: String,

    #[validate(range(min = 1.0, message = "Budget must be positive"))]
    pub budget: f64,

    pub budget_type: BudgetType,

    pub preferred_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyToJobDto {
    pub job_id: Uuid,
    pub tradesperson_id: Uuid,

    #[validate(range(min = 1.0, message = "Quotation amount must be positive"))]
    pub quotation_amount: f64,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub quotation_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignJobDto {
    pub job_id: Uuid,
    pub tradesperson_id: Uuid,

    #[validate(range(min = 1.0, message = "Quotation amount must be positive"))]
    pub quotation_amount: f64,

    pub quotation_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientAssignJobDto {
    pub job_id: Uuid,
    pub tradesperson_id: Uuid,

    #[validate(range(min = 1.0, message = "Quotation amount must be positive"))]
    pub quotation_amount: f64,

    pub quotation_notes: Option<String>,

    pub assigned_by: ActorRole,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJobDto {
    pub job_id: Uuid,
    pub completed_by: ActorRole,
    pub reviewer_type: ReviewerRole,
    pub reviewer_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RateTradespersonDto {
    pub job_id: Uuid,
    pub tradesperson_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 1000, message = "Review must be at most 1000 characters"))]
    pub review: Option<String>,

    pub reviewer_type: ReviewerRole,
    pub reviewer_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveJobDto {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuotationAction {
    Approve,
    Reject,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveQuotationDto {
    pub application_id: Uuid,
    pub action: QuotationAction,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTradespersonDto {
    pub tradesperson_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AvailableJobsQuery {
    pub trade: TradeCategory,

    #[validate(length(min = 2, max = 10, message = "Postcode is required"))]
    pub postcode: String,
}

// Response shapes

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Client> for ClientInfo {
    fn from(client: Client) -> Self {
        ClientInfo {
            id: client.id,
            email: client.email,
            first_name: client.first_name,
            last_name: client.last_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradespersonInfo {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub trade: TradeCategory,
    pub years_experience: i32,
    pub hourly_rate: Option<f64>,
}

impl From<Tradesperson> for TradespersonInfo {
    fn from(tp: Tradesperson) -> Self {
        use num_traits::ToPrimitive;

        TradespersonInfo {
            id: tp.id,
            first_name: tp.first_name,
            last_name: tp.last_name,
            email: tp.email,
            phone: tp.phone,
            trade: tp.trade,
            years_experience: tp.years_experience,
            hourly_rate: tp.hourly_rate.as_ref().and_then(|bd| bd.to_f64()),
        }
    }
}

/// A job joined with its client, assigned tradesperson and reviews, as the
/// dashboards consume it.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobWithRelations {
    #[serde(flatten)]
    pub job: Job,
    pub client: Option<ClientInfo>,
    pub tradesperson: Option<TradespersonInfo>,
    pub job_reviews: Vec<JobReview>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationWithTradesperson {
    #[serde(flatten)]
    pub application: JobApplication,
    pub tradesperson: Option<TradespersonInfo>,
}

/// Admin review queue entry: the application plus the job it targets and the
/// client who posted it.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminApplicationView {
    #[serde(flatten)]
    pub application: JobApplication,
    pub tradesperson: Option<TradespersonInfo>,
    pub job: Option<Job>,
    pub client: Option<ClientInfo>,
}

// Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_dto_rejects_non_positive_amount() {
        let dto = ApplyToJobDto {
            job_id: Uuid::new_v4(),
            tradesperson_id: Uuid::new_v4(),
            quotation_amount: 0.0,
            quotation_notes: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn rating_must_stay_in_range() {
        let mut dto = RateTradespersonDto {
            job_id: Uuid::new_v4(),
            tradesperson_id: Uuid::new_v4(),
            rating: 6,
            review: None,
            reviewer_type: ReviewerRole::Client,
            reviewer_id: Uuid::new_v4(),
        };
        assert!(dto.validate().is_err());

        dto.rating = 5;
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn request_bodies_accept_camel_case_keys() {
        let dto: CompleteJobDto = serde_json::from_value(serde_json::json!({
            "jobId": "7f2c1c1e-58c5-4f3a-9d3a-0a4f9e4be111",
            "completedBy": "client",
            "reviewerType": "client",
            "reviewerId": "7f2c1c1e-58c5-4f3a-9d3a-0a4f9e4be222",
        }))
        .unwrap();
        assert_eq!(dto.completed_by, ActorRole::Client);
        assert_eq!(dto.reviewer_type, ReviewerRole::Client);
    }

    #[test]
    fn quotation_action_uses_lowercase_wire_values() {
        let action: QuotationAction = serde_json::from_str(r#""approve""#).unwrap();
        assert_eq!(action, QuotationAction::Approve);
        let action: QuotationAction = serde_json::from_str(r#""reject""#).unwrap();
        assert_eq!(action, QuotationAction::Reject);
    }
}
