use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::jobdtos::QuotationAction;
use crate::models::quotemodel::QuoteRequest;

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequestDto {
    pub client_id: Option<Uuid>,
    pub tradesperson_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub customer_name: String,

    #[validate(email(message = "Invalid customer email"))]
    pub customer_email: String,

    pub customer_phone: Option<String>,

    pub project_type: Option<String>,

    #[validate(length(min = 10, max = 2000, message = "Project description must be between 10 and 2000 characters"))]
    pub project_description: String,

    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,

    pub timeframe: Option<String>,
    pub budget_range: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveQuoteRequestDto {
    pub quote_request_id: Uuid,
    pub action: QuotationAction,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteDto {
    pub quote_request_id: Uuid,
    pub tradesperson_id: Uuid,

    #[validate(range(min = 1.0, message = "Quote amount must be positive"))]
    pub amount: f64,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveQuoteDto {
    pub quote_id: Uuid,
    pub action: QuotationAction,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientQuoteRequestsQuery {
    pub email: String,
}

/// Quote request joined with the tradesperson's name/trade and the latest
/// submitted quote, as the client dashboard renders it.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteRequestWithQuote {
    #[serde(flatten)]
    pub request: QuoteRequest,
    pub tradesperson_name: Option<String>,
    pub tradesperson_trade: Option<String>,
    pub latest_quote_id: Option<Uuid>,
    pub latest_quote_amount: Option<f64>,
    pub latest_quote_description: Option<String>,
}
