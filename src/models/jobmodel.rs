use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "trade_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TradeCategory {
    Plumber,
    Electrician,
    Carpenter,
    Painter,
    Roofer,
    Plasterer,
    Tiler,
    Bricklayer,
    Gardener,
    Locksmith,
    GasEngineer,
    Handyman,
    Other,
}

impl TradeCategory {
    pub fn to_str(&self) -> &str {
        match self {
            TradeCategory::Plumber => "plumber",
            TradeCategory::Electrician => "electrician",
            TradeCategory::Carpenter => "carpenter",
            TradeCategory::Painter => "painter",
            TradeCategory::Roofer => "roofer",
            TradeCategory::Plasterer => "plasterer",
            TradeCategory::Tiler => "tiler",
            TradeCategory::Bricklayer => "bricklayer",
            TradeCategory::Gardener => "gardener",
            TradeCategory::Locksmith => "locksmith",
            TradeCategory::GasEngineer => "gas_engineer",
            TradeCategory::Handyman => "handyman",
            TradeCategory::Other => "other",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "budget_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    Fixed,
    Hourly,
    Negotiable,
}

/// Which actor class performed an assignment or completion.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "actor_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Client,
    Admin,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "reviewer_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Client,
    Tradesperson,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub client_id: Uuid,
    pub trade: TradeCategory,
    pub job_description: String,
    pub postcode: String,
    pub budget: BigDecimal,
    pub budget_type: BudgetType,
    pub preferred_date: Option<NaiveDate>,
    pub is_approved: Option<bool>, // Database has DEFAULT FALSE, can be NULL
    pub assigned_tradesperson_id: Option<Uuid>,
    pub assigned_by: Option<ActorRole>,
    pub quotation_amount: Option<BigDecimal>,
    pub quotation_notes: Option<String>,
    pub is_completed: Option<bool>, // Database has DEFAULT FALSE, can be NULL
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<ActorRole>,
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub tradesperson_id: Uuid,
    pub quotation_amount: BigDecimal,
    pub quotation_notes: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobReview {
    pub id: Uuid,
    pub job_id: Uuid,
    pub tradesperson_id: Uuid,
    pub reviewer_type: ReviewerRole,
    pub reviewer_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}
