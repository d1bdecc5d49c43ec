use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "quote_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteRequestStatus {
    Pending,
    AdminApproved,
    AdminRejected,
    Quoted,
    Approved,
    Rejected,
}

/// Customer-to-tradesperson quote request. The three pipeline flags are the
/// authority for transitions; `status` mirrors them for listings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuoteRequest {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub tradesperson_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub project_type: Option<String>,
    pub project_description: String,
    pub location: String,
    pub timeframe: Option<String>,
    pub budget_range: Option<String>,
    pub status: QuoteRequestStatus,
    pub admin_approved: Option<bool>,      // Database has DEFAULT FALSE, can be NULL
    pub tradesperson_quoted: Option<bool>, // Database has DEFAULT FALSE, can be NULL
    pub client_approved: Option<bool>,     // Database has DEFAULT FALSE, can be NULL
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quote {
    pub id: Uuid,
    pub quote_request_id: Uuid,
    pub tradesperson_id: Uuid,
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub status: QuoteRequestStatus,
    pub created_at: Option<DateTime<Utc>>,
}
