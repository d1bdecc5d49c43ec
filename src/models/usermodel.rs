use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

use super::jobmodel::TradeCategory;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub postcode: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tradesperson {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub postcode: String,
    pub city: Option<String>,
    pub trade: TradeCategory,
    pub years_experience: i32,
    pub hourly_rate: Option<BigDecimal>,
    pub is_verified: Option<bool>, // Database has DEFAULT FALSE, can be NULL
    pub is_approved: Option<bool>, // Database has DEFAULT FALSE, can be NULL
    pub is_active: Option<bool>,   // Database has DEFAULT TRUE, can be NULL
    pub created_at: Option<DateTime<Utc>>,
}
