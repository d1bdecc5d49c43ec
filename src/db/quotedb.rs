use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::dtos::quotedtos::CreateQuoteRequestDto;
use crate::models::quotemodel::{Quote, QuoteRequest, QuoteRequestStatus};

#[async_trait]
pub trait QuoteExt {
    async fn create_quote_request(
        &self,
        dto: CreateQuoteRequestDto,
    ) -> Result<QuoteRequest, sqlx::Error>;

    async fn lock_quote_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
    ) -> Result<Option<QuoteRequest>, sqlx::Error>;

    async fn set_admin_decision(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
        approved: bool,
    ) -> Result<QuoteRequest, sqlx::Error>;

    async fn insert_quote(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
        tradesperson_id: Uuid,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Result<Quote, sqlx::Error>;

    async fn mark_request_quoted(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
    ) -> Result<QuoteRequest, sqlx::Error>;

    async fn get_quote_by_id(&self, quote_id: Uuid) -> Result<Option<Quote>, sqlx::Error>;

    async fn set_client_decision(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        quote_id: Uuid,
        request_id: Uuid,
        approved: bool,
    ) -> Result<QuoteRequest, sqlx::Error>;

    async fn get_quote_requests_by_email(
        &self,
        customer_email: &str,
    ) -> Result<Vec<QuoteRequest>, sqlx::Error>;

    async fn get_quote_requests_by_tradesperson(
        &self,
        tradesperson_id: Uuid,
    ) -> Result<Vec<QuoteRequest>, sqlx::Error>;

    async fn get_pending_quote_requests(&self) -> Result<Vec<QuoteRequest>, sqlx::Error>;

    async fn get_latest_quotes_for_requests(
        &self,
        request_ids: &[Uuid],
    ) -> Result<Vec<Quote>, sqlx::Error>;
}

#[async_trait]
impl QuoteExt for DBClient {
    async fn create_quote_request(
        &self,
        dto: CreateQuoteRequestDto,
    ) -> Result<QuoteRequest, sqlx::Error> {
        let request = sqlx::query_as::<_, QuoteRequest>(
            r#"
            INSERT INTO quote_requests (client_id, tradesperson_id, customer_name, customer_email,
                                        customer_phone, project_type, project_description,
                                        location, timeframe, budget_range)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, client_id, tradesperson_id, customer_name, customer_email,
                      customer_phone, project_type, project_description, location, timeframe,
                      budget_range, status, admin_approved, tradesperson_quoted, client_approved,
                      created_at
            "#,
        )
        .bind(dto.client_id)
        .bind(dto.tradesperson_id)
        .bind(dto.customer_name)
        .bind(dto.customer_email.to_lowercase())
        .bind(dto.customer_phone)
        .bind(dto.project_type)
        .bind(dto.project_description)
        .bind(dto.location)
        .bind(dto.timeframe)
        .bind(dto.budget_range)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn lock_quote_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
    ) -> Result<Option<QuoteRequest>, sqlx::Error> {
        let request = sqlx::query_as::<_, QuoteRequest>(
            r#"
            SELECT id, client_id, tradesperson_id, customer_name, customer_email, customer_phone,
                   project_type, project_description, location, timeframe, budget_range, status,
                   admin_approved, tradesperson_quoted, client_approved, created_at
            FROM quote_requests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(request)
    }

    async fn set_admin_decision(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
        approved: bool,
    ) -> Result<QuoteRequest, sqlx::Error> {
        let status = if approved {
            QuoteRequestStatus::AdminApproved
        } else {
            QuoteRequestStatus::AdminRejected
        };

        let request = sqlx::query_as::<_, QuoteRequest>(
            r#"
            UPDATE quote_requests
            SET admin_approved = $2, status = $3
            WHERE id = $1
            RETURNING id, client_id, tradesperson_id, customer_name, customer_email,
                      customer_phone, project_type, project_description, location, timeframe,
                      budget_range, status, admin_approved, tradesperson_quoted, client_approved,
                      created_at
            "#,
        )
        .bind(request_id)
        .bind(approved)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(request)
    }

    async fn insert_quote(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
        tradesperson_id: Uuid,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Result<Quote, sqlx::Error> {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (quote_request_id, tradesperson_id, amount, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, quote_request_id, tradesperson_id, amount, description, status,
                      created_at
            "#,
        )
        .bind(request_id)
        .bind(tradesperson_id)
        .bind(amount)
        .bind(description)
        .fetch_one(&mut **tx)
        .await?;

        Ok(quote)
    }

    async fn mark_request_quoted(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
    ) -> Result<QuoteRequest, sqlx::Error> {
        let request = sqlx::query_as::<_, QuoteRequest>(
            r#"
            UPDATE quote_requests
            SET tradesperson_quoted = TRUE, status = $2
            WHERE id = $1
            RETURNING id, client_id, tradesperson_id, customer_name, customer_email,
                      customer_phone, project_type, project_description, location, timeframe,
                      budget_range, status, admin_approved, tradesperson_quoted, client_approved,
                      created_at
            "#,
        )
        .bind(request_id)
        .bind(QuoteRequestStatus::Quoted)
        .fetch_one(&mut **tx)
        .await?;

        Ok(request)
    }

    async fn get_quote_by_id(&self, quote_id: Uuid) -> Result<Option<Quote>, sqlx::Error> {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            SELECT id, quote_request_id, tradesperson_id, amount, description, status, created_at
            FROM quotes
            WHERE id = $1
            "#,
        )
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quote)
    }

    async fn set_client_decision(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        quote_id: Uuid,
        request_id: Uuid,
        approved: bool,
    ) -> Result<QuoteRequest, sqlx::Error> {
        let status = if approved {
            QuoteRequestStatus::Approved
        } else {
            QuoteRequestStatus::Rejected
        };

        sqlx::query(
            r#"
            UPDATE quotes
            SET status = $2
            WHERE id = $1
            "#,
        )
        .bind(quote_id)
        .bind(status)
        .execute(&mut **tx)
        .await?;

        let request = sqlx::query_as::<_, QuoteRequest>(
            r#"
            UPDATE quote_requests
            SET client_approved = $2, status = $3
            WHERE id = $1
            RETURNING id, client_id, tradesperson_id, customer_name, customer_email,
                      customer_phone, project_type, project_description, location, timeframe,
                      budget_range, status, admin_approved, tradesperson_quoted, client_approved,
                      created_at
            "#,
        )
        .bind(request_id)
        .bind(approved)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(request)
    }

    async fn get_quote_requests_by_email(
        &self,
        customer_email: &str,
    ) -> Result<Vec<QuoteRequest>, sqlx::Error> {
        let requests = sqlx::query_as::<_, QuoteRequest>(
            r#"
            SELECT id, client_id, tradesperson_id, customer_name, customer_email, customer_phone,
                   project_type, project_description, location, timeframe, budget_range, status,
                   admin_approved, tradesperson_quoted, client_approved, created_at
            FROM quote_requests
            WHERE LOWER(customer_email) = LOWER($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn get_quote_requests_by_tradesperson(
        &self,
        tradesperson_id: Uuid,
    ) -> Result<Vec<QuoteRequest>, sqlx::Error> {
        // Tradespeople only see requests an admin has already let through.
        let requests = sqlx::query_as::<_, QuoteRequest>(
            r#"
            SELECT id, client_id, tradesperson_id, customer_name, customer_email, customer_phone,
                   project_type, project_description, location, timeframe, budget_range, status,
                   admin_approved, tradesperson_quoted, client_approved, created_at
            FROM quote_requests
            WHERE tradesperson_id = $1
              AND COALESCE(admin_approved, FALSE) = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .bind(tradesperson_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn get_pending_quote_requests(&self) -> Result<Vec<QuoteRequest>, sqlx::Error> {
        let requests = sqlx::query_as::<_, QuoteRequest>(
            r#"
            SELECT id, client_id, tradesperson_id, customer_name, customer_email, customer_phone,
                   project_type, project_description, location, timeframe, budget_range, status,
                   admin_approved, tradesperson_quoted, client_approved, created_at
            FROM quote_requests
            WHERE status = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(QuoteRequestStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn get_latest_quotes_for_requests(
        &self,
        request_ids: &[Uuid],
    ) -> Result<Vec<Quote>, sqlx::Error> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }

        let quotes = sqlx::query_as::<_, Quote>(
            r#"
            SELECT DISTINCT ON (quote_request_id)
                   id, quote_request_id, tradesperson_id, amount, description, status, created_at
            FROM quotes
            WHERE quote_request_id = ANY($1)
            ORDER BY quote_request_id, created_at DESC
            "#,
        )
        .bind(request_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotes)
    }
}
