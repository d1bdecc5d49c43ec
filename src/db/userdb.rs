use async_trait::async_trait;
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::models::usermodel::{Client, Tradesperson};

#[async_trait]
pub trait UserExt {
    async fn get_client_by_id(&self, client_id: Uuid) -> Result<Option<Client>, sqlx::Error>;
    async fn get_clients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Client>, sqlx::Error>;

    async fn get_tradesperson_by_id(
        &self,
        tradesperson_id: Uuid,
    ) -> Result<Option<Tradesperson>, sqlx::Error>;
    async fn get_tradespeople_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tradesperson>, sqlx::Error>;
    async fn get_all_tradespeople(&self) -> Result<Vec<Tradesperson>, sqlx::Error>;

    async fn verify_tradesperson(
        &self,
        tradesperson_id: Uuid,
    ) -> Result<Option<Tradesperson>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_client_by_id(&self, client_id: Uuid) -> Result<Option<Client>, sqlx::Error> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, email, first_name, last_name, phone, postcode, created_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn get_clients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Client>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, email, first_name, last_name, phone, postcode, created_at
            FROM clients
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn get_tradesperson_by_id(
        &self,
        tradesperson_id: Uuid,
    ) -> Result<Option<Tradesperson>, sqlx::Error> {
        let tradesperson = sqlx::query_as::<_, Tradesperson>(
            r#"
            SELECT id, email, first_name, last_name, phone, postcode, city, trade, years_experience,
                   hourly_rate, is_verified, is_approved, is_active, created_at
            FROM tradespeople
            WHERE id = $1
            "#,
        )
        .bind(tradesperson_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tradesperson)
    }

    async fn get_tradespeople_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Tradesperson>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let tradespeople = sqlx::query_as::<_, Tradesperson>(
            r#"
            SELECT id, email, first_name, last_name, phone, postcode, city, trade, years_experience,
                   hourly_rate, is_verified, is_approved, is_active, created_at
            FROM tradespeople
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tradespeople)
    }

    async fn get_all_tradespeople(&self) -> Result<Vec<Tradesperson>, sqlx::Error> {
        let tradespeople = sqlx::query_as::<_, Tradesperson>(
            r#"
            SELECT id, email, first_name, last_name, phone, postcode, city, trade, years_experience,
                   hourly_rate, is_verified, is_approved, is_active, created_at
            FROM tradespeople
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tradespeople)
    }

    async fn verify_tradesperson(
        &self,
        tradesperson_id: Uuid,
    ) -> Result<Option<Tradesperson>, sqlx::Error> {
        let tradesperson = sqlx::query_as::<_, Tradesperson>(
            r#"
            UPDATE tradespeople
            SET is_verified = TRUE, is_approved = TRUE
            WHERE id = $1
            RETURNING id, email, first_name, last_name, phone, postcode, city, trade, years_experience,
                      hourly_rate, is_verified, is_approved, is_active, created_at
            "#,
        )
        .bind(tradesperson_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tradesperson)
    }
}
