use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::models::jobmodel::{
    ActorRole, ApplicationStatus, BudgetType, Job, JobApplication, JobReview, ReviewerRole,
    TradeCategory,
};

#[async_trait]
pub trait JobExt {
    async fn create_job(
        &self,
        client_id: Uuid,
        trade: TradeCategory,
        job_description: String,
        postcode: String,
        budget: f64,
        budget_type: BudgetType,
        preferred_date: Option<NaiveDate>,
    ) -> Result<Job, sqlx::Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error>;

    /// Row-lock a job inside an open transaction so concurrent assignment
    /// and completion attempts serialize on it.
    async fn lock_job(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, sqlx::Error>;

    async fn get_jobs_for_admin(&self) -> Result<Vec<Job>, sqlx::Error>;
    async fn get_jobs_by_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Job>, sqlx::Error>;
    async fn get_jobs_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, sqlx::Error>;
    async fn get_available_jobs(
        &self,
        trade: TradeCategory,
        outward: &str,
    ) -> Result<Vec<Job>, sqlx::Error>;

    async fn approve_job(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error>;

    async fn apply_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job_id: Uuid,
        tradesperson_id: Uuid,
        quotation_amount: BigDecimal,
        quotation_notes: Option<String>,
        assigned_by: ActorRole,
    ) -> Result<Job, sqlx::Error>;

    async fn mark_job_completed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job_id: Uuid,
        completed_by: ActorRole,
    ) -> Result<Job, sqlx::Error>;

    async fn create_job_application(
        &self,
        job_id: Uuid,
        tradesperson_id: Uuid,
        quotation_amount: f64,
        quotation_notes: Option<String>,
    ) -> Result<JobApplication, sqlx::Error>;

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, sqlx::Error>;

    /// Row-lock every application for a job inside an open transaction, so
    /// the settlement decided under the job lock cannot race a concurrent
    /// decision on the same rows.
    async fn get_applications_for_job_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job_id: Uuid,
    ) -> Result<Vec<JobApplication>, sqlx::Error>;

    /// Accept a pending application. Returns None when the row is no longer
    /// pending, so a stale decision cannot resurrect a settled application.
    async fn accept_application(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, sqlx::Error>;

    async fn reject_applications(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        application_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error>;

    async fn reject_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, sqlx::Error>;

    async fn get_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<JobApplication>, sqlx::Error>;

    async fn get_pending_applications(&self) -> Result<Vec<JobApplication>, sqlx::Error>;

    async fn create_job_review(
        &self,
        job_id: Uuid,
        tradesperson_id: Uuid,
        reviewer_type: ReviewerRole,
        reviewer_id: Uuid,
        rating: i32,
        review_text: Option<String>,
    ) -> Result<JobReview, sqlx::Error>;

    async fn get_reviews_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<JobReview>, sqlx::Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        client_id: Uuid,
        trade: TradeCategory,
        job_description: String,
        postcode: String,
        budget: f64,
        budget_type: BudgetType,
        preferred_date: Option<NaiveDate>,
    ) -> Result<Job, sqlx::Error> {
        let budget = BigDecimal::try_from(budget)
            .map_err(|e| sqlx::Error::Protocol(format!("invalid budget: {}", e)))?;

        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (client_id, trade, job_description, postcode, budget, budget_type, preferred_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, client_id, trade, job_description, postcode, budget, budget_type,
                      preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                      quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                      created_at
            "#,
        )
        .bind(client_id)
        .bind(trade)
        .bind(job_description)
        .bind(postcode.to_uppercase())
        .bind(budget)
        .bind(budget_type)
        .bind(preferred_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, client_id, trade, job_description, postcode, budget, budget_type,
                   preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                   quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                   created_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    async fn lock_job(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, client_id, trade, job_description, postcode, budget, budget_type,
                   preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                   quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                   created_at
            FROM jobs
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(job_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(job)
    }

    async fn get_jobs_for_admin(&self) -> Result<Vec<Job>, sqlx::Error> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, client_id, trade, job_description, postcode, budget, budget_type,
                   preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                   quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                   created_at
            FROM jobs
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    async fn get_jobs_by_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Job>, sqlx::Error> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, client_id, trade, job_description, postcode, budget, budget_type,
                   preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                   quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                   created_at
            FROM jobs
            WHERE id = ANY($1)
            "#,
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    async fn get_jobs_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, sqlx::Error> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, client_id, trade, job_description, postcode, budget, budget_type,
                   preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                   quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                   created_at
            FROM jobs
            WHERE client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    async fn get_available_jobs(
        &self,
        trade: TradeCategory,
        outward: &str,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, client_id, trade, job_description, postcode, budget, budget_type,
                   preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                   quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                   created_at
            FROM jobs
            WHERE COALESCE(is_approved, FALSE) = TRUE
              AND assigned_tradesperson_id IS NULL
              AND COALESCE(is_completed, FALSE) = FALSE
              AND trade = $1
              AND (CASE WHEN position(' ' IN postcode) > 0
                        THEN split_part(UPPER(postcode), ' ', 1)
                        WHEN length(postcode) > 3
                        THEN UPPER(left(postcode, length(postcode) - 3))
                        ELSE UPPER(postcode)
                   END) = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(trade)
        .bind(outward)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    async fn approve_job(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        // Idempotent: approving an already-approved job is a no-op update.
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET is_approved = TRUE
            WHERE id = $1
            RETURNING id, client_id, trade, job_description, postcode, budget, budget_type,
                      preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                      quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                      created_at
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    async fn apply_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job_id: Uuid,
        tradesperson_id: Uuid,
        quotation_amount: BigDecimal,
        quotation_notes: Option<String>,
        assigned_by: ActorRole,
    ) -> Result<Job, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET assigned_tradesperson_id = $2,
                assigned_by = $3,
                quotation_amount = $4,
                quotation_notes = $5
            WHERE id = $1
            RETURNING id, client_id, trade, job_description, postcode, budget, budget_type,
                      preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                      quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                      created_at
            "#,
        )
        .bind(job_id)
        .bind(tradesperson_id)
        .bind(assigned_by)
        .bind(quotation_amount)
        .bind(quotation_notes)
        .fetch_one(&mut **tx)
        .await?;

        Ok(job)
    }

    async fn mark_job_completed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job_id: Uuid,
        completed_by: ActorRole,
    ) -> Result<Job, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET is_completed = TRUE,
                completed_at = NOW(),
                completed_by = $2
            WHERE id = $1
            RETURNING id, client_id, trade, job_description, postcode, budget, budget_type,
                      preferred_date, is_approved, assigned_tradesperson_id, assigned_by,
                      quotation_amount, quotation_notes, is_completed, completed_at, completed_by,
                      created_at
            "#,
        )
        .bind(job_id)
        .bind(completed_by)
        .fetch_one(&mut **tx)
        .await?;

        Ok(job)
    }

    async fn create_job_application(
        &self,
        job_id: Uuid,
        tradesperson_id: Uuid,
        quotation_amount: f64,
        quotation_notes: Option<String>,
    ) -> Result<JobApplication, sqlx::Error> {
        let amount = BigDecimal::try_from(quotation_amount)
            .map_err(|e| sqlx::Error::Protocol(format!("invalid quotation amount: {}", e)))?;

        let application = sqlx::query_as::<_, JobApplication>(
            r#"
            INSERT INTO job_applications (job_id, tradesperson_id, quotation_amount, quotation_notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, job_id, tradesperson_id, quotation_amount, quotation_notes, status,
                      applied_at, accepted_at
            "#,
        )
        .bind(job_id)
        .bind(tradesperson_id)
        .bind(amount)
        .bind(quotation_notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(application)
    }

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        let application = sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT id, job_id, tradesperson_id, quotation_amount, quotation_notes, status,
                   applied_at, accepted_at
            FROM job_applications
            WHERE id = $1
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn get_applications_for_job_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job_id: Uuid,
    ) -> Result<Vec<JobApplication>, sqlx::Error> {
        let applications = sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT id, job_id, tradesperson_id, quotation_amount, quotation_notes, status,
                   applied_at, accepted_at
            FROM job_applications
            WHERE job_id = $1
            ORDER BY applied_at DESC
            FOR UPDATE
            "#,
        )
        .bind(job_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(applications)
    }

    async fn accept_application(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        let application = sqlx::query_as::<_, JobApplication>(
            r#"
            UPDATE job_applications
            SET status = $2, accepted_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING id, job_id, tradesperson_id, quotation_amount, quotation_notes, status,
                      applied_at, accepted_at
            "#,
        )
        .bind(application_id)
        .bind(ApplicationStatus::Accepted)
        .bind(ApplicationStatus::Pending)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(application)
    }

    async fn reject_applications(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        application_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        if application_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE job_applications
            SET status = $2, accepted_at = NULL
            WHERE id = ANY($1)
            "#,
        )
        .bind(application_ids)
        .bind(ApplicationStatus::Rejected)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn reject_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        // Only pending applications can be rejected directly.
        let application = sqlx::query_as::<_, JobApplication>(
            r#"
            UPDATE job_applications
            SET status = $2
            WHERE id = $1 AND status = $3
            RETURNING id, job_id, tradesperson_id, quotation_amount, quotation_notes, status,
                      applied_at, accepted_at
            "#,
        )
        .bind(application_id)
        .bind(ApplicationStatus::Rejected)
        .bind(ApplicationStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn get_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<JobApplication>, sqlx::Error> {
        let applications = sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT id, job_id, tradesperson_id, quotation_amount, quotation_notes, status,
                   applied_at, accepted_at
            FROM job_applications
            WHERE job_id = $1
            ORDER BY applied_at DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn get_pending_applications(&self) -> Result<Vec<JobApplication>, sqlx::Error> {
        let applications = sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT id, job_id, tradesperson_id, quotation_amount, quotation_notes, status,
                   applied_at, accepted_at
            FROM job_applications
            WHERE status = $1
            ORDER BY applied_at DESC
            "#,
        )
        .bind(ApplicationStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn create_job_review(
        &self,
        job_id: Uuid,
        tradesperson_id: Uuid,
        reviewer_type: ReviewerRole,
        reviewer_id: Uuid,
        rating: i32,
        review_text: Option<String>,
    ) -> Result<JobReview, sqlx::Error> {
        let review = sqlx::query_as::<_, JobReview>(
            r#"
            INSERT INTO job_reviews (job_id, tradesperson_id, reviewer_type, reviewer_id, rating, review_text)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, job_id, tradesperson_id, reviewer_type, reviewer_id, rating, review_text,
                      reviewed_at
            "#,
        )
        .bind(job_id)
        .bind(tradesperson_id)
        .bind(reviewer_type)
        .bind(reviewer_id)
        .bind(rating)
        .bind(review_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    async fn get_reviews_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<JobReview>, sqlx::Error> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        let reviews = sqlx::query_as::<_, JobReview>(
            r#"
            SELECT id, job_id, tradesperson_id, reviewer_type, reviewer_id, rating, review_text,
                   reviewed_at
            FROM job_reviews
            WHERE job_id = ANY($1)
            ORDER BY reviewed_at DESC
            "#,
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
