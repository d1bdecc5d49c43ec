// services/job_service.rs
use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{
        cache::{CacheHelper, JOB_LIST_TTL},
        db::DBClient,
        jobdb::JobExt,
        userdb::UserExt,
    },
    dtos::jobdtos::*,
    models::{jobmodel::*, usermodel::Tradesperson},
    service::{assignment, error::ServiceError},
};

/// Outcome of an admin quotation decision. `job` is present only when the
/// approval assigned the job.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuotationDecision {
    pub application: JobApplication,
    pub job: Option<Job>,
}

#[derive(Debug, Clone)]
pub struct JobService {
    db_client: Arc<DBClient>,
}

impl JobService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn create_job(&self, dto: CreateJobDto) -> Result<Job, ServiceError> {
        self.db_client
            .get_client_by_id(dto.client_id)
            .await?
            .ok_or(ServiceError::ClientNotFound(dto.client_id))?;

        let job = self
            .db_client
            .create_job(
                dto.client_id,
                dto.trade,
                dto.job_description,
                dto.postcode,
                dto.budget,
                dto.budget_type,
                dto.preferred_date,
            )
            .await?;

        self.invalidate_job_caches().await;
        Ok(job)
    }

    pub async fn approve_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        assignment::check_approval(assignment::stage_of(&job))?;

        let job = self
            .db_client
            .approve_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        self.invalidate_job_caches().await;
        Ok(job)
    }

    pub async fn apply_to_job(&self, dto: ApplyToJobDto) -> Result<JobApplication, ServiceError> {
        self.db_client
            .get_tradesperson_by_id(dto.tradesperson_id)
            .await?
            .ok_or(ServiceError::TradespersonNotFound(dto.tradesperson_id))?;

        let job = self
            .db_client
            .get_job_by_id(dto.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(dto.job_id))?;

        assignment::check_application(assignment::stage_of(&job))?;

        let application = self
            .db_client
            .create_job_application(
                dto.job_id,
                dto.tradesperson_id,
                dto.quotation_amount,
                dto.quotation_notes,
            )
            .await
            .map_err(|e| map_unique_violation(e, ServiceError::DuplicateApplication))?;

        self.invalidate_job_caches().await;
        Ok(application)
    }

    /// Assign a tradesperson to a job on behalf of `actor`. All effects —
    /// the job update, accepting the matching application, rejecting the
    /// rest — commit atomically.
    pub async fn assign_job(
        &self,
        job_id: Uuid,
        tradesperson_id: Uuid,
        quotation_amount: f64,
        quotation_notes: Option<String>,
        actor: ActorRole,
    ) -> Result<Job, ServiceError> {
        self.db_client
            .get_tradesperson_by_id(tradesperson_id)
            .await?
            .ok_or(ServiceError::TradespersonNotFound(tradesperson_id))?;

        let amount = BigDecimal::try_from(quotation_amount)
            .map_err(|_| ServiceError::Validation("Invalid quotation amount".to_string()))?;

        let mut tx = self.db_client.pool.begin().await?;

        let job = self
            .db_client
            .lock_job(&mut tx, job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        assignment::check_assignment(assignment::stage_of(&job), actor)?;

        let job = self
            .db_client
            .apply_assignment(
                &mut tx,
                job_id,
                tradesperson_id,
                amount,
                quotation_notes,
                actor,
            )
            .await?;

        // Direct assignment does not require an application. When the new
        // tradesperson has a pending one it becomes the accepted row; every
        // other outstanding application — a previously accepted one from an
        // earlier assignment included — is demoted.
        let applications = self
            .db_client
            .get_applications_for_job_tx(&mut tx, job_id)
            .await?;
        let winner = applications
            .iter()
            .find(|a| {
                a.tradesperson_id == tradesperson_id && a.status == ApplicationStatus::Pending
            })
            .map(|a| a.id);

        if let Some(application_id) = winner {
            self.db_client
                .accept_application(&mut tx, application_id)
                .await?;
        }
        let demoted = assignment::applications_to_demote(&applications, winner);
        self.db_client.reject_applications(&mut tx, &demoted).await?;

        tx.commit().await?;

        self.invalidate_job_caches().await;
        Ok(job)
    }

    /// Admin decision on a tradesperson's quotation. Approval assigns the
    /// job to the applicant at the quoted amount, acting for the client.
    pub async fn decide_quotation(
        &self,
        dto: ApproveQuotationDto,
    ) -> Result<QuotationDecision, ServiceError> {
        let application = self
            .db_client
            .get_application_by_id(dto.application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(dto.application_id))?;

        match dto.action {
            QuotationAction::Reject => {
                let application = self
                    .db_client
                    .reject_application(dto.application_id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::Validation("Application is no longer pending".to_string())
                    })?;
                self.invalidate_job_caches().await;
                Ok(QuotationDecision {
                    application,
                    job: None,
                })
            }
            QuotationAction::Approve => {
                let mut tx = self.db_client.pool.begin().await?;

                let job = self
                    .db_client
                    .lock_job(&mut tx, application.job_id)
                    .await?
                    .ok_or(ServiceError::JobNotFound(application.job_id))?;

                // Approving a quotation acts on the client's behalf.
                assignment::check_assignment(assignment::stage_of(&job), ActorRole::Client)?;

                // Re-read under the lock; the pre-lock snapshot may be stale
                // against a concurrent decision on the same application.
                let applications = self
                    .db_client
                    .get_applications_for_job_tx(&mut tx, job.id)
                    .await?;
                let winner = applications
                    .iter()
                    .find(|a| a.id == dto.application_id)
                    .ok_or(ServiceError::ApplicationNotFound(dto.application_id))?;
                if winner.status != ApplicationStatus::Pending {
                    return Err(ServiceError::Validation(
                        "Application is no longer pending".to_string(),
                    ));
                }

                let job = self
                    .db_client
                    .apply_assignment(
                        &mut tx,
                        job.id,
                        winner.tradesperson_id,
                        winner.quotation_amount.clone(),
                        winner.quotation_notes.clone(),
                        ActorRole::Client,
                    )
                    .await?;

                let accepted = self
                    .db_client
                    .accept_application(&mut tx, winner.id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::Validation("Application is no longer pending".to_string())
                    })?;
                let demoted = assignment::applications_to_demote(&applications, Some(winner.id));
                self.db_client.reject_applications(&mut tx, &demoted).await?;

                tx.commit().await?;

                self.invalidate_job_caches().await;
                Ok(QuotationDecision {
                    application: accepted,
                    job: Some(job),
                })
            }
        }
    }

    pub async fn complete_job(&self, dto: CompleteJobDto) -> Result<Job, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let job = self
            .db_client
            .lock_job(&mut tx, dto.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(dto.job_id))?;

        assignment::check_completion(assignment::stage_of(&job))?;
        verify_reviewer_identity(&job, dto.reviewer_type, dto.reviewer_id)?;

        let job = self
            .db_client
            .mark_job_completed(&mut tx, dto.job_id, dto.completed_by)
            .await?;

        tx.commit().await?;

        self.invalidate_job_caches().await;
        Ok(job)
    }

    pub async fn rate_tradesperson(
        &self,
        dto: RateTradespersonDto,
    ) -> Result<JobReview, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(dto.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(dto.job_id))?;

        assignment::check_review(assignment::stage_of(&job))?;

        if job.assigned_tradesperson_id != Some(dto.tradesperson_id) {
            return Err(ServiceError::Validation(
                "Tradesperson was not assigned to this job".to_string(),
            ));
        }
        verify_reviewer_identity(&job, dto.reviewer_type, dto.reviewer_id)?;

        let review = self
            .db_client
            .create_job_review(
                dto.job_id,
                dto.tradesperson_id,
                dto.reviewer_type,
                dto.reviewer_id,
                dto.rating,
                dto.review,
            )
            .await
            .map_err(|e| map_unique_violation(e, ServiceError::DuplicateReview))?;

        self.invalidate_job_caches().await;
        Ok(review)
    }

    pub async fn get_admin_jobs(&self) -> Result<Vec<JobWithRelations>, ServiceError> {
        let cache_key = "jobs:admin";
        if let Some(cached) = self.cached_list(cache_key).await {
            return Ok(cached);
        }

        let jobs = self.db_client.get_jobs_for_admin().await?;
        let assembled = self.assemble_jobs(jobs).await?;

        self.cache_list(cache_key, &assembled).await;
        Ok(assembled)
    }

    pub async fn get_client_jobs(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<JobWithRelations>, ServiceError> {
        self.db_client
            .get_client_by_id(client_id)
            .await?
            .ok_or(ServiceError::ClientNotFound(client_id))?;

        let cache_key = format!("jobs:client:{}", client_id);
        if let Some(cached) = self.cached_list(&cache_key).await {
            return Ok(cached);
        }

        let jobs = self.db_client.get_jobs_by_client(client_id).await?;
        let assembled = self.assemble_jobs(jobs).await?;

        self.cache_list(&cache_key, &assembled).await;
        Ok(assembled)
    }

    /// Open jobs for a tradesperson's feed: same trade, same postcode area.
    pub async fn get_available_jobs(
        &self,
        trade: TradeCategory,
        postcode: &str,
    ) -> Result<Vec<Job>, ServiceError> {
        let outward = crate::utils::postcode::outward_code(postcode);
        let cache_key = format!("jobs:available:{}:{}", trade.to_str(), outward);

        if let Some(redis) = &self.db_client.redis_client {
            if let Ok(Some(cached)) = CacheHelper::get::<Vec<Job>>(redis, &cache_key).await {
                return Ok(cached);
            }
        }

        let jobs = self.db_client.get_available_jobs(trade, &outward).await?;

        if let Some(redis) = &self.db_client.redis_client {
            if let Err(e) = CacheHelper::set(redis, &cache_key, &jobs, JOB_LIST_TTL).await {
                tracing::warn!("Failed to cache available jobs: {}", e);
            }
        }
        Ok(jobs)
    }

    pub async fn get_job_applications(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<ApplicationWithTradesperson>, ServiceError> {
        self.db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let applications = self.db_client.get_applications_for_job(job_id).await?;
        self.with_tradespeople(applications).await
    }

    /// Admin review queue: pending applications with the job they target,
    /// the posting client and the applicant.
    pub async fn get_pending_applications(
        &self,
    ) -> Result<Vec<AdminApplicationView>, ServiceError> {
        let applications = self.db_client.get_pending_applications().await?;

        let tradesperson_ids: Vec<Uuid> = dedup(applications.iter().map(|a| a.tradesperson_id));
        let job_ids: Vec<Uuid> = dedup(applications.iter().map(|a| a.job_id));

        let tradespeople: HashMap<Uuid, TradespersonInfo> = self
            .db_client
            .get_tradespeople_by_ids(&tradesperson_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, TradespersonInfo::from(t)))
            .collect();

        let jobs: HashMap<Uuid, Job> = self
            .db_client
            .get_jobs_by_ids(&job_ids)
            .await?
            .into_iter()
            .map(|j| (j.id, j))
            .collect();

        let client_ids: Vec<Uuid> = dedup(jobs.values().map(|j| j.client_id));
        let clients: HashMap<Uuid, ClientInfo> = self
            .db_client
            .get_clients_by_ids(&client_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, ClientInfo::from(c)))
            .collect();

        Ok(applications
            .into_iter()
            .map(|application| {
                let tradesperson = tradespeople.get(&application.tradesperson_id).cloned();
                let job = jobs.get(&application.job_id).cloned();
                let client = job
                    .as_ref()
                    .and_then(|j| clients.get(&j.client_id).cloned());
                AdminApplicationView {
                    application,
                    tradesperson,
                    job,
                    client,
                }
            })
            .collect())
    }

    pub async fn verify_tradesperson(
        &self,
        tradesperson_id: Uuid,
    ) -> Result<Tradesperson, ServiceError> {
        self.db_client
            .verify_tradesperson(tradesperson_id)
            .await?
            .ok_or(ServiceError::TradespersonNotFound(tradesperson_id))
    }

    pub async fn get_tradespeople(&self) -> Result<Vec<Tradesperson>, ServiceError> {
        Ok(self.db_client.get_all_tradespeople().await?)
    }

    async fn assemble_jobs(&self, jobs: Vec<Job>) -> Result<Vec<JobWithRelations>, ServiceError> {
        let client_ids: Vec<Uuid> = dedup(jobs.iter().map(|j| j.client_id));
        let tradesperson_ids: Vec<Uuid> =
            dedup(jobs.iter().filter_map(|j| j.assigned_tradesperson_id));
        let job_ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();

        let clients: HashMap<Uuid, ClientInfo> = self
            .db_client
            .get_clients_by_ids(&client_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, ClientInfo::from(c)))
            .collect();

        let tradespeople: HashMap<Uuid, TradespersonInfo> = self
            .db_client
            .get_tradespeople_by_ids(&tradesperson_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, TradespersonInfo::from(t)))
            .collect();

        let mut reviews: HashMap<Uuid, Vec<JobReview>> = HashMap::new();
        for review in self.db_client.get_reviews_for_jobs(&job_ids).await? {
            reviews.entry(review.job_id).or_default().push(review);
        }

        Ok(jobs
            .into_iter()
            .map(|job| {
                let client = clients.get(&job.client_id).cloned();
                let tradesperson = job
                    .assigned_tradesperson_id
                    .and_then(|id| tradespeople.get(&id).cloned());
                let job_reviews = reviews.remove(&job.id).unwrap_or_default();
                JobWithRelations {
                    job,
                    client,
                    tradesperson,
                    job_reviews,
                }
            })
            .collect())
    }

    async fn with_tradespeople(
        &self,
        applications: Vec<JobApplication>,
    ) -> Result<Vec<ApplicationWithTradesperson>, ServiceError> {
        let ids: Vec<Uuid> = dedup(applications.iter().map(|a| a.tradesperson_id));
        let tradespeople: HashMap<Uuid, TradespersonInfo> = self
            .db_client
            .get_tradespeople_by_ids(&ids)
            .await?
            .into_iter()
            .map(|t| (t.id, TradespersonInfo::from(t)))
            .collect();

        Ok(applications
            .into_iter()
            .map(|application| {
                let tradesperson = tradespeople.get(&application.tradesperson_id).cloned();
                ApplicationWithTradesperson {
                    application,
                    tradesperson,
                }
            })
            .collect())
    }

    async fn cached_list(&self, key: &str) -> Option<Vec<JobWithRelations>> {
        let redis = self.db_client.redis_client.as_ref()?;
        CacheHelper::get::<Vec<JobWithRelations>>(redis, key)
            .await
            .ok()
            .flatten()
    }

    async fn cache_list(&self, key: &str, value: &[JobWithRelations]) {
        if let Some(redis) = &self.db_client.redis_client {
            if let Err(e) = CacheHelper::set(redis, key, &value, JOB_LIST_TTL).await {
                tracing::warn!("Failed to cache {}: {}", key, e);
            }
        }
    }

    /// Listing caches go stale after any job mutation. A cache failure never
    /// fails the request.
    async fn invalidate_job_caches(&self) {
        if let Some(redis) = &self.db_client.redis_client {
            if let Err(e) = CacheHelper::delete_pattern(redis, "jobs:*").await {
                tracing::warn!("Failed to invalidate job caches: {}", e);
            }
        }
    }
}

fn verify_reviewer_identity(
    job: &Job,
    reviewer_type: ReviewerRole,
    reviewer_id: Uuid,
) -> Result<(), ServiceError> {
    let authorized = match reviewer_type {
        ReviewerRole::Client => job.client_id == reviewer_id,
        ReviewerRole::Tradesperson => job.assigned_tradesperson_id == Some(reviewer_id),
    };
    if authorized {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "Reviewer is not a participant in this job".to_string(),
        ))
    }
}

fn map_unique_violation(e: sqlx::Error, conflict: ServiceError) -> ServiceError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => conflict,
        _ => ServiceError::Database(e),
    }
}

fn dedup(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    fn job_with(client_id: Uuid, tradesperson_id: Option<Uuid>) -> Job {
        Job {
            id: Uuid::new_v4(),
            client_id,
            trade: TradeCategory::Electrician,
            job_description: "Rewire garage consumer unit".to_string(),
            postcode: "M1 2AB".to_string(),
            budget: BigDecimal::from(400),
            budget_type: BudgetType::Fixed,
            preferred_date: None,
            is_approved: Some(true),
            assigned_tradesperson_id: tradesperson_id,
            assigned_by: tradesperson_id.map(|_| ActorRole::Admin),
            quotation_amount: None,
            quotation_notes: None,
            is_completed: Some(false),
            completed_at: None,
            completed_by: None,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn client_reviewer_must_own_the_job() {
        let client_id = Uuid::new_v4();
        let job = job_with(client_id, None);

        assert!(verify_reviewer_identity(&job, ReviewerRole::Client, client_id).is_ok());
        assert!(matches!(
            verify_reviewer_identity(&job, ReviewerRole::Client, Uuid::new_v4()),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn tradesperson_reviewer_must_be_assigned() {
        let tradesperson_id = Uuid::new_v4();
        let job = job_with(Uuid::new_v4(), Some(tradesperson_id));

        assert!(
            verify_reviewer_identity(&job, ReviewerRole::Tradesperson, tradesperson_id).is_ok()
        );
        assert!(matches!(
            verify_reviewer_identity(&job, ReviewerRole::Tradesperson, Uuid::new_v4()),
            Err(ServiceError::Forbidden(_))
        ));

        let unassigned = job_with(Uuid::new_v4(), None);
        assert!(matches!(
            verify_reviewer_identity(&unassigned, ReviewerRole::Tradesperson, tradesperson_id),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn dedup_preserves_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let out = dedup(vec![a, b, a, b, a].into_iter());
        assert_eq!(out, vec![a, b]);
    }
}
