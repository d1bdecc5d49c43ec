//! Assignment workflow rules.
//!
//! Every path that moves a job through its lifecycle (admin assignment,
//! client quotation approval, completion, rating) derives the job's stage
//! here and asks the same gate functions. The database rows keep denormalized
//! flags; this module is the single place that interprets them.

use uuid::Uuid;

use crate::models::jobmodel::{ActorRole, ApplicationStatus, Job, JobApplication};
use crate::service::error::ServiceError;

/// The lifecycle stage of a job, derived from its stored flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    /// Posted by a client, not yet approved by an admin.
    PendingApproval,
    /// Approved and open for applications.
    Open,
    /// Assigned to a tradesperson by the recorded actor class.
    Assigned { by: ActorRole },
    /// Work confirmed complete.
    Completed,
}

/// Derive the stage from a job row. Completion dominates assignment,
/// assignment dominates approval.
pub fn stage_of(job: &Job) -> JobStage {
    if job.is_completed.unwrap_or(false) {
        return JobStage::Completed;
    }
    if job.assigned_tradesperson_id.is_some() {
        // assigned_by is NOT NULL whenever an assignment exists (enforced by
        // a table constraint); default to client for legacy rows.
        return JobStage::Assigned {
            by: job.assigned_by.unwrap_or(ActorRole::Client),
        };
    }
    if job.is_approved.unwrap_or(false) {
        return JobStage::Open;
    }
    JobStage::PendingApproval
}

/// A tradesperson may apply only while the job is open.
pub fn check_application(stage: JobStage) -> Result<(), ServiceError> {
    match stage {
        JobStage::Open => Ok(()),
        JobStage::PendingApproval => Err(ServiceError::JobNotApproved),
        JobStage::Assigned { by } => Err(ServiceError::JobAlreadyAssigned(by)),
        JobStage::Completed => Err(ServiceError::JobAlreadyCompleted),
    }
}

/// Assignment is allowed on an open job, or as a reassignment when the same
/// actor class made the existing assignment. A client may not override an
/// admin's assignment and vice versa.
pub fn check_assignment(stage: JobStage, actor: ActorRole) -> Result<(), ServiceError> {
    match stage {
        JobStage::Open => Ok(()),
        JobStage::Assigned { by } if by == actor => Ok(()),
        JobStage::Assigned { by } => Err(ServiceError::JobAlreadyAssigned(by)),
        JobStage::PendingApproval => Err(ServiceError::JobNotApproved),
        JobStage::Completed => Err(ServiceError::JobAlreadyCompleted),
    }
}

/// Completion requires a current assignment.
pub fn check_completion(stage: JobStage) -> Result<(), ServiceError> {
    match stage {
        JobStage::Assigned { .. } => Ok(()),
        JobStage::Completed => Err(ServiceError::JobAlreadyCompleted),
        JobStage::PendingApproval | JobStage::Open => Err(ServiceError::JobNotAssigned),
    }
}

/// Ratings are only accepted once the job is completed.
pub fn check_review(stage: JobStage) -> Result<(), ServiceError> {
    match stage {
        JobStage::Completed => Ok(()),
        _ => Err(ServiceError::JobNotCompleted),
    }
}

/// Admin approval of a posted job. Re-approving is a no-op; a completed job
/// can no longer be touched.
pub fn check_approval(stage: JobStage) -> Result<(), ServiceError> {
    match stage {
        JobStage::Completed => Err(ServiceError::JobAlreadyCompleted),
        _ => Ok(()),
    }
}

/// Applications a (re)assignment supersedes. At most one application per job
/// is `accepted`, so when `winner` takes the job every other non-rejected
/// application is demoted — including an application accepted by an earlier
/// assignment.
pub fn applications_to_demote(
    applications: &[JobApplication],
    winner: Option<Uuid>,
) -> Vec<Uuid> {
    applications
        .iter()
        .filter(|a| Some(a.id) != winner && a.status != ApplicationStatus::Rejected)
        .map(|a| a.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::jobmodel::{BudgetType, TradeCategory};

    fn posted_job() -> Job {
        Job {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            trade: TradeCategory::Plumber,
            job_description: "Replace kitchen tap and check under-sink pipework".to_string(),
            postcode: "SW1A 1AA".to_string(),
            budget: BigDecimal::from(150),
            budget_type: BudgetType::Fixed,
            preferred_date: None,
            is_approved: Some(false),
            assigned_tradesperson_id: None,
            assigned_by: None,
            quotation_amount: None,
            quotation_notes: None,
            is_completed: Some(false),
            completed_at: None,
            completed_by: None,
            created_at: Some(Utc::now()),
        }
    }

    fn open_job() -> Job {
        let mut job = posted_job();
        job.is_approved = Some(true);
        job
    }

    fn assigned_job(by: ActorRole) -> Job {
        let mut job = open_job();
        job.assigned_tradesperson_id = Some(Uuid::new_v4());
        job.assigned_by = Some(by);
        job.quotation_amount = Some(BigDecimal::from(140));
        job
    }

    fn completed_job(by: ActorRole) -> Job {
        let mut job = assigned_job(by);
        job.is_completed = Some(true);
        job.completed_at = Some(Utc::now());
        job.completed_by = Some(ActorRole::Client);
        job
    }

    #[test]
    fn stage_follows_lifecycle() {
        assert_eq!(stage_of(&posted_job()), JobStage::PendingApproval);
        assert_eq!(stage_of(&open_job()), JobStage::Open);
        assert_eq!(
            stage_of(&assigned_job(ActorRole::Admin)),
            JobStage::Assigned {
                by: ActorRole::Admin
            }
        );
        assert_eq!(stage_of(&completed_job(ActorRole::Admin)), JobStage::Completed);
    }

    #[test]
    fn completion_flag_dominates_assignment() {
        let mut job = completed_job(ActorRole::Client);
        job.is_approved = Some(false);
        assert_eq!(stage_of(&job), JobStage::Completed);
    }

    #[test]
    fn null_flags_read_as_false() {
        let mut job = posted_job();
        job.is_approved = None;
        job.is_completed = None;
        assert_eq!(stage_of(&job), JobStage::PendingApproval);
    }

    #[test]
    fn applications_only_on_open_jobs() {
        assert!(check_application(stage_of(&open_job())).is_ok());
        assert!(matches!(
            check_application(stage_of(&posted_job())),
            Err(ServiceError::JobNotApproved)
        ));
        assert!(matches!(
            check_application(stage_of(&assigned_job(ActorRole::Admin))),
            Err(ServiceError::JobAlreadyAssigned(ActorRole::Admin))
        ));
        assert!(matches!(
            check_application(stage_of(&completed_job(ActorRole::Admin))),
            Err(ServiceError::JobAlreadyCompleted)
        ));
    }

    #[test]
    fn open_job_accepts_assignment_from_either_actor() {
        let stage = stage_of(&open_job());
        assert!(check_assignment(stage, ActorRole::Admin).is_ok());
        assert!(check_assignment(stage, ActorRole::Client).is_ok());
    }

    #[test]
    fn same_actor_class_may_reassign() {
        let stage = stage_of(&assigned_job(ActorRole::Client));
        assert!(check_assignment(stage, ActorRole::Client).is_ok());
    }

    #[test]
    fn admin_cannot_override_client_assignment() {
        let stage = stage_of(&assigned_job(ActorRole::Client));
        assert!(matches!(
            check_assignment(stage, ActorRole::Admin),
            Err(ServiceError::JobAlreadyAssigned(ActorRole::Client))
        ));
    }

    #[test]
    fn client_cannot_override_admin_assignment() {
        let stage = stage_of(&assigned_job(ActorRole::Admin));
        assert!(matches!(
            check_assignment(stage, ActorRole::Client),
            Err(ServiceError::JobAlreadyAssigned(ActorRole::Admin))
        ));
    }

    #[test]
    fn unapproved_job_cannot_be_assigned() {
        let stage = stage_of(&posted_job());
        assert!(matches!(
            check_assignment(stage, ActorRole::Admin),
            Err(ServiceError::JobNotApproved)
        ));
    }

    #[test]
    fn completion_requires_assignment() {
        assert!(check_completion(stage_of(&assigned_job(ActorRole::Admin))).is_ok());
        assert!(matches!(
            check_completion(stage_of(&open_job())),
            Err(ServiceError::JobNotAssigned)
        ));
        assert!(matches!(
            check_completion(stage_of(&completed_job(ActorRole::Admin))),
            Err(ServiceError::JobAlreadyCompleted)
        ));
    }

    #[test]
    fn reviews_only_after_completion() {
        assert!(check_review(stage_of(&completed_job(ActorRole::Client))).is_ok());
        assert!(matches!(
            check_review(stage_of(&assigned_job(ActorRole::Client))),
            Err(ServiceError::JobNotCompleted)
        ));
    }

    fn application(job_id: Uuid, status: ApplicationStatus) -> JobApplication {
        JobApplication {
            id: Uuid::new_v4(),
            job_id,
            tradesperson_id: Uuid::new_v4(),
            quotation_amount: BigDecimal::from(120),
            quotation_notes: None,
            status,
            applied_at: Some(Utc::now()),
            accepted_at: None,
        }
    }

    #[test]
    fn reassignment_demotes_previously_accepted_application() {
        let job_id = Uuid::new_v4();
        let previously_accepted = application(job_id, ApplicationStatus::Accepted);
        let new_winner = application(job_id, ApplicationStatus::Pending);

        let demoted = applications_to_demote(
            &[previously_accepted.clone(), new_winner.clone()],
            Some(new_winner.id),
        );

        assert_eq!(demoted, vec![previously_accepted.id]);
    }

    #[test]
    fn winner_is_never_demoted() {
        let job_id = Uuid::new_v4();
        let winner = application(job_id, ApplicationStatus::Pending);
        let other = application(job_id, ApplicationStatus::Pending);

        let demoted = applications_to_demote(&[winner.clone(), other.clone()], Some(winner.id));

        assert_eq!(demoted, vec![other.id]);
    }

    #[test]
    fn already_rejected_applications_are_left_alone() {
        let job_id = Uuid::new_v4();
        let rejected = application(job_id, ApplicationStatus::Rejected);
        let pending = application(job_id, ApplicationStatus::Pending);

        let demoted = applications_to_demote(&[rejected, pending.clone()], None);

        assert_eq!(demoted, vec![pending.id]);
    }

    #[test]
    fn direct_assignment_without_application_demotes_everything_outstanding() {
        let job_id = Uuid::new_v4();
        let accepted = application(job_id, ApplicationStatus::Accepted);
        let pending = application(job_id, ApplicationStatus::Pending);

        let demoted = applications_to_demote(&[accepted.clone(), pending.clone()], None);

        assert_eq!(demoted, vec![accepted.id, pending.id]);
    }

    // Walks the happy path: post, approve, apply, assign via quotation
    // approval, complete, rate.
    #[test]
    fn full_workflow_passes_every_gate_in_order() {
        let mut job = posted_job();
        assert!(check_approval(stage_of(&job)).is_ok());

        job.is_approved = Some(true);
        assert!(check_application(stage_of(&job)).is_ok());
        assert!(check_assignment(stage_of(&job), ActorRole::Client).is_ok());
        assert!(check_completion(stage_of(&job)).is_err());

        job.assigned_tradesperson_id = Some(Uuid::new_v4());
        job.assigned_by = Some(ActorRole::Client);
        assert!(check_application(stage_of(&job)).is_err());
        assert!(check_completion(stage_of(&job)).is_ok());
        assert!(check_review(stage_of(&job)).is_err());

        job.is_completed = Some(true);
        job.completed_by = Some(ActorRole::Client);
        assert!(check_review(stage_of(&job)).is_ok());
        assert!(check_assignment(stage_of(&job), ActorRole::Client).is_err());
    }

    #[test]
    fn approval_is_idempotent_but_completed_jobs_are_final() {
        assert!(check_approval(stage_of(&posted_job())).is_ok());
        assert!(check_approval(stage_of(&open_job())).is_ok());
        assert!(matches!(
            check_approval(stage_of(&completed_job(ActorRole::Admin))),
            Err(ServiceError::JobAlreadyCompleted)
        ));
    }
}
