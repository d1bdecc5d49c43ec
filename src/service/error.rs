// services/error.rs
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;
use crate::models::jobmodel::ActorRole;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Application not found: {0}")]
    ApplicationNotFound(Uuid),

    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    #[error("Tradesperson not found: {0}")]
    TradespersonNotFound(Uuid),

    #[error("Quote request not found: {0}")]
    QuoteRequestNotFound(Uuid),

    #[error("Quote not found: {0}")]
    QuoteNotFound(Uuid),

    #[error("Job is awaiting admin approval")]
    JobNotApproved,

    #[error("Job already assigned by {0:?}")]
    JobAlreadyAssigned(ActorRole),

    #[error("Job has no assigned tradesperson")]
    JobNotAssigned,

    #[error("Job is already completed")]
    JobAlreadyCompleted,

    #[error("Job is not completed yet")]
    JobNotCompleted,

    #[error("Tradesperson has already applied to this job")]
    DuplicateApplication,

    #[error("Reviewer has already rated this job")]
    DuplicateReview,

    #[error("Quote request is not in the expected state: {0}")]
    InvalidQuoteState(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::ApplicationNotFound(_)
            | ServiceError::ClientNotFound(_)
            | ServiceError::TradespersonNotFound(_)
            | ServiceError::QuoteRequestNotFound(_)
            | ServiceError::QuoteNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::JobAlreadyAssigned(_)
            | ServiceError::JobAlreadyCompleted
            | ServiceError::DuplicateApplication
            | ServiceError::DuplicateReview => StatusCode::CONFLICT,

            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,

            ServiceError::JobNotApproved
            | ServiceError::JobNotAssigned
            | ServiceError::JobNotCompleted
            | ServiceError::InvalidQuoteState(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        let status = err.status_code();
        let message = match &err {
            // Do not leak internal database detail to clients.
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpError::new(message, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ServiceError::JobNotFound(Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(
            ServiceError::DuplicateApplication.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::JobAlreadyAssigned(ActorRole::Admin).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn database_errors_are_masked() {
        let err = ServiceError::Database(sqlx::Error::PoolClosed);
        let http: HttpError = err.into();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http.message, "Internal server error");
    }
}
