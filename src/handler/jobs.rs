use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::jobdtos::*,
    error::HttpError,
    models::jobmodel::ActorRole,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", post(create_job))
        .route("/", get(get_all_jobs))
        .route("/client/:client_id", get(get_client_jobs))
        .route("/available", get(get_available_jobs))
        .route("/apply", post(apply_to_job))
        .route("/client-assign", post(client_assign_job))
        .route("/complete", post(complete_job))
        .route("/rate-tradesperson", post(rate_tradesperson))
        .route("/:job_id/applications", get(get_job_applications))
}

/// Admin dashboard listing: every job with its client, assigned tradesperson
/// and reviews.
pub async fn get_all_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.job_service.get_admin_jobs().await?;

    Ok(Json(ApiResponse::success("All jobs", jobs)))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.create_job(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job created", job)),
    ))
}

pub async fn get_client_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.job_service.get_client_jobs(client_id).await?;

    Ok(Json(ApiResponse::success("Client jobs", jobs)))
}

pub async fn get_available_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<AvailableJobsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let jobs = app_state
        .job_service
        .get_available_jobs(query.trade, &query.postcode)
        .await?;

    Ok(Json(ApiResponse::success("Available jobs", jobs)))
}

pub async fn apply_to_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ApplyToJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let application = app_state.job_service.apply_to_job(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Application submitted", application)),
    ))
}

/// Client-side assignment. The body names the acting role so a client
/// accepting a quotation and an admin overriding go through the same gate.
pub async fn client_assign_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ClientAssignJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .assign_job(
            body.job_id,
            body.tradesperson_id,
            body.quotation_amount,
            body.quotation_notes,
            body.assigned_by,
        )
        .await?;

    Ok(Json(ApiResponse::success("Job assigned", job)))
}

pub async fn complete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CompleteJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.complete_job(body).await?;

    Ok(Json(ApiResponse::success("Job completed", job)))
}

pub async fn rate_tradesperson(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RateTradespersonDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let review = app_state.job_service.rate_tradesperson(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Review recorded", review)),
    ))
}

pub async fn get_job_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state.job_service.get_job_applications(job_id).await?;

    Ok(Json(ApiResponse::success("Job applications", applications)))
}

// Routed under /api/admin; assigns as the admin actor class.
pub async fn admin_assign_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<AssignJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .assign_job(
            body.job_id,
            body.tradesperson_id,
            body.quotation_amount,
            body.quotation_notes,
            ActorRole::Admin,
        )
        .await?;

    Ok(Json(ApiResponse::success("Job assigned", job)))
}
