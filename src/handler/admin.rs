use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::{
    dtos::{jobdtos::*, quotedtos::ApproveQuoteRequestDto},
    error::HttpError,
    handler::jobs::admin_assign_job,
    AppState,
};

pub fn admin_handler() -> Router {
    Router::new()
        .route("/approve-job", post(approve_job))
        .route("/assign-job", post(admin_assign_job))
        .route("/approve-quotation", post(decide_quotation))
        .route("/job-applications", get(get_pending_applications))
        .route("/tradespeople", get(get_tradespeople))
        .route("/verify-tradesperson", post(verify_tradesperson))
        .route("/quote-requests", get(get_pending_quote_requests))
        .route("/approve-quote-request", post(decide_quote_request))
}

pub async fn approve_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ApproveJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.approve_job(body.job_id).await?;

    Ok(Json(ApiResponse::success("Job approved", job)))
}

pub async fn get_pending_applications(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state.job_service.get_pending_applications().await?;

    Ok(Json(ApiResponse::success(
        "Pending applications",
        applications,
    )))
}

pub async fn decide_quotation(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ApproveQuotationDto>,
) -> Result<impl IntoResponse, HttpError> {
    let decision = app_state.job_service.decide_quotation(body).await?;

    let message = if decision.job.is_some() {
        "Quotation approved and job assigned"
    } else {
        "Quotation rejected"
    };
    Ok(Json(ApiResponse::success(message, decision)))
}

pub async fn get_tradespeople(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let tradespeople = app_state.job_service.get_tradespeople().await?;

    Ok(Json(ApiResponse::success("Tradespeople", tradespeople)))
}

pub async fn verify_tradesperson(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<VerifyTradespersonDto>,
) -> Result<impl IntoResponse, HttpError> {
    let tradesperson = app_state
        .job_service
        .verify_tradesperson(body.tradesperson_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Tradesperson verified",
        tradesperson,
    )))
}

pub async fn get_pending_quote_requests(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = app_state.quote_service.get_pending_quote_requests().await?;

    Ok(Json(ApiResponse::success("Pending quote requests", requests)))
}

pub async fn decide_quote_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ApproveQuoteRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state.quote_service.decide_quote_request(body).await?;

    Ok(Json(ApiResponse::success("Quote request reviewed", request)))
}
