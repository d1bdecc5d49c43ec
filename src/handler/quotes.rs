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
    dtos::{jobdtos::ApiResponse, quotedtos::*},
    error::HttpError,
    AppState,
};

pub fn quotes_handler() -> Router {
    Router::new()
        .route("/request", post(create_quote_request))
        .route("/submit", post(submit_quote))
        .route("/approve", post(decide_quote))
        .route("/client", get(get_customer_quote_requests))
        .route(
            "/tradesperson/:tradesperson_id",
            get(get_tradesperson_quote_requests),
        )
}

pub async fn create_quote_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateQuoteRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state.quote_service.create_quote_request(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Quote request submitted", request)),
    ))
}

pub async fn get_customer_quote_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ClientQuoteRequestsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    if query.email.trim().is_empty() {
        return Err(HttpError::bad_request("Email is required"));
    }

    let requests = app_state
        .quote_service
        .get_customer_quote_requests(&query.email)
        .await?;

    Ok(Json(ApiResponse::success("Quote requests", requests)))
}

pub async fn get_tradesperson_quote_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(tradesperson_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = app_state
        .quote_service
        .get_tradesperson_quote_requests(tradesperson_id)
        .await?;

    Ok(Json(ApiResponse::success("Quote requests", requests)))
}

pub async fn submit_quote(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<SubmitQuoteDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let quote = app_state.quote_service.submit_quote(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Quote submitted", quote)),
    ))
}

pub async fn decide_quote(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ApproveQuoteDto>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state.quote_service.decide_quote(body).await?;

    Ok(Json(ApiResponse::success("Quote decision recorded", request)))
}
