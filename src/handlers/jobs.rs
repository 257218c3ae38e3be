use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::service_job;
use crate::errors::ServiceError;
use crate::services::inventory::PartRequest;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "mechanic_id": 7 }))]
pub struct AssignJobRequest {
    /// Mechanic taking the job
    #[validate(range(min = 1))]
    pub mechanic_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "mechanic_notes": "Replaced oil filter and topped up coolant",
    "final_cost": "1450.00",
    "parts": [{ "part_id": 3, "quantity": 1 }]
}))]
pub struct CompleteJobRequest {
    /// Close-out notes from the mechanic
    pub mechanic_notes: Option<String>,
    /// Final cost including parts; when omitted and parts were used, the
    /// estimate stands in
    pub final_cost: Option<Decimal>,
    /// Parts consumed while servicing the vehicle
    #[serde(default)]
    pub parts: Vec<PartRequest>,
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(("id" = i64, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job found"),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<service_job::Model>>, ServiceError> {
    let job = state.job_service.get_job(id).await?;
    Ok(Json(ApiResponse::success(job)))
}

#[utoipa::path(
    post,
    path = "/jobs/{id}/assign",
    params(("id" = i64, Path, description = "Job id")),
    request_body = AssignJobRequest,
    responses(
        (status = 200, description = "Mechanic assigned"),
        (status = 400, description = "Job already started or closed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Job or mechanic not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn assign_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AssignJobRequest>,
) -> Result<Json<ApiResponse<service_job::Model>>, ServiceError> {
    request.validate()?;
    let job = state.job_service.assign(id, request.mechanic_id).await?;
    Ok(Json(ApiResponse::success(job)))
}

#[utoipa::path(
    post,
    path = "/jobs/{id}/start",
    params(("id" = i64, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job started"),
        (status = 400, description = "Job is not approved", body = crate::errors::ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn start_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<service_job::Model>>, ServiceError> {
    let job = state.job_service.start(id).await?;
    Ok(Json(ApiResponse::success(job)))
}

#[utoipa::path(
    post,
    path = "/jobs/{id}/requeue",
    params(("id" = i64, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job returned to the approved queue"),
        (status = 400, description = "Job is not in progress", body = crate::errors::ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn requeue_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<service_job::Model>>, ServiceError> {
    let job = state.job_service.requeue(id).await?;
    Ok(Json(ApiResponse::success(job)))
}

#[utoipa::path(
    post,
    path = "/jobs/{id}/cancel",
    params(("id" = i64, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job cancelled"),
        (status = 400, description = "Job already started or closed", body = crate::errors::ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<service_job::Model>>, ServiceError> {
    let job = state.job_service.cancel(id).await?;
    Ok(Json(ApiResponse::success(job)))
}

#[utoipa::path(
    post,
    path = "/jobs/{id}/complete",
    params(("id" = i64, Path, description = "Job id")),
    request_body = CompleteJobRequest,
    responses(
        (status = 200, description = "Job completed"),
        (status = 400, description = "Job is not in progress", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent completion detected", body = crate::errors::ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn complete_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CompleteJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<service_job::Model>>), ServiceError> {
    let job = state
        .job_service
        .complete(id, request.mechanic_notes, request.final_cost, request.parts)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(job))))
}

/// Job lifecycle routes
pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_job))
        .route("/:id/assign", post(assign_job))
        .route("/:id/start", post(start_job))
        .route("/:id/requeue", post(requeue_job))
        .route("/:id/cancel", post(cancel_job))
        .route("/:id/complete", post(complete_job))
}
