use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::payment_record;
use crate::errors::ServiceError;
use crate::services::compensation::CompensationDue;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "job_ids": [12, 15, 18],
    "total_amount": "950.00",
    "manager_id": 2,
    "note": "August payout"
}))]
pub struct SettleRequest {
    /// Completed-and-unpaid jobs to settle
    #[validate(length(min = 1))]
    pub job_ids: Vec<i64>,
    /// Manager override of the headline total; defaults to time + bonus
    pub total_amount: Option<Decimal>,
    /// Manager issuing the payment
    #[validate(range(min = 1))]
    pub manager_id: i64,
    /// Free-text note stored on the payment record
    pub note: Option<String>,
}

/// Per-job compensation line rounded for display.
#[derive(Debug, Serialize, ToSchema)]
pub struct JobDueLine {
    pub job_id: i64,
    pub time_based_pay: Decimal,
    pub bonus: Decimal,
}

/// Amount currently owed to a mechanic. All figures are rounded to two
/// decimal places here and only here; the underlying calculator sums
/// unrounded amounts.
#[derive(Debug, Serialize, ToSchema)]
pub struct MechanicDueResponse {
    pub mechanic_id: i64,
    pub per_job: Vec<JobDueLine>,
    pub total_time_based_pay: Decimal,
    pub total_bonus: Decimal,
    pub total_due: Decimal,
}

impl From<CompensationDue> for MechanicDueResponse {
    fn from(due: CompensationDue) -> Self {
        Self {
            mechanic_id: due.mechanic_id,
            per_job: due
                .per_job
                .into_iter()
                .map(|line| JobDueLine {
                    job_id: line.job_id,
                    time_based_pay: line.time_based_pay.round_dp(2),
                    bonus: line.bonus.round_dp(2),
                })
                .collect(),
            total_time_based_pay: due.total_time_based_pay.round_dp(2),
            total_bonus: due.total_bonus.round_dp(2),
            total_due: due.total_due.round_dp(2),
        }
    }
}

#[utoipa::path(
    get,
    path = "/mechanics/{id}/due",
    params(("id" = i64, Path, description = "Mechanic id")),
    responses(
        (status = 200, description = "Compensation currently due", body = MechanicDueResponse),
        (status = 404, description = "Mechanic not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Payroll"
)]
pub async fn get_due(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MechanicDueResponse>>, ServiceError> {
    let due = state.compensation_service.compute_due(id).await?;
    Ok(Json(ApiResponse::success(due.into())))
}

#[utoipa::path(
    post,
    path = "/mechanics/{id}/settle",
    params(("id" = i64, Path, description = "Mechanic id")),
    request_body = SettleRequest,
    responses(
        (status = 201, description = "Payment recorded"),
        (status = 404, description = "Mechanic not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Job set not eligible", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent settlement detected", body = crate::errors::ErrorResponse)
    ),
    tag = "Payroll"
)]
pub async fn settle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SettleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<payment_record::Model>>), ServiceError> {
    request.validate()?;
    let record = state
        .payroll_service
        .settle(
            id,
            request.job_ids,
            request.total_amount,
            request.manager_id,
            request.note,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

#[utoipa::path(
    get,
    path = "/payments/{id}",
    params(("id" = i64, Path, description = "Payment record id")),
    responses(
        (status = 200, description = "Payment record found"),
        (status = 404, description = "Payment record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Payroll"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<payment_record::Model>>, ServiceError> {
    let record = state.payroll_service.get_payment(id).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// Mechanic compensation routes
pub fn mechanic_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/due", get(get_due))
        .route("/:id/settle", post(settle))
}

/// Payment record routes
pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/:id", get(get_payment))
}
