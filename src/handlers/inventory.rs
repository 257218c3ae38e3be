use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::part;
use crate::errors::ServiceError;
use crate::services::inventory::{StockAdjustment, StockAdjustmentMode};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "quantity": 25, "mode": "add" }))]
pub struct AdjustStockRequest {
    /// Quantity to apply; interpretation depends on `mode`
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// One of `set`, `add`, `subtract`
    pub mode: StockAdjustmentMode,
}

#[utoipa::path(
    get,
    path = "/parts/{id}",
    params(("id" = i64, Path, description = "Part id")),
    responses(
        (status = 200, description = "Part found"),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Inventory"
)]
pub async fn get_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<part::Model>>, ServiceError> {
    let part = state.inventory_service.get_part(id).await?;
    Ok(Json(ApiResponse::success(part)))
}

#[utoipa::path(
    post,
    path = "/parts/{id}/adjust",
    params(("id" = i64, Path, description = "Part id")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = StockAdjustment),
        (status = 400, description = "Negative quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Inventory"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AdjustStockRequest>,
) -> Result<Json<ApiResponse<StockAdjustment>>, ServiceError> {
    request.validate()?;
    let adjustment = state
        .inventory_service
        .adjust_stock(id, request.quantity, request.mode)
        .await?;
    Ok(Json(ApiResponse::success(adjustment)))
}

/// Parts inventory routes
pub fn part_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_part))
        .route("/:id/adjust", post(adjust_stock))
}
