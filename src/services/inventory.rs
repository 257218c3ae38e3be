use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    entities::{part, part_usage_line},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// One `(part, quantity)` pair requested by a job completion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartRequest {
    pub part_id: i64,
    pub quantity: i32,
}

/// How [`InventoryService::adjust_stock`] interprets its quantity argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockAdjustmentMode {
    /// Replace the stored quantity.
    Set,
    /// Increase the stored quantity (restock).
    Add,
    /// Decrease the stored quantity, clamped at zero.
    Subtract,
}

/// Outcome of a stock adjustment, reported back to the caller and carried on
/// the emitted event.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockAdjustment {
    pub part_id: i64,
    pub old_quantity: i32,
    pub new_quantity: i32,
    pub below_minimum: bool,
}

/// Service owning the parts inventory ledger.
///
/// Every mutation is a conditional or expression-based UPDATE; the stored
/// quantity can never go negative.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Gets a part by id.
    #[instrument(skip(self))]
    pub async fn get_part(&self, part_id: i64) -> Result<part::Model, ServiceError> {
        part::Entity::find_by_id(part_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", part_id)))
    }

    /// Adjusts a part's stock quantity atomically, clamping at zero.
    ///
    /// The new quantity is computed inside the UPDATE itself, never in
    /// application code, so two concurrent adjustments compose instead of
    /// overwriting each other. `old_quantity` on the result is the value
    /// observed when the call began and is reporting-only.
    #[instrument(skip(self), fields(part_id = %part_id, mode = ?mode))]
    pub async fn adjust_stock(
        &self,
        part_id: i64,
        quantity: i32,
        mode: StockAdjustmentMode,
    ) -> Result<StockAdjustment, ServiceError> {
        if quantity < 0 {
            return Err(ServiceError::Validation(format!(
                "Adjustment quantity must be non-negative, got {}",
                quantity
            )));
        }

        let adjustment = self
            .db
            .transaction::<_, StockAdjustment, ServiceError>(move |txn| {
                Box::pin(async move {
                    let part = part::Entity::find_by_id(part_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Part {} not found", part_id))
                        })?;
                    let old_quantity = part.quantity;
                    let min_quantity = part.min_quantity;

                    match mode {
                        StockAdjustmentMode::Set => {
                            part::Entity::update_many()
                                .col_expr(part::Column::Quantity, Expr::value(quantity))
                                .col_expr(part::Column::UpdatedAt, Expr::value(Utc::now()))
                                .filter(part::Column::Id.eq(part_id))
                                .exec(txn)
                                .await
                                .map_err(ServiceError::DatabaseError)?;
                        }
                        StockAdjustmentMode::Add => {
                            part::Entity::update_many()
                                .col_expr(
                                    part::Column::Quantity,
                                    Expr::col(part::Column::Quantity).add(quantity),
                                )
                                .col_expr(part::Column::UpdatedAt, Expr::value(Utc::now()))
                                .filter(part::Column::Id.eq(part_id))
                                .exec(txn)
                                .await
                                .map_err(ServiceError::DatabaseError)?;
                        }
                        StockAdjustmentMode::Subtract => {
                            // Decrement only while the stock covers it; a
                            // shortfall clamps to zero instead.
                            let result = part::Entity::update_many()
                                .col_expr(
                                    part::Column::Quantity,
                                    Expr::col(part::Column::Quantity).sub(quantity),
                                )
                                .col_expr(part::Column::UpdatedAt, Expr::value(Utc::now()))
                                .filter(part::Column::Id.eq(part_id))
                                .filter(part::Column::Quantity.gte(quantity))
                                .exec(txn)
                                .await
                                .map_err(ServiceError::DatabaseError)?;
                            if result.rows_affected == 0 {
                                part::Entity::update_many()
                                    .col_expr(part::Column::Quantity, Expr::value(0))
                                    .col_expr(part::Column::UpdatedAt, Expr::value(Utc::now()))
                                    .filter(part::Column::Id.eq(part_id))
                                    .exec(txn)
                                    .await
                                    .map_err(ServiceError::DatabaseError)?;
                            }
                        }
                    }

                    let new_quantity = part::Entity::find_by_id(part_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .map(|p| p.quantity)
                        .unwrap_or(0);

                    Ok(StockAdjustment {
                        part_id,
                        old_quantity,
                        new_quantity,
                        below_minimum: new_quantity < min_quantity,
                    })
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(
            part_id = %adjustment.part_id,
            old = %adjustment.old_quantity,
            new = %adjustment.new_quantity,
            "Stock adjusted"
        );
        self.event_sender
            .send(Event::StockAdjusted {
                part_id: adjustment.part_id,
                old_quantity: adjustment.old_quantity,
                new_quantity: adjustment.new_quantity,
                below_minimum: adjustment.below_minimum,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(adjustment)
    }
}

/// Decrements stock for every requested part and records one usage line per
/// pair, inside the caller's transaction.
///
/// The check-then-decrement is a single conditional UPDATE guarded on
/// `quantity >= requested`, so two concurrent completions cannot both pass
/// the stock check and drive the counter past zero. Any failure aborts the
/// whole batch; the surrounding transaction rolls back every decrement
/// already applied.
pub async fn consume_parts_for_job(
    txn: &DatabaseTransaction,
    job_id: i64,
    parts: &[PartRequest],
) -> Result<Vec<part_usage_line::Model>, ServiceError> {
    for request in parts {
        if request.quantity <= 0 {
            return Err(ServiceError::Validation(format!(
                "Part quantity must be positive, got {} for part {}",
                request.quantity, request.part_id
            )));
        }
    }

    let mut usage_lines = Vec::with_capacity(parts.len());
    for request in parts {
        let part = part::Entity::find_by_id(request.part_id)
            .one(txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Part {} not found", request.part_id))
            })?;

        let result = part::Entity::update_many()
            .col_expr(
                part::Column::Quantity,
                Expr::col(part::Column::Quantity).sub(request.quantity),
            )
            .col_expr(part::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(part::Column::Id.eq(request.part_id))
            .filter(part::Column::Quantity.gte(request.quantity))
            .exec(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            // The guarded update lost the race or the stock was short to
            // begin with; either way the available count is authoritative.
            let available = part::Entity::find_by_id(request.part_id)
                .one(txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .map(|p| p.quantity)
                .unwrap_or(0);
            return Err(ServiceError::InsufficientStock {
                part_id: request.part_id,
                requested: request.quantity,
                available,
            });
        }

        // Price is snapshotted at the time of use; later changes to the
        // part's unit cost never rewrite history.
        let line = part_usage_line::ActiveModel {
            job_id: Set(job_id),
            part_id: Set(request.part_id),
            quantity: Set(request.quantity),
            unit_price: Set(part.unit_cost),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let line = line.insert(txn).await.map_err(ServiceError::DatabaseError)?;
        usage_lines.push(line);
    }

    Ok(usage_lines)
}
