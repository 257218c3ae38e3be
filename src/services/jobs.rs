use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::{
    entities::{mechanic, service_job, JobStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::{consume_parts_for_job, PartRequest},
};

/// Service owning the service-job state machine.
///
/// Every operation runs in one transaction, and every status write is a
/// conditional update guarded on the status that was read. A job whose
/// status changed underneath a caller surfaces as `ConcurrencyConflict`,
/// never as a double transition.
#[derive(Clone)]
pub struct JobService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl JobService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Gets a job by id.
    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: i64) -> Result<service_job::Model, ServiceError> {
        service_job::Entity::find_by_id(job_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Job {} not found", job_id)))
    }

    /// Assigns (or reassigns) a mechanic and moves a pending job to approved.
    #[instrument(skip(self), fields(job_id = %job_id, mechanic_id = %mechanic_id))]
    pub async fn assign(
        &self,
        job_id: i64,
        mechanic_id: i64,
    ) -> Result<service_job::Model, ServiceError> {
        let job = self
            .db
            .transaction::<_, service_job::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let job = find_job(txn, job_id).await?;

                    mechanic::Entity::find_by_id(mechanic_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Mechanic {} not found", mechanic_id))
                        })?;

                    // Reassignment of an approved job keeps it approved.
                    if !matches!(job.status, JobStatus::Pending | JobStatus::Approved) {
                        return Err(ServiceError::InvalidTransition {
                            from: job.status,
                            to: JobStatus::Approved,
                        });
                    }

                    let result = service_job::Entity::update_many()
                        .col_expr(service_job::Column::MechanicId, Expr::value(mechanic_id))
                        .col_expr(
                            service_job::Column::Status,
                            Expr::value(JobStatus::Approved),
                        )
                        .col_expr(service_job::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(service_job::Column::Id.eq(job_id))
                        .filter(service_job::Column::Status.eq(job.status))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::ConcurrencyConflict(format!(
                            "Job {} was modified concurrently during assignment",
                            job_id
                        )));
                    }

                    find_job(txn, job_id).await
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(job_id = %job_id, mechanic_id = %mechanic_id, "Job assigned");
        self.event_sender
            .send(Event::JobAssigned { job_id, mechanic_id })
            .await
            .map_err(ServiceError::EventError)?;
        Ok(job)
    }

    /// Starts an approved job.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn start(&self, job_id: i64) -> Result<service_job::Model, ServiceError> {
        let job = self.transition(job_id, JobStatus::InProgress).await?;
        self.event_sender
            .send(Event::JobStarted(job_id))
            .await
            .map_err(ServiceError::EventError)?;
        Ok(job)
    }

    /// Returns an in-progress job to the approved queue. The mechanic stays
    /// assigned.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn requeue(&self, job_id: i64) -> Result<service_job::Model, ServiceError> {
        let job = self.transition(job_id, JobStatus::Approved).await?;
        self.event_sender
            .send(Event::JobRequeued(job_id))
            .await
            .map_err(ServiceError::EventError)?;
        Ok(job)
    }

    /// Cancels a job that has not yet been started. No inventory effects.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn cancel(&self, job_id: i64) -> Result<service_job::Model, ServiceError> {
        let job = self.transition(job_id, JobStatus::Cancelled).await?;
        self.event_sender
            .send(Event::JobCancelled(job_id))
            .await
            .map_err(ServiceError::EventError)?;
        Ok(job)
    }

    /// Completes an in-progress job.
    ///
    /// Inside one transaction, in order: stock decrement for every requested
    /// part (a shortfall aborts the whole call with no partial decrement),
    /// usage-line snapshots, then the guarded status flip with completion
    /// timestamp and final cost. Callers supply a final cost consistent with
    /// service plus parts; a completion that consumed parts without an
    /// explicit total falls back to the estimated cost.
    #[instrument(skip(self, mechanic_notes, parts), fields(job_id = %job_id, parts = parts.len()))]
    pub async fn complete(
        &self,
        job_id: i64,
        mechanic_notes: Option<String>,
        final_cost: Option<Decimal>,
        parts: Vec<PartRequest>,
    ) -> Result<service_job::Model, ServiceError> {
        let parts_count = parts.len();
        let job = self
            .db
            .transaction::<_, service_job::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let job = find_job(txn, job_id).await?;
                    if job.status != JobStatus::InProgress {
                        return Err(ServiceError::InvalidTransition {
                            from: job.status,
                            to: JobStatus::Completed,
                        });
                    }

                    consume_parts_for_job(txn, job_id, &parts).await?;

                    // The estimate stands in only when parts were used and
                    // no explicit total was given.
                    let final_cost = match final_cost {
                        Some(cost) => Some(cost),
                        None if !parts.is_empty() => job.estimated_cost,
                        None => None,
                    };

                    let result = service_job::Entity::update_many()
                        .col_expr(
                            service_job::Column::Status,
                            Expr::value(JobStatus::Completed),
                        )
                        .col_expr(
                            service_job::Column::CompletedAt,
                            Expr::value(Some(Utc::now())),
                        )
                        .col_expr(service_job::Column::FinalCost, Expr::value(final_cost))
                        .col_expr(
                            service_job::Column::MechanicNotes,
                            Expr::value(mechanic_notes),
                        )
                        .col_expr(service_job::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(service_job::Column::Id.eq(job_id))
                        .filter(service_job::Column::Status.eq(JobStatus::InProgress))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::ConcurrencyConflict(format!(
                            "Job {} was completed or moved concurrently",
                            job_id
                        )));
                    }

                    find_job(txn, job_id).await
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(job_id = %job_id, final_cost = ?job.final_cost, "Job completed");
        self.event_sender
            .send(Event::JobCompleted {
                job_id,
                final_cost: job.final_cost,
                parts_consumed: parts_count,
            })
            .await
            .map_err(ServiceError::EventError)?;
        Ok(job)
    }

    /// Applies a plain status transition under the optimistic guard.
    async fn transition(
        &self,
        job_id: i64,
        to: JobStatus,
    ) -> Result<service_job::Model, ServiceError> {
        let job = self
            .db
            .transaction::<_, service_job::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let job = find_job(txn, job_id).await?;
                    if !job.status.can_transition(to) {
                        return Err(ServiceError::InvalidTransition {
                            from: job.status,
                            to,
                        });
                    }

                    let result = service_job::Entity::update_many()
                        .col_expr(service_job::Column::Status, Expr::value(to))
                        .col_expr(service_job::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(service_job::Column::Id.eq(job_id))
                        .filter(service_job::Column::Status.eq(job.status))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::ConcurrencyConflict(format!(
                            "Job {} was modified concurrently",
                            job_id
                        )));
                    }

                    find_job(txn, job_id).await
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(job_id = %job_id, status = %job.status.as_str(), "Job status updated");
        Ok(job)
    }
}

async fn find_job(
    txn: &DatabaseTransaction,
    job_id: i64,
) -> Result<service_job::Model, ServiceError> {
    service_job::Entity::find_by_id(job_id)
        .one(txn)
        .await
        .map_err(ServiceError::DatabaseError)?
        .ok_or_else(|| ServiceError::NotFound(format!("Job {} not found", job_id)))
}
