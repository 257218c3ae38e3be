use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::{
    entities::{mechanic, payment_record, service_catalog_entry, service_job, JobStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::compensation::{compute_compensation, CompletedJobInput},
};

/// Service that settles completed-and-unpaid jobs into payment records.
///
/// A settlement is all-or-nothing: every job flips to paid and the payment
/// record is inserted in the same transaction, or nothing happens.
#[derive(Clone)]
pub struct PayrollService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl PayrollService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Marks a set of jobs as paid and records one payment.
    ///
    /// Every submitted job must currently be completed, unpaid, and assigned
    /// to the mechanic; any violation aborts the whole call. The time and
    /// bonus components are always recomputed server-side from the jobs'
    /// current state; the manager may only override the headline total.
    #[instrument(skip(self, note), fields(mechanic_id = %mechanic_id, jobs = job_ids.len()))]
    pub async fn settle(
        &self,
        mechanic_id: i64,
        job_ids: Vec<i64>,
        total_override: Option<Decimal>,
        manager_id: i64,
        note: Option<String>,
    ) -> Result<payment_record::Model, ServiceError> {
        if job_ids.is_empty() {
            return Err(ServiceError::Validation(
                "Settlement requires at least one job".to_string(),
            ));
        }

        // A job id submitted twice would be double-counted by the recompute
        // below; reject the set outright rather than guessing intent.
        let mut seen = HashSet::with_capacity(job_ids.len());
        for id in &job_ids {
            if !seen.insert(*id) {
                return Err(ServiceError::InvalidJobSet(format!(
                    "Job {} appears more than once in the settlement",
                    id
                )));
            }
        }

        let record = self
            .db
            .transaction::<_, payment_record::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mechanic = mechanic::Entity::find_by_id(mechanic_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Mechanic {} not found", mechanic_id))
                        })?;

                    let jobs = service_job::Entity::find()
                        .filter(service_job::Column::Id.is_in(job_ids.clone()))
                        .find_also_related(service_catalog_entry::Entity)
                        .all(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    if jobs.len() != job_ids.len() {
                        let found: HashSet<i64> = jobs.iter().map(|(j, _)| j.id).collect();
                        let missing: Vec<String> = job_ids
                            .iter()
                            .filter(|id| !found.contains(id))
                            .map(|id| id.to_string())
                            .collect();
                        return Err(ServiceError::InvalidJobSet(format!(
                            "Jobs not found: {}",
                            missing.join(", ")
                        )));
                    }

                    for (job, _) in &jobs {
                        if job.status != JobStatus::Completed {
                            return Err(ServiceError::InvalidJobSet(format!(
                                "Job {} is not completed (status '{}')",
                                job.id,
                                job.status.as_str()
                            )));
                        }
                        if job.is_paid {
                            return Err(ServiceError::InvalidJobSet(format!(
                                "Job {} is already paid",
                                job.id
                            )));
                        }
                        if job.mechanic_id != Some(mechanic_id) {
                            return Err(ServiceError::InvalidJobSet(format!(
                                "Job {} is not assigned to mechanic {}",
                                job.id, mechanic_id
                            )));
                        }
                    }

                    // Never trust a client-supplied breakdown; recompute from
                    // the rows just read.
                    let inputs: Vec<CompletedJobInput> = jobs
                        .iter()
                        .map(|(job, catalog)| CompletedJobInput {
                            job_id: job.id,
                            estimated_duration_minutes: catalog
                                .as_ref()
                                .map(|c| c.estimated_duration_minutes),
                            job_cost: job.final_cost.or(job.estimated_cost),
                        })
                        .collect();
                    let due = compute_compensation(mechanic_id, mechanic.hourly_rate, &inputs);

                    // Guarded flip: a job settled by a concurrent call since
                    // the read above makes the update fall short.
                    let result = service_job::Entity::update_many()
                        .col_expr(service_job::Column::IsPaid, Expr::value(true))
                        .col_expr(service_job::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(service_job::Column::Id.is_in(job_ids.clone()))
                        .filter(service_job::Column::Status.eq(JobStatus::Completed))
                        .filter(service_job::Column::IsPaid.eq(false))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    if result.rows_affected != job_ids.len() as u64 {
                        return Err(ServiceError::ConcurrencyConflict(format!(
                            "Settlement for mechanic {} raced a concurrent mutation ({} of {} jobs updated)",
                            mechanic_id,
                            result.rows_affected,
                            job_ids.len()
                        )));
                    }

                    let total_amount =
                        total_override.unwrap_or(due.total_time_based_pay + due.total_bonus);

                    let record = payment_record::ActiveModel {
                        mechanic_id: Set(mechanic_id),
                        time_based_pay: Set(due.total_time_based_pay),
                        bonus: Set(due.total_bonus),
                        total_amount: Set(total_amount),
                        jobs_included: Set(serde_json::json!(job_ids)),
                        paid_by: Set(manager_id),
                        note: Set(note),
                        paid_at: Set(Utc::now()),
                        ..Default::default()
                    };
                    record.insert(txn).await.map_err(ServiceError::DatabaseError)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(
            payment_id = %record.id,
            mechanic_id = %record.mechanic_id,
            total = %record.total_amount,
            "Settlement recorded"
        );
        self.event_sender
            .send(Event::PaymentSettled {
                payment_id: record.id,
                mechanic_id: record.mechanic_id,
                jobs_settled: record.job_ids().len(),
                total_amount: record.total_amount,
            })
            .await
            .map_err(ServiceError::EventError)?;
        Ok(record)
    }

    /// Gets a payment record by id.
    #[instrument(skip(self))]
    pub async fn get_payment(&self, payment_id: i64) -> Result<payment_record::Model, ServiceError> {
        payment_record::Entity::find_by_id(payment_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Payment record {} not found", payment_id))
            })
    }
}
