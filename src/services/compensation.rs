use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::{
    entities::{mechanic, service_catalog_entry, service_job, JobStatus},
    errors::ServiceError,
};

/// Bonus paid per job as a fraction of the job's cost.
const BONUS_RATE: Decimal = dec!(0.03);

const MINUTES_PER_HOUR: Decimal = dec!(60);

/// Inputs the calculator needs for one completed-and-unpaid job.
#[derive(Debug, Clone)]
pub struct CompletedJobInput {
    pub job_id: i64,
    pub estimated_duration_minutes: Option<i32>,
    pub job_cost: Option<Decimal>,
}

/// Per-job compensation line. Amounts are unrounded; callers round for
/// display only, never before summing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobCompensation {
    pub job_id: i64,
    pub duration_hours: Decimal,
    pub time_based_pay: Decimal,
    pub job_cost: Decimal,
    pub bonus: Decimal,
}

/// Aggregate compensation due to one mechanic.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompensationDue {
    pub mechanic_id: i64,
    pub per_job: Vec<JobCompensation>,
    pub total_time_based_pay: Decimal,
    pub total_bonus: Decimal,
    pub total_due: Decimal,
}

/// Computes time-based pay and bonus for a set of completed-and-unpaid jobs.
///
/// Pure and re-runnable: no side effects, identical inputs give identical
/// totals. A missing hourly rate or duration degrades that component to
/// zero; the job itself is never skipped, so a job with a bonus but no rate
/// still contributes its bonus.
pub fn compute_compensation(
    mechanic_id: i64,
    hourly_rate: Option<Decimal>,
    jobs: &[CompletedJobInput],
) -> CompensationDue {
    let rate = hourly_rate.unwrap_or(Decimal::ZERO);

    let per_job: Vec<JobCompensation> = jobs
        .iter()
        .map(|job| {
            let duration_hours = Decimal::from(job.estimated_duration_minutes.unwrap_or(0))
                / MINUTES_PER_HOUR;
            let job_cost = job.job_cost.unwrap_or(Decimal::ZERO);
            JobCompensation {
                job_id: job.job_id,
                duration_hours,
                time_based_pay: duration_hours * rate,
                job_cost,
                bonus: job_cost * BONUS_RATE,
            }
        })
        .collect();

    let total_time_based_pay: Decimal = per_job.iter().map(|j| j.time_based_pay).sum();
    let total_bonus: Decimal = per_job.iter().map(|j| j.bonus).sum();

    CompensationDue {
        mechanic_id,
        per_job,
        total_time_based_pay,
        total_bonus,
        total_due: total_time_based_pay + total_bonus,
    }
}

/// Read-side service answering "what is this mechanic currently owed".
#[derive(Clone)]
pub struct CompensationService {
    db: Arc<DatabaseConnection>,
}

impl CompensationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Computes the amount due to a mechanic over their completed-and-unpaid
    /// jobs. Pure read; calling it twice without an intervening settlement
    /// returns identical totals.
    #[instrument(skip(self), fields(mechanic_id = %mechanic_id))]
    pub async fn compute_due(&self, mechanic_id: i64) -> Result<CompensationDue, ServiceError> {
        let db = &*self.db;

        let mechanic = mechanic::Entity::find_by_id(mechanic_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Mechanic {} not found", mechanic_id))
            })?;

        let jobs = service_job::Entity::find()
            .filter(service_job::Column::MechanicId.eq(mechanic_id))
            .filter(service_job::Column::Status.eq(JobStatus::Completed))
            .filter(service_job::Column::IsPaid.eq(false))
            .order_by_asc(service_job::Column::Id)
            .find_also_related(service_catalog_entry::Entity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let inputs: Vec<CompletedJobInput> = jobs
            .into_iter()
            .map(|(job, catalog)| CompletedJobInput {
                job_id: job.id,
                estimated_duration_minutes: catalog.map(|c| c.estimated_duration_minutes),
                job_cost: job.final_cost.or(job.estimated_cost),
            })
            .collect();

        Ok(compute_compensation(
            mechanic_id,
            mechanic.hourly_rate,
            &inputs,
        ))
    }
}
