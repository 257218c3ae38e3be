mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use autoshop_api::{
    entities::{part, part_usage_line, service_job, JobStatus},
    errors::ServiceError,
    services::{
        inventory::{InventoryService, PartRequest, StockAdjustmentMode},
        jobs::JobService,
    },
};

use common::{seed_catalog_entry, seed_job, seed_mechanic, seed_part, setup_file_backed, JobSeed};

const MAX_ATTEMPTS: usize = 200;

// SQLite reports transient lock contention as a database error; domain
// outcomes (insufficient stock, invalid transition) are terminal.
async fn complete_with_retry(
    svc: &JobService,
    job_id: i64,
    parts: Vec<PartRequest>,
) -> Result<service_job::Model, ServiceError> {
    let mut last = None;
    for _ in 0..MAX_ATTEMPTS {
        match svc.complete(job_id, None, None, parts.clone()).await {
            Err(ServiceError::DatabaseError(e)) => {
                last = Some(ServiceError::DatabaseError(e));
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            other => return other,
        }
    }
    Err(last.unwrap_or_else(|| ServiceError::InternalError("retries exhausted".into())))
}

async fn subtract_with_retry(
    svc: &InventoryService,
    part_id: i64,
    quantity: i32,
) -> autoshop_api::services::inventory::StockAdjustment {
    for _ in 0..MAX_ATTEMPTS {
        match svc
            .adjust_stock(part_id, quantity, StockAdjustmentMode::Subtract)
            .await
        {
            Err(ServiceError::DatabaseError(_)) => {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            other => return other.expect("adjustment"),
        }
    }
    panic!("retries exhausted for part {}", part_id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_cannot_oversell_stock() {
    let (db, events, _dir) = setup_file_backed().await;
    let svc = JobService::new(db.clone(), events);

    let mechanic_id = seed_mechanic(&db, None).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;
    let part_id = seed_part(&db, "Oil Filter", 10, dec!(120)).await;

    let mut job_ids = Vec::new();
    for _ in 0..20 {
        job_ids.push(seed_job(&db, JobSeed::in_progress(catalog_id, mechanic_id)).await);
    }

    // 20 jobs each want one unit; only 10 units exist.
    let mut tasks = Vec::new();
    for job_id in job_ids {
        let svc = svc.clone();
        tasks.push(tokio::spawn(async move {
            complete_with_retry(&svc, job_id, vec![PartRequest { part_id, quantity: 1 }]).await
        }));
    }

    let mut completed = 0;
    for task in tasks {
        match task.await.expect("task") {
            Ok(job) => {
                assert_eq!(job.status, JobStatus::Completed);
                completed += 1;
            }
            Err(err) => assert_matches!(err, ServiceError::InsufficientStock { .. }),
        }
    }
    assert_eq!(completed, 10);

    let stock = part::Entity::find_by_id(part_id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity, 0);

    let lines = part_usage_line::Entity::find()
        .filter(part_usage_line::Column::PartId.eq(part_id))
        .all(&*db)
        .await
        .unwrap();
    assert_eq!(lines.len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_concurrent_completion_wins_a_job() {
    let (db, events, _dir) = setup_file_backed().await;
    let svc = JobService::new(db.clone(), events);

    let mechanic_id = seed_mechanic(&db, None).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;
    let part_id = seed_part(&db, "Brake Pad", 20, dec!(250)).await;
    let job_id = seed_job(&db, JobSeed::in_progress(catalog_id, mechanic_id)).await;

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let svc = svc.clone();
        tasks.push(tokio::spawn(async move {
            complete_with_retry(&svc, job_id, vec![PartRequest { part_id, quantity: 2 }]).await
        }));
    }

    let mut wins = 0;
    for task in tasks {
        match task.await.expect("task") {
            Ok(_) => wins += 1,
            Err(err) => assert_matches!(
                err,
                ServiceError::InvalidTransition { .. } | ServiceError::ConcurrencyConflict(_)
            ),
        }
    }
    assert_eq!(wins, 1);

    // Exactly one completion's parts were consumed and recorded.
    let stock = part::Entity::find_by_id(part_id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity, 18);

    let lines = part_usage_line::Entity::find()
        .filter(part_usage_line::Column::JobId.eq(job_id))
        .all(&*db)
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_subtractions_never_drive_stock_negative() {
    let (db, events, _dir) = setup_file_backed().await;
    let inventory = InventoryService::new(db.clone(), events);

    let part_id = seed_part(&db, "Wiper Blade", 5, dec!(180)).await;

    // Ten concurrent single-unit subtractions against five units.
    let mut tasks = Vec::new();
    for _ in 0..10 {
        let inventory = inventory.clone();
        tasks.push(tokio::spawn(async move {
            subtract_with_retry(&inventory, part_id, 1).await
        }));
    }

    for task in tasks {
        let adjustment = task.await.expect("task");
        assert!(adjustment.new_quantity >= 0);
    }

    let stock = part::Entity::find_by_id(part_id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity, 0);
}
