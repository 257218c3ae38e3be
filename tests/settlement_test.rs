mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

use autoshop_api::{
    entities::{payment_record, service_job},
    errors::ServiceError,
    services::{compensation::CompensationService, payroll::PayrollService},
};

use common::{seed_catalog_entry, seed_job, seed_mechanic, setup, JobSeed};

#[tokio::test]
async fn compute_due_matches_worked_example() {
    let (db, _events) = setup().await;
    let svc = CompensationService::new(db.clone());

    // Rate 200/hr, one completed unpaid job: 90 minutes, final cost 1000.
    let mechanic_id = seed_mechanic(&db, Some(dec!(200))).await;
    let catalog_id = seed_catalog_entry(&db, 90, dec!(800)).await;
    seed_job(
        &db,
        JobSeed::completed(catalog_id, mechanic_id, dec!(1000)),
    )
    .await;

    let due = svc.compute_due(mechanic_id).await.unwrap();
    assert_eq!(due.per_job.len(), 1);
    assert_eq!(due.total_time_based_pay, dec!(300));
    assert_eq!(due.total_bonus, dec!(30));
    assert_eq!(due.total_due, dec!(330));
}

#[tokio::test]
async fn compute_due_is_idempotent() {
    let (db, _events) = setup().await;
    let svc = CompensationService::new(db.clone());

    let mechanic_id = seed_mechanic(&db, Some(dec!(100))).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;
    seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;
    seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;

    let first = svc.compute_due(mechanic_id).await.unwrap();
    let second = svc.compute_due(mechanic_id).await.unwrap();

    assert_eq!(first.total_time_based_pay, dec!(200));
    assert_eq!(first.total_bonus, dec!(30));
    assert_eq!(first.total_due, dec!(230));
    assert_eq!(first.total_due, second.total_due);
    assert_eq!(first.per_job.len(), second.per_job.len());
}

#[tokio::test]
async fn compute_due_skips_paid_and_open_jobs() {
    let (db, _events) = setup().await;
    let svc = CompensationService::new(db.clone());

    let mechanic_id = seed_mechanic(&db, Some(dec!(100))).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;
    seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;
    seed_job(
        &db,
        JobSeed::completed(catalog_id, mechanic_id, dec!(900)).paid(),
    )
    .await;
    seed_job(&db, JobSeed::in_progress(catalog_id, mechanic_id)).await;

    let due = svc.compute_due(mechanic_id).await.unwrap();
    assert_eq!(due.per_job.len(), 1);
    assert_eq!(due.total_due, dec!(115));
}

#[tokio::test]
async fn compute_due_unknown_mechanic_is_not_found() {
    let (db, _events) = setup().await;
    let svc = CompensationService::new(db.clone());

    let err = svc.compute_due(404).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn settle_flips_jobs_and_records_payment() {
    let (db, events) = setup().await;
    let payroll = PayrollService::new(db.clone(), events);
    let compensation = CompensationService::new(db.clone());

    let mechanic_id = seed_mechanic(&db, Some(dec!(100))).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;
    let first = seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;
    let second = seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;

    let record = payroll
        .settle(
            mechanic_id,
            vec![first, second],
            None,
            1,
            Some("August payout".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(record.mechanic_id, mechanic_id);
    assert_eq!(record.time_based_pay, dec!(200));
    assert_eq!(record.bonus, dec!(30));
    assert_eq!(record.total_amount, dec!(230));
    assert_eq!(record.job_ids(), vec![first, second]);
    assert_eq!(record.paid_by, 1);
    assert_eq!(record.note.as_deref(), Some("August payout"));

    for id in [first, second] {
        let job = service_job::Entity::find_by_id(id)
            .one(&*db)
            .await
            .unwrap()
            .unwrap();
        assert!(job.is_paid);
    }

    // Settled jobs no longer show up as due.
    let due = compensation.compute_due(mechanic_id).await.unwrap();
    assert!(due.per_job.is_empty());
    assert_eq!(due.total_due, dec!(0));
}

#[tokio::test]
async fn settle_stores_override_alongside_computed_components() {
    let (db, events) = setup().await;
    let payroll = PayrollService::new(db.clone(), events);

    let mechanic_id = seed_mechanic(&db, Some(dec!(100))).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;
    let job = seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;

    let record = payroll
        .settle(mechanic_id, vec![job], Some(dec!(150)), 1, None)
        .await
        .unwrap();

    // Override wins the headline, the computed breakdown stays for audit.
    assert_eq!(record.total_amount, dec!(150));
    assert_eq!(record.time_based_pay, dec!(100));
    assert_eq!(record.bonus, dec!(15));
}

#[tokio::test]
async fn settle_rejects_duplicate_job_ids() {
    let (db, events) = setup().await;
    let payroll = PayrollService::new(db.clone(), events);

    let mechanic_id = seed_mechanic(&db, Some(dec!(100))).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;
    let job = seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;

    let err = payroll
        .settle(mechanic_id, vec![job, job], None, 1, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidJobSet(_));

    // Nothing was settled.
    let job = service_job::Entity::find_by_id(job)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert!(!job.is_paid);
    assert!(payment_record::Entity::find()
        .all(&*db)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn settle_same_job_twice_across_calls_fails() {
    let (db, events) = setup().await;
    let payroll = PayrollService::new(db.clone(), events);

    let mechanic_id = seed_mechanic(&db, Some(dec!(100))).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;
    let job = seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;

    payroll
        .settle(mechanic_id, vec![job], None, 1, None)
        .await
        .unwrap();
    let err = payroll
        .settle(mechanic_id, vec![job], None, 1, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidJobSet(_));

    // Exactly one payment record exists.
    let records = payment_record::Entity::find().all(&*db).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn settle_rejects_ineligible_jobs_without_partial_effects() {
    let (db, events) = setup().await;
    let payroll = PayrollService::new(db.clone(), events);

    let mechanic_id = seed_mechanic(&db, Some(dec!(100))).await;
    let other_mechanic = seed_mechanic(&db, Some(dec!(100))).await;
    let catalog_id = seed_catalog_entry(&db, 60, dec!(500)).await;

    let eligible = seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(500))).await;
    let wrong_owner = seed_job(
        &db,
        JobSeed::completed(catalog_id, other_mechanic, dec!(500)),
    )
    .await;
    let not_done = seed_job(&db, JobSeed::in_progress(catalog_id, mechanic_id)).await;

    for bad_set in [vec![eligible, wrong_owner], vec![eligible, not_done], vec![eligible, 9999]] {
        let err = payroll
            .settle(mechanic_id, bad_set, None, 1, None)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::InvalidJobSet(_));
    }

    // The eligible job was never swept up in a failed settlement.
    let job = service_job::Entity::find_by_id(eligible)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert!(!job.is_paid);
    assert!(payment_record::Entity::find()
        .all(&*db)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn settle_requires_jobs_and_known_mechanic() {
    let (db, events) = setup().await;
    let payroll = PayrollService::new(db.clone(), events);

    let mechanic_id = seed_mechanic(&db, Some(dec!(100))).await;

    let err = payroll
        .settle(mechanic_id, vec![], None, 1, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Validation(_));

    let err = payroll.settle(777, vec![1], None, 1, None).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn settle_mechanic_without_rate_pays_bonus_only() {
    let (db, events) = setup().await;
    let payroll = PayrollService::new(db.clone(), events);

    let mechanic_id = seed_mechanic(&db, None).await;
    let catalog_id = seed_catalog_entry(&db, 90, dec!(800)).await;
    let job = seed_job(&db, JobSeed::completed(catalog_id, mechanic_id, dec!(1000))).await;

    let record = payroll
        .settle(mechanic_id, vec![job], None, 1, None)
        .await
        .unwrap();
    assert_eq!(record.time_based_pay, dec!(0));
    assert_eq!(record.bonus, dec!(30));
    assert_eq!(record.total_amount, dec!(30));
}
