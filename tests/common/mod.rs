#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tokio::sync::mpsc;

use autoshop_api::{
    db,
    entities::{mechanic, part, service_catalog_entry, service_job, JobStatus},
    events::{process_events, EventSender},
};

/// Connects to a fresh in-memory database with the schema applied and a
/// running event processor.
pub async fn setup() -> (Arc<DatabaseConnection>, EventSender) {
    let pool = db::establish_connection("sqlite::memory:")
        .await
        .expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");

    let (tx, rx) = mpsc::channel(256);
    tokio::spawn(process_events(rx));

    (Arc::new(pool), EventSender::new(tx))
}

/// Like [`setup`], but file-backed so the pool holds multiple connections
/// and requests can actually race. The returned TempDir keeps the database
/// file alive for the duration of the test.
pub async fn setup_file_backed() -> (Arc<DatabaseConnection>, EventSender, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("autoshop_test.db").display()
    );
    let pool = db::establish_connection(&url).await.expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");

    let (tx, rx) = mpsc::channel(256);
    tokio::spawn(process_events(rx));

    (Arc::new(pool), EventSender::new(tx), dir)
}

pub async fn seed_mechanic(db: &DatabaseConnection, hourly_rate: Option<Decimal>) -> i64 {
    let model = mechanic::ActiveModel {
        name: Set("Ravi Kumar".to_string()),
        hourly_rate: Set(hourly_rate),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.expect("seed mechanic").id
}

pub async fn seed_catalog_entry(
    db: &DatabaseConnection,
    estimated_duration_minutes: i32,
    base_price: Decimal,
) -> i64 {
    let model = service_catalog_entry::ActiveModel {
        name: Set("General service".to_string()),
        estimated_duration_minutes: Set(estimated_duration_minutes),
        base_price: Set(base_price),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.expect("seed catalog entry").id
}

pub async fn seed_part(
    db: &DatabaseConnection,
    name: &str,
    quantity: i32,
    unit_cost: Decimal,
) -> i64 {
    let model = part::ActiveModel {
        name: Set(name.to_string()),
        code: Set(format!("PRT-{}", name.to_uppercase().replace(' ', "-"))),
        category: Set(Some("consumables".to_string())),
        quantity: Set(quantity),
        min_quantity: Set(1),
        unit_cost: Set(unit_cost),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.expect("seed part").id
}

pub struct JobSeed {
    pub catalog_entry_id: i64,
    pub mechanic_id: Option<i64>,
    pub status: JobStatus,
    pub estimated_cost: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub is_paid: bool,
}

impl JobSeed {
    pub fn pending(catalog_entry_id: i64) -> Self {
        Self {
            catalog_entry_id,
            mechanic_id: None,
            status: JobStatus::Pending,
            estimated_cost: None,
            final_cost: None,
            is_paid: false,
        }
    }

    pub fn in_progress(catalog_entry_id: i64, mechanic_id: i64) -> Self {
        Self {
            catalog_entry_id,
            mechanic_id: Some(mechanic_id),
            status: JobStatus::InProgress,
            estimated_cost: None,
            final_cost: None,
            is_paid: false,
        }
    }

    pub fn completed(catalog_entry_id: i64, mechanic_id: i64, final_cost: Decimal) -> Self {
        Self {
            catalog_entry_id,
            mechanic_id: Some(mechanic_id),
            status: JobStatus::Completed,
            estimated_cost: None,
            final_cost: Some(final_cost),
            is_paid: false,
        }
    }

    pub fn estimated(mut self, estimated_cost: Decimal) -> Self {
        self.estimated_cost = Some(estimated_cost);
        self
    }

    pub fn paid(mut self) -> Self {
        self.is_paid = true;
        self
    }
}

pub async fn seed_job(db: &DatabaseConnection, seed: JobSeed) -> i64 {
    let completed_at = match seed.status {
        JobStatus::Completed => Some(Utc::now()),
        _ => None,
    };
    let model = service_job::ActiveModel {
        customer_id: Set(1),
        vehicle_id: Set(1),
        catalog_entry_id: Set(seed.catalog_entry_id),
        mechanic_id: Set(seed.mechanic_id),
        status: Set(seed.status),
        estimated_cost: Set(seed.estimated_cost),
        final_cost: Set(seed.final_cost),
        scheduled_at: Set(Utc::now()),
        completed_at: Set(completed_at),
        customer_notes: Set(Some("Strange noise from the front left wheel".to_string())),
        mechanic_notes: Set(None),
        is_paid: Set(seed.is_paid),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.expect("seed job").id
}
