//! Autoshop API Library
//!
//! Core engine for a vehicle-service-shop backend: the service job
//! lifecycle, the parts inventory ledger, and mechanic compensation.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::services::{
    compensation::CompensationService, inventory::InventoryService, jobs::JobService,
    payroll::PayrollService,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub job_service: JobService,
    pub inventory_service: InventoryService,
    pub compensation_service: CompensationService,
    pub payroll_service: PayrollService,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        Self {
            job_service: JobService::new(db.clone(), event_sender.clone()),
            inventory_service: InventoryService::new(db.clone(), event_sender.clone()),
            compensation_service: CompensationService::new(db.clone()),
            payroll_service: PayrollService::new(db.clone(), event_sender.clone()),
            db,
            config,
            event_sender,
        }
    }
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = state.db.ping().await.is_ok();
    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Assembles the application router, including the Swagger UI.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/jobs", handlers::jobs::job_routes())
        .nest("/mechanics", handlers::payroll::mechanic_routes())
        .nest("/payments", handlers::payroll::payment_routes())
        .nest("/parts", handlers::inventory::part_routes())
        .with_state(state)
        .merge(openapi::swagger_ui())
}
