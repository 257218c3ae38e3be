use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers;
use crate::services::compensation::{CompensationDue, JobCompensation};
use crate::services::inventory::{PartRequest, StockAdjustment, StockAdjustmentMode};

/// Aggregated OpenAPI document for every route the router mounts.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Autoshop API",
        version = "0.1.0",
        description = r#"
Backend engine for vehicle-service shops.

- **Jobs**: the service job lifecycle (assign, start, requeue, cancel, complete).
- **Inventory**: parts stock, consumed at job completion with price snapshots.
- **Payroll**: mechanic compensation and settlement into payment records.

Errors use a consistent JSON envelope:

```json
{
  "error": "Unprocessable Entity",
  "message": "Insufficient stock for part 7: requested 3, available 2",
  "timestamp": "2026-08-25T10:30:00.000Z"
}
```
        "#
    ),
    paths(
        handlers::jobs::get_job,
        handlers::jobs::assign_job,
        handlers::jobs::start_job,
        handlers::jobs::requeue_job,
        handlers::jobs::cancel_job,
        handlers::jobs::complete_job,
        handlers::payroll::get_due,
        handlers::payroll::settle,
        handlers::payroll::get_payment,
        handlers::inventory::get_part,
        handlers::inventory::adjust_stock,
    ),
    components(schemas(
        ErrorResponse,
        PartRequest,
        StockAdjustment,
        StockAdjustmentMode,
        CompensationDue,
        JobCompensation,
        handlers::jobs::AssignJobRequest,
        handlers::jobs::CompleteJobRequest,
        handlers::payroll::SettleRequest,
        handlers::payroll::JobDueLine,
        handlers::payroll::MechanicDueResponse,
        handlers::inventory::AdjustStockRequest,
    )),
    tags(
        (name = "Jobs", description = "Service job lifecycle"),
        (name = "Inventory", description = "Parts stock management"),
        (name = "Payroll", description = "Mechanic compensation and settlement")
    )
)]
pub struct ApiDoc;

/// Swagger UI router, served at `/swagger-ui` with the document at
/// `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
