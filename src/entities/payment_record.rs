use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit record for one settlement action. Insert-only.
///
/// `total_amount` may differ from `time_based_pay + bonus` when a manager
/// overrides the headline figure; the computed components are stored
/// alongside it regardless so the override is auditable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub mechanic_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub time_based_pay: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub bonus: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,
    /// Ordered list of settled job ids, stored as a JSON array.
    #[sea_orm(column_type = "Json")]
    pub jobs_included: Json,
    pub paid_by: i64,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl Model {
    /// Decodes the settled job ids back out of the JSON column.
    pub fn job_ids(&self) -> Vec<i64> {
        serde_json::from_value(self.jobs_included.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mechanic::Entity",
        from = "Column::MechanicId",
        to = "super::mechanic::Column::Id"
    )]
    Mechanic,
}

impl Related<super::mechanic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mechanic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
