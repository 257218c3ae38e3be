use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory ledger entry for one stocked part.
///
/// `quantity` is never negative; every mutation goes through the conditional
/// updates in `services::inventory`, which clamp at zero.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.min_quantity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::part_usage_line::Entity")]
    PartUsageLines,
}

impl Related<super::part_usage_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartUsageLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
