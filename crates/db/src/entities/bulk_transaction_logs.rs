//! `SeaORM` Entity for the bulk_transaction_logs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bulk_transaction_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recorded_by: Uuid,
    pub transaction_kind: TransactionKind,
    /// Batch reference prefix, e.g. `SAVINGS_DEPOSIT-BULK-20260806`.
    pub reference_prefix: String,
    pub success_count: i32,
    pub error_count: i32,
    /// Captured `{index, error}` pairs.
    pub errors: Json,
    pub file_name: Option<String>,
    /// Set post-commit after a successful archive upload.
    pub archive_url: Option<String>,
    pub reference: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::RecordedBy",
        to = "super::members::Column::Id"
    )]
    Members,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
