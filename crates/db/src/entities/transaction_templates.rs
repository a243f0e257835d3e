//! `SeaORM` Entity for the transaction_templates table.
//!
//! Stored templates override the built-in event mapping; absent ones are
//! lazily persisted on first post.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Event code, e.g. `savings_deposit` or `fee_payment_registration`.
    pub code: String,
    pub description: Option<String>,
    pub reference: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::template_lines::Entity")]
    TemplateLines,
}

impl Related<super::template_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
