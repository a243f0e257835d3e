//! `SeaORM` Entity for the journal_entries table.
//!
//! Exactly one of `debit`/`credit` is non-zero per entry; for every
//! journal the debit and credit sums are equal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub journal_id: Uuid,
    pub gl_account_id: Uuid,
    pub debit: Decimal,
    pub credit: Decimal,
    pub transaction_date: Date,
    pub source_model: String,
    pub reference_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journals::Entity",
        from = "Column::JournalId",
        to = "super::journals::Column::Id"
    )]
    Journals,
    #[sea_orm(
        belongs_to = "super::gl_accounts::Entity",
        from = "Column::GlAccountId",
        to = "super::gl_accounts::Column::Id"
    )]
    GlAccounts,
}

impl Related<super::journals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journals.def()
    }
}

impl Related<super::gl_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GlAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
