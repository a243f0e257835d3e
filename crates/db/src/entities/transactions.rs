//! `SeaORM` Entity for the transactions table.
//!
//! Immutable once `completed`; the daily-sequenced identity is assigned
//! under an exclusive (prefix, date) lock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{
    PaymentMethod, RepaymentType, TransactionKind, TransactionStatus,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub currency: String,
    pub status: TransactionStatus,
    /// Principal vs interest (loan repayments only).
    pub repayment_type: Option<RepaymentType>,
    pub receipt_number: Option<String>,
    pub description: Option<String>,
    /// Daily-sequenced identity, e.g. `SD202608060001`.
    pub identity: String,
    pub transaction_date: Date,
    /// Operator who recorded the transaction.
    pub recorded_by: Uuid,
    pub reference: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::RecordedBy",
        to = "super::members::Column::Id"
    )]
    Members,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
