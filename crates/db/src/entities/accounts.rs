//! `SeaORM` Entity for the accounts table.
//!
//! One row per (member, product type). Loan accounts additionally track
//! accrued interest; `balance` is the outstanding balance for loans.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ProductKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub product_type_id: Uuid,
    pub kind: ProductKind,
    pub account_number: String,
    pub balance: Decimal,
    /// Accrued interest (loan accounts only).
    pub interest_accrued: Option<Decimal>,
    /// Last interest accrual timestamp (loan accounts only).
    pub last_interest_calculation: Option<DateTimeWithTimeZone>,
    pub is_active: bool,
    pub reference: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(
        belongs_to = "super::product_types::Entity",
        from = "Column::ProductTypeId",
        to = "super::product_types::Column::Id"
    )]
    ProductTypes,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::product_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductTypes.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
