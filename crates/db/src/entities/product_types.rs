//! `SeaORM` Entity for the product_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{FeeClassification, ProductKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "product_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: ProductKind,
    pub name: String,
    pub description: Option<String>,
    /// Annual interest rate percent (loan and venture products).
    pub interest_rate: Option<Decimal>,
    /// Standard amount (fee products).
    pub standard_amount: Option<Decimal>,
    /// Classification driving the fee posting credit account.
    pub fee_classification: Option<FeeClassification>,
    pub is_active: bool,
    pub reference: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
