//! `SeaORM` Entity for the member_fees table.
//!
//! Tracks cumulative payments per (member, fee type); `is_paid` flips when
//! payments cover the fee type's standard amount.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "member_fees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub product_type_id: Uuid,
    pub amount_paid: Decimal,
    pub is_paid: bool,
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

impl ActiveModelBehavior for ActiveModel {}
