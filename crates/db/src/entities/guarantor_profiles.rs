//! `SeaORM` Entity for the guarantor_profiles table.
//!
//! `max_guarantee_amount` mirrors the owner's summed savings balances;
//! `committed_guarantee_amount` is mutated only by the commit and release
//! paths under a row lock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "guarantor_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub is_eligible: bool,
    /// Immutable policy cap on concurrent guarantees.
    pub max_active_guarantees: i32,
    pub max_guarantee_amount: Decimal,
    pub committed_guarantee_amount: Decimal,
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
    #[sea_orm(has_many = "super::guarantee_requests::Entity")]
    GuaranteeRequests,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::guarantee_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GuaranteeRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
