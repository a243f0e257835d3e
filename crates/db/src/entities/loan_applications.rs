//! `SeaORM` Entity for the loan_applications table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ApplicationStatus, CalculationMode, RepaymentFrequency};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub product_type_id: Uuid,
    pub requested_amount: Decimal,
    pub calculation_mode: CalculationMode,
    pub term_months: i32,
    pub monthly_payment: Decimal,
    pub total_interest: Decimal,
    pub repayment_amount: Decimal,
    pub repayment_frequency: RepaymentFrequency,
    pub start_date: Date,
    /// Immutable projection snapshot from the amortisation calculator.
    pub projection: Json,
    pub self_guaranteed_amount: Decimal,
    /// Operational loan account, linked on approval.
    pub loan_account_id: Option<Uuid>,
    pub status: ApplicationStatus,
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
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::LoanAccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
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
