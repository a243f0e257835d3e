//! `SeaORM` Entity for the guarantee_requests table.
//!
//! At most one request per (application, guarantor) pair. The
//! `outstanding_amount` running balance shrinks on proportional release.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::GuaranteeStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "guarantee_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub loan_application_id: Uuid,
    pub guarantor_profile_id: Uuid,
    pub guaranteed_amount: Decimal,
    /// Remaining held portion of the pledge.
    pub outstanding_amount: Decimal,
    pub status: GuaranteeStatus,
    pub note: Option<String>,
    /// True for the applicant's own self-guarantee surrogate.
    pub is_self: bool,
    pub reference: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loan_applications::Entity",
        from = "Column::LoanApplicationId",
        to = "super::loan_applications::Column::Id"
    )]
    LoanApplications,
    #[sea_orm(
        belongs_to = "super::guarantor_profiles::Entity",
        from = "Column::GuarantorProfileId",
        to = "super::guarantor_profiles::Column::Id"
    )]
    GuarantorProfiles,
}

impl Related<super::loan_applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanApplications.def()
    }
}

impl Related<super::guarantor_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GuarantorProfiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
