//! `SeaORM` Entity for the template_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "template_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_id: Uuid,
    pub gl_account_id: Uuid,
    pub is_debit: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transaction_templates::Entity",
        from = "Column::TemplateId",
        to = "super::transaction_templates::Column::Id"
    )]
    TransactionTemplates,
    #[sea_orm(
        belongs_to = "super::gl_accounts::Entity",
        from = "Column::GlAccountId",
        to = "super::gl_accounts::Column::Id"
    )]
    GlAccounts,
}

impl Related<super::transaction_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionTemplates.def()
    }
}

impl Related<super::gl_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GlAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
