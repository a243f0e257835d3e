//! `SeaORM` entity definitions.

pub mod accounts;
pub mod bulk_transaction_logs;
pub mod gl_accounts;
pub mod guarantee_requests;
pub mod guarantor_profiles;
pub mod journal_entries;
pub mod journals;
pub mod loan_applications;
pub mod member_fees;
pub mod members;
pub mod product_types;
pub mod sea_orm_active_enums;
pub mod template_lines;
pub mod transaction_templates;
pub mod transactions;
