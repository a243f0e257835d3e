//! Member registry.
//!
//! Creating a member fans out, in the same transaction, to one product
//! account per existing active product type and a guarantor profile.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use rust_decimal::Decimal;
use tamarind_core::auth;
use tamarind_shared::config::MemberDefaults;
use tamarind_shared::types::{PageRequest, PageResponse};

use super::account::AccountRepository;
use super::{ident, now};
use crate::entities::{guarantor_profiles, members, product_types};
use crate::error::{DbError, DbResult};

/// Default policy cap on concurrent guarantees for new profiles.
const DEFAULT_MAX_ACTIVE_GUARANTEES: i32 = 5;

/// Input for enrolling a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email, unique.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Grants the system-admin role.
    pub is_system_admin: bool,
    /// Grants the superuser role.
    pub is_superuser: bool,
}

/// Repository for members.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
    defaults: MemberDefaults,
}

impl MemberRepository {
    /// Creates a new member repository with role-flag defaults.
    #[must_use]
    pub const fn new(db: DatabaseConnection, defaults: MemberDefaults) -> Self {
        Self { db, defaults }
    }

    /// Fetches a member by id.
    pub async fn get(&self, member_id: Uuid) -> DbResult<members::Model> {
        members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("member {member_id}")))
    }

    /// Fetches a member by membership number.
    pub async fn find_by_member_number(&self, member_number: &str) -> DbResult<members::Model> {
        members::Entity::find()
            .filter(members::Column::MemberNumber.eq(member_number))
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("member {member_number}")))
    }

    /// Fetches a member by email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<members::Model> {
        members::Entity::find()
            .filter(members::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("member {email}")))
    }

    /// Lists members, newest first.
    pub async fn list(&self, page: &PageRequest) -> DbResult<PageResponse<members::Model>> {
        let query = members::Entity::find().order_by_desc(members::Column::CreatedAt);
        let total = query.clone().count(&self.db).await?;
        let items = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok(PageResponse::new(items, total, page))
    }

    /// Enrols a member and provisions their accounts and guarantor
    /// profile atomically.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: NewMember) -> DbResult<members::Model> {
        if input.email.trim().is_empty() {
            return Err(DbError::validation("email", "must not be empty"));
        }
        if input.first_name.trim().is_empty() {
            return Err(DbError::validation("first_name", "must not be empty"));
        }
        let password_hash = auth::hash_password(&input.password)?;

        let txn = self.db.begin().await?;

        let duplicate = members::Entity::find()
            .filter(members::Column::Email.eq(input.email.clone()))
            .count(&txn)
            .await?;
        if duplicate > 0 {
            return Err(DbError::Conflict(format!(
                "a member with email {} already exists",
                input.email
            )));
        }

        let today = Utc::now().date_naive();
        let member_number = ident::unique_member_number(&txn, today).await?;
        let timestamp = now();

        let member = members::ActiveModel {
            id: Set(Uuid::now_v7()),
            member_number: Set(member_number),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            password_hash: Set(password_hash),
            is_member: Set(true),
            is_system_admin: Set(input.is_system_admin),
            is_superuser: Set(input.is_superuser),
            is_approved: Set(self.defaults.is_approved),
            is_active: Set(self.defaults.is_active),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        provision_member(&txn, &member).await?;

        txn.commit().await?;
        info!(member_number = %member.member_number, "enrolled member");
        Ok(member)
    }

    /// Deactivates a member.
    pub async fn deactivate(&self, member_id: Uuid) -> DbResult<members::Model> {
        let member = self.get(member_id).await?;
        let mut active: members::ActiveModel = member.into();
        active.is_active = Set(false);
        active.updated_at = Set(now());
        Ok(active.update(&self.db).await?)
    }
}

/// Provisions one account per active product type plus a guarantor
/// profile for a freshly enrolled member.
pub(crate) async fn provision_member(
    txn: &DatabaseTransaction,
    member: &members::Model,
) -> DbResult<()> {
    let today = Utc::now().date_naive();

    let types = product_types::Entity::find()
        .filter(product_types::Column::IsActive.eq(true))
        .all(txn)
        .await?;
    for product_type in &types {
        AccountRepository::get_or_create(txn, member.id, product_type, today).await?;
    }

    let timestamp = now();
    guarantor_profiles::ActiveModel {
        id: Set(Uuid::now_v7()),
        member_id: Set(member.id),
        is_eligible: Set(true),
        max_active_guarantees: Set(DEFAULT_MAX_ACTIVE_GUARANTEES),
        max_guarantee_amount: Set(Decimal::ZERO),
        committed_guarantee_amount: Set(Decimal::ZERO),
        reference: Set(tamarind_core::ident::generate_reference()),
        created_at: Set(timestamp),
        updated_at: Set(timestamp),
    }
    .insert(txn)
    .await?;

    Ok(())
}
