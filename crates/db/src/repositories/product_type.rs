//! Product catalog.
//!
//! Adding a type provisions one account of that type for every existing
//! active member. Provisioning is idempotent and a single member's
//! failure never aborts the rest; failures are logged and counted.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tamarind_core::catalog::{FeeClassification, ProductKind, validate_product_type};

use super::account::AccountRepository;
use super::now;
use crate::entities::{members, product_types};
use crate::error::{DbError, DbResult};

/// Input for registering a product type.
#[derive(Debug, Clone)]
pub struct NewProductType {
    /// Product kind.
    pub kind: ProductKind,
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Annual interest rate percent (loan and venture products).
    pub interest_rate: Option<Decimal>,
    /// Standard amount (fee products).
    pub standard_amount: Option<Decimal>,
    /// Fee classification; defaults to income for fee products.
    pub fee_classification: Option<FeeClassification>,
}

/// Outcome of the per-member provisioning sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisioningReport {
    /// Accounts created by this run.
    pub created: u32,
    /// Members that already had the account.
    pub skipped: u32,
    /// Members whose provisioning failed (logged, not fatal).
    pub failed: u32,
}

/// Repository for product types.
#[derive(Debug, Clone)]
pub struct ProductTypeRepository {
    db: DatabaseConnection,
}

impl ProductTypeRepository {
    /// Creates a new product type repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches a type by id.
    pub async fn get(&self, product_type_id: Uuid) -> DbResult<product_types::Model> {
        product_types::Entity::find_by_id(product_type_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("product type {product_type_id}")))
    }

    /// Lists types of one kind.
    pub async fn list_by_kind(&self, kind: ProductKind) -> DbResult<Vec<product_types::Model>> {
        Ok(product_types::Entity::find()
            .filter(
                product_types::Column::Kind
                    .eq(crate::entities::sea_orm_active_enums::ProductKind::from(kind)),
            )
            .order_by_asc(product_types::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Registers a type and provisions an account for every active
    /// member.
    #[instrument(skip(self, input), fields(name = %input.name, kind = %input.kind))]
    pub async fn create(
        &self,
        input: NewProductType,
    ) -> DbResult<(product_types::Model, ProvisioningReport)> {
        validate_product_type(
            input.kind,
            &input.name,
            input.interest_rate,
            input.standard_amount,
        )?;

        let fee_classification = match input.kind {
            ProductKind::Fee => Some(input.fee_classification.unwrap_or(FeeClassification::Income)),
            _ => input.fee_classification,
        };

        let txn = self.db.begin().await?;

        let duplicate = product_types::Entity::find()
            .filter(product_types::Column::Name.eq(input.name.clone()))
            .count(&txn)
            .await?;
        if duplicate > 0 {
            return Err(DbError::Conflict(format!(
                "a product type named {} already exists",
                input.name
            )));
        }

        let timestamp = now();
        let created = product_types::ActiveModel {
            id: Set(Uuid::now_v7()),
            kind: Set(input.kind.into()),
            name: Set(input.name),
            description: Set(input.description),
            interest_rate: Set(input.interest_rate),
            standard_amount: Set(input.standard_amount),
            fee_classification: Set(fee_classification.map(Into::into)),
            is_active: Set(true),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        let report = provision_accounts(&txn, &created).await?;

        txn.commit().await?;
        info!(
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "provisioned accounts for new product type"
        );
        Ok((created, report))
    }

    /// Re-runs provisioning for an existing type. Idempotent.
    pub async fn provision(&self, product_type_id: Uuid) -> DbResult<ProvisioningReport> {
        let product_type = self.get(product_type_id).await?;
        let txn = self.db.begin().await?;
        let report = provision_accounts(&txn, &product_type).await?;
        txn.commit().await?;
        Ok(report)
    }

    /// Deactivates a type; existing accounts are untouched.
    pub async fn deactivate(&self, product_type_id: Uuid) -> DbResult<product_types::Model> {
        let product_type = self.get(product_type_id).await?;
        let mut active: product_types::ActiveModel = product_type.into();
        active.is_active = Set(false);
        active.updated_at = Set(now());
        Ok(active.update(&self.db).await?)
    }
}

/// Sweeps all active members, creating the missing account of this type
/// for each. Each member runs in its own savepoint so one failure never
/// aborts the sweep.
async fn provision_accounts(
    txn: &sea_orm::DatabaseTransaction,
    product_type: &product_types::Model,
) -> DbResult<ProvisioningReport> {
    let today = Utc::now().date_naive();
    let mut report = ProvisioningReport::default();

    let member_list = members::Entity::find()
        .filter(members::Column::IsActive.eq(true))
        .all(txn)
        .await?;

    for member in member_list {
        let savepoint = txn.begin().await?;
        match AccountRepository::get_or_create(&savepoint, member.id, product_type, today).await {
            Ok((_, true)) => {
                savepoint.commit().await?;
                report.created += 1;
            }
            Ok((_, false)) => {
                savepoint.commit().await?;
                report.skipped += 1;
            }
            Err(err) => {
                savepoint.rollback().await?;
                warn!(
                    member = %member.member_number,
                    error = %err,
                    "account provisioning failed for member"
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
