//! Database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260601_000001_initial;
mod m20260601_000002_zero_legacy_commitments;

/// Migration runner.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_initial::Migration),
            Box::new(m20260601_000002_zero_legacy_commitments::Migration),
        ]
    }
}
