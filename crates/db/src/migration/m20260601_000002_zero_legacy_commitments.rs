//! Zeroes committed guarantee amounts that predate deferred commitment.
//!
//! Profiles created before commitment moved to submission time may carry
//! stale committed amounts. They are zeroed here and rebuilt by
//! `GuarantorRepository::replay_commitments`, which scans live
//! (submitted/approved/disbursed) applications. Stored values are never
//! trusted silently.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ZERO_COMMITMENTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Irreversible: the legacy values are not preserved.
        Ok(())
    }
}

const ZERO_COMMITMENTS_SQL: &str = r"
UPDATE guarantor_profiles
SET committed_guarantee_amount = 0
WHERE committed_guarantee_amount <> 0;
";
