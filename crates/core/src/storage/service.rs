//! Archive store implementation using Apache OpenDAL.

use chrono::NaiveDate;
use opendal::{Operator, services};

use super::config::StorageProvider;
use super::error::StorageError;

/// Archive store for bulk-batch CSV files.
pub struct ArchiveStore {
    operator: Operator,
    provider: StorageProvider,
}

impl ArchiveStore {
    /// Creates an archive store for the configured provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the operator cannot be initialised.
    pub fn from_provider(provider: StorageProvider) -> Result<Self, StorageError> {
        let operator = match &provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder)
                    .map_err(|e| StorageError::Configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(root);
                Operator::new(builder)
                    .map_err(|e| StorageError::Configuration(e.to_string()))?
                    .finish()
            }
        };
        Ok(Self { operator, provider })
    }

    /// Storage key of a batch archive: `bulk/<year>/<reference>.csv`.
    #[must_use]
    pub fn archive_key(reference: &str, batch_date: NaiveDate) -> String {
        format!("bulk/{}/{reference}.csv", batch_date.format("%Y"))
    }

    /// Uploads the original CSV of a processed batch and returns its
    /// archive URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; callers log and carry on.
    pub async fn archive_csv(
        &self,
        reference: &str,
        batch_date: NaiveDate,
        contents: Vec<u8>,
    ) -> Result<String, StorageError> {
        let key = Self::archive_key(reference, batch_date);
        self.operator.write(&key, contents).await?;
        Ok(format!(
            "{}://{}/{key}",
            self.provider.name(),
            self.provider.location()
        ))
    }

    /// Checks whether an archive exists.
    pub async fn exists(&self, reference: &str, batch_date: NaiveDate) -> bool {
        let key = Self::archive_key(reference, batch_date);
        self.operator.stat(&key).await.is_ok()
    }
}
