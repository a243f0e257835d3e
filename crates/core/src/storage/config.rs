//! Storage provider configuration.

use super::error::StorageError;

/// Supported object-storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// S3-compatible object storage.
    S3 {
        /// Endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key id.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Local filesystem (development).
    LocalFs {
        /// Root directory.
        root: String,
    },
}

impl StorageProvider {
    /// Builds a provider from application settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` for an unknown service name.
    pub fn from_settings(
        settings: &tamarind_shared::config::StorageConfig,
    ) -> Result<Self, StorageError> {
        match settings.service.as_str() {
            "fs" => Ok(Self::LocalFs {
                root: settings.root.clone(),
            }),
            "s3" => Ok(Self::S3 {
                endpoint: settings.endpoint.clone(),
                bucket: settings.bucket.clone(),
                access_key_id: settings.access_key_id.clone(),
                secret_access_key: settings.secret_access_key.clone(),
                region: settings.region.clone(),
            }),
            other => Err(StorageError::Configuration(format!(
                "unknown storage service: {other}"
            ))),
        }
    }

    /// Short provider name for logs and archive URLs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "fs",
        }
    }

    /// The bucket (S3) or root directory (fs) files land in.
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root,
        }
    }
}
