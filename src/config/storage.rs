//! Local fallback store configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Local file store settings. The local store is always the last link of
/// the store chain.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding preparations and sessions
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__DATA_DIR"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
