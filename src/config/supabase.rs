//! Hosted (Supabase PostgREST) store configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::supabase::SupabaseRestConfig;

/// Supabase configuration. Optional; without it the hosted store is left
/// out of the chain.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Public anon key
    pub anon_key: SecretString,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn rest_config(&self) -> SupabaseRestConfig {
        SupabaseRestConfig::new(self.url.clone(), self.anon_key.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// Validate Supabase configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("SUPABASE__URL"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ValidationError::InvalidSupabaseUrl);
        }
        if production && !self.url.starts_with("https://") {
            return Err(ValidationError::SupabaseMustBeHttps);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}
