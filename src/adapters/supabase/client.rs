//! Minimal PostgREST client shared by the Supabase stores.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::ports::StoreError;

pub(super) const STORE_NAME: &str = "supabase";

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseRestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    anon_key: SecretString,
    pub timeout: Duration,
}

impl SupabaseRestConfig {
    pub fn new(url: impl Into<String>, anon_key: SecretString) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin wrapper adding auth headers and status mapping.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: SupabaseRestConfig,
    client: Client,
}

impl SupabaseClient {
    pub fn new(config: SupabaseRestConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::NotConfigured(format!("supabase http client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.config.anon_key.expose_secret();
        builder
            .header("apikey", key.as_str())
            .header("Authorization", format!("Bearer {}", key))
    }

    pub(super) fn get(&self, table: &str) -> RequestBuilder {
        self.authorized(self.client.get(self.table_url(table)))
    }

    /// Upsert request; `on_conflict` names the unique columns.
    pub(super) fn upsert(&self, table: &str, on_conflict: &str, merge: bool) -> RequestBuilder {
        let resolution = if merge {
            "resolution=merge-duplicates"
        } else {
            "resolution=ignore-duplicates"
        };
        self.authorized(self.client.post(self.table_url(table)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", format!("{},return=minimal", resolution))
    }

    /// Sends the request and maps transport and status failures.
    pub(super) async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::unavailable(STORE_NAME, "request timed out")
            } else {
                StoreError::unavailable(STORE_NAME, e.to_string())
            }
        })?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> StoreError {
    let message = format!("status {}: {}", status.as_u16(), body);
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        StoreError::unavailable(STORE_NAME, message)
    } else {
        StoreError::rejected(STORE_NAME, message)
    }
}

/// Quotes a value for a PostgREST filter so commas and parentheses in names
/// cannot break the filter syntax.
pub(super) fn quote_filter_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
