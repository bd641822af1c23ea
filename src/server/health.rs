//! Shallow health check: reports which provider settings are present.
//!
//! The provider itself is never contacted here.

use serde::{Deserialize, Serialize};

use crate::config::{AzureOpenAiConfig, NOT_SET};

/// Number of leading API key characters that may appear in diagnostics.
const VISIBLE_KEY_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub endpoint: String,
    pub deployment_name: String,
    pub api_key_status: String,
}

impl HealthStatus {
    pub fn from_config(config: &AzureOpenAiConfig) -> Self {
        Self {
            status: "UP".to_string(),
            endpoint: config.endpoint_or_sentinel().to_string(),
            deployment_name: config.deployment_or_sentinel().to_string(),
            api_key_status: redact_api_key(config.api_key.as_deref()),
        }
    }
}

/// Describe the API key without revealing more than its first four characters.
pub fn redact_api_key(api_key: Option<&str>) -> String {
    match api_key {
        None | Some(NOT_SET) => NOT_SET.to_string(),
        Some(key) => {
            let prefix: String = key.chars().take(VISIBLE_KEY_CHARS).collect();
            format!("SET (first 4 chars: {prefix}...)")
        }
    }
}
