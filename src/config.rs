//! Runtime configuration for azure-chat-proxy.
//!
//! Configuration is read from an optional JSON file, then overridden by
//! command-line flags and environment variables. The result is immutable
//! for the lifetime of the process and shared as `Arc<Config>`.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Placeholder reported for any credential that is not configured.
pub const NOT_SET: &str = "NOT_SET";

/// Command-line arguments.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "azure-chat-proxy", about = "HTTP façade for Azure OpenAI chat completions")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides the config file).
    #[arg(long, env = "CHAT_PROXY_LISTEN")]
    pub listen: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,

    /// Azure OpenAI resource endpoint, e.g. https://my-resource.openai.azure.com
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Name of the model deployment serving chat requests.
    #[arg(long, env = "AZURE_OPENAI_DEPLOYMENT_NAME")]
    pub deployment_name: Option<String>,

    /// API key for the Azure OpenAI resource.
    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// REST API version sent as the `api-version` query parameter.
    #[arg(long, env = "AZURE_OPENAI_API_VERSION")]
    pub api_version: Option<String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Chat-completion provider configuration.
    pub azure: AzureOpenAiConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:8080").
    pub listen: String,

    /// Upper bound on a single provider call, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Azure OpenAI connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint URL.
    pub endpoint: Option<String>,

    /// Deployment (model) name.
    pub deployment_name: Option<String>,

    /// API key. Never logged.
    pub api_key: Option<String>,

    /// REST API version.
    pub api_version: String,

    /// Temperature used when a prompt does not carry its own.
    pub default_temperature: Option<f32>,
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment_name: None,
            api_key: None,
            api_version: "2024-10-21".to_string(),
            default_temperature: None,
        }
    }
}

impl fmt::Debug for AzureOpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiConfig")
            .field("endpoint", &self.endpoint)
            .field("deployment_name", &self.deployment_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_version", &self.api_version)
            .field("default_temperature", &self.default_temperature)
            .finish()
    }
}

impl AzureOpenAiConfig {
    /// Endpoint value for display, `NOT_SET` when absent.
    pub fn endpoint_or_sentinel(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(NOT_SET)
    }

    /// Deployment name for display, `NOT_SET` when absent.
    pub fn deployment_or_sentinel(&self) -> &str {
        self.deployment_name.as_deref().unwrap_or(NOT_SET)
    }

    fn normalize(&mut self) {
        self.endpoint = present(self.endpoint.take());
        self.deployment_name = present(self.deployment_name.take());
        self.api_key = present(self.api_key.take());
    }
}

/// Blank strings and the `NOT_SET` sentinel both mean "not configured".
/// Anything else is kept exactly as given.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v.as_str() != NOT_SET)
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let data = std::fs::read_to_string(path)?;
            serde_json::from_str::<Config>(&data)?
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };
        config.azure.normalize();
        Ok(config)
    }

    /// Overlay command-line and environment values onto the loaded file.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(listen) = &cli.listen {
            self.server.listen = listen.clone();
        }
        if cli.endpoint.is_some() {
            self.azure.endpoint = cli.endpoint.clone();
        }
        if cli.deployment_name.is_some() {
            self.azure.deployment_name = cli.deployment_name.clone();
        }
        if cli.api_key.is_some() {
            self.azure.api_key = cli.api_key.clone();
        }
        if let Some(version) = &cli.api_version {
            self.azure.api_version = version.clone();
        }
        self.azure.normalize();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
        assert_eq!(cfg.server.request_timeout_secs, 30);
        assert!(cfg.azure.endpoint.is_none());
        assert_eq!(cfg.azure.endpoint_or_sentinel(), NOT_SET);
        assert_eq!(cfg.azure.deployment_or_sentinel(), NOT_SET);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"azure": {{"endpoint": "https://example.openai.azure.com", "api_key": "NOT_SET"}}}}"#
        )
        .unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(
            cfg.azure.endpoint.as_deref(),
            Some("https://example.openai.azure.com")
        );
        assert!(cfg.azure.api_key.is_none());
        assert_eq!(cfg.azure.api_version, "2024-10-21");
        assert_eq!(cfg.server.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = Config::load(std::path::Path::new("/nonexistent/config.json")).unwrap();
        assert!(cfg.azure.api_key.is_none());
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli {
            listen: Some("127.0.0.1:9000".to_string()),
            deployment_name: Some("gpt-4o".to_string()),
            api_key: Some("  ".to_string()),
            ..Cli::default()
        };
        let cfg = Config::default().apply_cli(&cli);
        assert_eq!(cfg.server.listen, "127.0.0.1:9000");
        assert_eq!(cfg.azure.deployment_name.as_deref(), Some("gpt-4o"));
        assert!(cfg.azure.api_key.is_none());
    }

    #[test]
    fn test_values_are_kept_raw() {
        let cli = Cli {
            endpoint: Some(" https://res.openai.azure.com/ ".to_string()),
            deployment_name: Some("NOT_SET".to_string()),
            ..Cli::default()
        };
        let cfg = Config::default().apply_cli(&cli);
        assert_eq!(cfg.azure.endpoint_or_sentinel(), " https://res.openai.azure.com/ ");
        assert_eq!(cfg.azure.deployment_or_sentinel(), NOT_SET);
        assert!(cfg.azure.deployment_name.is_none());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let cfg = AzureOpenAiConfig {
            api_key: Some("sk-secret-value".to_string()),
            ..AzureOpenAiConfig::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
