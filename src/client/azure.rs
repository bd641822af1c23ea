//! Azure OpenAI chat-completions client.
//!
//! Posts to `{endpoint}/openai/deployments/{deployment}/chat/completions`
//! with the `api-key` header. Calls are bounded by the configured request
//! timeout and never retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{ChatClient, ChatClientError, Completion, Usage};
use crate::config::{AzureOpenAiConfig, Config};
use crate::prompt::{Message, Prompt};

/// Wire body for the chat-completions endpoint.
#[derive(Debug, Serialize)]
pub struct AzureChatRequest<'a> {
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct AzureChatResponse {
    #[serde(default)]
    choices: Vec<AzureChoice>,
    #[serde(default)]
    usage: Option<AzureUsage>,
}

#[derive(Debug, Deserialize)]
struct AzureChoice {
    message: Option<AzureMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AzureMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AzureUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AzureErrorEnvelope {
    error: AzureErrorBody,
}

#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct AzureOpenAiClient {
    http: reqwest::Client,
    config: AzureOpenAiConfig,
    timeout_secs: u64,
}

impl AzureOpenAiClient {
    pub fn new(config: &Config) -> Result<Self, ChatClientError> {
        let timeout_secs = config.server.request_timeout_secs;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ChatClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            config: config.azure.clone(),
            timeout_secs,
        })
    }

    /// Full URL of the chat-completions operation for the configured deployment.
    pub fn completions_url(&self) -> Result<String, ChatClientError> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or(ChatClientError::NotConfigured("endpoint"))?;
        let deployment = self
            .config
            .deployment_name
            .as_deref()
            .ok_or(ChatClientError::NotConfigured("deployment name"))?;

        Ok(format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim().trim_end_matches('/'),
            deployment.trim(),
            self.config.api_version
        ))
    }

    /// Build the wire body. Prompt temperature wins over the configured default.
    pub fn request_body<'a>(&self, prompt: &'a Prompt) -> AzureChatRequest<'a> {
        AzureChatRequest {
            messages: &prompt.messages,
            temperature: prompt
                .options
                .temperature
                .or(self.config.default_temperature),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> ChatClientError {
        if e.is_timeout() {
            ChatClientError::Timeout(self.timeout_secs)
        } else {
            // Strip the URL so query parameters never reach logs or clients.
            ChatClientError::Transport(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl ChatClient for AzureOpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<Completion, ChatClientError> {
        let url = self.completions_url()?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ChatClientError::NotConfigured("API key"))?;

        let body = self.request_body(prompt);
        debug!(
            messages = body.messages.len(),
            temperature = ?body.temperature,
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&url)
            .header("api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AzureErrorEnvelope>(&raw)
                .ok()
                .and_then(|env| match (env.error.code, env.error.message) {
                    (Some(code), Some(msg)) => Some(format!("{code}: {msg}")),
                    (None, Some(msg)) => Some(msg),
                    (Some(code), None) => Some(code),
                    (None, None) => None,
                })
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                });
            warn!(status = status.as_u16(), "Chat provider returned an error");
            return Err(ChatClientError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        // The request timeout also covers the body, so a stalled read is a timeout.
        let raw = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let parsed: AzureChatResponse =
            serde_json::from_slice(&raw).map_err(|e| ChatClientError::Decode(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ChatClientError::EmptyCompletion)?;

        Ok(Completion {
            content: choice.message.and_then(|m| m.content),
            finish_reason: choice.finish_reason,
            usage: parsed.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_prompt;

    fn configured() -> Config {
        let mut config = Config::default();
        config.azure.endpoint = Some("https://res.openai.azure.com/".to_string());
        config.azure.deployment_name = Some("gpt-4o-mini".to_string());
        config.azure.api_key = Some("key".to_string());
        config
    }

    #[test]
    fn test_completions_url() {
        let client = AzureOpenAiClient::new(&configured()).unwrap();
        assert_eq!(
            client.completions_url().unwrap(),
            "https://res.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-10-21"
        );
    }

    #[test]
    fn test_url_ignores_surrounding_whitespace() {
        let mut config = configured();
        config.azure.endpoint = Some("  https://res.openai.azure.com/\n".to_string());
        let client = AzureOpenAiClient::new(&config).unwrap();
        assert!(client
            .completions_url()
            .unwrap()
            .starts_with("https://res.openai.azure.com/openai/deployments/gpt-4o-mini/"));
    }

    #[test]
    fn test_url_requires_endpoint() {
        let client = AzureOpenAiClient::new(&Config::default()).unwrap();
        assert!(matches!(
            client.completions_url(),
            Err(ChatClientError::NotConfigured("endpoint"))
        ));
    }

    #[test]
    fn test_body_omits_absent_temperature() {
        let client = AzureOpenAiClient::new(&configured()).unwrap();
        let prompt = build_prompt(Some("hi"), Some("sys"), None).unwrap();
        let json = serde_json::to_value(client.request_body(&prompt)).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_prompt_temperature_overrides_default() {
        let mut config = configured();
        config.azure.default_temperature = Some(0.7);
        let client = AzureOpenAiClient::new(&config).unwrap();

        let plain = build_prompt(Some("hi"), None, None).unwrap();
        assert_eq!(client.request_body(&plain).temperature, Some(0.7));

        let tuned = build_prompt(Some("hi"), None, Some(0.1)).unwrap();
        assert_eq!(client.request_body(&tuned).temperature, Some(0.1));
    }
}
