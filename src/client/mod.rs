//! Chat-completion collaborator.
//!
//! - [`ChatClient`]: the seam the HTTP layer talks to
//! - [`azure`]: Azure OpenAI implementation over reqwest

pub mod azure;

use async_trait::async_trait;
use thiserror::Error;

use crate::prompt::{Prompt, PromptError};

#[derive(Error, Debug)]
pub enum ChatClientError {
    #[error("Chat provider is not configured: {0} is missing")]
    NotConfigured(&'static str),

    #[error("Invalid prompt: {0}")]
    InvalidPrompt(#[from] PromptError),

    #[error("Chat provider did not respond within {0} seconds")]
    Timeout(u64),

    #[error("Failed to reach chat provider: {0}")]
    Transport(String),

    #[error("Chat provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Chat provider response could not be decoded: {0}")]
    Decode(String),

    #[error("Chat provider returned no completion")]
    EmptyCompletion,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of a single chat-completion call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl Completion {
    /// Primary text content, empty when the provider returned none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn into_text(self) -> String {
        self.content.unwrap_or_default()
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Submit a fully assembled prompt and wait for the completion.
    async fn complete(&self, prompt: &Prompt) -> Result<Completion, ChatClientError>;

    /// Send plain user text with client defaults and return the completion text.
    async fn call_user(&self, text: &str) -> Result<String, ChatClientError> {
        let prompt = Prompt::user(text)?;
        Ok(self.complete(&prompt).await?.into_text())
    }
}
