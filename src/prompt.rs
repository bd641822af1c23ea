//! Chat request model and prompt assembly.
//!
//! A [`Prompt`] is an optional system instruction, a mandatory user
//! instruction and a generation-options bag. Prompts are built per request
//! and never shared.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("message text is required and must not be empty")]
    MissingUserMessage,
}

/// Structured body accepted by the detailed chat endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub user_message: Option<String>,
    #[serde(default)]
    pub system_message: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn into_prompt(self) -> Result<Prompt, PromptError> {
        build_prompt(
            self.user_message.as_deref(),
            self.system_message.as_deref(),
            self.temperature,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Generation options sent alongside the messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Sampling temperature. `None` leaves the client default in effect.
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl Prompt {
    /// A prompt holding a single user instruction and default options.
    pub fn user(text: &str) -> Result<Self, PromptError> {
        build_prompt(Some(text), None, None)
    }

    pub fn system_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    pub fn user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Assemble a prompt from its parts.
///
/// The system instruction comes first when present and non-empty. A user
/// message that is missing or blank is rejected rather than forwarded.
pub fn build_prompt(
    user_message: Option<&str>,
    system_message: Option<&str>,
    temperature: Option<f32>,
) -> Result<Prompt, PromptError> {
    let user = match user_message {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(PromptError::MissingUserMessage),
    };

    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_message.filter(|s| !s.is_empty()) {
        messages.push(Message {
            role: Role::System,
            content: system.to_string(),
        });
    }
    messages.push(Message {
        role: Role::User,
        content: user.to_string(),
    });

    Ok(Prompt {
        messages,
        options: ChatOptions { temperature },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_only_prompt() {
        let prompt = build_prompt(Some("What is Rust?"), None, None).unwrap();
        assert_eq!(prompt.messages.len(), 1);
        assert_eq!(prompt.messages[0].role, Role::User);
        assert_eq!(prompt.messages[0].content, "What is Rust?");
        assert!(prompt.system_message().is_none());
        assert!(prompt.options.temperature.is_none());
    }

    #[test]
    fn test_system_message_comes_first() {
        let prompt = build_prompt(Some("hi"), Some("You are terse."), None).unwrap();
        let roles: Vec<Role> = prompt.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert_eq!(prompt.system_message(), Some("You are terse."));
        assert_eq!(prompt.user_message(), Some("hi"));
    }

    #[test]
    fn test_empty_system_message_is_dropped() {
        let prompt = build_prompt(Some("hi"), Some(""), None).unwrap();
        assert_eq!(prompt.messages.len(), 1);
        assert!(prompt.system_message().is_none());
    }

    #[test]
    fn test_temperature_is_carried_exactly() {
        for t in [0.0_f32, 0.35, 1.0, 1.7] {
            let prompt = build_prompt(Some("hi"), None, Some(t)).unwrap();
            assert_eq!(prompt.options.temperature, Some(t));
        }
    }

    #[test]
    fn test_missing_or_blank_user_message_rejected() {
        assert_eq!(
            build_prompt(None, Some("sys"), Some(0.2)),
            Err(PromptError::MissingUserMessage)
        );
        assert_eq!(
            build_prompt(Some(""), None, None),
            Err(PromptError::MissingUserMessage)
        );
        assert_eq!(
            build_prompt(Some(" \n\t"), None, None),
            Err(PromptError::MissingUserMessage)
        );
    }

    #[test]
    fn test_chat_request_deserializes_camel_case() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"userMessage": "Hello", "systemMessage": "Be kind", "temperature": 0.5}"#,
        )
        .unwrap();
        let prompt = req.into_prompt().unwrap();
        assert_eq!(prompt.system_message(), Some("Be kind"));
        assert_eq!(prompt.user_message(), Some("Hello"));
        assert_eq!(prompt.options.temperature, Some(0.5));
    }

    #[test]
    fn test_chat_request_without_user_message() {
        let req: ChatRequest = serde_json::from_str(r#"{"systemMessage": "x"}"#).unwrap();
        assert!(req.user_message.is_none());
        assert!(req.into_prompt().is_err());
    }
}
