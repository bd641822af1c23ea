//! azure-chat-proxy: a small HTTP façade over Azure OpenAI chat completions.
//!
//! Accepts plain-text or structured chat requests, assembles a single
//! system + user prompt, forwards it to the configured deployment and
//! returns the completion text. A health endpoint reports which provider
//! settings are present.

pub mod client;
pub mod config;
pub mod prompt;
pub mod server;
