//! HTTP server exposing the chat proxy.
//!
//! - [`chat_api`]: Router and route handlers
//! - [`error`]: Error-to-response mapping
//! - [`health`]: Configuration-presence health report

pub mod chat_api;
pub mod error;
pub mod health;
