//! Chat-completions client for the upstream LLM provider.
//!
//! Keep the public surface small: [`ChatClient`] for sending requests and
//! [`ChatRequestBuilder`] for assembling them.

pub mod chat;
pub mod core;

pub use chat::{ChatCompletion, ChatRequest, ChatRequestBuilder};
pub use core::ChatClient;
