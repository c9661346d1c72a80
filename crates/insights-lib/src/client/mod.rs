//! Clients for the remote collaborators
//!
//! - JSON-over-HTTP client shared by the adapters
//! - Prediction / anomaly / recommendation backends
//! - Chat-completion backend

mod chat;
mod http;
mod prediction;

pub use chat::{ChatClient, ChatConfig, OpenAiChatClient};
pub use http::JsonClient;
pub use prediction::{BackendConfig, HttpPredictionBackend, PredictionBackend};
