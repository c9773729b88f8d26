//! Course Assistant LLM
//!
//! Model service types, the `LlmProvider` trait, and the Anthropic Messages
//! API provider. Also includes the HTTP client factory.

pub mod anthropic;
pub mod http_client;
pub mod provider;
pub mod types;

// Re-export main types
pub use anthropic::{AnthropicProvider, ANTHROPIC_API_URL};
pub use http_client::build_http_client;
pub use provider::LlmProvider;
pub use types::*;
