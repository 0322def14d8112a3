//! llmagent - relay streamed LLM responses to multiple consumers
//!
//! One provider abstraction, three consumers. Providers emit
//! [`llm::Fragment`]s over a per-request relay channel; the console
//! printer, the MCP HTTP endpoint, and the interactive shell all read that
//! channel through the same drain state machine, so buffered and streaming
//! providers look identical at the consumer boundary.

pub mod config;
pub mod llm;
pub mod server;
pub mod tui;

pub use config::{Config, ConfigError};
pub use llm::{
    drain, Aggregate, DrainState, Fragment, FragmentReceiver, LlmError, LlmProvider, MockProvider,
    OpenRouterConfig, OpenRouterProvider,
};
pub use server::{McpRequest, McpResponse};
