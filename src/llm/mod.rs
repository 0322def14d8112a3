//! LLM provider abstraction and streaming relay
//!
//! Providers produce a sequence of [`Fragment`]s over a relay channel; the
//! consumers (console, HTTP, interactive shell) drain that channel through
//! the shared [`Aggregate`] state machine. Setup failures surface as
//! synchronous [`LlmError`]s before any channel exists; failures after
//! streaming begins travel through the channel as error fragments.

mod drain;
mod mock;
mod openrouter;
mod sse;
mod stream;

pub use drain::{drain, Aggregate, DrainState};
pub use mock::MockProvider;
pub use openrouter::{OpenRouterConfig, OpenRouterProvider};
pub use stream::{relay_channel, Fragment, FragmentReceiver, FRAGMENT_BUFFER};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("API key cannot be empty")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for LLM providers.
///
/// Consumers always speak the streaming shape. A provider that can only
/// produce whole responses implements `get_response` and inherits `stream`,
/// which relays the buffered response as one content fragment followed by
/// the terminal sentinel.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a prompt and wait for the complete response.
    async fn get_response(&self, prompt: &str) -> Result<String, LlmError>;

    /// Send a prompt and stream the response over a relay channel.
    ///
    /// Streaming providers return once the request is set up, with all
    /// network reads happening in a detached producing task. Every stream
    /// ends in a terminal fragment or channel closure; a consumer that
    /// drops the receiver early is observed by the producer, which then
    /// stops instead of blocking on an unread channel.
    async fn stream(&self, prompt: &str) -> Result<FragmentReceiver, LlmError> {
        if prompt.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }
        let content = self.get_response(prompt).await?;
        let (tx, rx) = relay_channel();
        tokio::spawn(async move {
            if !content.is_empty() && tx.send(Fragment::Content(content)).await.is_err() {
                return;
            }
            let _ = tx.send(Fragment::Done).await;
        });
        Ok(rx)
    }
}
