//! OpenRouter streaming provider
//!
//! One HTTP request per call. The buffered path parses a whole chat
//! completion body; the streaming path hands the response body to a
//! detached producing task that decodes SSE lines into fragments. A
//! non-success status is reported synchronously before any channel exists.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::sse::parse_sse_line;
use super::stream::{relay_channel, Fragment, FragmentReceiver};
use super::{LlmError, LlmProvider};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "gryphe/mythomax-l2-13b";

/// Whole-request timeout, sized for slow streamed generations.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenRouter-specific configuration
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// API key (required)
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Endpoint override (default: the public chat completions URL)
    pub base_url: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
        }
    }
}

pub struct OpenRouterProvider {
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterProvider {
    /// Create a provider. Fails when the API key is empty.
    pub fn new(config: OpenRouterConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { config, client })
    }

    fn url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OPENROUTER_API_URL)
    }

    fn build_request(&self, prompt: &str, stream: bool) -> Value {
        json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": stream,
        })
    }

    /// Send the request and fail on a non-success status, with the response
    /// body folded into the error.
    async fn send(&self, body: &Value) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(self.url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "http://localhost/llmagent")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider(format!("{status}: {error_text}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn get_response(&self, prompt: &str) -> Result<String, LlmError> {
        if prompt.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        let body = self.build_request(prompt, false);
        let response = self.send(&body).await?;
        let payload: Value = response.json().await?;

        Ok(payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string())
    }

    async fn stream(&self, prompt: &str) -> Result<FragmentReceiver, LlmError> {
        if prompt.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        let body = self.build_request(prompt, true);
        let response = self.send(&body).await?;

        let (tx, rx) = relay_channel();

        // The producing task owns the connection; the response body is
        // dropped (and the connection released) on every exit path.
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            loop {
                if tx.is_closed() {
                    debug!("consumer dropped the relay channel, stopping stream read");
                    return;
                }

                let Some(chunk_result) = stream.next().await else {
                    break;
                };

                match chunk_result {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));

                        while let Some(newline_pos) = buffer.find('\n') {
                            let line = buffer[..newline_pos].to_string();
                            buffer = buffer[newline_pos + 1..].to_string();

                            for fragment in parse_sse_line(&line) {
                                let terminal = fragment.is_terminal();
                                if tx.send(fragment).await.is_err() {
                                    return; // receiver dropped
                                }
                                if terminal {
                                    return;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!("stream read failed: {e}");
                        let _ = tx
                            .send(Fragment::Error(format!("failed to read stream: {e}")))
                            .await;
                        return;
                    }
                }
            }

            // Upstream closed the body without [DONE].
            let _ = tx.send(Fragment::Done).await;
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{drain, DrainState};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server_uri: &str) -> OpenRouterProvider {
        OpenRouterProvider::new(OpenRouterConfig {
            api_key: "test-key".to_string(),
            base_url: Some(format!("{server_uri}/chat/completions")),
            ..Default::default()
        })
        .unwrap()
    }

    async fn mount_sse(server: &MockServer, body: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream"),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let result = OpenRouterProvider::new(OpenRouterConfig::default());
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    async fn empty_prompt_fails_without_a_request() {
        // Nothing listens on this address; an attempted request would error
        // differently than the validation we expect.
        let provider = provider_for("http://127.0.0.1:1");
        assert!(matches!(
            provider.stream("").await,
            Err(LlmError::EmptyPrompt)
        ));
        assert!(matches!(
            provider.get_response("").await,
            Err(LlmError::EmptyPrompt)
        ));
    }

    #[tokio::test]
    async fn streams_deltas_until_done() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n",
            "\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":null}]}\n",
            "\n",
            "data: [DONE]\n",
            "\n",
        );
        mount_sse(&server, body).await;

        let provider = provider_for(&server.uri());
        let rx = provider.stream("hi").await.unwrap();
        let aggregate = drain(rx).await;

        assert_eq!(aggregate.state(), DrainState::Succeeded);
        assert_eq!(aggregate.content(), "Hello");
    }

    #[tokio::test]
    async fn finish_reason_terminates_the_stream() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"done\"},\"finish_reason\":\"stop\"}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"never relayed\"},\"finish_reason\":null}]}\n",
        );
        mount_sse(&server, body).await;

        let provider = provider_for(&server.uri());
        let rx = provider.stream("hi").await.unwrap();
        let aggregate = drain(rx).await;

        assert_eq!(aggregate.state(), DrainState::Succeeded);
        assert_eq!(aggregate.content(), "done");
    }

    #[tokio::test]
    async fn malformed_payload_yields_exactly_one_error_fragment() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"},\"finish_reason\":null}]}\n",
            "data: {broken\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"after\"},\"finish_reason\":null}]}\n",
        );
        mount_sse(&server, body).await;

        let provider = provider_for(&server.uri());
        let mut rx = provider.stream("hi").await.unwrap();

        assert_eq!(rx.recv().await, Some(Fragment::Content("ok".to_string())));
        assert!(matches!(rx.recv().await, Some(Fragment::Error(_))));
        // The producing task stops after the error; the channel closes.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn non_success_status_is_a_synchronous_setup_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(402).set_body_string("payment required"))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        match provider.stream("hi").await {
            Err(LlmError::Provider(message)) => {
                assert!(message.contains("402"));
                assert!(message.contains("payment required"));
            }
            other => panic!("expected setup error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn eof_without_done_ends_the_stream_cleanly() {
        let server = MockServer::start().await;
        let body =
            "data: {\"choices\":[{\"delta\":{\"content\":\"cut off\"},\"finish_reason\":null}]}\n";
        mount_sse(&server, body).await;

        let provider = provider_for(&server.uri());
        let rx = provider.stream("hi").await.unwrap();
        let aggregate = drain(rx).await;

        assert_eq!(aggregate.state(), DrainState::Succeeded);
        assert_eq!(aggregate.content(), "cut off");
    }

    #[tokio::test]
    async fn buffered_call_parses_the_whole_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "whole answer" } }]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let content = provider.get_response("hi").await.unwrap();
        assert_eq!(content, "whole answer");
    }
}
