//! Offline mock provider for exercising consumers without network access

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

use super::stream::{relay_channel, Fragment, FragmentReceiver};
use super::{LlmError, LlmProvider};

/// Deterministic provider that replays a scripted fragment sequence.
///
/// With no script configured, every call emits the same 3-part canned
/// response followed by the terminal sentinel. The script is cloned per
/// call, so repeated invocations with the same prompt produce identical
/// streams.
pub struct MockProvider {
    script: Option<Vec<Fragment>>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: None,
            delay: None,
        }
    }

    /// Replace the canned response with an explicit fragment sequence.
    ///
    /// A script without a terminal fragment ends with the channel simply
    /// closing, which consumers treat as a clean end of stream.
    pub fn with_script(mut self, script: Vec<Fragment>) -> Self {
        self.script = Some(script);
        self
    }

    /// Delay each fragment, simulating provider latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn script_for(&self, prompt: &str) -> Vec<Fragment> {
        match &self.script {
            Some(script) => script.clone(),
            None => vec![
                Fragment::Content("This is a mock ".to_string()),
                Fragment::Content("response for: ".to_string()),
                Fragment::Content(format!("'{prompt}'")),
                Fragment::Done,
            ],
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn get_response(&self, prompt: &str) -> Result<String, LlmError> {
        if prompt.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }
        let mut content = String::new();
        for fragment in self.script_for(prompt) {
            match fragment {
                Fragment::Content(text) => content.push_str(&text),
                Fragment::Done => break,
                Fragment::Error(message) => return Err(LlmError::Stream(message)),
            }
        }
        Ok(content)
    }

    async fn stream(&self, prompt: &str) -> Result<FragmentReceiver, LlmError> {
        if prompt.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        let script = self.script_for(prompt);
        let delay = self.delay;
        let (tx, rx) = relay_channel();

        tokio::spawn(async move {
            for fragment in script {
                if let Some(delay) = delay {
                    sleep(delay).await;
                }
                let terminal = fragment.is_terminal();
                if tx.send(fragment).await.is_err() {
                    return; // receiver dropped
                }
                if terminal {
                    return;
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{drain, DrainState};

    #[tokio::test]
    async fn canned_response_ends_with_the_sentinel() {
        let provider = MockProvider::new();
        let mut rx = provider.stream("why?").await.unwrap();

        let mut fragments = Vec::new();
        while let Some(fragment) = rx.recv().await {
            fragments.push(fragment);
        }

        assert_eq!(fragments.len(), 4);
        assert_eq!(fragments.last(), Some(&Fragment::Done));
        assert!(fragments[..3].iter().all(|f| !f.is_terminal()));
    }

    #[tokio::test]
    async fn repeated_calls_stream_identically() {
        let provider = MockProvider::new();

        let first = drain(provider.stream("same prompt").await.unwrap()).await;
        let second = drain(provider.stream("same prompt").await.unwrap()).await;

        assert_eq!(first.state(), DrainState::Succeeded);
        assert_eq!(second.state(), DrainState::Succeeded);
        assert_eq!(first.content(), second.content());
    }

    #[tokio::test]
    async fn scripted_error_stops_the_stream() {
        let provider = MockProvider::new().with_script(vec![
            Fragment::Content("partial".to_string()),
            Fragment::Error("scripted failure".to_string()),
            Fragment::Content("never sent".to_string()),
        ]);

        let aggregate = drain(provider.stream("x").await.unwrap()).await;
        assert_eq!(aggregate.state(), DrainState::Failed);
        assert_eq!(aggregate.error(), Some("scripted failure"));
        assert_eq!(aggregate.content(), "partial");
    }

    #[tokio::test]
    async fn script_without_terminal_closes_the_channel() {
        let provider = MockProvider::new().with_script(vec![
            Fragment::Content("a".to_string()),
            Fragment::Content("b".to_string()),
        ]);

        let aggregate = drain(provider.stream("x").await.unwrap()).await;
        assert_eq!(aggregate.state(), DrainState::Succeeded);
        assert_eq!(aggregate.content(), "ab");
    }

    #[tokio::test]
    async fn delay_spaces_out_fragments() {
        let provider = MockProvider::new().with_delay(Duration::from_millis(5));

        let aggregate = drain(provider.stream("slow").await.unwrap()).await;
        assert_eq!(aggregate.state(), DrainState::Succeeded);
        assert_eq!(aggregate.content(), "This is a mock response for: 'slow'");
    }

    #[tokio::test]
    async fn buffered_call_folds_the_script() {
        let provider = MockProvider::new();
        let content = provider.get_response("why?").await.unwrap();
        assert_eq!(content, "This is a mock response for: 'why?'");
    }

    #[tokio::test]
    async fn buffered_call_surfaces_a_scripted_error() {
        let provider = MockProvider::new().with_script(vec![
            Fragment::Content("partial".to_string()),
            Fragment::Error("boom".to_string()),
        ]);

        assert!(matches!(
            provider.get_response("x").await,
            Err(LlmError::Stream(_))
        ));
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected() {
        let provider = MockProvider::new();
        assert!(matches!(
            provider.stream("").await,
            Err(LlmError::EmptyPrompt)
        ));
        assert!(matches!(
            provider.get_response("").await,
            Err(LlmError::EmptyPrompt)
        ));
    }
}
