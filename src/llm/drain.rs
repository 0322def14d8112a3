//! Consumer-side drain loop for relay channels
//!
//! Every consumer reads its relay channel through the same small state
//! machine: observe fragments while `Draining`, settle into `Succeeded` or
//! `Failed`, and never move again. A channel that closes without a terminal
//! fragment counts as success with no trailing content.

use super::stream::{Fragment, FragmentReceiver};

/// Where a consumer is in reading one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    /// Still reading fragments.
    Draining,
    /// Terminal fragment or clean closure observed.
    Succeeded,
    /// An error fragment was observed.
    Failed,
}

/// Accumulates one stream's content and tracks the drain state.
///
/// Content is the ordered concatenation of every `Content` fragment seen.
/// The first error observed wins; content gathered before it is kept.
#[derive(Debug)]
pub struct Aggregate {
    content: String,
    error: Option<String>,
    state: DrainState,
}

impl Aggregate {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            error: None,
            state: DrainState::Draining,
        }
    }

    /// Feed one channel observation: a received fragment, or `None` for
    /// channel closure. Returns the state after the transition. Terminal
    /// states are final; anything observed afterwards is ignored.
    pub fn observe(&mut self, fragment: Option<Fragment>) -> DrainState {
        if self.state != DrainState::Draining {
            return self.state;
        }
        match fragment {
            Some(Fragment::Content(text)) => self.content.push_str(&text),
            Some(Fragment::Done) => self.state = DrainState::Succeeded,
            Some(Fragment::Error(message)) => {
                self.error = Some(message);
                self.state = DrainState::Failed;
            }
            // Abrupt end: the producer went away without a terminal
            // fragment. Equivalent to success with no further content.
            None => self.state = DrainState::Succeeded,
        }
        self.state
    }

    pub fn state(&self) -> DrainState {
        self.state
    }

    pub fn is_settled(&self) -> bool {
        self.state != DrainState::Draining
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl Default for Aggregate {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a relay channel to completion and return the settled aggregate.
///
/// The receiver is dropped on return. The first terminal observation stops
/// the loop; producers notice the dropped receiver at their next send or
/// closed-channel check, so stopping early cannot strand them.
pub async fn drain(mut rx: FragmentReceiver) -> Aggregate {
    let mut aggregate = Aggregate::new();
    while !aggregate.is_settled() {
        aggregate.observe(rx.recv().await);
    }
    aggregate
}
