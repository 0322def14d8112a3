//! Fragment model and relay channel for streamed responses

use tokio::sync::mpsc;

/// Buffer size for relay channels.
pub const FRAGMENT_BUFFER: usize = 64;

/// One unit of a streamed response, or a stream control signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A partial piece of response text.
    Content(String),
    /// The stream completed successfully. No fragments follow.
    Done,
    /// The stream failed. No fragments follow; content received before this
    /// point is partial but valid.
    Error(String),
}

impl Fragment {
    /// Whether this fragment ends its stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Fragment::Done | Fragment::Error(_))
    }
}

/// Read side of a relay channel. Owned by exactly one consumer for the
/// lifetime of one request; dropping it signals abandonment to the producer.
pub type FragmentReceiver = mpsc::Receiver<Fragment>;

/// Create the relay channel for one stream: one producing task writes, one
/// consumer reads, and neither side is ever shared or reused.
pub fn relay_channel() -> (mpsc::Sender<Fragment>, FragmentReceiver) {
    mpsc::channel(FRAGMENT_BUFFER)
}
