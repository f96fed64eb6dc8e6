use std::fmt::{self, Display};
use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};

use crate::provider::ModelProviderError;

/// A response from the model provider.
pub trait ModelResponse: Sized + Send + 'static {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Attempts to pull out the next event from the response.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct response state:
    ///
    /// - `Poll::Pending` means that this response is still waiting for
    ///   the next event. Implementations will ensure that the current
    ///   task will be notified when the next event may be ready.
    /// - `Poll::Ready(Ok(Some(event)))` means the response has an event
    ///   to deliver, and may produce further events on subsequent
    ///   `poll_next_event` calls.
    /// - `Poll::Ready(Ok(None))` means the response has completed.
    /// - `Poll::Ready(Err(error))` means an error occurred while
    ///   processing the response.
    ///
    /// Calling this method after completion should always return `None`.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>>;
}

/// The event from a model response.
///
/// The kind of every incoming chunk is decided once, at the transport
/// boundary: a chunk either carries model-internal reasoning text, a
/// fragment of the answer text, or the terminal usage accounting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelResponseEvent {
    /// Received a fragment of the model's deliberation text.
    ReasoningDelta(String),
    /// Received a fragment of the answer text.
    AnswerDelta(String),
    /// Received the terminal usage accounting.
    Usage(ModelUsage),
}

/// Token accounting reported on the terminal chunk of a response.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct ModelUsage {
    /// Tokens consumed by the input messages.
    pub prompt_tokens: u64,
    /// Tokens generated by the model.
    pub completion_tokens: u64,
    /// Total tokens billed for the exchange.
    pub total_tokens: u64,
}

impl Display for ModelUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prompt tokens: {}, completion tokens: {}, total tokens: {}",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}
