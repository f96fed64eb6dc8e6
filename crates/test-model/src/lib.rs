//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use memprobe_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
    ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    provider: TestModelProvider,
    request: ModelRequest,
    event_idx: usize,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let step_idx = self.request.messages.len();
        if step_idx >= self.provider.conversation_script.len() {
            return Poll::Ready(Err(Error {
                message: "no enough steps",
                kind: ErrorKind::RateLimitExceeded,
            }));
        }

        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        let step = &this.provider.conversation_script[step_idx];
        let preset_events = match step {
            ConversationStep::Context => {
                return Poll::Ready(Err(Error {
                    message: "not an assistant response step",
                    kind: ErrorKind::Moderated,
                }));
            }
            ConversationStep::AssistantResponse(response) => &response.events,
        };

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if this.event_idx < preset_events.len() {
                let event = match &preset_events[this.event_idx] {
                    PresetEvent::ReasoningDelta(text) => {
                        ModelResponseEvent::ReasoningDelta(text.clone())
                    }
                    PresetEvent::AnswerDelta(text) => {
                        ModelResponseEvent::AnswerDelta(text.clone())
                    }
                    PresetEvent::Usage(usage) => {
                        ModelResponseEvent::Usage(*usage)
                    }
                };
                this.event_idx += 1;
                return Poll::Ready(Ok(Some(event)));
            }

            // In case this method is called after completion.
            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(
            this.provider.delay.unwrap_or(Duration::from_millis(1)),
        )));
        Pin::new(this).poll_next_event(cx)
    }
}

#[derive(Clone)]
enum ConversationStep {
    Context,
    AssistantResponse(PresetResponse),
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the conversation script, which
/// is how the model should respond to a request. The added steps will be
/// selected according to the history messages in your request. If there are no
/// enough steps in the script, an error will be returned.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    conversation_script: Vec<ConversationStep>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Adds a scripted model response. It answers the request whose
    /// history length equals the number of steps added before it.
    #[inline]
    pub fn add_assistant_response_step(&mut self, preset: PresetResponse) {
        self.conversation_script
            .push(ConversationStep::AssistantResponse(preset));
    }

    /// Adds a placeholder for one history message (user text or an
    /// assistant message built by the caller).
    #[inline]
    pub fn add_context_step(&mut self) {
        self.conversation_script.push(ConversationStep::Context);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let resp = TestModelResponse {
            provider: self.clone(),
            request: req.clone(),
            event_idx: 0,
            sleep: None,
        };
        ready(Ok(resp))
    }
}
