use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use memprobe_model::{
    ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
    ModelResponseEvent, ModelUsage,
};
use tracing::Instrument;

type SendRequestResult =
    Result<ModelClientResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(ModelRequest, Box<dyn Fn(StreamEvent) + Send + 'static>)
        -> BoxedSendRequestFuture + Send + Sync
>;

/// An observable moment in a streamed completion.
///
/// Events are delivered strictly in stream order, one fully processed
/// before the next is requested. `AnswerStart` fires exactly once per
/// completion, before the first answer fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of the model's deliberation text.
    Reasoning(String),
    /// The first answer fragment is about to be delivered.
    AnswerStart,
    /// A fragment of the answer text.
    Answer(String),
    /// The terminal usage accounting.
    Usage(ModelUsage),
}

/// A wrapper around a model provider that maintains an execution
/// environment for the provider and provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req, on_event| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let resp_or_err = fut.await;
                    handle_response::<P>(resp_or_err, on_event).await
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and drives the streamed response to completion,
    /// forwarding every event to `on_event` as it arrives.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The response stops streaming further
    /// events when this operation is cancelled.
    #[inline]
    pub async fn send_request(
        &self,
        req: ModelRequest,
        on_event: impl Fn(StreamEvent) + Send + 'static,
    ) -> Result<ModelClientResponse, Box<dyn ModelProviderError>> {
        (self.handler_fn)(req, Box::new(on_event)).await
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug)]
pub struct ModelClientResponse {
    /// The accumulated answer text.
    pub answer: String,
    /// Usage accounting from the terminal chunk, if the endpoint
    /// reported one.
    pub usage: Option<ModelUsage>,
}

async fn handle_response<P: ModelProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
    on_event: Box<dyn Fn(StreamEvent) + Send + 'static>,
) -> SendRequestResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("got an error: {err:?}");
            return Err(Box::new(err));
        }
    };

    let mut answer = String::new();
    let mut usage = None;
    let mut answer_started = false;

    trace!("start receiving events");

    let mut pinned_resp = pin!(resp);
    loop {
        let event_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_event(cx)).await;
        let event = match event_or_err {
            Ok(event) => event,
            Err(err) => {
                error!("got an error: {err:?}");
                return Err(Box::new(err));
            }
        };

        let Some(event) = event else {
            break;
        };
        trace!("got an event: {event:?}");

        match event {
            ModelResponseEvent::ReasoningDelta(text) => {
                on_event(StreamEvent::Reasoning(text));
            }
            ModelResponseEvent::AnswerDelta(text) => {
                if !answer_started {
                    answer_started = true;
                    on_event(StreamEvent::AnswerStart);
                }
                answer.push_str(&text);
                on_event(StreamEvent::Answer(text));
            }
            ModelResponseEvent::Usage(stats) => {
                usage = Some(stats);
                on_event(StreamEvent::Usage(stats));
            }
        }
    }

    trace!("finished a request");

    Ok(ModelClientResponse { answer, usage })
}
