use std::pin::Pin;
use std::task::{Context, Poll, ready};

use memprobe_model::{ErrorKind, ModelResponse, ModelResponseEvent};
use pin_project_lite::pin_project;

use crate::Error;
use crate::io::Sse;
use crate::proto::ChatCompletionChunk;

struct PartialState {
    sse: Sse,
    id: Option<String>,
    // A single chunk may carry both reasoning and answer text. The
    // reasoning fragment is delivered first and the answer fragment is
    // parked here until the next `poll_next_event` call.
    pending_answer: Option<String>,
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl OpenAIResponse {
    #[inline]
    pub fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            id: None,
            pending_answer: None,
        };
        let next_event_fut = async move { next_event(partial_state).await };
        Self {
            next_event_fut: Some(Box::pin(next_event_fut)),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            // The stream has been exhausted.
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, _)) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        // The stream may still have more data to pull, create a new future for
        // the next event.
        let next_event_fut = async move { next_event(partial_state).await };
        *this.next_event_fut = Some(Box::pin(next_event_fut));

        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(mut partial_state: PartialState) -> NextEvent {
    if let Some(content) = partial_state.pending_answer.take() {
        return Ok((
            Some(ModelResponseEvent::AnswerDelta(content)),
            partial_state,
        ));
    }

    loop {
        let sse_event = match partial_state.sse.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => return Ok((None, partial_state)),
            Err(err) => {
                return Err(Error::new(format!("{err:?}"), ErrorKind::Other));
            }
        };
        trace!("got sse event: {sse_event}");
        if sse_event == "[DONE]" {
            return Ok((None, partial_state));
        }

        let mut chunk = serde_json::from_str::<ChatCompletionChunk>(&sse_event)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        if partial_state.id.get_or_insert_with(|| chunk.id.clone()) != &chunk.id
        {
            return Err(Error::new("chunk id mismatch", ErrorKind::Other));
        };

        let Some(choice) = chunk.choices.pop() else {
            // When no further choices remain, the chunk carries the
            // usage accounting for the whole exchange.
            if let Some(usage) = chunk.usage {
                return Ok((
                    Some(ModelResponseEvent::Usage(usage.into())),
                    partial_state,
                ));
            }
            continue;
        };

        if let Some(finish_reason) = choice.finish_reason {
            trace!("response finished: {finish_reason}");
            continue;
        }

        let reasoning = choice
            .delta
            .reasoning_content
            .filter(|text| !text.is_empty());
        let content = choice.delta.content.filter(|text| !text.is_empty());
        match (reasoning, content) {
            (Some(reasoning), content) => {
                partial_state.pending_answer = content;
                return Ok((
                    Some(ModelResponseEvent::ReasoningDelta(reasoning)),
                    partial_state,
                ));
            }
            (None, Some(content)) => {
                return Ok((
                    Some(ModelResponseEvent::AnswerDelta(content)),
                    partial_state,
                ));
            }
            (None, None) => continue,
        }
    }
}
