use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use memprobe_model::{
    ErrorKind, ModelMessage, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ModelResponseEvent, ModelUsage,
};
use tokio::time::{Sleep, sleep};

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug)]
struct FakeModelResponse {
    fake_events: VecDeque<ModelResponseEvent>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl FakeModelResponse {
    fn new(input: &str) -> Self {
        let mut fake_events: VecDeque<_> = [
            ModelResponseEvent::ReasoningDelta(
                "The user greeted me.".to_string(),
            ),
            ModelResponseEvent::AnswerDelta("You said ".to_string()),
            ModelResponseEvent::AnswerDelta(input.to_string()),
        ]
        .into();
        fake_events.push_back(ModelResponseEvent::Usage(ModelUsage {
            prompt_tokens: input.len() as u64,
            completion_tokens: 2,
            total_tokens: input.len() as u64 + 2,
        }));
        Self {
            fake_events,
            sleep: None,
        }
    }
}

impl ModelResponse for FakeModelResponse {
    type Error = FakeModelProviderError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            return Poll::Ready(Ok(this.fake_events.pop_front()));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_event(cx)
    }
}

struct FakeModelProvider;

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;
    type Response = FakeModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let result = 'blk: {
            if req.messages.is_empty() {
                break 'blk Err(FakeModelProviderError(ErrorKind::Other));
            }

            let content = req.messages.first().map(|msg| match &msg {
                ModelMessage::User(text) => text.as_str(),
                _ => unreachable!("unexpected message: {msg:?}"),
            });

            Ok(FakeModelResponse::new(content.unwrap_or("")))
        };
        ready(result)
    }
}

mod tests {
    use std::future::poll_fn;

    use super::*;

    #[tokio::test]
    async fn test_completion() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![ModelMessage::User("Good morning".to_string())],
        };
        let mut resp = provider.send_request(&req).await.unwrap();

        let mut reasoning = String::new();
        let mut answer = String::new();
        let mut usage = None;
        loop {
            let resp_fut =
                poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx));
            match resp_fut.await {
                Ok(Some(event)) => match event {
                    ModelResponseEvent::ReasoningDelta(delta) => {
                        reasoning.push_str(&delta);
                    }
                    ModelResponseEvent::AnswerDelta(delta) => {
                        answer.push_str(&delta);
                    }
                    ModelResponseEvent::Usage(stats) => {
                        usage = Some(stats);
                    }
                },
                Ok(None) => break,
                Err(err) => unreachable!("unexpected error: {err:?}"),
            }
        }

        assert_eq!(reasoning, "The user greeted me.");
        assert_eq!(answer, "You said Good morning");
        assert_eq!(
            usage,
            Some(ModelUsage {
                prompt_tokens: 12,
                completion_tokens: 2,
                total_tokens: 14,
            })
        );
    }

    #[tokio::test]
    async fn test_error() {
        let provider = FakeModelProvider;
        let req = ModelRequest { messages: vec![] };
        let result = provider.send_request(&req).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
