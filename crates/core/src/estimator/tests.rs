use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use memprobe_test_model::{PresetEvent, PresetResponse, TestModelProvider};
use serde_json::{Map, Value};

use super::*;

/// A scripted tool session that records every invocation.
#[derive(Clone, Default)]
struct RecordingSession {
    calls: Arc<Mutex<Vec<(String, String)>>>,
    missing: Vec<String>,
}

impl RecordingSession {
    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolSession for RecordingSession {
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, tool::Error> {
        let path = arguments
            .get(FILE_PATH_ARG)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                tool::Error::invalid_input().with_reason("missing file_path")
            })?
            .to_owned();
        self.calls
            .lock()
            .unwrap()
            .push((name.to_owned(), path.clone()));
        match name {
            SCRIPT_CONTENTS_TOOL => {
                Ok("<pre><code>import numpy\n</code></pre>".to_owned())
            }
            FILE_SIZE_TOOL => {
                if self.missing.contains(&path) {
                    Ok("File not found".to_owned())
                } else {
                    Ok(format!("File size: {} MB", 0.5))
                }
            }
            _ => Err(tool::Error::invalid_input().with_reason("unknown tool")),
        }
    }
}

/// Scripts the fake model for one full two-phase query: two context
/// positions (initial user message + discovery message), the discovery
/// response, one more context position (estimate message), then the
/// estimate response.
fn scripted_provider(
    discovery: PresetResponse,
    estimate: PresetResponse,
) -> TestModelProvider {
    let mut provider = TestModelProvider::default();
    provider.add_context_step();
    provider.add_context_step();
    provider.add_assistant_response_step(discovery);
    provider.add_assistant_response_step(estimate);
    provider
}

#[tokio::test]
async fn test_two_phase_query() {
    let provider = scripted_provider(
        PresetResponse::with_events([
            PresetEvent::ReasoningDelta("Two files referenced.".to_owned()),
            PresetEvent::AnswerDelta("['a.py'".to_owned()),
            PresetEvent::AnswerDelta(", 'b.py']".to_owned()),
        ]),
        PresetResponse::with_answer("Expected peak memory: around 120 MB."),
    );
    let session = RecordingSession::default();
    let estimator = Estimator::new(provider, session.clone(), "train.py");

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let on_event = move |event| sink.lock().unwrap().push(event);
    let answer = estimator
        .process_query("how much memory does this need?", on_event)
        .await
        .unwrap();

    assert_eq!(answer, "Expected peak memory: around 120 MB.");
    assert!(!answer.is_empty());

    // Exactly one content call followed by one size call per discovered
    // path, in discovery order.
    assert_eq!(
        session.calls(),
        vec![
            (SCRIPT_CONTENTS_TOOL.to_owned(), "train.py".to_owned()),
            (FILE_SIZE_TOOL.to_owned(), "a.py".to_owned()),
            (FILE_SIZE_TOOL.to_owned(), "b.py".to_owned()),
        ]
    );

    // Both phases streamed: reasoning first, then one answer banner per
    // completion.
    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            StreamEvent::Reasoning("Two files referenced.".to_owned()),
            StreamEvent::AnswerStart,
            StreamEvent::Answer("['a.py'".to_owned()),
            StreamEvent::Answer(", 'b.py']".to_owned()),
            StreamEvent::AnswerStart,
            StreamEvent::Answer(
                "Expected peak memory: around 120 MB.".to_owned()
            ),
        ]
    );
}

#[tokio::test]
async fn test_unparsable_discovery_answer() {
    let provider = scripted_provider(
        PresetResponse::with_answer("The script mainly needs a.py and b.py."),
        PresetResponse::with_answer("never reached"),
    );
    let session = RecordingSession::default();
    let estimator = Estimator::new(provider, session.clone(), "train.py");

    let err = estimator.process_query("estimate", |_| {}).await.unwrap_err();
    assert!(matches!(err, QueryError::ParsePaths(_)));

    // Phase 2 never ran.
    assert_eq!(
        session.calls(),
        vec![(SCRIPT_CONTENTS_TOOL.to_owned(), "train.py".to_owned())]
    );
}

#[tokio::test]
async fn test_empty_discovery_list() {
    let provider = scripted_provider(
        PresetResponse::with_answer("[]"),
        PresetResponse::with_answer("Nothing to load; interpreter overhead only."),
    );
    let session = RecordingSession::default();
    let estimator = Estimator::new(provider, session.clone(), "empty.py");

    let answer = estimator.process_query("estimate", |_| {}).await.unwrap();
    assert_eq!(answer, "Nothing to load; interpreter overhead only.");
    assert_eq!(
        session.calls(),
        vec![(SCRIPT_CONTENTS_TOOL.to_owned(), "empty.py".to_owned())]
    );
}

#[tokio::test]
async fn test_missing_file_sentinel_is_not_an_error() {
    let provider = scripted_provider(
        PresetResponse::with_answer("['gone.csv']"),
        PresetResponse::with_answer("Baseline only."),
    );
    let session = RecordingSession {
        missing: vec!["gone.csv".to_owned()],
        ..Default::default()
    };
    let estimator = Estimator::new(provider, session.clone(), "train.py");

    // The sentinel size report flows into phase 2 as a normal result.
    let answer = estimator.process_query("estimate", |_| {}).await.unwrap();
    assert_eq!(answer, "Baseline only.");
    assert_eq!(session.calls().len(), 2);
}

#[test]
fn test_render_size_map_preserves_order() {
    let rendered = render_size_map(&[
        ("b.py".to_owned(), "File size: 1 MB".to_owned()),
        ("a.py".to_owned(), "File not found".to_owned()),
    ]);
    assert_eq!(
        rendered,
        r#"{"b.py": "File size: 1 MB", "a.py": "File not found"}"#
    );
}
