use memprobe_model::ModelUsage;
use serde::{Deserialize, Serialize};

/// The events in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    #[serde(rename = "reasoning_delta")]
    ReasoningDelta(String),
    #[serde(rename = "answer_delta")]
    AnswerDelta(String),
    #[serde(rename = "usage")]
    Usage(ModelUsage),
}

/// The preset response for an assistant step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Events in this response.
    pub events: Vec<PresetEvent>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Creates a `PresetResponse` that answers with a single text
    /// fragment, which is the common case in orchestration tests.
    #[inline]
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            events: vec![PresetEvent::AnswerDelta(answer.into())],
        }
    }
}
