#[cfg(test)]
mod tests;

use std::fmt::{self, Display};
use std::sync::Arc;

use memprobe_model::{ModelProvider, ModelProviderError};
use serde_json::{Map, Value};

use crate::conversation::Conversation;
use crate::model_client::{ModelClient, ModelClientResponse, StreamEvent};
use crate::paths::{self, ParseError};
use crate::prompts;
use crate::tool::{
    self, FILE_PATH_ARG, FILE_SIZE_TOOL, SCRIPT_CONTENTS_TOOL, ToolSession,
};

/// A failure while processing one query.
///
/// Every variant is scoped to the query it occurred in; the session and
/// the model client stay usable for subsequent queries.
#[derive(Debug)]
pub enum QueryError {
    /// The model endpoint failed or the stream broke.
    Model(Box<dyn ModelProviderError>),
    /// A tool invocation failed.
    Tool(tool::Error),
    /// The file-enumeration answer was not a valid list of strings.
    ParsePaths(ParseError),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Model(err) => write!(f, "model request failed: {err}"),
            QueryError::Tool(err) => write!(f, "tool call failed: {err}"),
            QueryError::ParsePaths(err) => {
                write!(f, "failed to parse the file path list: {err}")
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Model(err) => Some(err.as_ref()),
            QueryError::Tool(err) => Some(err),
            QueryError::ParsePaths(err) => Some(err),
        }
    }
}

impl From<ParseError> for QueryError {
    #[inline]
    fn from(err: ParseError) -> Self {
        QueryError::ParsePaths(err)
    }
}

/// The two-phase memory-estimation driver.
///
/// Each call to [`process_query`](Estimator::process_query) starts a
/// fresh conversation and runs it to completion: one script-content
/// tool call, one completion enumerating referenced files, one size
/// tool call per file, and one completion producing the estimate.
pub struct Estimator<S> {
    model: ModelClient,
    session: S,
    target_script: String,
}

impl<S: ToolSession> Estimator<S> {
    /// Creates an estimator over a model provider and a tool session.
    ///
    /// `target_script` is the path handed to the content tool in phase
    /// one. The query text itself never selects the analyzed file.
    pub fn new<P: ModelProvider + 'static>(
        provider: P,
        session: S,
        target_script: impl Into<String>,
    ) -> Self {
        Self {
            model: ModelClient::new(provider),
            session,
            target_script: target_script.into(),
        }
    }

    /// Consumes the estimator and returns the tool session for
    /// teardown.
    #[inline]
    pub fn into_session(self) -> S {
        self.session
    }

    /// Processes one query and returns the final estimate text.
    ///
    /// `on_event` observes the streamed completion of both phases in
    /// order.
    pub async fn process_query(
        &self,
        query: &str,
        on_event: impl Fn(StreamEvent) + Send + Sync + 'static,
    ) -> Result<String, QueryError> {
        let on_event = Arc::new(on_event);
        let mut conversation = Conversation::default();
        conversation.push_user(prompts::initial_message(query));

        // Phase 1: fetch the target script and ask the model to
        // enumerate every file it pulls in at runtime.
        debug!(target_script = %self.target_script, "starting file discovery");
        let contents = self
            .call_tool(SCRIPT_CONTENTS_TOOL, &self.target_script)
            .await?;
        conversation.push_assistant(prompts::discovery_message(&contents));
        let discovery = self
            .complete(&conversation, Arc::clone(&on_event))
            .await?;
        let discovered = paths::parse_path_list(&discovery.answer)?;
        debug!(files = discovered.len(), "file discovery finished");

        // Phase 2: size every discovered file, in discovery order, and
        // ask for the estimate.
        let mut sizes = Vec::with_capacity(discovered.len());
        for path in &discovered {
            let size = self.call_tool(FILE_SIZE_TOOL, path).await?;
            sizes.push((path.clone(), size));
        }
        conversation.push_assistant(prompts::estimate_message(
            &render_size_map(&sizes),
        ));
        let estimate = self.complete(&conversation, on_event).await?;
        Ok(estimate.answer)
    }

    async fn call_tool(
        &self,
        name: &str,
        file_path: &str,
    ) -> Result<String, QueryError> {
        let mut arguments = Map::new();
        arguments.insert(
            FILE_PATH_ARG.to_owned(),
            Value::String(file_path.to_owned()),
        );
        self.session
            .call_tool(name, arguments)
            .await
            .map_err(QueryError::Tool)
    }

    async fn complete<F: Fn(StreamEvent) + Send + Sync + 'static>(
        &self,
        conversation: &Conversation,
        on_event: Arc<F>,
    ) -> Result<ModelClientResponse, QueryError> {
        self.model
            .send_request(conversation.to_request(), move |event| {
                on_event(event)
            })
            .await
            .map_err(QueryError::Model)
    }
}

/// Renders the ordered size pairs as a map literal for the estimation
/// prompt, preserving discovery order.
fn render_size_map(sizes: &[(String, String)]) -> String {
    let mut rendered = String::from("{");
    for (idx, (path, size)) in sizes.iter().enumerate() {
        if idx > 0 {
            rendered.push_str(", ");
        }
        rendered.push_str(&format!("{path:?}: {size:?}"));
    }
    rendered.push('}');
    rendered
}
