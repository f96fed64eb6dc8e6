//! Tool call supports.

use std::borrow::Cow;
use std::fmt::{self, Display};

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Name of the tool that reads a script and renders it for the model.
pub const SCRIPT_CONTENTS_TOOL: &str = "get_script_contents";
/// Name of the tool that reports a file's size.
pub const FILE_SIZE_TOOL: &str = "get_file_size";
/// Name of the argument carrying the target path in both tools.
pub const FILE_PATH_ARG: &str = "file_path";

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input provided to the tool was invalid.
    InvalidInput,
    /// The tool ran but reported a failure.
    ExecutionError,
    /// The call never reached the tool (session or transport fault).
    Transport,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidInput => write!(f, "Invalid input"),
            ErrorKind::ExecutionError => write!(f, "Execution error"),
            ErrorKind::Transport => write!(f, "Transport error"),
        }
    }
}

/// Describes a tool call error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
}

impl Error {
    /// Creates a new error with the `InvalidInput` kind.
    #[inline]
    pub fn invalid_input() -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            reason: None,
        }
    }

    /// Creates a new error with the `ExecutionError` kind.
    #[inline]
    pub fn execution_error() -> Self {
        Self {
            kind: ErrorKind::ExecutionError,
            reason: None,
        }
    }

    /// Creates a new error with the `Transport` kind.
    #[inline]
    pub fn transport() -> Self {
        Self {
            kind: ErrorKind::Transport,
            reason: None,
        }
    }

    /// Attaches a reason to the error.
    #[inline]
    pub fn with_reason<S: Into<String>>(self, reason: S) -> Self {
        Self {
            kind: self.kind,
            reason: Some(reason.into()),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> Cow<'_, str> {
        match self.reason.as_deref() {
            Some(reason) => Cow::Borrowed(reason),
            None => Cow::Owned(format!("{}", self.kind)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}

impl std::error::Error for Error {}

/// A live session to a tool-providing server.
///
/// One invocation is a tool name plus a string-keyed argument mapping
/// and yields a single string payload. Calls are independent and
/// stateless; the session itself only carries the transport handshake.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Invokes a tool by name and returns its textual payload.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, Error>;
}
