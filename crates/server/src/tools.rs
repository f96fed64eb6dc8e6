//! MCP tools for script memory analysis.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo,
};
use rmcp::{
    ErrorData as McpError, ServerHandler, schemars, tool, tool_handler,
    tool_router,
};
use serde::Deserialize;
use syntect::parsing::SyntaxSet;

use crate::content;

/// Script inspection MCP service.
#[derive(Clone)]
pub struct ScriptToolsService {
    /// Loaded syntax definitions for language detection.
    syntaxes: Arc<SyntaxSet>,
    /// Tool router
    tool_router: ToolRouter<Self>,
}

impl ScriptToolsService {
    pub fn new() -> Self {
        Self {
            syntaxes: Arc::new(SyntaxSet::load_defaults_newlines()),
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for ScriptToolsService {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScriptContentsRequest {
    /// Path of the script to read.
    #[schemars(description = "Path of the script file to read")]
    pub file_path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FileSizeRequest {
    /// Path of the file to size.
    #[schemars(description = "Path of the file to report the size of")]
    pub file_path: String,
}

#[tool_router]
impl ScriptToolsService {
    /// Read a script and render it for the model.
    #[tool(
        description = "Retrieve a script's content, wrapped in a fenced code block tagged with the detected language and rendered as markdown."
    )]
    pub async fn get_script_contents(
        &self,
        Parameters(request): Parameters<ScriptContentsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let path = PathBuf::from(&request.file_path);
        let rendered = content::render_script(&self.syntaxes, &path)
            .map_err(|err| {
                McpError::invalid_params(
                    format!("cannot read script {}: {err}", path.display()),
                    None,
                )
            })?;
        Ok(CallToolResult::success(vec![Content::text(rendered)]))
    }

    /// Report a file's size.
    #[tool(
        description = "Report a file's on-disk size in MB for memory baseline estimation. Answers with 'File not found' for missing paths."
    )]
    pub async fn get_file_size(
        &self,
        Parameters(request): Parameters<FileSizeRequest>,
    ) -> Result<CallToolResult, McpError> {
        let path = PathBuf::from(&request.file_path);
        // A missing file is a normal answer here, not an error; the
        // model folds the sentinel into its estimate.
        let reply = match std::fs::metadata(&path) {
            Ok(metadata) => content::format_file_size(metadata.len()),
            Err(_) => "File not found".to_owned(),
        };
        Ok(CallToolResult::success(vec![Content::text(reply)]))
    }
}

#[tool_handler]
impl ServerHandler for ScriptToolsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Script inspection tools for memory estimation. Use 'get_script_contents' to read a script with code highlighting, and 'get_file_size' to establish a static memory baseline."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .expect("tool result carries no text")
    }

    #[tokio::test]
    async fn test_get_script_contents_tags_python() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.py");
        fs::write(&path, "print('hello')\n").unwrap();

        let service = ScriptToolsService::new();
        let result = service
            .get_script_contents(Parameters(ScriptContentsRequest {
                file_path: path.to_string_lossy().into_owned(),
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        let text = text_of(&result);
        assert!(text.contains("language-{python}"), "{text}");
        assert!(text.contains("print"));
    }

    #[tokio::test]
    async fn test_get_script_contents_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ghost.py");

        let service = ScriptToolsService::new();
        let err = service
            .get_script_contents(Parameters(ScriptContentsRequest {
                file_path: path.to_string_lossy().into_owned(),
            }))
            .await
            .unwrap_err();
        assert!(err.message.contains("cannot read script"));
    }

    #[tokio::test]
    async fn test_get_file_size_reports_exact_division() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, vec![0u8; 524_288]).unwrap();

        let service = ScriptToolsService::new();
        let result = service
            .get_file_size(Parameters(FileSizeRequest {
                file_path: path.to_string_lossy().into_owned(),
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "File size: 0.5 MB");
    }

    #[tokio::test]
    async fn test_get_file_size_missing_file_sentinel() {
        let service = ScriptToolsService::new();
        let result = service
            .get_file_size(Parameters(FileSizeRequest {
                file_path: "/definitely/not/here.bin".to_owned(),
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "File not found");
    }
}
