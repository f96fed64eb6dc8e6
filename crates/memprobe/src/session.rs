//! The MCP session to the tool server.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context as _, Result, bail};
use async_trait::async_trait;
use memprobe_core::tool::{self, ToolSession};
use rmcp::model::CallToolRequestParam;
use rmcp::service::{RoleClient, RunningService, ServiceExt as _};
use rmcp::transport::TokioChildProcess;
use serde_json::{Map, Value};
use tokio::process::Command;

/// Builds the command that launches the tool server.
///
/// Interpreted servers are selected by extension; a path without an
/// extension is treated as a native executable and run directly. Any
/// other extension is a configuration error, raised before a connection
/// is ever attempted.
fn server_command(path: &Path) -> Result<Command> {
    let command = match path.extension().and_then(OsStr::to_str) {
        Some("py") => {
            let mut command = Command::new("python");
            command.arg(path);
            command
        }
        Some("js") => {
            let mut command = Command::new("node");
            command.arg(path);
            command
        }
        None => Command::new(path),
        Some(other) => bail!(
            "server script must be a .py or .js file or a native executable, got '.{other}'"
        ),
    };
    Ok(command)
}

/// A live session to a spawned tool server.
///
/// The child process and the MCP handshake state are owned by this type
/// for its entire lifetime. Dropping it tears both down; the normal
/// exit path goes through [`shutdown`](McpToolSession::shutdown) for an
/// orderly cancel.
pub struct McpToolSession {
    service: RunningService<RoleClient, ()>,
}

impl McpToolSession {
    /// Spawns the tool server and performs the session handshake.
    pub async fn connect(server_script: &Path) -> Result<Self> {
        let command = server_command(server_script)?;
        debug!(script = %server_script.display(), "spawning tool server");
        let transport =
            TokioChildProcess::new(command).context("spawn tool server")?;
        let service = ()
            .serve(transport)
            .await
            .context("initialize MCP session")?;
        Ok(Self { service })
    }

    /// Lists the names of the tools the server exposes.
    pub async fn tool_names(&self) -> Result<Vec<String>> {
        let tools = self
            .service
            .list_tools(Default::default())
            .await
            .context("list server tools")?;
        Ok(tools.tools.iter().map(|tool| tool.name.to_string()).collect())
    }

    /// Cancels the session and reaps the server process.
    pub async fn shutdown(self) -> Result<()> {
        self.service
            .cancel()
            .await
            .context("shut down MCP session")?;
        Ok(())
    }
}

#[async_trait]
impl ToolSession for McpToolSession {
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, tool::Error> {
        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: name.to_owned().into(),
                arguments: Some(arguments),
            })
            .await
            .map_err(|err| {
                tool::Error::transport().with_reason(format!("{err}"))
            })?;

        let text = result
            .content
            .iter()
            .filter_map(|content| content.as_text())
            .map(|text| text.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if result.is_error == Some(true) {
            return Err(tool::Error::execution_error().with_reason(text));
        }
        Ok(text)
    }
}
