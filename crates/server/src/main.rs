//! MCP tool server for script memory analysis.
//!
//! Exposes two tools over a stdio transport:
//!
//! - `get_script_contents` - read a script, detect its language, and
//!   return it rendered as highlighted markdown
//! - `get_file_size` - report a file's on-disk size for baseline
//!   estimation

#[macro_use]
extern crate tracing;

mod content;
mod tools;

use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;

use tools::ScriptToolsService;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr only: stdout carries the MCP protocol.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("starting script tool server");

    let service = ScriptToolsService::new();
    let server = service.serve(stdio()).await?;
    server.waiting().await?;

    info!("script tool server stopped");
    Ok(())
}
