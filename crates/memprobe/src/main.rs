//! Interactive memory-estimation client.
//!
//! Spawns an MCP tool server, then reads queries from stdin and runs
//! each one through the two-phase estimation conversation, streaming
//! the model's reasoning and answer text as it arrives.

#[macro_use]
extern crate tracing;

mod session;

use std::env;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use memprobe_core::tool::ToolSession;
use memprobe_core::{Estimator, StreamEvent};
use memprobe_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt, BufReader, Stdin};

use session::McpToolSession;

/// The script analyzed in phase one when `--target` is not given. The
/// query text never selects the file; this default preserves the
/// placeholder the workflow was originally written against.
const DEFAULT_TARGET: &str = "cena.py";

#[derive(Debug, Parser)]
#[command(name = "memprobe", about = "Estimate a script's peak memory usage")]
struct Cli {
    /// Path to the tool server (.py, .js, or a native executable).
    server_script: PathBuf,

    /// Script whose memory usage is analyzed.
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let api_key = env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY environment variable is not set")?;
    let base_url = env::var("OPENAI_BASE_URL")
        .context("OPENAI_BASE_URL environment variable is not set")?;
    let mut config = OpenAIConfigBuilder::with_api_key(api_key)
        .with_base_url(base_url);
    if let Ok(model) = env::var("OPENAI_MODEL") {
        config = config.with_model(model);
    }
    let provider = OpenAIProvider::new(config.build());

    let session = McpToolSession::connect(&cli.server_script).await?;
    let tool_names = session.tool_names().await?;
    println!("\nConnected to server with tools: {tool_names:?}");

    let estimator = Estimator::new(provider, session, cli.target);
    chat_loop(&estimator).await;
    estimator.into_session().shutdown().await?;
    Ok(())
}

/// Runs the read-eval-print loop until `quit` or end of input.
///
/// Every query is isolated: a failure is reported and the loop keeps
/// going.
async fn chat_loop<S: ToolSession>(estimator: &Estimator<S>) {
    println!("\nMCP client started!");
    println!("Type your queries or 'quit' to exit.");

    let mut stdin = BufReader::new(io::stdin());
    loop {
        print!("\nQuery: ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut stdin).await else {
            break;
        };
        let query = line.trim();
        if is_quit(query) {
            break;
        }

        match estimator.process_query(query, print_stream_event).await {
            Ok(answer) => println!("\n{answer}"),
            Err(err) => println!("\nError: {err}"),
        }
    }
}

fn print_stream_event(event: StreamEvent) {
    match event {
        StreamEvent::Reasoning(text) => {
            print!("{text}");
            std::io::stdout().flush().ok();
        }
        StreamEvent::AnswerStart => {
            let banner = format!("{0}Answer{0}", "=".repeat(20));
            println!("\n{}\n", banner.bold());
        }
        StreamEvent::Answer(text) => {
            print!("{text}");
            std::io::stdout().flush().ok();
        }
        StreamEvent::Usage(usage) => {
            println!("\nUsage:\n{usage}");
        }
    }
}

/// Returns `true` for the loop-terminating command, in any letter case.
fn is_quit(query: &str) -> bool {
    query.eq_ignore_ascii_case("quit")
}

async fn read_line(stdin: &mut BufReader<Stdin>) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_in_any_case() {
        assert!(is_quit("quit"));
        assert!(is_quit("QUIT"));
        assert!(is_quit("Quit"));
        assert!(is_quit("qUiT"));
    }

    #[test]
    fn test_queries_are_not_quit() {
        assert!(!is_quit(""));
        assert!(!is_quit("quit now"));
        assert!(!is_quit("how much memory?"));
    }
}
