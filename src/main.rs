//! Errand - LLM-driven browser task runner
//!
//! Main entry point for the CLI application.

use errand::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::parse_args();
    cli::run(args).await
}
