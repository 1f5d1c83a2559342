//! CLI module - command-line interface
//!
//! Parses the two positional arguments and runs one task end to end.

use clap::error::ErrorKind;
use clap::Parser;
use std::env;
use std::process;

use crate::agent::Agent;
use crate::core::Config;

/// Usage line shown on malformed invocations
pub const USAGE: &str = "Usage: errand <openai-api-key> <task-description>";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "errand")]
#[command(version, about = "Run a natural-language browser task with an LLM")]
pub struct Args {
    /// OpenAI API key
    pub api_key: String,

    /// Natural-language description of the task to run
    pub task: String,
}

/// Parse argv
///
/// Exactly two positional arguments are accepted; any other count prints the
/// usage line and exits with status 1 before anything else happens.
/// `--help` and `--version` keep their conventional exit-0 behavior.
pub fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    }
}

/// Start message printed before the agent result is awaited
pub fn start_message(task: &str) -> String {
    format!("Starting task: {}", task)
}

/// Run one task end to end
pub async fn run(args: Args) -> anyhow::Result<()> {
    // The LLM client reads the key from the environment, exactly as given.
    // Config::load's .env pass never overrides variables that are already set.
    env::set_var("OPENAI_API_KEY", &args.api_key);

    // No anonymized usage reporting from CLI runs
    env::set_var("ERRAND_TELEMETRY", "false");

    let config = Config::load();

    let mut agent = Agent::with_config(config)?;
    agent.initialize().await?;

    println!("{}", start_message(&args.task));

    let result = agent.run(&args.task).await?;
    println!("{}", result);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_positional_args_parse() {
        let args = Args::try_parse_from(["errand", "sk-abc123", "buy oat milk"]).unwrap();
        assert_eq!(args.api_key, "sk-abc123");
        assert_eq!(args.task, "buy oat milk");
    }

    #[test]
    fn test_wrong_arg_counts_are_rejected() {
        assert!(Args::try_parse_from(["errand"]).is_err());
        assert!(Args::try_parse_from(["errand", "sk-abc123"]).is_err());
        assert!(Args::try_parse_from(["errand", "sk-abc123", "task", "extra"]).is_err());
    }

    #[test]
    fn test_start_message_contains_task() {
        let msg = start_message("find the cheapest flight to Lisbon");
        assert_eq!(msg, "Starting task: find the cheapest flight to Lisbon");
    }
}
