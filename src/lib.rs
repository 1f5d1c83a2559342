//! Errand - LLM-driven browser task runner
//!
//! A command-line assistant that takes a natural-language task, drives a real
//! browser with an OpenAI model until the task is done, and prints the result.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: LLM provider abstraction with the OpenAI implementation
//! - **Tools**: Browser tool registry backed by the agent-browser CLI
//! - **Agent**: The observe→act run loop and run history
//! - **CLI**: Argument parsing and the single-shot entry point
//!
//! # Usage
//!
//! ```rust,no_run
//! use errand::{Agent, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut agent = Agent::with_config(Config::load()).unwrap();
//!     agent.initialize().await.unwrap();
//!
//!     let result = agent.run("Find the current Rust release version").await.unwrap();
//!     println!("{}", result);
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use crate::agent::{Agent, RunResult};
pub use crate::core::{Config, ErrandError, Result};
