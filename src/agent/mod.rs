//! Agent module - the observe→act run loop and its bookkeeping
//!
//! Contains the runner that coordinates LLM calls and browser tool execution.

pub mod history;
pub mod loop_state;
pub mod runner;

pub use history::{RunResult, StepRecord, TaskHistory};
pub use loop_state::{AgentLoopState, Observation};
pub use runner::Agent;
