//! Run history and the printed run result
//!
//! Records what the agent did on each step and carries the result object the
//! CLI prints when the run finishes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::loop_state::Observation;
use crate::core::ToolCall;

/// Record of a single observe→act step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-indexed step number
    pub step: usize,
    /// Free-text content the model produced alongside its actions
    pub thought: String,
    /// Tool calls the model requested
    pub tool_calls: Vec<ToolCall>,
    /// Observations returned by the tools
    pub observations: Vec<Observation>,
}

/// Full history of one agent run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskHistory {
    /// The task the run was started with
    pub task: String,
    /// Per-step records, in execution order
    steps: Vec<StepRecord>,
}

impl TaskHistory {
    /// Create an empty history for a task
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step record
    pub fn record_step(
        &mut self,
        step: usize,
        thought: impl Into<String>,
        tool_calls: Vec<ToolCall>,
        observations: Vec<Observation>,
    ) {
        self.steps.push(StepRecord {
            step,
            thought: thought.into(),
            tool_calls,
            observations,
        });
    }

    /// Get the recorded steps
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if no steps were recorded
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of all tools invoked during the run, in order
    pub fn actions_taken(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.tool_calls.iter().map(|c| c.name.as_str()))
            .collect()
    }
}

/// The result of one agent run
///
/// This is what the CLI prints on completion; `Display` is the user-facing
/// rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// The task that was run
    pub task: String,
    /// Final answer or outcome report
    pub answer: String,
    /// Whether the agent reported the task as accomplished
    pub success: bool,
    /// Number of observe→act steps used
    pub steps_used: usize,
    /// URL the browser ended on, when a browser session was live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Task: {}", self.task)?;
        writeln!(
            f,
            "Status: {} ({} steps)",
            if self.success {
                "completed"
            } else {
                "incomplete"
            },
            self.steps_used
        )?;

        if let Some(ref url) = self.final_url {
            writeln!(f, "Final URL: {}", url)?;
        }

        write!(f, "\n{}", self.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_records_steps() {
        let mut history = TaskHistory::new("Buy oat milk");
        assert!(history.is_empty());

        history.record_step(
            1,
            "Opening the shop",
            vec![ToolCall::new(
                "browser_url",
                serde_json::json!({"url": "https://shop.example"}),
            )],
            vec![Observation::success("browser_url", "Navigated")],
        );
        history.record_step(2, "Done", Vec::new(), Vec::new());

        assert_eq!(history.len(), 2);
        assert_eq!(history.actions_taken(), vec!["browser_url"]);
    }

    #[test]
    fn test_run_result_display_contains_answer() {
        let result = RunResult {
            task: "Find the Rust homepage title".to_string(),
            answer: "The title is \"Rust Programming Language\"".to_string(),
            success: true,
            steps_used: 3,
            final_url: Some("https://www.rust-lang.org/".to_string()),
        };

        let rendered = result.to_string();
        assert!(rendered.contains("Task: Find the Rust homepage title"));
        assert!(rendered.contains("completed (3 steps)"));
        assert!(rendered.contains("Final URL: https://www.rust-lang.org/"));
        assert!(rendered.ends_with("The title is \"Rust Programming Language\""));
    }

    #[test]
    fn test_run_result_display_incomplete() {
        let result = RunResult {
            task: "t".to_string(),
            answer: "ran out of steps".to_string(),
            success: false,
            steps_used: 25,
            final_url: None,
        };

        let rendered = result.to_string();
        assert!(rendered.contains("incomplete (25 steps)"));
        assert!(!rendered.contains("Final URL"));
    }
}
