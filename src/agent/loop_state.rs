//! Agent loop state management
//!
//! Tracks the state of one observe→act run including observations from tool
//! executions.

use serde::{Deserialize, Serialize};

/// Cap on how much of a single observation is replayed into the next prompt
const MAX_OBSERVATION_CHARS: usize = 4000;

/// State of one agent run
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Completed steps (0-indexed while running)
    pub step: usize,
    /// Maximum allowed steps
    pub max_steps: usize,
    /// Observations collected from tool executions
    pub observations: Vec<Observation>,
    /// Final answer once the agent has finished
    pub final_answer: Option<String>,
    /// Whether the agent reported the task as accomplished
    pub task_succeeded: bool,
}

impl AgentLoopState {
    /// Create a new loop state with the given step budget
    pub fn new(max_steps: usize) -> Self {
        Self {
            step: 0,
            max_steps,
            observations: Vec::new(),
            final_answer: None,
            task_succeeded: false,
        }
    }

    /// Check if the loop should continue
    pub fn should_continue(&self) -> bool {
        self.step < self.max_steps && self.final_answer.is_none()
    }

    /// Record the final answer and stop the loop
    pub fn finish(&mut self, answer: impl Into<String>, success: bool) {
        self.final_answer = Some(answer.into());
        self.task_succeeded = success;
    }

    /// Format observations for inclusion in the next prompt
    ///
    /// Long outputs (full page snapshots) are truncated so the prompt stays
    /// within a sane size across many steps.
    pub fn format_observations(&self) -> String {
        if self.observations.is_empty() {
            return String::new();
        }

        let mut output = String::from("\n\n## Tool Observations:\n");
        for (i, obs) in self.observations.iter().enumerate() {
            let text = if obs.output.len() > MAX_OBSERVATION_CHARS {
                let cut = floor_char_boundary(&obs.output, MAX_OBSERVATION_CHARS);
                format!("{}… [truncated]", &obs.output[..cut])
            } else {
                obs.output.clone()
            };

            let status = if obs.success { "ok" } else { "FAILED" };
            output.push_str(&format!(
                "\n### Observation {} ({}, {})\n{}\n",
                i + 1,
                obs.tool_name,
                status,
                text
            ));
        }
        output
    }

    /// Add observations from a batch of tool executions
    pub fn add_observations(&mut self, observations: Vec<Observation>) {
        self.observations.extend(observations);
    }

    /// Increment the step counter
    pub fn next_step(&mut self) {
        self.step += 1;
    }
}

/// Largest index <= max that sits on a UTF-8 character boundary
fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// An observation from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Name of the tool that produced this observation
    pub tool_name: String,
    /// Whether the tool execution was successful
    pub success: bool,
    /// Human-readable output from the tool
    pub output: String,
    /// Optional structured data from the tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Observation {
    /// Create a successful observation
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
            data: None,
        }
    }

    /// Create an error observation
    pub fn error(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
            data: None,
        }
    }
}

impl From<crate::core::ToolResult> for Observation {
    fn from(result: crate::core::ToolResult) -> Self {
        Self {
            tool_name: result.tool_name,
            success: result.success,
            output: result.output,
            data: result.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_state_new() {
        let state = AgentLoopState::new(25);
        assert_eq!(state.step, 0);
        assert_eq!(state.max_steps, 25);
        assert!(state.observations.is_empty());
        assert!(state.final_answer.is_none());
    }

    #[test]
    fn test_should_continue() {
        let mut state = AgentLoopState::new(2);
        assert!(state.should_continue());

        state.next_step();
        assert!(state.should_continue());

        state.next_step();
        assert!(!state.should_continue()); // Budget exhausted
    }

    #[test]
    fn test_finish_stops_loop() {
        let mut state = AgentLoopState::new(10);
        state.finish("All done", true);
        assert!(!state.should_continue());
        assert!(state.task_succeeded);
        assert_eq!(state.final_answer.as_deref(), Some("All done"));
    }

    #[test]
    fn test_format_observations() {
        let mut state = AgentLoopState::new(10);
        state.add_observations(vec![
            Observation::success("browser_url", "Navigated to example.com"),
            Observation::error("browser_click", "No element @e9"),
        ]);

        let formatted = state.format_observations();
        assert!(formatted.contains("browser_url"));
        assert!(formatted.contains("FAILED"));
        assert!(formatted.contains("No element @e9"));
    }

    #[test]
    fn test_format_observations_truncates() {
        let mut state = AgentLoopState::new(10);
        state.add_observations(vec![Observation::success(
            "browser_snapshot",
            "x".repeat(MAX_OBSERVATION_CHARS + 100),
        )]);

        let formatted = state.format_observations();
        assert!(formatted.contains("[truncated]"));
        assert!(formatted.len() < MAX_OBSERVATION_CHARS + 200);
    }
}
