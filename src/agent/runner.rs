//! Agent runner
//!
//! Drives one task to completion with an observe→act loop: the model plans an
//! action, browser tools execute it, and the observation feeds the next step.

use std::sync::Arc;

use crate::agent::history::{RunResult, TaskHistory};
use crate::agent::loop_state::{AgentLoopState, Observation};
use crate::core::{Config, ErrandError, Message, Result, ToolCall, ToolDefinition};
use crate::llm::{GenerateOptions, LLMProvider, LLMResponse, OpenAiClient};
use crate::tools::browser::BrowserExecutor;
use crate::tools::{ToolRegistry, TASK_COMPLETE};

/// Agent that runs a single natural-language task against a browser
pub struct Agent {
    /// Configuration
    config: Config,
    /// LLM client
    llm: OpenAiClient,
    /// Tool registry
    tools: Arc<ToolRegistry>,
    /// Whether the browser backend answered the availability probe
    browser_available: bool,
}

impl Agent {
    /// Create an agent with the given configuration
    ///
    /// Fails when `OPENAI_API_KEY` is absent from the environment.
    pub fn with_config(config: Config) -> Result<Self> {
        let llm = OpenAiClient::from_config(&config)?;

        let tools = if config.browser.enabled {
            ToolRegistry::with_browser(&config.browser)
        } else {
            ToolRegistry::new()
        };

        Ok(Self {
            config,
            llm,
            tools: Arc::new(tools),
            browser_available: false, // Checked in initialize
        })
    }

    /// Initialize the agent (check backend and model availability)
    pub async fn initialize(&mut self) -> Result<()> {
        if self.config.agent.debug {
            eprintln!(
                "DEBUG: anonymized telemetry {}",
                if self.config.telemetry.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }

        // A bad key or unknown model should surface here, not mid-run
        if !self
            .llm
            .is_model_available(&self.config.openai.model)
            .await?
        {
            return Err(ErrandError::ModelNotFound(self.config.openai.model.clone()));
        }

        if self.config.browser.enabled {
            self.browser_available = BrowserExecutor::is_available().await;
            if !self.browser_available {
                return Err(ErrandError::BrowserBackendNotFound);
            }
        }

        Ok(())
    }

    /// Run a task to completion
    ///
    /// The loop ends when:
    /// 1. The model calls `task_complete` with its final answer
    /// 2. The model replies with plain content and no tool calls
    /// 3. The step budget runs out (a best-effort answer is synthesized)
    pub async fn run(&mut self, task: &str) -> Result<RunResult> {
        let mut state = AgentLoopState::new(self.config.agent.max_steps);
        let mut history = TaskHistory::new(task);

        println!("[Agent] Running (max {} steps)", state.max_steps);

        while state.should_continue() {
            let step = state.step + 1;
            println!("\n[Step {}/{}] Planning...", step, state.max_steps);

            let response = self.call_planner(task, &state).await?;

            // Completion via the task_complete tool
            if let Some(call) = response
                .tool_calls
                .iter()
                .find(|c| c.name == TASK_COMPLETE)
            {
                let answer = call
                    .get_string("answer")
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| response.content.clone());
                let success = call.get_bool("success").unwrap_or(true);

                history.record_step(step, response.content, response.tool_calls.clone(), Vec::new());
                state.finish(answer, success);
                break;
            }

            // Plain content with no tool calls is also a final answer
            if response.tool_calls.is_empty() {
                let answer = if response.content.is_empty() {
                    "The model produced no answer for this task.".to_string()
                } else {
                    response.content.clone()
                };

                history.record_step(step, response.content, Vec::new(), Vec::new());
                state.finish(answer, true);
                break;
            }

            // Execute tools sequentially (page state is order-dependent)
            println!(
                "[Step {}] Executing {} tool(s)...",
                step,
                response.tool_calls.len()
            );

            let observations = self.execute_tools(&response.tool_calls).await;

            for obs in &observations {
                let status = if obs.success { "✓" } else { "✗" };
                println!("  {} {}", status, obs.tool_name);
            }

            history.record_step(
                step,
                response.content,
                response.tool_calls,
                observations.clone(),
            );
            state.add_observations(observations);
            state.next_step();
        }

        // Step budget exhausted without an answer
        let (answer, success) = if let Some(ref answer) = state.final_answer {
            (answer.clone(), state.task_succeeded)
        } else {
            println!("\n[Agent] Step budget exhausted. Synthesizing response...");
            (self.synthesize_from_observations(&state).await?, false)
        };

        let final_url = self.final_url().await;

        // Leave no browser session behind
        if let Some(browser) = self.tools.browser_executor() {
            let _ = browser.close().await;
        }

        println!(
            "\n[Agent] Done ({} steps, {} observations)",
            history.len(),
            state.observations.len()
        );

        Ok(RunResult {
            task: task.to_string(),
            answer,
            success,
            steps_used: history.len(),
            final_url,
        })
    }

    /// Call the planner model with the task and accumulated observations
    async fn call_planner(&self, task: &str, state: &AgentLoopState) -> Result<LLMResponse> {
        let system_prompt = self
            .config
            .agent
            .system_prompt
            .clone()
            .unwrap_or_else(|| self.default_system_prompt());

        let user_content = if state.observations.is_empty() {
            task.to_string()
        } else {
            format!("{}\n{}", task, state.format_observations())
        };

        let messages = vec![Message::system(system_prompt), Message::user(user_content)];

        let tool_defs: Vec<ToolDefinition> =
            self.tools.all_definitions().into_iter().cloned().collect();

        if self.config.agent.debug {
            eprintln!("DEBUG: Calling planner with {} tools", tool_defs.len());
        }

        self.llm
            .chat_with_tools(
                &self.config.openai.model,
                &messages,
                &tool_defs,
                Some(GenerateOptions {
                    temperature: Some(0.1), // Low temperature for action selection
                    ..Default::default()
                }),
            )
            .await
    }

    /// Build the default system prompt
    fn default_system_prompt(&self) -> String {
        let browser_instructions = if self.browser_available {
            r#"
## Browser Tools
- `browser_url`: Navigate to a URL. Returns a COMPACT element listing.
- `browser_snapshot`: Get interactive elements. Returns elements with @eN refs.
- `browser_fill`: Type text into an element. Args: {"ref": "e5", "text": "search query"}
- `browser_click`: Click an element. Args: {"ref": "e8"}
- `browser_press`, `browser_scroll`, `browser_get_text`, `browser_screenshot` for finer control.

## Workflow
1. `browser_url`: Navigate to the site.
2. OBSERVE: Identify the target element's ref (e.g., e5) from the listing in the observation.
3. ACT: Use the EXACT ref with `browser_fill` or `browser_click`.
4. REPEAT: Each action returns an updated listing. Always check the LATEST observation before selecting the next ref."#
        } else {
            "\nNo browser is attached for this run; answer from the task alone."
        };

        format!(
            r#"You are a browser automation agent. You are given one task and you work it to completion:
1. THINK about what the next action should be.
2. ACT by calling a browser tool.
3. OBSERVE the result and continue.
{}

## Rules
- When the task is done (or cannot be done), call `task_complete` with your final answer. Do not keep browsing after that.
- ALWAYS read the latest tool observation carefully before choosing your next action.
- Use EXACT element refs from listings for all browser interactions."#,
            browser_instructions
        )
    }

    /// Execute tool calls and collect observations
    ///
    /// Browser state depends on action order, so everything runs sequentially.
    async fn execute_tools(&self, tool_calls: &[ToolCall]) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(tool_calls.len());

        for tool_call in tool_calls {
            if self.config.agent.debug {
                eprintln!("DEBUG: Executing tool: {}", tool_call.name);
            }

            match self.tools.execute(tool_call).await {
                Ok(result) => observations.push(Observation::from(result)),
                Err(e) => observations.push(Observation::error(&tool_call.name, e.to_string())),
            }
        }

        observations
    }

    /// Synthesize a response from observations when the step budget runs out
    async fn synthesize_from_observations(&self, state: &AgentLoopState) -> Result<String> {
        if state.observations.is_empty() {
            return Ok("The step budget ran out before any progress was made.".to_string());
        }

        let synthesis_prompt = format!(
            "The task could not be finished within the step budget. Based on the \
             following tool observations, report what was accomplished and what remains:\n\n{}",
            state.format_observations()
        );

        let messages = vec![Message::user(synthesis_prompt)];

        let response = self
            .llm
            .chat(
                &self.config.openai.model,
                &messages,
                Some(GenerateOptions {
                    temperature: Some(0.7),
                    ..Default::default()
                }),
            )
            .await?;

        Ok(response.content)
    }

    /// URL the browser ended on, when a session is live
    async fn final_url(&self) -> Option<String> {
        if !self.browser_available {
            return None;
        }

        let browser = self.tools.browser_executor()?;
        browser.get_url().await.ok().filter(|u| !u.is_empty())
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Check if browser tools are live for this run
    pub fn has_browser(&self) -> bool {
        self.browser_available
    }

    /// Enable debug mode
    pub fn set_debug(&mut self, debug: bool) {
        self.config.agent.debug = debug;
        self.llm.set_debug(debug);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_browser() -> Config {
        let mut config = Config::default();
        config.browser.enabled = false;
        config
    }

    // One test covers all key-dependent construction paths; tests run in
    // parallel and OPENAI_API_KEY is process-global state.
    #[test]
    fn test_construction_and_api_key_handling() {
        std::env::remove_var("OPENAI_API_KEY");
        assert!(matches!(
            Agent::with_config(config_without_browser()),
            Err(ErrandError::MissingApiKey("OPENAI_API_KEY"))
        ));

        std::env::set_var("OPENAI_API_KEY", "sk-test-key");
        let agent = Agent::with_config(config_without_browser()).unwrap();
        assert!(!agent.has_browser());
        assert_eq!(agent.config().openai.model, "gpt-4o-mini");

        let prompt = agent.default_system_prompt();
        assert!(prompt.contains("task_complete"));
        assert!(prompt.contains("No browser is attached"));

        std::env::remove_var("OPENAI_API_KEY");
    }
}
