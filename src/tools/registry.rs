//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to handlers.

use std::collections::HashMap;

use crate::core::config::BrowserConfig;
use crate::core::{Result, ToolCall, ToolCategory, ToolDefinition, ToolResult};
use crate::tools::browser::BrowserExecutor;

/// Name of the tool the model calls to finish a task
pub const TASK_COMPLETE: &str = "task_complete";

/// Registry of available tools
pub struct ToolRegistry {
    /// Tool definitions indexed by name
    definitions: HashMap<String, ToolDefinition>,
    /// Tool categories
    categories: HashMap<String, ToolCategory>,
    /// Browser executor instance
    browser: Option<BrowserExecutor>,
}

impl ToolRegistry {
    /// Create a new tool registry with the task lifecycle tools
    pub fn new() -> Self {
        let mut registry = Self {
            definitions: HashMap::new(),
            categories: HashMap::new(),
            browser: None,
        };

        registry.register_task_tools();

        registry
    }

    /// Create a registry with browser tools enabled
    pub fn with_browser(config: &BrowserConfig) -> Self {
        let mut registry = Self::new();
        registry.browser = Some(BrowserExecutor::from_config(config));
        registry.register_browser_tools();
        registry
    }

    /// Register the task lifecycle tools
    fn register_task_tools(&mut self) {
        self.register(
            ToolDefinition::function(
                TASK_COMPLETE,
                "Finish the task and report the final answer to the user. \
                 Call this exactly once, when the task is fully done or cannot proceed.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "answer": {
                            "type": "string",
                            "description": "The final answer or outcome report for the user"
                        },
                        "success": {
                            "type": "boolean",
                            "description": "Whether the task was accomplished"
                        }
                    },
                    "required": ["answer"]
                }),
            ),
            ToolCategory::Task,
        );
    }

    /// Register browser automation tools
    fn register_browser_tools(&mut self) {
        // Browse URL
        self.register(
            ToolDefinition::function(
                "browser_url",
                "Navigate to a URL and get the page structure for analysis",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "The URL to navigate to"
                        },
                        "wait_for_load": {
                            "type": "boolean",
                            "description": "Wait for network idle before snapshot"
                        }
                    },
                    "required": ["url"]
                }),
            ),
            ToolCategory::Browser,
        );

        // Click element
        self.register(
            ToolDefinition::function(
                "browser_click",
                "Click an element on the page by its ref from snapshot",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "ref": {
                            "type": "string",
                            "description": "Element ref from snapshot (e.g., e1, e2)"
                        }
                    },
                    "required": ["ref"]
                }),
            ),
            ToolCategory::Browser,
        );

        // Fill input
        self.register(
            ToolDefinition::function(
                "browser_fill",
                "Fill text into an input field by its ref",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "ref": {
                            "type": "string",
                            "description": "Element ref from snapshot"
                        },
                        "text": {
                            "type": "string",
                            "description": "Text to enter"
                        }
                    },
                    "required": ["ref", "text"]
                }),
            ),
            ToolCategory::Browser,
        );

        // Get text
        self.register(
            ToolDefinition::function(
                "browser_get_text",
                "Get text content from an element",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "ref": {
                            "type": "string",
                            "description": "Element ref from snapshot"
                        }
                    },
                    "required": ["ref"]
                }),
            ),
            ToolCategory::Browser,
        );

        // Take screenshot
        self.register(
            ToolDefinition::function(
                "browser_screenshot",
                "Take a screenshot of the current page",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "File path to save screenshot (optional)"
                        },
                        "full_page": {
                            "type": "boolean",
                            "description": "Capture full page instead of viewport"
                        }
                    }
                }),
            ),
            ToolCategory::Browser,
        );

        // Press a key
        self.register(
            ToolDefinition::function(
                "browser_press",
                "Press a keyboard key (e.g., Enter, Tab, Escape)",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "key": {
                            "type": "string",
                            "description": "Key to press"
                        }
                    },
                    "required": ["key"]
                }),
            ),
            ToolCategory::Browser,
        );

        // Scroll
        self.register(
            ToolDefinition::function(
                "browser_scroll",
                "Scroll the page up or down",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "direction": {
                            "type": "string",
                            "enum": ["up", "down"],
                            "description": "Scroll direction"
                        },
                        "pixels": {
                            "type": "integer",
                            "description": "How far to scroll (optional)"
                        }
                    },
                    "required": ["direction"]
                }),
            ),
            ToolCategory::Browser,
        );

        // Close browser
        self.register(
            ToolDefinition::function(
                "browser_close",
                "Close the browser session",
                serde_json::json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
            ToolCategory::Browser,
        );

        // Get page snapshot
        self.register(
            ToolDefinition::function(
                "browser_snapshot",
                "Get current page accessibility tree with interactive element refs",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "interactive_only": {
                            "type": "boolean",
                            "description": "Only return interactive elements (buttons, links, inputs)"
                        }
                    }
                }),
            ),
            ToolCategory::Browser,
        );
    }

    /// Register a tool definition
    pub fn register(&mut self, definition: ToolDefinition, category: ToolCategory) {
        let name = definition.function.name.clone();
        self.definitions.insert(name.clone(), definition);
        self.categories.insert(name, category);
    }

    /// Get all tool definitions
    pub fn all_definitions(&self) -> Vec<&ToolDefinition> {
        self.definitions.values().collect()
    }

    /// Get tool definitions by category
    pub fn definitions_by_category(&self, category: ToolCategory) -> Vec<&ToolDefinition> {
        self.definitions
            .iter()
            .filter(|(name, _)| self.categories.get(*name) == Some(&category))
            .map(|(_, def)| def)
            .collect()
    }

    /// Get browser tool definitions
    pub fn browser_tools(&self) -> Vec<&ToolDefinition> {
        self.definitions_by_category(ToolCategory::Browser)
    }

    /// Check if browser is enabled
    pub fn has_browser(&self) -> bool {
        self.browser.is_some()
    }

    /// Get the browser executor
    pub fn browser_executor(&self) -> Option<&BrowserExecutor> {
        self.browser.as_ref()
    }

    /// Check if a tool name is a registered browser tool
    pub fn is_browser_tool(&self, name: &str) -> bool {
        self.categories.get(name) == Some(&ToolCategory::Browser)
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        match self.categories.get(&tool_call.name) {
            Some(ToolCategory::Browser) => self.execute_browser_tool(tool_call).await,
            Some(ToolCategory::Task) => {
                // task_complete is resolved by the agent loop; echoing the
                // answer keeps direct registry use well-defined
                Ok(ToolResult::success(
                    &tool_call.name,
                    tool_call.get_string("answer").unwrap_or_default(),
                ))
            }
            None => Ok(ToolResult::failure(
                &tool_call.name,
                format!("Unknown tool: {}", tool_call.name),
            )),
        }
    }

    /// Execute a browser tool
    async fn execute_browser_tool(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        let browser = match &self.browser {
            Some(b) => b,
            None => {
                return Ok(ToolResult::failure(
                    &tool_call.name,
                    "Browser tools are not enabled",
                ))
            }
        };

        match tool_call.name.as_str() {
            "browser_url" => {
                let url = tool_call.get_string("url").unwrap_or_default();
                let wait = tool_call.get_bool("wait_for_load").unwrap_or(true);
                browser.open(&url, wait).await
            }
            "browser_click" => {
                let ref_id = tool_call.get_string("ref").unwrap_or_default();
                browser.click(&ref_id).await
            }
            "browser_fill" => {
                let ref_id = tool_call.get_string("ref").unwrap_or_default();
                let text = tool_call.get_string("text").unwrap_or_default();
                browser.fill(&ref_id, &text).await
            }
            "browser_get_text" => {
                let ref_id = tool_call.get_string("ref").unwrap_or_default();
                browser.get_text(&ref_id).await
            }
            "browser_screenshot" => {
                let path = tool_call.get_string("path");
                let full = tool_call.get_bool("full_page").unwrap_or(false);
                browser.screenshot(path.as_deref(), full).await
            }
            "browser_press" => {
                let key = tool_call.get_string("key").unwrap_or_default();
                browser.press(&key).await
            }
            "browser_scroll" => {
                let direction = tool_call
                    .get_string("direction")
                    .unwrap_or_else(|| "down".to_string());
                let pixels = tool_call.get_u64("pixels").map(|p| p as u32);
                browser.scroll(&direction, pixels).await
            }
            "browser_snapshot" => {
                let interactive = tool_call.get_bool("interactive_only").unwrap_or(true);
                browser.snapshot(interactive).await
            }
            "browser_close" => browser.close().await,
            _ => Ok(ToolResult::failure(
                &tool_call.name,
                format!("Unknown browser tool: {}", tool_call.name),
            )),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_without_browser() {
        let registry = ToolRegistry::new();
        assert!(!registry.has_browser());
        assert!(registry.browser_tools().is_empty());
        // task_complete is always registered
        assert_eq!(registry.all_definitions().len(), 1);
    }

    #[test]
    fn test_registry_with_browser() {
        let registry = ToolRegistry::with_browser(&BrowserConfig::default());
        assert!(registry.has_browser());
        assert_eq!(registry.browser_tools().len(), 9);
        assert!(registry.is_browser_tool("browser_url"));
        assert!(!registry.is_browser_tool(TASK_COMPLETE));
    }

    #[tokio::test]
    async fn test_unknown_tool_fails() {
        let registry = ToolRegistry::new();
        let call = ToolCall::new("no_such_tool", serde_json::json!({}));
        let result = registry.execute(&call).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_browser_tool_without_browser_fails() {
        let registry = ToolRegistry::new();
        let call = ToolCall::new(
            "browser_url",
            serde_json::json!({"url": "https://example.com"}),
        );
        // browser_url is not registered at all without a browser
        let result = registry.execute(&call).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_task_complete_echoes_answer() {
        let registry = ToolRegistry::new();
        let call = ToolCall::new(TASK_COMPLETE, serde_json::json!({"answer": "done"}));
        let result = registry.execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "done");
    }
}
