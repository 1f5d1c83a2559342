//! Browser executor - wraps agent-browser CLI
//!
//! Provides an async interface to agent-browser commands.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use url::Url;

use crate::core::config::BrowserConfig;
use crate::core::{ErrandError, Result, ToolResult};
use crate::tools::browser::snapshot::Snapshot;

/// Executor for browser automation via the agent-browser CLI
pub struct BrowserExecutor {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    /// Browser binary to drive instead of the bundled one
    executable: Option<PathBuf>,
    /// Per-command timeout
    command_timeout: Duration,
}

impl BrowserExecutor {
    /// Create a new browser executor
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            headed: false,
            executable: None,
            command_timeout: Duration::from_millis(30000),
        }
    }

    /// Create an executor from browser configuration
    ///
    /// The configured session name gets a random suffix so concurrent runs
    /// do not share page state.
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            session_name: format!("{}-{:04x}", config.session_name, rand::random::<u16>()),
            headed: config.headed,
            executable: config.executable.clone(),
            command_timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("agent-browser");
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        if let Some(ref exe) = self.executable {
            cmd.arg("--executable-path").arg(exe);
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = timeout(self.command_timeout, cmd.output())
            .await
            .map_err(|_| {
                ErrandError::browser(format!(
                    "agent-browser {} timed out after {}ms",
                    args.first().unwrap_or(&""),
                    self.command_timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ErrandError::BrowserBackendNotFound
                } else {
                    ErrandError::browser(format!("Failed to run agent-browser: {}", e))
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ErrandError::browser(format!(
                "agent-browser command failed: {}",
                stderr
            )))
        }
    }

    /// Run a command and return JSON output
    async fn run_json_command(&self, args: &[&str]) -> Result<String> {
        let mut full_args: Vec<&str> = args.to_vec();
        full_args.push("--json");
        self.run_command(&full_args).await
    }

    /// Build a ToolResult carrying a parsed snapshot
    ///
    /// Falls back to the raw output when the snapshot JSON does not parse.
    fn snapshot_result(tool: &str, prefix: &str, raw: String) -> ToolResult {
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => {
                let listing = snapshot.format_for_display();
                let data = serde_json::to_value(&snapshot).unwrap_or(serde_json::Value::Null);
                ToolResult::success_with_data(
                    tool,
                    format!(
                        "{} {} elements on page.\n{}",
                        prefix,
                        snapshot.count_elements(),
                        listing
                    ),
                    data,
                )
            }
            Err(_) => ToolResult::success(tool, format!("{}\n{}", prefix, raw)),
        }
    }

    /// Navigate to a URL
    pub async fn open(&self, url: &str, wait_for_load: bool) -> Result<ToolResult> {
        let url = normalize_url(url)?;
        self.run_command(&["open", &url]).await?;

        // Optionally wait for network idle
        if wait_for_load {
            let _ = self.run_command(&["wait", "--load", "networkidle"]).await;
        }

        // Get a snapshot of the landed page
        let snapshot_output = self.run_json_command(&["snapshot", "-i"]).await?;

        Ok(Self::snapshot_result(
            "browser_url",
            &format!("Navigated to {}.", url),
            snapshot_output,
        ))
    }

    /// Click an element by ref
    pub async fn click(&self, ref_id: &str) -> Result<ToolResult> {
        let ref_id = normalize_ref(ref_id);
        self.run_command(&["click", &ref_id]).await?;

        // Get updated snapshot after click
        let snapshot_output = self.run_json_command(&["snapshot", "-i"]).await?;

        Ok(Self::snapshot_result(
            "browser_click",
            &format!("Clicked {}.", ref_id),
            snapshot_output,
        ))
    }

    /// Fill an input field
    pub async fn fill(&self, ref_id: &str, text: &str) -> Result<ToolResult> {
        let ref_id = normalize_ref(ref_id);
        self.run_command(&["fill", &ref_id, text]).await?;

        Ok(ToolResult::success(
            "browser_fill",
            format!("Filled {} with '{}'", ref_id, text),
        ))
    }

    /// Get text from an element
    pub async fn get_text(&self, ref_id: &str) -> Result<ToolResult> {
        let ref_id = normalize_ref(ref_id);
        let output = self.run_command(&["get", "text", &ref_id]).await?;

        Ok(ToolResult::success("browser_get_text", output.trim()))
    }

    /// Take a screenshot
    pub async fn screenshot(&self, path: Option<&str>, full_page: bool) -> Result<ToolResult> {
        let mut args = vec!["screenshot"];

        if let Some(p) = path {
            args.push(p);
        }

        if full_page {
            args.push("--full");
        }

        let output = self.run_command(&args).await?;

        let message = if let Some(p) = path {
            format!("Screenshot saved to {}", p)
        } else {
            format!(
                "Screenshot captured (base64): {}...",
                &output[..output.len().min(100)]
            )
        };

        Ok(ToolResult::success("browser_screenshot", message))
    }

    /// Get page snapshot
    pub async fn snapshot(&self, interactive_only: bool) -> Result<ToolResult> {
        let args = if interactive_only {
            vec!["snapshot", "-i"]
        } else {
            vec!["snapshot"]
        };

        let output = self.run_json_command(&args).await?;

        Ok(Self::snapshot_result(
            "browser_snapshot",
            "Page snapshot.",
            output,
        ))
    }

    /// Press a key
    pub async fn press(&self, key: &str) -> Result<ToolResult> {
        self.run_command(&["press", key]).await?;
        Ok(ToolResult::success(
            "browser_press",
            format!("Pressed {}", key),
        ))
    }

    /// Scroll the page
    pub async fn scroll(&self, direction: &str, pixels: Option<u32>) -> Result<ToolResult> {
        let mut args = vec!["scroll", direction];
        let px_str;

        if let Some(px) = pixels {
            px_str = px.to_string();
            args.push(&px_str);
        }

        self.run_command(&args).await?;
        Ok(ToolResult::success(
            "browser_scroll",
            format!("Scrolled {}", direction),
        ))
    }

    /// Get current URL
    pub async fn get_url(&self) -> Result<String> {
        self.run_command(&["get", "url"])
            .await
            .map(|s| s.trim().to_string())
    }

    /// Close the browser
    pub async fn close(&self) -> Result<ToolResult> {
        self.run_command(&["close"]).await?;
        Ok(ToolResult::success("browser_close", "Browser closed"))
    }
}

impl Default for BrowserExecutor {
    fn default() -> Self {
        Self::new("errand")
    }
}

/// Normalize a navigation target into an absolute URL
///
/// Models frequently emit bare hosts like `google.com`; those get an
/// https scheme. Anything else unparseable is rejected before a browser
/// process is spawned.
fn normalize_url(raw: &str) -> Result<String> {
    match Url::parse(raw) {
        Ok(url) => Ok(url.into()),
        Err(_) if !raw.contains("://") => Url::parse(&format!("https://{}", raw))
            .map(Into::into)
            .map_err(|e| ErrandError::browser(format!("Invalid URL '{}': {}", raw, e))),
        Err(e) => Err(ErrandError::browser(format!("Invalid URL '{}': {}", raw, e))),
    }
}

/// Ensure an element ref carries the @ prefix agent-browser expects
fn normalize_ref(ref_id: &str) -> String {
    if ref_id.starts_with('@') {
        ref_id.to_string()
    } else {
        format!("@{}", ref_id)
    }
}
