//! Custom error types for Errand
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Errand operations
#[derive(Error, Debug)]
pub enum ErrandError {
    /// OpenAI connection or API errors
    #[error("OpenAI error: {0}")]
    OpenAi(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Browser backend not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    BrowserBackendNotFound,

    /// API key missing from the environment
    #[error("{0} is not set. Pass the API key as the first argument or export it")]
    MissingApiKey(&'static str),

    /// Model not available for this API key
    #[error("Model '{0}' is not available for this API key")]
    ModelNotFound(String),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Errand operations
pub type Result<T> = std::result::Result<T, ErrandError>;

impl ErrandError {
    /// Create an OpenAI error
    pub fn openai(msg: impl Into<String>) -> Self {
        Self::OpenAi(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
