//! OpenAI client implementation
//!
//! Async HTTP client for the OpenAI Chat Completions API with tool calling.
//! The API key is read from `OPENAI_API_KEY` at construction time.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::core::{Config, ErrandError, Message, Result, ToolCall, ToolDefinition};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    chat_url: String,
    models_url: String,
    api_key: String,
    debug: bool,
}

/// Chat completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Message in API format
#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

/// Chat completions response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

/// A completion choice
#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Assistant message in a completion choice
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

/// Tool call in API format
#[derive(Debug, Deserialize)]
struct ApiToolCall {
    function: ApiFunction,
}

/// Function within a tool call
///
/// The API delivers `arguments` as a JSON-encoded string, not an object.
#[derive(Debug, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

/// Token usage in API format
#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Models listing response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
}

impl OpenAiClient {
    /// Create a new client from configuration
    ///
    /// Fails if `OPENAI_API_KEY` is not present in the environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ErrandError::MissingApiKey("OPENAI_API_KEY"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.openai.timeout_secs))
            .build()
            .map_err(|e| ErrandError::openai(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            chat_url: config.chat_url(),
            models_url: config.models_url(),
            api_key,
            debug: config.agent.debug,
        })
    }

    /// Create a client against a custom base URL with an explicit key
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base = base_url.trim_end_matches('/');

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            chat_url: format!("{}/chat/completions", base),
            models_url: format!("{}/models", base),
            api_key: api_key.into(),
            debug: false,
        }
    }

    /// Enable or disable debug output
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Convert internal Message to API format
    fn to_api_message(msg: &Message) -> ApiMessage {
        ApiMessage {
            role: msg.role.clone(),
            content: msg.content.clone(),
        }
    }

    /// Convert an API response to LLMResponse
    fn to_llm_response(&self, response: ChatResponse) -> Result<LLMResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ErrandError::openai("Response contained no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| self.parse_tool_call(tc))
            .collect();

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage,
            model: response.model,
        })
    }

    /// Parse a tool call, decoding the string-encoded arguments
    ///
    /// A malformed argument string becomes an empty object so the tool layer
    /// reports the missing arguments instead of the whole run aborting.
    fn parse_tool_call(&self, tc: ApiToolCall) -> ToolCall {
        let arguments = match serde_json::from_str(&tc.function.arguments) {
            Ok(value) => value,
            Err(e) => {
                self.debug_print(
                    "Argument parse error",
                    &format!("{}: {}", e, tc.function.arguments),
                );
                serde_json::json!({})
            }
        };

        ToolCall {
            name: tc.function.name,
            arguments,
        }
    }

    /// Debug print if enabled
    fn debug_print(&self, label: &str, content: &str) {
        if self.debug {
            if content.len() > 500 {
                eprintln!("DEBUG {}: {}...", label, &content[..500]);
            } else {
                eprintln!("DEBUG {}: {}", label, content);
            }
        }
    }

    /// Send a chat request, optionally with tools
    async fn chat_internal(
        &self,
        model: &str,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let api_messages: Vec<ApiMessage> = messages.iter().map(Self::to_api_message).collect();

        let opts = options.unwrap_or_default();
        let request = ChatRequest {
            model,
            messages: api_messages,
            tools,
            temperature: opts.temperature,
            max_tokens: opts.max_tokens,
            stop: opts.stop,
        };

        let request_json = serde_json::to_string(&request)?;
        self.debug_print("Request", &request_json);

        let response = self
            .client
            .post(self.chat_url.as_str())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ErrandError::openai(format!("Cannot reach {}: {}", self.chat_url, e))
                } else {
                    ErrandError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 {
                return Err(ErrandError::openai(
                    "Invalid API key (HTTP 401). Check the key passed on the command line",
                ));
            }

            if status.as_u16() == 404 && error_text.contains("model") {
                return Err(ErrandError::ModelNotFound(model.to_string()));
            }

            return Err(ErrandError::openai(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        self.debug_print("Response", &response_text);

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| ErrandError::openai(format!("Failed to parse response: {}", e)))?;

        self.to_llm_response(chat_response)
    }
}

#[async_trait]
impl LLMProvider for OpenAiClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.chat_internal(model, messages, None, options).await
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.chat_internal(model, messages, Some(tools), options)
            .await
    }

    async fn is_model_available(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m == model))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.models_url.as_str())
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ErrandError::openai(format!("Cannot reach {}: {}", self.models_url, e))
                } else {
                    ErrandError::from(e)
                }
            })?;

        if response.status().as_u16() == 401 {
            return Err(ErrandError::openai(
                "Invalid API key (HTTP 401). Check the key passed on the command line",
            ));
        }

        if !response.status().is_success() {
            return Err(ErrandError::openai("Failed to list models"));
        }

        let models_response: ModelsResponse = response.json().await?;
        Ok(models_response.data.into_iter().map(|m| m.id).collect())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_urls() {
        let client = OpenAiClient::with_base_url("https://api.openai.com/v1/", "sk-test");
        assert_eq!(client.chat_url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(client.models_url, "https://api.openai.com/v1/models");
    }

    #[test]
    fn test_response_parsing_with_tool_call() {
        let raw = r#"{
            "model": "gpt-4o-mini",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "browser_url",
                            "arguments": "{\"url\": \"https://example.com\"}"
                        }
                    }]
                }
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let client = OpenAiClient::with_base_url("https://api.openai.com/v1", "sk-test");
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let response = client.to_llm_response(parsed).unwrap();

        assert!(response.content.is_empty());
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "browser_url");
        assert_eq!(
            response.tool_calls[0].arguments["url"],
            "https://example.com"
        );
        assert_eq!(response.usage.as_ref().unwrap().total_tokens, 15);
    }

    #[test]
    fn test_malformed_arguments_degrade_to_empty_object() {
        let client = OpenAiClient::with_base_url("https://api.openai.com/v1", "sk-test");
        let call = client.parse_tool_call(ApiToolCall {
            function: ApiFunction {
                name: "browser_click".to_string(),
                arguments: "{not json".to_string(),
            },
        });

        assert_eq!(call.name, "browser_click");
        assert!(call.arguments.as_object().unwrap().is_empty());
        assert!(call.get_string("ref").is_none());
    }

    #[test]
    fn test_empty_choices_is_an_error() {
        let client = OpenAiClient::with_base_url("https://api.openai.com/v1", "sk-test");
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"model": "gpt-4o-mini", "choices": []}"#).unwrap();
        assert!(client.to_llm_response(parsed).is_err());
    }
}
