// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OpenAI chat completions provider adapter
//!
//! Translates the canonical message model to the OpenAI-compatible chat
//! API. The system prompt travels as a leading system message, tools are
//! wrapped in `function` envelopes, and tool arguments cross the wire as a
//! JSON-encoded string. Tool results are fed back as plain user-role text
//! and images are degraded to descriptive text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{ApiError, Result, SitecraftError};
use crate::llm::message::{ContentBlock, ImageSource, Message, MessageContent, Role, ToolCall};
use crate::llm::provider::{ChatProvider, ToolChoice, ToolDefinition};
use crate::tools::chat_tools;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";

/// OpenAI-compatible adapter
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    tools: Vec<OpenAiTool>,
    tool_choice: serde_json::Value,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    /// Arguments arrive as a JSON-encoded string, not an object
    arguments: String,
}

#[derive(Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAiFunction,
}

#[derive(Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

impl OpenAiProvider {
    /// Create a new OpenAI adapter with the default model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Create with a specific model id
    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_API_URL.to_string(),
            model: model.into(),
        }
    }

    /// Create with a custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Convert canonical messages to the chat-completions shape, with the
    /// system prompt prepended as a system message
    fn convert_messages(&self, system_prompt: &str, messages: &[Message]) -> Vec<OpenAiMessage> {
        let mut converted = vec![OpenAiMessage {
            role: "system",
            content: Some(system_prompt.to_string()),
            tool_calls: None,
        }];

        for message in messages {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };

            match &message.content {
                MessageContent::Text(text) => converted.push(OpenAiMessage {
                    role,
                    content: Some(text.clone()),
                    tool_calls: None,
                }),
                MessageContent::Blocks(blocks) => {
                    let mut text_parts = Vec::new();
                    let mut tool_calls = Vec::new();

                    for block in blocks {
                        match block {
                            ContentBlock::Text { text } => text_parts.push(text.clone()),
                            ContentBlock::Image { .. } => {
                                text_parts.push("[image attachment]".to_string())
                            }
                            ContentBlock::ToolUse { id, name, input } => {
                                tool_calls.push(OpenAiToolCall {
                                    id: id.clone(),
                                    call_type: "function".to_string(),
                                    function: OpenAiFunctionCall {
                                        name: name.clone(),
                                        arguments: input.to_string(),
                                    },
                                })
                            }
                            ContentBlock::ToolResult {
                                tool_use_id,
                                content,
                            } => text_parts.push(format!(
                                "Tool result for tool use ID {}: {}",
                                tool_use_id, content
                            )),
                        }
                    }

                    converted.push(OpenAiMessage {
                        role,
                        content: if text_parts.is_empty() {
                            None
                        } else {
                            Some(text_parts.join("\n"))
                        },
                        tool_calls: if tool_calls.is_empty() {
                            None
                        } else {
                            Some(tool_calls)
                        },
                    });
                }
            }
        }

        converted
    }

    /// Wrap canonical tool definitions in function envelopes
    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|t| OpenAiTool {
                tool_type: "function",
                function: OpenAiFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: serde_json::json!({
                        "type": t.input_schema.schema_type,
                        "properties": t.input_schema.properties,
                        "required": t.input_schema.required,
                    }),
                },
            })
            .collect()
    }

    fn convert_tool_choice(&self, tool_choice: &ToolChoice) -> serde_json::Value {
        match tool_choice {
            ToolChoice::Auto => serde_json::json!("auto"),
            ToolChoice::Tool(name) => serde_json::json!({
                "type": "function",
                "function": {"name": name},
            }),
        }
    }

    fn parse_error(&self, status: u16, body: &str) -> SitecraftError {
        if status == 401 {
            return SitecraftError::Api(ApiError::AuthenticationFailed);
        }

        let message = serde_json::from_str::<OpenAiError>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        SitecraftError::Api(ApiError::ServerError { status, message })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn send(
        &self,
        system_prompt: &str,
        history: &[Message],
        tool_choice: &ToolChoice,
    ) -> Result<Vec<ContentBlock>> {
        let body = OpenAiRequest {
            model: self.model.clone(),
            messages: self.convert_messages(system_prompt, history),
            tools: self.convert_tools(&chat_tools()),
            tool_choice: self.convert_tool_choice(tool_choice),
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status, "OpenAI API call failed");
            return Err(self.parse_error(status, &body));
        }

        let api_response: OpenAiResponse = response.json().await?;

        let message = api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| {
                SitecraftError::Api(ApiError::InvalidResponse(
                    "response carried no choices".to_string(),
                ))
            })?;

        let mut blocks = Vec::new();

        if let Some(content) = message.content {
            blocks.push(ContentBlock::Text { text: content });
        }

        for call in message.tool_calls.unwrap_or_default() {
            let input =
                serde_json::from_str(&call.function.arguments).map_err(|e| {
                    SitecraftError::Api(ApiError::InvalidResponse(format!(
                        "tool call arguments are not valid JSON: {}",
                        e
                    )))
                })?;

            blocks.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            });
        }

        Ok(blocks)
    }

    fn image_message(&self, _image: &ImageSource, input: &str) -> Message {
        // No native image support; the attachment is degraded to text.
        Message::user(format!("User input for image: {}", input))
    }

    fn tool_use_message(&self, call: &ToolCall) -> Message {
        Message::assistant_blocks(vec![ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.input.clone(),
        }])
    }

    fn tool_result_message(&self, tool_use_id: &str, result: &str) -> Message {
        // Results return as plain user text rather than a dedicated role.
        Message::user(format!(
            "Tool result for tool use ID {}: {}",
            tool_use_id, result
        ))
    }
}
