// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Google Gemini provider adapter
//!
//! Translates the canonical message model to the Gemini `generateContent`
//! API. The system prompt travels as a leading model-role turn, tool
//! declarations go under a single `functionDeclarations` bundle, and the
//! API key rides on the URL. Gemini has no tool correlation ids, so the
//! adapter generates placeholders, and tool use/result history entries are
//! degraded to descriptive model-role text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{ApiError, Result, SitecraftError};
use crate::llm::message::{ContentBlock, ImageSource, Message, MessageContent, Role, ToolCall};
use crate::llm::provider::{ChatProvider, ToolChoice, ToolDefinition};
use crate::tools::chat_tools;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Google Gemini adapter
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    tools: GeminiTools,
    tool_config: GeminiToolConfig,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<GeminiSafetySetting>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTools {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
struct GeminiToolConfig {
    function_calling_config: GeminiFunctionCallingConfig,
}

#[derive(Serialize)]
struct GeminiFunctionCallingConfig {
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_function_names: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

impl GeminiProvider {
    /// Create a new Gemini adapter with the default model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Create with a specific model id
    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_API_URL.to_string(),
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

    fn endpoint(&self) -> String {
        // The key is URL auth, not a header.
        format!(
            "{}/models/{}-latest:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Convert canonical history into `contents`, with the system prompt
    /// prepended as a model-role turn
    fn convert_contents(&self, system_prompt: &str, messages: &[Message]) -> Vec<GeminiContent> {
        let mut contents = vec![GeminiContent {
            role: "model".to_string(),
            parts: vec![GeminiPart::Text {
                text: system_prompt.to_string(),
            }],
        }];

        for message in messages {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "model",
            };

            let parts = match &message.content {
                MessageContent::Text(text) => vec![GeminiPart::Text { text: text.clone() }],
                MessageContent::Blocks(blocks) => {
                    blocks.iter().map(degrade_block_to_part).collect()
                }
            };

            contents.push(GeminiContent {
                role: role.to_string(),
                parts,
            });
        }

        contents
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> GeminiTools {
        GeminiTools {
            function_declarations: tools
                .iter()
                .map(|t| GeminiFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: serde_json::json!({
                        "type": t.input_schema.schema_type,
                        "properties": t.input_schema.properties,
                        "required": t.input_schema.required,
                    }),
                })
                .collect(),
        }
    }

    fn convert_tool_config(&self, tool_choice: &ToolChoice) -> GeminiToolConfig {
        GeminiToolConfig {
            function_calling_config: GeminiFunctionCallingConfig {
                mode: "ANY",
                allowed_function_names: match tool_choice {
                    ToolChoice::Auto => None,
                    ToolChoice::Tool(name) => Some(vec![name.clone()]),
                },
            },
        }
    }

    fn generation_config() -> GeminiGenerationConfig {
        GeminiGenerationConfig {
            temperature: 1.0,
            top_k: 0,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }

    fn safety_settings() -> Vec<GeminiSafetySetting> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| GeminiSafetySetting {
            category,
            threshold: "BLOCK_MEDIUM_AND_ABOVE",
        })
        .collect()
    }
}

/// Gemini history carries no structured tool or image parts; anything
/// beyond text is flattened to a descriptive text part
fn degrade_block_to_part(block: &ContentBlock) -> GeminiPart {
    match block {
        ContentBlock::Text { text } => GeminiPart::Text { text: text.clone() },
        ContentBlock::Image { .. } => GeminiPart::Text {
            text: "[image attachment]".to_string(),
        },
        ContentBlock::ToolUse { id, name, .. } => GeminiPart::Text {
            text: format!("Tool use for tool ID {}: {}", id, name),
        },
        ContentBlock::ToolResult {
            tool_use_id,
            content,
        } => GeminiPart::Text {
            text: format!("Tool result for tool use ID {}: {}", tool_use_id, content),
        },
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn send(
        &self,
        system_prompt: &str,
        history: &[Message],
        tool_choice: &ToolChoice,
    ) -> Result<Vec<ContentBlock>> {
        let body = GeminiRequest {
            contents: self.convert_contents(system_prompt, history),
            tools: self.convert_tools(&chat_tools()),
            tool_config: self.convert_tool_config(tool_choice),
            generation_config: Self::generation_config(),
            safety_settings: Self::safety_settings(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status, "Gemini API call failed");
            return Err(match status {
                400 | 401 | 403 => SitecraftError::Api(ApiError::AuthenticationFailed),
                _ => SitecraftError::Api(ApiError::ServerError {
                    status,
                    message: body,
                }),
            });
        }

        let api_response: GeminiResponse = response.json().await?;

        let candidate = api_response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                SitecraftError::Api(ApiError::InvalidResponse(
                    "response carried no candidates".to_string(),
                ))
            })?;

        Ok(candidate
            .content
            .parts
            .into_iter()
            .map(|part| match part {
                GeminiPart::Text { text } => ContentBlock::Text { text },
                GeminiPart::FunctionCall { function_call } => ContentBlock::ToolUse {
                    // Gemini responses carry no correlation id.
                    id: ToolCall::placeholder_id(),
                    name: function_call.name,
                    input: function_call.args,
                },
            })
            .collect())
    }

    fn image_message(&self, _image: &ImageSource, input: &str) -> Message {
        // No file API integration; the attachment is degraded to text.
        Message::user(format!("User input for image: {}", input))
    }

    fn tool_use_message(&self, call: &ToolCall) -> Message {
        Message::assistant(format!("Tool use for tool ID {}: {}", call.id, call.name))
    }

    fn tool_result_message(&self, tool_use_id: &str, result: &str) -> Message {
        Message::assistant(format!(
            "Tool result for tool use ID {}: {}",
            tool_use_id, result
        ))
    }
}
