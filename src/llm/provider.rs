// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Provider adapter trait and related types
//!
//! Defines the abstraction layer over the different LLM backends. Each
//! adapter translates the canonical message model to its vendor's wire
//! format, classifies what comes back, and builds the vendor-correct
//! message shapes for every kind of conversation turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::llm::message::{ContentBlock, ImageSource, Message, ToolCall};

/// Main trait for provider adapters
///
/// One round-trip is `send`: the full history plus the system prompt goes
/// out, and the response comes back as canonical content blocks. Failure
/// (transport error, non-success status, missing credential) is an `Err`;
/// the orchestrator treats it as recoverable and never retries.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the provider name (e.g., "anthropic", "openai", "gemini")
    fn name(&self) -> &str;

    /// Send one request carrying the system prompt, the entire history, and
    /// the tool choice for this turn. Returns the response content blocks.
    async fn send(
        &self,
        system_prompt: &str,
        history: &[Message],
        tool_choice: &ToolChoice,
    ) -> Result<Vec<ContentBlock>>;

    /// Classify a returned block: does it request tool execution?
    fn is_tool_message(&self, block: &ContentBlock) -> bool {
        matches!(block, ContentBlock::ToolUse { .. })
    }

    /// Classify a returned block: is it plain text?
    fn is_text_message(&self, block: &ContentBlock) -> bool {
        matches!(block, ContentBlock::Text { .. })
    }

    /// Extract tool calls from a block. One block can carry at most one call
    /// in the canonical model, but vendors may emit several blocks per turn.
    fn tool_calls(&self, block: &ContentBlock) -> Vec<ToolCall> {
        match block {
            ContentBlock::ToolUse { id, name, input } => vec![ToolCall {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }],
            _ => vec![],
        }
    }

    /// Get the text carried by a block
    fn text(&self, block: &ContentBlock) -> String {
        match block {
            ContentBlock::Text { text } => text.clone(),
            _ => String::new(),
        }
    }

    /// Build a plain user message
    fn user_message(&self, input: &str) -> Message {
        Message::user(input)
    }

    /// Build a user message carrying an image attachment
    ///
    /// Providers without image support degrade this to descriptive text.
    fn image_message(&self, image: &ImageSource, input: &str) -> Message;

    /// Build an assistant message from accumulated response text
    fn assistant_message(&self, text: &str) -> Message {
        Message::assistant(text)
    }

    /// Build the history entry recording a tool invocation
    fn tool_use_message(&self, call: &ToolCall) -> Message;

    /// Build the history entry carrying a tool result back to the model
    fn tool_result_message(&self, tool_use_id: &str, result: &str) -> Message;
}

/// How the model should choose to use tools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// Let the model decide
    #[default]
    Auto,
    /// Force a specific tool
    Tool(String),
}

/// Canonical tool definition, translated per vendor at the adapter boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Tool description
    pub description: String,

    /// Input schema (JSON Schema)
    pub input_schema: ToolInputSchema,
}

/// Input schema for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    /// Schema type (always "object")
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Property definitions
    pub properties: serde_json::Value,

    /// Required properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}
