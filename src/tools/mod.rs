// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool system for Sitecraft
//!
//! Declares the canonical tool set the model can request (file creation,
//! file writes, reads, listings, and web search) and the executor that
//! runs them. Adapters translate the canonical definitions into each
//! vendor's tool-declaration shape.

pub mod executor;
pub mod fs;
pub mod search;

pub use executor::{CustomToolHandler, ToolExecutor};
pub use search::TavilyClient;

use serde_json::Value;
use thiserror::Error;

use crate::llm::provider::{ToolDefinition, ToolInputSchema};

/// Error kinds produced by tool execution
///
/// These never escape the executor as failures: the orchestrator renders
/// them into descriptive result text that the model sees and can react to.
#[derive(Error, Debug)]
pub enum ToolError {
    /// A required argument was missing or malformed
    #[error("Invalid input for {tool} tool.")]
    InvalidInput { tool: String },

    /// No tool with this name is registered
    #[error("Tool not found.")]
    UnknownTool(String),

    /// Filesystem operation failed
    #[error("Error {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        source: std::io::Error,
    },

    /// Web search failed
    #[error("Error performing search: {0}")]
    Search(String),

    /// A custom handler reported a failure
    #[error("Error executing {tool}: {message}")]
    Custom { tool: String, message: String },
}

impl ToolError {
    /// Shorthand for the invalid-input case
    pub fn invalid_input(tool: impl Into<String>) -> Self {
        ToolError::InvalidInput { tool: tool.into() }
    }

    /// Render the error into the result text injected back into the
    /// conversation. Every variant keeps its recognizable prefix
    /// ("Invalid input", "Error", "Tool not found").
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Helper to build a tool input schema
pub struct SchemaBuilder {
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            properties: serde_json::Map::new(),
            required: vec![],
        }
    }

    /// Add a string property
    pub fn string(mut self, name: &str, description: &str, required: bool) -> Self {
        self.properties.insert(
            name.to_string(),
            serde_json::json!({
                "type": "string",
                "description": description
            }),
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Add an array-of-objects property
    pub fn object_array(
        mut self,
        name: &str,
        description: &str,
        item_properties: Value,
        item_required: &[&str],
        required: bool,
    ) -> Self {
        self.properties.insert(
            name.to_string(),
            serde_json::json!({
                "type": "array",
                "description": description,
                "items": {
                    "type": "object",
                    "properties": item_properties,
                    "required": item_required,
                }
            }),
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Build the schema
    pub fn build(self) -> ToolInputSchema {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Value::Object(self.properties),
            required: self.required,
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical definitions of the built-in chat tools
///
/// This is the single list every adapter translates from; no adapter keeps
/// its own tool table.
pub fn chat_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "create_files".to_string(),
            description: "Create one or more new files with the given contents. Parent directories are created as needed.".to_string(),
            input_schema: SchemaBuilder::new()
                .object_array(
                    "files",
                    "The files to create",
                    serde_json::json!({
                        "path": {"type": "string", "description": "Path of the file to create"},
                        "content": {"type": "string", "description": "Content of the file"},
                    }),
                    &["path", "content"],
                    true,
                )
                .build(),
        },
        ToolDefinition {
            name: "write_to_file".to_string(),
            description: "Write content to a file. If the file exists its content is updated and a summary of the line changes is reported; otherwise the file is created.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("path", "Path of the file to write", true)
                .string("content", "Full new content of the file", true)
                .build(),
        },
        ToolDefinition {
            name: "read_file".to_string(),
            description: "Read the contents of a file. If given a directory, the contents of every file inside it are concatenated.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("path", "Path of the file or directory to read", true)
                .build(),
        },
        ToolDefinition {
            name: "list_files".to_string(),
            description: "List the files and directories at the given path.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("path", "Path of the directory to list (defaults to the workspace root)", false)
                .build(),
        },
        ToolDefinition {
            name: "tavily_search".to_string(),
            description: "Search the web with Tavily and return the raw search results.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("query", "The search query", true)
                .build(),
        },
    ]
}
