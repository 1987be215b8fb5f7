// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool execution engine
//!
//! Maps a tool name to its implementation and converts every failure path
//! into a descriptive result string. Execution never propagates an error to
//! the orchestrator: the model sees failures as ordinary tool results and
//! may react to them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::{fs, ToolError};
use crate::tools::TavilyClient;

/// Handler for caller-registered custom tools
pub type CustomToolHandler =
    Arc<dyn Fn(&Value) -> std::result::Result<String, ToolError> + Send + Sync>;

/// Executes tools requested by the model
pub struct ToolExecutor {
    /// Root against which relative tool paths are resolved
    workspace_root: PathBuf,
    /// Web search client, absent when no Tavily key is configured
    search: Option<TavilyClient>,
    /// Custom handlers resolved for unknown tool names
    custom: HashMap<String, CustomToolHandler>,
}

impl ToolExecutor {
    /// Create a new executor rooted at the given workspace directory
    pub fn new(workspace_root: PathBuf) -> Self {
        Self {
            workspace_root,
            search: None,
            custom: HashMap::new(),
        }
    }

    /// Attach a web search client
    pub fn with_search(mut self, client: TavilyClient) -> Self {
        self.search = Some(client);
        self
    }

    /// Register a custom handler for a tool name not in the built-in set
    pub fn register_custom(&mut self, name: impl Into<String>, handler: CustomToolHandler) {
        self.custom.insert(name.into(), handler);
    }

    /// Execute a tool and render any failure into result text
    ///
    /// This is the orchestrator-facing entry point; it always produces a
    /// result string, even on failure.
    pub async fn execute(&self, name: &str, input: &Value) -> String {
        match self.try_execute(name, input).await {
            Ok(output) => output,
            Err(err) => {
                warn!(tool = name, error = %err, "tool execution failed");
                err.render()
            }
        }
    }

    /// Execute a tool, keeping the error kind explicit
    pub async fn try_execute(
        &self,
        name: &str,
        input: &Value,
    ) -> std::result::Result<String, ToolError> {
        debug!(tool = name, "executing tool");

        match name {
            "create_files" => self.create_files(input),
            "write_to_file" => self.write_to_file(input),
            "read_file" => self.read_file(input),
            "list_files" => self.list_files(input),
            "tavily_search" => self.tavily_search(input).await,
            _ => match self.custom.get(name) {
                Some(handler) => handler(input),
                None => Err(ToolError::UnknownTool(name.to_string())),
            },
        }
    }

    fn create_files(&self, input: &Value) -> std::result::Result<String, ToolError> {
        let files = input["files"]
            .as_array()
            .ok_or_else(|| ToolError::invalid_input("create_files"))?;

        let mut results = Vec::new();
        for file in files {
            let path = file["path"]
                .as_str()
                .ok_or_else(|| ToolError::invalid_input("create_files"))?;
            let content = file["content"].as_str().unwrap_or_default();

            let resolved = fs::resolve(&self.workspace_root, path);
            match fs::create_file(&resolved, content.trim()) {
                Ok(result) => results.push(result),
                Err(err) => results.push(err.render()),
            }
        }

        Ok(results.join("\n"))
    }

    fn write_to_file(&self, input: &Value) -> std::result::Result<String, ToolError> {
        let path = input["path"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ToolError::invalid_input("write_to_file"))?;
        let content = input["content"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ToolError::invalid_input("write_to_file"))?;

        let resolved = fs::resolve(&self.workspace_root, path);
        fs::write_to_file(&resolved, content.trim())
    }

    fn read_file(&self, input: &Value) -> std::result::Result<String, ToolError> {
        let path = input["path"]
            .as_str()
            .ok_or_else(|| ToolError::invalid_input("read_file"))?;

        let resolved = fs::resolve(&self.workspace_root, path);
        fs::read_file(&resolved)
    }

    fn list_files(&self, input: &Value) -> std::result::Result<String, ToolError> {
        let resolved = match input["path"].as_str() {
            Some(path) => fs::resolve(&self.workspace_root, path),
            None => self.workspace_root.clone(),
        };

        fs::list_files(&resolved)
    }

    async fn tavily_search(&self, input: &Value) -> std::result::Result<String, ToolError> {
        let query = input["query"]
            .as_str()
            .ok_or_else(|| ToolError::invalid_input("tavily_search"))?;

        let client = self
            .search
            .as_ref()
            .ok_or_else(|| ToolError::Search("no Tavily API key configured".to_string()))?;

        client.search(query).await
    }
}
