// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tavily web search client
//!
//! Thin wrapper over the Tavily HTTP API, used by the `tavily_search` tool.
//! The raw response body is returned unparsed; the model consumes it as-is.

use reqwest::Client;
use serde::Serialize;

use super::ToolError;

const TAVILY_API_URL: &str = "https://api.tavily.com/search";

/// Tavily search client
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    include_images: bool,
    include_raw_content: bool,
    max_results: u32,
    include_domains: Vec<String>,
    exclude_domains: Vec<String>,
}

impl TavilyClient {
    /// Create a new Tavily client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: TAVILY_API_URL.to_string(),
        }
    }

    /// Create with a custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Run a basic-depth search and return the raw response body
    pub async fn search(&self, query: &str) -> Result<String, ToolError> {
        let body = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            include_answer: false,
            include_images: true,
            include_raw_content: false,
            max_results: 5,
            include_domains: vec![],
            exclude_domains: vec![],
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::Search(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::Search(format!(
                "search returned status {}",
                response.status().as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ToolError::Search(e.to_string()))
    }
}
