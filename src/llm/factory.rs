// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Provider factory
//!
//! Maps a model identifier to its adapter family and checks the credential
//! before constructing anything. A missing key or an unknown model is a
//! configuration error raised before any network call.

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::error::{Result, SitecraftError};
use crate::llm::provider::ChatProvider;
use crate::llm::providers::{AnthropicProvider, GeminiProvider, OpenAiProvider};

/// Build the provider adapter for a model identifier
pub fn build(model: &str, settings: &Settings) -> Result<Arc<dyn ChatProvider>> {
    if model.starts_with("claude") {
        let api_key = settings.providers.anthropic.resolve_key().ok_or_else(|| {
            SitecraftError::Config("Anthropic API key not set.".to_string())
        })?;

        info!(model, provider = "anthropic", "building provider");
        return Ok(Arc::new(AnthropicProvider::with_model(api_key, model)));
    }

    if model.starts_with("gpt") {
        let api_key = settings
            .providers
            .openai
            .resolve_key()
            .ok_or_else(|| SitecraftError::Config("OpenAI API key not set.".to_string()))?;

        info!(model, provider = "openai", "building provider");
        return Ok(Arc::new(OpenAiProvider::with_model(api_key, model)));
    }

    if model.starts_with("gemini") {
        let api_key = settings
            .providers
            .gemini
            .resolve_key()
            .ok_or_else(|| SitecraftError::Config("Gemini API key not set.".to_string()))?;

        info!(model, provider = "gemini", "building provider");
        return Ok(Arc::new(GeminiProvider::with_model(api_key, model)));
    }

    Err(SitecraftError::Config(format!("Invalid model: {}", model)))
}
