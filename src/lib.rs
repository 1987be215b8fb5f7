// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Sitecraft - AI assistant for CMS theme and site work.
//!
//! The core is a multi-provider conversational tool-calling engine:
//! - `llm`: vendor-neutral message model, the `ChatProvider` trait, the
//!   Anthropic/OpenAI/Gemini adapters, and the provider factory
//! - `chat`: turn orchestration, the automode supervisor, and the system
//!   prompt machinery
//! - `tools`: built-in file and web-search tools plus the executor that
//!   routes model-requested calls
//! - `config`: settings loaded from `~/.sitecraft/settings.toml`
//!
//! The `sitecraft` binary (`src/main.rs`) wraps this in an interactive
//! terminal chat loop.

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod tools;
pub mod utils;

pub use error::{Result, SitecraftError};
