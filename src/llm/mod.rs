// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM provider abstraction layer
//!
//! A vendor-neutral message model, the `ChatProvider` trait, the concrete
//! adapters, and the factory that maps a model identifier to an adapter.

pub mod factory;
pub mod message;
pub mod provider;
pub mod providers;

pub use message::{Conversation, ContentBlock, ImageSource, Message, MessageContent, Role, ToolCall};
pub use provider::{ChatProvider, ToolChoice, ToolDefinition, ToolInputSchema};
