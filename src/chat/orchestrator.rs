// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation orchestrator
//!
//! Drives one chat turn end to end: compose the user message, send the
//! full history, execute any requested tools, re-ask once with the results
//! appended, and record the assistant response. A failed provider call
//! aborts the turn with a fixed apology; whatever was already appended to
//! the history stays there.

use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::prompt;
use crate::llm::message::{Conversation, ImageSource, Message};
use crate::llm::provider::{ChatProvider, ToolChoice};
use crate::tools::ToolExecutor;

/// Inputs that look like file edits get a forced `write_to_file` tool choice
fn edit_intent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(add|edit|update|change|modify)\s").unwrap())
}

/// One user turn: text, optionally with an image attached
#[derive(Debug, Clone)]
pub struct TurnInput {
    text: String,
    image: Option<ImageSource>,
}

impl TurnInput {
    /// Plain text input
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    /// Text input with an image attachment
    pub fn with_image(text: impl Into<String>, image: ImageSource) -> Self {
        Self {
            text: text.into(),
            image: Some(image),
        }
    }
}

/// Result of one chat turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Assistant response text shown to the user
    pub response: String,

    /// Whether the response carried the automode completion phrase
    pub completed: bool,
}

/// Drives the ask → execute-tools → re-ask protocol over one conversation
pub struct ChatOrchestrator {
    provider: Arc<dyn ChatProvider>,
    executor: ToolExecutor,
    conversation: Conversation,
    template: String,
    theme_folder: String,
    automode: bool,
}

impl ChatOrchestrator {
    /// Create an orchestrator for a fresh conversation
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        executor: ToolExecutor,
        template: impl Into<String>,
        theme_folder: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            executor,
            conversation: Conversation::new(),
            template: template.into(),
            theme_folder: theme_folder.into(),
            automode: false,
        }
    }

    /// Conversation history accumulated so far
    pub fn history(&self) -> &Conversation {
        &self.conversation
    }

    /// Toggle the automode flag rendered into the system prompt
    pub fn set_automode(&mut self, automode: bool) {
        self.automode = automode;
    }

    /// Record that automode was interrupted, answering a dangling user
    /// message so the history does not end mid-exchange
    pub fn note_interruption(&mut self) {
        let dangling = self
            .conversation
            .last()
            .map(|m| m.role == crate::llm::message::Role::User)
            .unwrap_or(false);

        if dangling {
            self.conversation.push(
                self.provider
                    .assistant_message("Automode interrupted. How can I assist you further?"),
            );
        }
    }

    /// Run one chat turn
    pub async fn send_turn(
        &mut self,
        input: TurnInput,
        iteration: Option<(u32, u32)>,
    ) -> TurnOutcome {
        let tool_choice = self.compose(input);
        let system_prompt = prompt::render_system_prompt(
            &self.template,
            self.automode,
            iteration,
            &self.theme_folder,
        );

        let blocks = match self
            .provider
            .send(&system_prompt, self.conversation.messages(), &tool_choice)
            .await
        {
            Ok(blocks) => blocks,
            Err(err) => {
                warn!(error = %err, "provider call failed, aborting turn");
                return TurnOutcome {
                    response: prompt::APOLOGY.to_string(),
                    completed: false,
                };
            }
        };

        let mut response = String::new();
        let mut completed = false;

        for block in &blocks {
            if self.provider.is_tool_message(block) {
                for call in self.provider.tool_calls(block) {
                    info!(tool = %call.name, "executing requested tool");
                    let result = self.executor.execute(&call.name, &call.input).await;
                    debug!(tool = %call.name, result = %result, "tool finished");

                    self.conversation.push(self.provider.tool_use_message(&call));
                    self.conversation
                        .push(self.provider.tool_result_message(&call.id, &result));
                }

                // Re-ask with the tool results appended. The re-ask text
                // replaces anything accumulated so far.
                let followup = match self
                    .provider
                    .send(&system_prompt, self.conversation.messages(), &ToolChoice::Auto)
                    .await
                {
                    Ok(followup) => followup,
                    Err(err) => {
                        warn!(error = %err, "provider re-ask failed, aborting turn");
                        return TurnOutcome {
                            response: prompt::APOLOGY.to_string(),
                            completed: false,
                        };
                    }
                };

                for block in &followup {
                    if self.provider.is_text_message(block) {
                        response = self.provider.text(block);
                    }
                }
            } else if self.provider.is_text_message(block) {
                let text = self.provider.text(block);
                response.push_str(&text);
                if prompt::contains_exit_phrase(&text) {
                    completed = true;
                }
            }
        }

        if !response.is_empty() {
            self.conversation
                .push(self.provider.assistant_message(&response));
        }

        TurnOutcome {
            response,
            completed,
        }
    }

    /// Compose the user-side message for this turn and pick the tool choice
    fn compose(&mut self, input: TurnInput) -> ToolChoice {
        if let Some(image) = input.image {
            self.conversation
                .push(self.provider.image_message(&image, &input.text));
            return ToolChoice::Auto;
        }

        let mut text = input.text;
        let tool_choice = if edit_intent_regex().is_match(&text) {
            text.push_str(" (write_to_file)");
            ToolChoice::Tool("write_to_file".to_string())
        } else {
            ToolChoice::Auto
        };

        self.conversation.push(self.provider.user_message(&text));
        tool_choice
    }
}
