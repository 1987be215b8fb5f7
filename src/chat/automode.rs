// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Automode supervisor
//!
//! Runs the orchestrator autonomously: the user's goal goes in once, then
//! every following iteration is fed "Continue with the next step." until the
//! model signals completion, the iteration budget runs out, or the user
//! interrupts. Interruption is cooperative and observed at iteration
//! boundaries only; a turn in flight finishes first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use super::orchestrator::{ChatOrchestrator, TurnInput, TurnOutcome};
use super::prompt;

/// Default iteration budget
pub const DEFAULT_ITERATIONS: u32 = 25;

/// How an automode run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomodePhase {
    /// Not started
    Idle,
    /// Currently looping
    Running,
    /// The model emitted the completion phrase
    Completed,
    /// The iteration budget ran out
    Exhausted,
    /// The user interrupted the loop
    Interrupted,
}

/// Result of one automode run
#[derive(Debug, Clone, Copy)]
pub struct AutomodeOutcome {
    /// Terminal phase of the run
    pub phase: AutomodePhase,

    /// Iterations actually executed
    pub iterations_run: u32,
}

/// Supervises an automode loop over a `ChatOrchestrator`
pub struct AutomodeSupervisor {
    interrupt: Arc<AtomicBool>,
}

impl Default for AutomodeSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomodeSupervisor {
    pub fn new() -> Self {
        Self {
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle a signal handler (or another task) can set to stop the loop
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// Run automode until completion, exhaustion, or interruption.
    ///
    /// `on_turn` is invoked with each turn's outcome so the caller can
    /// display progress.
    pub async fn run(
        &self,
        orchestrator: &mut ChatOrchestrator,
        goal: impl Into<String>,
        max_iterations: u32,
        mut on_turn: impl FnMut(u32, &TurnOutcome),
    ) -> AutomodeOutcome {
        self.interrupt.store(false, Ordering::SeqCst);
        orchestrator.set_automode(true);

        let mut input = goal.into();
        let mut iterations_run = 0;
        let mut phase = AutomodePhase::Running;

        while phase == AutomodePhase::Running {
            if self.interrupt.load(Ordering::SeqCst) {
                info!("automode interrupted");
                orchestrator.note_interruption();
                phase = AutomodePhase::Interrupted;
                break;
            }

            if iterations_run >= max_iterations {
                info!(max_iterations, "automode iteration budget exhausted");
                phase = AutomodePhase::Exhausted;
                break;
            }

            let iteration = iterations_run + 1;
            let outcome = orchestrator
                .send_turn(
                    TurnInput::text(input.clone()),
                    Some((iteration, max_iterations)),
                )
                .await;
            iterations_run = iteration;
            on_turn(iteration, &outcome);

            if outcome.completed || prompt::contains_exit_phrase(&outcome.response) {
                info!(iteration, "automode completed");
                phase = AutomodePhase::Completed;
                break;
            }

            input = prompt::CONTINUATION_PROMPT.to_string();
        }

        orchestrator.set_automode(false);

        AutomodeOutcome {
            phase,
            iterations_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::error::{ApiError, Result, SitecraftError};
    use crate::llm::message::{ContentBlock, ImageSource, Message, Role, ToolCall};
    use crate::llm::provider::{ChatProvider, ToolChoice};
    use crate::tools::ToolExecutor;

    struct LoopProvider {
        responses: Mutex<VecDeque<Result<Vec<ContentBlock>>>>,
        seen_inputs: Mutex<Vec<String>>,
    }

    impl LoopProvider {
        fn new(texts: Vec<Result<Vec<ContentBlock>>>) -> Self {
            Self {
                responses: Mutex::new(texts.into()),
                seen_inputs: Mutex::new(vec![]),
            }
        }

        fn text(text: &str) -> Result<Vec<ContentBlock>> {
            Ok(vec![ContentBlock::Text {
                text: text.to_string(),
            }])
        }
    }

    #[async_trait]
    impl ChatProvider for LoopProvider {
        fn name(&self) -> &str {
            "loop"
        }

        async fn send(
            &self,
            _system_prompt: &str,
            history: &[Message],
            _tool_choice: &ToolChoice,
        ) -> Result<Vec<ContentBlock>> {
            if let Some(last) = history.last().and_then(|m| m.text()) {
                self.seen_inputs.lock().unwrap().push(last.to_string());
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| LoopProvider::text("working on it"))
        }

        fn image_message(&self, _image: &ImageSource, input: &str) -> Message {
            Message::user(input)
        }

        fn tool_use_message(&self, call: &ToolCall) -> Message {
            Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: call.id.clone(),
                name: call.name.clone(),
                input: call.input.clone(),
            }])
        }

        fn tool_result_message(&self, tool_use_id: &str, result: &str) -> Message {
            Message::user_blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.to_string(),
                content: result.to_string(),
            }])
        }
    }

    fn orchestrator(
        temp: &TempDir,
        responses: Vec<Result<Vec<ContentBlock>>>,
    ) -> (ChatOrchestrator, Arc<LoopProvider>) {
        let provider = Arc::new(LoopProvider::new(responses));
        let executor = ToolExecutor::new(temp.path().to_path_buf());
        let orch = ChatOrchestrator::new(
            provider.clone(),
            executor,
            prompt::SYSTEM_PROMPT_TEMPLATE,
            "themes/custom",
        );
        (orch, provider)
    }

    #[tokio::test]
    async fn test_completes_on_exit_phrase() {
        let temp = TempDir::new().unwrap();
        let (mut orch, provider) = orchestrator(
            &temp,
            vec![
                LoopProvider::text("step one done"),
                LoopProvider::text("step two done"),
                LoopProvider::text("All finished. AUTOMODE_COMPLETE"),
            ],
        );

        let supervisor = AutomodeSupervisor::new();
        let outcome = supervisor
            .run(&mut orch, "build the theme", 25, |_, _| {})
            .await;

        assert_eq!(outcome.phase, AutomodePhase::Completed);
        assert_eq!(outcome.iterations_run, 3);

        // The first iteration carries the goal, the rest the continuation
        // prompt.
        let inputs = provider.seen_inputs.lock().unwrap();
        assert_eq!(inputs[0], "build the theme");
        assert_eq!(inputs[1], prompt::CONTINUATION_PROMPT);
        assert_eq!(inputs[2], prompt::CONTINUATION_PROMPT);
    }

    #[tokio::test]
    async fn test_exhausts_iteration_budget() {
        let temp = TempDir::new().unwrap();
        let (mut orch, _) = orchestrator(&temp, vec![]);

        let supervisor = AutomodeSupervisor::new();
        let mut turns = 0;
        let outcome = supervisor
            .run(&mut orch, "never finishes", 3, |_, _| turns += 1)
            .await;

        assert_eq!(outcome.phase, AutomodePhase::Exhausted);
        assert_eq!(outcome.iterations_run, 3);
        assert_eq!(turns, 3);
    }

    #[tokio::test]
    async fn test_interrupt_observed_at_iteration_boundary() {
        let temp = TempDir::new().unwrap();
        let (mut orch, _) = orchestrator(&temp, vec![]);

        let supervisor = AutomodeSupervisor::new();

        // Set the flag from the first turn callback; the loop only notices
        // it at the next boundary.
        let handle = supervisor.interrupt_handle();
        let outcome = supervisor
            .run(&mut orch, "long task", 25, |_, _| {
                handle.store(true, Ordering::SeqCst)
            })
            .await;

        assert_eq!(outcome.phase, AutomodePhase::Interrupted);
        assert_eq!(outcome.iterations_run, 1);
    }

    #[tokio::test]
    async fn test_interrupt_synthesizes_assistant_reply() {
        let temp = TempDir::new().unwrap();
        // The provider fails, so the history ends with the user message.
        let (mut orch, _) = orchestrator(
            &temp,
            vec![Err(SitecraftError::Api(ApiError::Network(
                "down".to_string(),
            )))],
        );

        let supervisor = AutomodeSupervisor::new();
        let handle = supervisor.interrupt_handle();
        supervisor
            .run(&mut orch, "do things", 25, |_, _| {
                handle.store(true, Ordering::SeqCst)
            })
            .await;

        let last = orch.history().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(
            last.text(),
            Some("Automode interrupted. How can I assist you further?")
        );
    }

    #[tokio::test]
    async fn test_iteration_info_rendered_into_prompt() {
        let temp = TempDir::new().unwrap();

        struct PromptCapture {
            prompts: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl ChatProvider for PromptCapture {
            fn name(&self) -> &str {
                "capture"
            }

            async fn send(
                &self,
                system_prompt: &str,
                _history: &[Message],
                _tool_choice: &ToolChoice,
            ) -> Result<Vec<ContentBlock>> {
                self.prompts.lock().unwrap().push(system_prompt.to_string());
                Ok(vec![ContentBlock::Text {
                    text: "ok".to_string(),
                }])
            }

            fn image_message(&self, _image: &ImageSource, input: &str) -> Message {
                Message::user(input)
            }

            fn tool_use_message(&self, call: &ToolCall) -> Message {
                Message::assistant(call.name.clone())
            }

            fn tool_result_message(&self, _tool_use_id: &str, result: &str) -> Message {
                Message::user(result)
            }
        }

        let provider = Arc::new(PromptCapture {
            prompts: Mutex::new(vec![]),
        });
        let executor = ToolExecutor::new(temp.path().to_path_buf());
        let mut orch = ChatOrchestrator::new(
            provider.clone(),
            executor,
            prompt::SYSTEM_PROMPT_TEMPLATE,
            "themes/custom",
        );

        let supervisor = AutomodeSupervisor::new();
        supervisor.run(&mut orch, "go", 2, |_, _| {}).await;

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("You are currently in automode."));
        assert!(prompts[0].contains("iteration 1 out of 2"));
        assert!(prompts[1].contains("iteration 2 out of 2"));
    }
}
