// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! End-to-end chat flows over a scripted provider: tool pipelines against a
//! real workspace, automode runs, and failure handling.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use sitecraft::chat::{
    prompt, AutomodePhase, AutomodeSupervisor, ChatOrchestrator, TurnInput,
};
use sitecraft::error::{ApiError, Result, SitecraftError};
use sitecraft::llm::message::{ContentBlock, ImageSource, Message, Role, ToolCall};
use sitecraft::llm::provider::{ChatProvider, ToolChoice};
use sitecraft::tools::ToolExecutor;

/// Provider double that replays a script of responses
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<Vec<ContentBlock>>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<Vec<ContentBlock>>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }

    fn text(text: &str) -> Result<Vec<ContentBlock>> {
        Ok(vec![ContentBlock::Text {
            text: text.to_string(),
        }])
    }

    fn tool_use(id: &str, name: &str, input: serde_json::Value) -> ContentBlock {
        ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(
        &self,
        _system_prompt: &str,
        _history: &[Message],
        _tool_choice: &ToolChoice,
    ) -> Result<Vec<ContentBlock>> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedProvider::text("carrying on"))
    }

    fn image_message(&self, _image: &ImageSource, input: &str) -> Message {
        Message::user(format!("User input for image: {}", input))
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

fn orchestrator_with(
    workspace: &TempDir,
    provider: Arc<ScriptedProvider>,
) -> ChatOrchestrator {
    ChatOrchestrator::new(
        provider,
        ToolExecutor::new(workspace.path().to_path_buf()),
        prompt::SYSTEM_PROMPT_TEMPLATE,
        "themes/custom",
    )
}

#[tokio::test]
async fn test_create_then_edit_file_pipeline() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        // Turn 1: the model creates a stylesheet.
        Ok(vec![ScriptedProvider::tool_use(
            "t1",
            "create_files",
            serde_json::json!({
                "files": [{"path": "css/site.css", "content": "body { margin: 0; }"}]
            }),
        )]),
        ScriptedProvider::text("Created css/site.css."),
        // Turn 2: the model rewrites it.
        Ok(vec![ScriptedProvider::tool_use(
            "t2",
            "write_to_file",
            serde_json::json!({
                "path": "css/site.css",
                "content": "body { margin: 0; }\nh1 { color: teal; }"
            }),
        )]),
        ScriptedProvider::text("Added the heading rule."),
    ]);
    let mut orch = orchestrator_with(&workspace, provider);

    let first = orch
        .send_turn(TurnInput::text("make a stylesheet"), None)
        .await;
    assert_eq!(first.response, "Created css/site.css.");

    let second = orch
        .send_turn(TurnInput::text("now style the heading"), None)
        .await;
    assert_eq!(second.response, "Added the heading rule.");

    let content = std::fs::read_to_string(workspace.path().join("css/site.css")).unwrap();
    assert!(content.contains("h1 { color: teal; }"));

    // Both turns recorded a matched tool use/result pair.
    let messages = orch.history().messages();
    let result_ids: Vec<&str> = messages
        .iter()
        .flat_map(|m| m.tool_result_ids())
        .collect();
    assert_eq!(result_ids, vec!["t1", "t2"]);
}

#[tokio::test]
async fn test_tool_result_text_reaches_history() {
    let workspace = TempDir::new().unwrap();
    std::fs::write(workspace.path().join("notes.txt"), "remember the footer").unwrap();

    let provider = ScriptedProvider::new(vec![
        Ok(vec![ScriptedProvider::tool_use(
            "t1",
            "read_file",
            serde_json::json!({"path": "notes.txt"}),
        )]),
        ScriptedProvider::text("The note says to remember the footer."),
    ]);
    let mut orch = orchestrator_with(&workspace, provider);

    orch.send_turn(TurnInput::text("what do my notes say?"), None)
        .await;

    let messages = orch.history().messages();
    let result_message = messages
        .iter()
        .find(|m| !m.tool_result_ids().is_empty())
        .unwrap();
    match &result_message.content {
        sitecraft::llm::message::MessageContent::Blocks(blocks) => {
            assert!(matches!(
                &blocks[0],
                ContentBlock::ToolResult { content, .. } if content == "remember the footer"
            ));
        }
        other => panic!("expected blocks, got {other:?}"),
    }
}

#[tokio::test]
async fn test_automode_runs_to_completion() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        Ok(vec![ScriptedProvider::tool_use(
            "t1",
            "create_files",
            serde_json::json!({
                "files": [{"path": "index.html", "content": "<h1>Hi</h1>"}]
            }),
        )]),
        ScriptedProvider::text("Page scaffolded."),
        ScriptedProvider::text("Verified the page. AUTOMODE_COMPLETE"),
    ]);
    let mut orch = orchestrator_with(&workspace, provider);

    let supervisor = AutomodeSupervisor::new();
    let outcome = supervisor
        .run(&mut orch, "scaffold a landing page", 25, |_, _| {})
        .await;

    assert_eq!(outcome.phase, AutomodePhase::Completed);
    assert_eq!(outcome.iterations_run, 2);
    assert!(workspace.path().join("index.html").exists());
}

#[tokio::test]
async fn test_automode_budget_exhaustion() {
    let workspace = TempDir::new().unwrap();
    // The default "carrying on" response never completes.
    let provider = ScriptedProvider::new(vec![]);
    let mut orch = orchestrator_with(&workspace, provider);

    let supervisor = AutomodeSupervisor::new();
    let outcome = supervisor.run(&mut orch, "endless task", 4, |_, _| {}).await;

    assert_eq!(outcome.phase, AutomodePhase::Exhausted);
    assert_eq!(outcome.iterations_run, 4);
}

#[tokio::test]
async fn test_automode_interrupt_midway() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![]);
    let mut orch = orchestrator_with(&workspace, provider);

    let supervisor = AutomodeSupervisor::new();
    let handle = supervisor.interrupt_handle();
    let outcome = supervisor
        .run(&mut orch, "long task", 25, move |iteration, _| {
            if iteration == 2 {
                handle.store(true, Ordering::SeqCst);
            }
        })
        .await;

    assert_eq!(outcome.phase, AutomodePhase::Interrupted);
    assert_eq!(outcome.iterations_run, 2);
    // The history ends with an assistant message, not a dangling user turn.
    assert_eq!(orch.history().last().unwrap().role, Role::Assistant);
}

#[tokio::test]
async fn test_provider_failure_mid_automode() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::text("step one"),
        Err(SitecraftError::Api(ApiError::ServerError {
            status: 529,
            message: "overloaded".to_string(),
        })),
        ScriptedProvider::text("recovered. AUTOMODE_COMPLETE"),
    ]);
    let mut orch = orchestrator_with(&workspace, provider);

    let mut seen = vec![];
    let supervisor = AutomodeSupervisor::new();
    let outcome = supervisor
        .run(&mut orch, "resilient task", 25, |_, turn| {
            seen.push(turn.response.clone())
        })
        .await;

    // The apology is just another turn; the loop keeps going.
    assert_eq!(outcome.phase, AutomodePhase::Completed);
    assert_eq!(seen[1], prompt::APOLOGY);
}

#[tokio::test]
async fn test_sentinel_inside_quotes_still_completes() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![ScriptedProvider::text(
        "I will write \"AUTOMODE_COMPLETE\" once finished.",
    )]);
    let mut orch = orchestrator_with(&workspace, provider);

    let supervisor = AutomodeSupervisor::new();
    let outcome = supervisor.run(&mut orch, "careful task", 25, |_, _| {}).await;

    // Substring detection has no quoting awareness.
    assert_eq!(outcome.phase, AutomodePhase::Completed);
    assert_eq!(outcome.iterations_run, 1);
}
