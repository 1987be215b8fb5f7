// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Sitecraft - AI assistant for your CMS, in the terminal
//!
//! Entry point for the Sitecraft CLI application.

use std::io::{self, Write};
use std::sync::atomic::Ordering;

use clap::Parser;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::ExecutableCommand;

use sitecraft::chat::{
    prompt, AutomodePhase, AutomodeSupervisor, ChatOrchestrator, TurnInput,
};
use sitecraft::cli::{parse_chat_command, ChatArgs, ChatCommand, Cli, Commands};
use sitecraft::config::Settings;
use sitecraft::error::Result;
use sitecraft::llm::factory;
use sitecraft::tools::{TavilyClient, ToolExecutor};
use sitecraft::utils::{self, ResponseSegment};

const USER_COLOR: Color = Color::White;
const MODEL_COLOR: Color = Color::Blue;
const TOOL_COLOR: Color = Color::Yellow;
const RESULT_COLOR: Color = Color::Green;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if cli.verbose > 0 {
        if let Ok(directive) = "sitecraft=debug".parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Settings::load()?;

    match cli.command {
        None => run_chat(ChatArgs::default(), settings).await,
        Some(Commands::Chat(args)) => run_chat(args, settings).await,
    }
}

async fn run_chat(args: ChatArgs, settings: Settings) -> Result<()> {
    let model = args
        .model
        .unwrap_or_else(|| settings.defaults.model.clone());
    let provider = factory::build(&model, &settings)?;

    let mut executor = ToolExecutor::new(settings.workspace.root.clone());
    if let Some(key) = settings.tavily.resolve_key() {
        executor = executor.with_search(TavilyClient::new(key));
    }

    let template = settings
        .defaults
        .system_prompt_template
        .clone()
        .unwrap_or_else(|| prompt::SYSTEM_PROMPT_TEMPLATE.to_string());

    let mut orchestrator = ChatOrchestrator::new(
        provider,
        executor,
        template,
        settings.workspace.theme_folder.clone(),
    );

    print_colored("Welcome to Sitecraft Chat with Image Support!", MODEL_COLOR);
    print_colored("Type 'exit' to end the conversation.", MODEL_COLOR);
    print_colored(
        "Type 'image' to include an image in your message.",
        MODEL_COLOR,
    );
    print_colored(
        "Type 'automode [number]' to enter autonomous mode with a specific number of iterations.",
        MODEL_COLOR,
    );
    print_colored("Type 'scrape' to scrape a website page.", MODEL_COLOR);
    print_colored(
        "While in automode, press Ctrl+C at any time to return to regular chat.",
        MODEL_COLOR,
    );

    loop {
        let input = read_user_input("You")?;

        match parse_chat_command(&input, settings.defaults.automode_iterations) {
            ChatCommand::Empty => {
                print_colored("Please enter a message.", MODEL_COLOR);
            }
            ChatCommand::Exit => {
                print_colored("Thank you for chatting. Goodbye!", MODEL_COLOR);
                break;
            }
            ChatCommand::Scrape => {
                let url = read_user_input("Enter URL to scrape here")?;
                match utils::scrape_url(&url).await {
                    Ok(content) => {
                        let outcome = orchestrator
                            .send_turn(
                                TurnInput::text(format!(
                                    "Please give me a one sentence summary of this content: {}",
                                    content
                                )),
                                None,
                            )
                            .await;
                        display_response(&outcome.response);
                    }
                    Err(_) => {
                        print_colored(
                            "Invalid URL or scraping failed. Please try again.",
                            MODEL_COLOR,
                        );
                    }
                }
            }
            ChatCommand::Image => {
                let url = read_user_input("Enter URL for image here")?;
                if !utils::is_valid_url(&url) {
                    print_colored("Invalid image path. Please try again.", MODEL_COLOR);
                    continue;
                }

                let text = read_user_input("You (prompt for image)")?;
                print_colored(&format!("Processing image at URL: {}", url), TOOL_COLOR);

                match utils::fetch_image(&url).await {
                    Ok(image) => {
                        let outcome = orchestrator
                            .send_turn(TurnInput::with_image(text, image), None)
                            .await;
                        display_response(&outcome.response);
                    }
                    Err(_) => {
                        print_colored(prompt::IMAGE_APOLOGY, TOOL_COLOR);
                    }
                }
            }
            ChatCommand::Automode(max_iterations) => {
                print_colored(
                    &format!(
                        "Entering automode with {} iterations. Press Ctrl+C to exit automode at any time.",
                        max_iterations
                    ),
                    TOOL_COLOR,
                );

                let goal = read_user_input("You")?;

                let supervisor = AutomodeSupervisor::new();
                let handle = supervisor.interrupt_handle();
                let watcher = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        handle.store(true, Ordering::SeqCst);
                    }
                });

                let outcome = supervisor
                    .run(&mut orchestrator, goal, max_iterations, |iteration, turn| {
                        display_response(&turn.response);
                        if !turn.completed {
                            print_colored(
                                &format!("Continuation iteration {} completed.", iteration),
                                TOOL_COLOR,
                            );
                        }
                    })
                    .await;
                watcher.abort();

                match outcome.phase {
                    AutomodePhase::Completed => {
                        print_colored("Automode completed.", TOOL_COLOR)
                    }
                    AutomodePhase::Exhausted => print_colored(
                        "Max iterations reached. Exiting automode.",
                        TOOL_COLOR,
                    ),
                    AutomodePhase::Interrupted => print_colored(
                        "Automode interrupted by user. Exiting automode.",
                        TOOL_COLOR,
                    ),
                    _ => {}
                }
            }
            ChatCommand::InvalidAutomode => {
                print_colored(
                    "Invalid iteration count. Use 'automode' or 'automode <positive number>'.",
                    MODEL_COLOR,
                );
            }
            ChatCommand::Say(text) => {
                let outcome = orchestrator.send_turn(TurnInput::text(text), None).await;
                display_response(&outcome.response);
            }
        }
    }

    Ok(())
}

/// Print an assistant response, rendering fenced code blocks distinctly
fn display_response(response: &str) {
    if response.starts_with("Error") || response.starts_with("I'm sorry") {
        print_colored(response, TOOL_COLOR);
        return;
    }

    for segment in utils::format_response_segments(response) {
        match segment {
            ResponseSegment::Prose(text) => print_colored(&text, MODEL_COLOR),
            ResponseSegment::Code(code) => {
                print_colored(&format!("Code:\n{}", code), RESULT_COLOR)
            }
        }
    }
}

fn read_user_input(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    let _ = stdout.execute(SetForegroundColor(USER_COLOR));
    print!("\n{}: ", label);
    let _ = stdout.execute(ResetColor);
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_colored(text: &str, color: Color) {
    let mut stdout = io::stdout();
    let _ = stdout.execute(SetForegroundColor(color));
    println!("{}", text);
    let _ = stdout.execute(ResetColor);
}
