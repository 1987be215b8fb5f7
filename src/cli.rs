// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions and chat input parsing
//!
//! Clap argument surface plus the parser that classifies raw chat-loop
//! input into commands.

use clap::{Parser, Subcommand};

/// Sitecraft - AI assistant for CMS theme and site work
#[derive(Parser, Debug)]
#[command(name = "sitecraft")]
#[command(version, about = "AI assistant for CMS theme and site work")]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive chat session (default when no command given)
    Chat(ChatArgs),
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Model identifier (e.g. claude-3-haiku-20240307, gpt-3.5-turbo-0125,
    /// gemini-1.5-pro)
    #[arg(short, long)]
    pub model: Option<String>,
}

/// A classified line of chat-loop input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Empty input, prompt again
    Empty,
    /// End the session
    Exit,
    /// Attach an image to the next message
    Image,
    /// Scrape a page and summarize it
    Scrape,
    /// Enter automode with an iteration budget
    Automode(u32),
    /// Automode with an argument that is not a positive iteration count
    InvalidAutomode,
    /// Ordinary chat text
    Say(String),
}

/// Classify one line of user input
///
/// `automode_budget` is the configured iteration budget used when the
/// automode command carries no explicit count.
pub fn parse_chat_command(input: &str, automode_budget: u32) -> ChatCommand {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ChatCommand::Empty;
    }

    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "exit" => return ChatCommand::Exit,
        "image" => return ChatCommand::Image,
        "scrape" => return ChatCommand::Scrape,
        _ => {}
    }

    if lower.starts_with("automode") {
        return match trimmed.split_whitespace().nth(1) {
            None => ChatCommand::Automode(automode_budget),
            Some(arg) => match arg.parse::<u32>() {
                Ok(n) if n > 0 => ChatCommand::Automode(n),
                _ => ChatCommand::InvalidAutomode,
            },
        };
    }

    ChatCommand::Say(trimmed.to_string())
}
