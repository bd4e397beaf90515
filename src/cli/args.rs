// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for Fahz.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fahz GPT - the Fahz-Company AI assistant for your terminal
#[derive(Parser, Debug)]
#[command(name = "fahz")]
#[command(version, about = "Fahz GPT for your terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (defaults to ~/.fahz/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat model to use
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 1.5)
    #[arg(short, long, global = true)]
    pub temperature: Option<f32>,

    /// System prompt override
    #[arg(long, global = true)]
    pub system_prompt: Option<String>,

    /// Persona to start with
    #[arg(short, long, global = true)]
    pub persona: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive chat interface (default when no command given)
    Chat,

    /// Ask a single question (non-interactive)
    Ask(AskArgs),

    /// Generate an image from a prompt
    Image(PromptArgs),

    /// Generate a video from a prompt
    Video(PromptArgs),

    /// List the available personas
    Personas,
}

/// Arguments for the ask subcommand
#[derive(clap::Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub prompt: String,

    /// Image files to attach
    #[arg(short, long, num_args = 1..)]
    pub attach: Vec<PathBuf>,
}

/// A bare prompt argument
#[derive(clap::Args, Debug)]
pub struct PromptArgs {
    /// Prompt describing what to generate
    pub prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses_without_command() {
        let cli = Cli::parse_from(["fahz"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parses_ask_with_attachments() {
        let cli = Cli::parse_from(["fahz", "ask", "what is this", "-a", "a.png", "b.png"]);
        match cli.command {
            Some(Commands::Ask(args)) => {
                assert_eq!(args.prompt, "what is this");
                assert_eq!(args.attach.len(), 2);
            }
            other => panic!("expected Ask, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_global_generation_flags() {
        let cli = Cli::parse_from(["fahz", "-m", "gemini-3-pro-preview", "-t", "1.2", "chat"]);
        assert_eq!(cli.model.as_deref(), Some("gemini-3-pro-preview"));
        assert_eq!(cli.temperature, Some(1.2));
    }

    #[test]
    fn test_cli_parses_image_and_video() {
        let cli = Cli::parse_from(["fahz", "image", "a red cube"]);
        assert!(matches!(cli.command, Some(Commands::Image(_))));

        let cli = Cli::parse_from(["fahz", "video", "a sunrise"]);
        assert!(matches!(cli.command, Some(Commands::Video(_))));
    }

    #[test]
    fn test_cli_verify_schema() {
        Cli::command().debug_assert();
    }
}
