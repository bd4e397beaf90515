// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Fahz GPT - the Fahz-Company AI assistant for your terminal
//!
//! Entry point for the Fahz CLI application.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use fahz::attachments;
use fahz::cli::{AskArgs, Cli, Commands};
use fahz::config::Settings;
use fahz::controller::{Controller, SubmitKind, SubmitOutcome};
use fahz::conversation::Role;
use fahz::error::{FahzError, Result};
use fahz::gateway::GeminiGateway;
use fahz::media::MediaStore;
use fahz::personas;
use fahz::tui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // Practical debug toggle: `-v` enables gateway diagnostics without
    // requiring users to know target names up front. `RUST_LOG` still takes
    // precedence.
    if cli.verbose > 0 {
        for directive in ["fahz.gateway=debug", "fahz.controller=debug"] {
            if let Ok(parsed) = directive.parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Load settings
    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(Settings::default_path);
    let settings = Settings::load_from(&settings_path)?;

    let controller = build_controller(&cli, &settings)?;

    match cli.command {
        None | Some(Commands::Chat) => {
            tui::run_tui(controller, settings, settings_path).await?;
        }
        Some(Commands::Ask(args)) => {
            run_ask(&controller, &args).await?;
        }
        Some(Commands::Image(args)) => {
            run_generate(&controller, SubmitKind::Image, &args.prompt).await?;
        }
        Some(Commands::Video(args)) => {
            run_generate(&controller, SubmitKind::Video, &args.prompt).await?;
        }
        Some(Commands::Personas) => {
            print_personas();
        }
    }

    Ok(())
}

/// Wire the gateway and controller from settings plus CLI overrides.
fn build_controller(cli: &Cli, settings: &Settings) -> Result<Controller> {
    let mut config = settings.generation_config();
    if let Some(model) = &cli.model {
        if !config.set_model(model) {
            return Err(FahzError::Config(format!("unknown model '{}'", model)));
        }
    }
    if let Some(temperature) = cli.temperature {
        config.set_temperature(temperature);
    }
    if let Some(system_prompt) = &cli.system_prompt {
        config.system_prompt = system_prompt.clone();
    }

    let media = MediaStore::new(settings.media_dir())?;
    let gateway = GeminiGateway::new(media)
        .with_poll_interval(Duration::from_secs(settings.video.poll_interval_secs))
        .with_max_poll_attempts(settings.video.max_poll_attempts);

    let controller = Controller::with_config(Arc::new(gateway), config);

    if let Some(id) = &cli.persona {
        let persona = personas::find(id)
            .ok_or_else(|| FahzError::Config(format!("unknown persona '{}'", id)))?;
        controller.apply_persona(persona);
    }

    Ok(controller)
}

/// One-shot question: attach files, submit, print the reply.
async fn run_ask(controller: &Controller, args: &AskArgs) -> Result<()> {
    for path in &args.attach {
        let attachment = attachments::read_attachment(path).await?;
        controller.pending().push(attachment);
    }

    submit_and_print(controller, SubmitKind::Chat, &args.prompt).await
}

/// One-shot media generation: submit, print the reply and artifact path.
async fn run_generate(controller: &Controller, kind: SubmitKind, prompt: &str) -> Result<()> {
    submit_and_print(controller, kind, prompt).await
}

async fn submit_and_print(controller: &Controller, kind: SubmitKind, prompt: &str) -> Result<()> {
    match controller.submit(kind, prompt).await {
        SubmitOutcome::Done => {}
        SubmitOutcome::EmptyInput => {
            return Err(FahzError::InvalidInput("empty prompt".to_string()));
        }
        SubmitOutcome::Busy => {
            return Err(FahzError::InvalidInput(
                "another submission is in flight".to_string(),
            ));
        }
    }

    for message in controller.messages() {
        if message.role != Role::Assistant {
            continue;
        }
        println!("{}", message.content);
        if let Some(image) = &message.generated_image {
            println!("image: {}", image.path.display());
        }
        if let Some(video) = &message.generated_video {
            println!("video: {}", video.path.display());
        }
    }
    Ok(())
}

/// List the persona catalog.
fn print_personas() {
    for persona in personas::builtin() {
        println!("{} {:<14} {}", persona.icon, persona.id, persona.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_from(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_build_controller_defaults() {
        let cli = cli_from(&["fahz"]);
        let mut settings = Settings::default();
        settings.media.dir = Some(std::env::temp_dir().join("fahz-test-media"));

        let controller = build_controller(&cli, &settings).unwrap();
        assert_eq!(controller.config().model, settings.defaults.model);
        assert_eq!(controller.log_len(), 0);
    }

    #[test]
    fn test_build_controller_rejects_unknown_model() {
        let cli = cli_from(&["fahz", "--model", "gpt-4"]);
        let mut settings = Settings::default();
        settings.media.dir = Some(std::env::temp_dir().join("fahz-test-media"));

        assert!(build_controller(&cli, &settings).is_err());
    }

    #[test]
    fn test_build_controller_applies_persona() {
        let cli = cli_from(&["fahz", "--persona", "chef"]);
        let mut settings = Settings::default();
        settings.media.dir = Some(std::env::temp_dir().join("fahz-test-media"));

        let controller = build_controller(&cli, &settings).unwrap();
        assert_eq!(
            controller.config().system_prompt,
            personas::find("chef").unwrap().system_prompt
        );
        // Applying a persona leaves the greeting in the log
        assert_eq!(controller.log_len(), 1);
    }

    #[test]
    fn test_build_controller_clamps_temperature_flag() {
        let cli = cli_from(&["fahz", "--temperature", "9.0"]);
        let mut settings = Settings::default();
        settings.media.dir = Some(std::env::temp_dir().join("fahz-test-media"));

        let controller = build_controller(&cli, &settings).unwrap();
        assert_eq!(controller.config().temperature, 1.5);
    }
}
