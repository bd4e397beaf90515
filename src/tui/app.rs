// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Application state for the Fahz TUI
//!
//! Holds the active tab, input state, and status line, dispatches key
//! events, and runs submissions as background tasks so the interface stays
//! responsive while a gateway call is in flight.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::attachments;
use crate::config::Settings;
use crate::controller::{parse_submission, Controller, SubmitOutcome};
use crate::conversation::TEMPERATURE_MAX;
use crate::error::Result;
use crate::models;
use crate::personas;
use crate::tui::input::InputState;

/// The four top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Conversation view
    Chat,
    /// Persona catalog
    Personas,
    /// Informational view
    About,
    /// Configuration and export view
    Config,
}

impl Tab {
    /// All tabs in display order
    pub const ALL: [Tab; 4] = [Tab::Chat, Tab::Personas, Tab::About, Tab::Config];

    /// Title shown in the tab bar
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Personas => "Personas",
            Tab::About => "About",
            Tab::Config => "Config",
        }
    }

    /// Position in the tab bar
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    /// The next tab, wrapping around
    pub fn next(&self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The previous tab, wrapping around
    pub fn prev(&self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Result of one tick of the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Continue,
    Quit,
}

/// Notifications sent back to the app from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A file finished loading into the pending queue
    AttachmentLoaded(String),
    /// A file could not be loaded
    AttachmentFailed(String),
    /// A submission task settled
    SubmissionFinished(SubmitOutcome),
}

/// The Fahz TUI application
pub struct App {
    /// Submission orchestrator shared with background tasks
    pub controller: Controller,

    // === UI State ===
    pub tab: Tab,
    pub input: InputState,
    pub scroll_up: u16,
    pub persona_index: usize,
    pub model_index: usize,
    pub show_help: bool,

    // === Status ===
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub should_quit: bool,
    pub tick_count: usize,

    // === Resources ===
    settings: Settings,
    settings_path: PathBuf,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create a new application
    pub fn new(controller: Controller, settings: Settings, settings_path: PathBuf) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let model_index = models::chat_models()
            .iter()
            .position(|m| m.id == controller.config().model)
            .unwrap_or(0);

        Self {
            controller,
            tab: Tab::Chat,
            input: InputState::new(),
            scroll_up: 0,
            persona_index: 0,
            model_index,
            show_help: false,
            status_message: None,
            status_is_error: false,
            should_quit: false,
            tick_count: 0,
            settings,
            settings_path,
            event_tx,
            event_rx,
        }
    }

    /// Process one tick of the event loop
    pub async fn tick(&mut self) -> Result<TickResult> {
        if self.should_quit {
            return Ok(TickResult::Quit);
        }
        self.tick_count = self.tick_count.wrapping_add(1);

        // Handle background events with a timeout for smooth updates
        tokio::select! {
            Some(event) = self.event_rx.recv() => {
                self.handle_event(event);
            }
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }

        // Check keyboard input (non-blocking)
        if crossterm::event::poll(Duration::from_millis(0))? {
            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                self.handle_key(key);
            }
        }

        Ok(TickResult::Continue)
    }

    /// Handle a notification from a background task
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AttachmentLoaded(label) => {
                self.set_status(format!("Attached {}", label));
            }
            AppEvent::AttachmentFailed(message) => {
                self.set_error(message);
            }
            AppEvent::SubmissionFinished(outcome) => {
                if outcome == SubmitOutcome::Done {
                    self.status_message = None;
                    self.scroll_up = 0;
                }
            }
        }
    }

    /// Handle a keyboard event
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Global keys that work in any view
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                self.should_quit = true;
                return;
            }
            (_, KeyCode::Tab) => {
                self.tab = self.tab.next();
                return;
            }
            (_, KeyCode::BackTab) => {
                self.tab = self.tab.prev();
                return;
            }
            _ => {}
        }

        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.tab {
            Tab::Chat => self.handle_chat_key(key),
            Tab::Personas => self.handle_personas_key(key),
            Tab::About => {}
            Tab::Config => self.handle_config_key(key),
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert_char(c)
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::PageUp => self.scroll_up = self.scroll_up.saturating_add(5),
            KeyCode::PageDown => self.scroll_up = self.scroll_up.saturating_sub(5),
            _ => {}
        }
    }

    fn handle_personas_key(&mut self, key: KeyEvent) {
        let count = personas::builtin().len();
        match key.code {
            KeyCode::Up => {
                self.persona_index = (self.persona_index + count - 1) % count;
            }
            KeyCode::Down => {
                self.persona_index = (self.persona_index + 1) % count;
            }
            KeyCode::Enter => {
                let persona = &personas::builtin()[self.persona_index];
                self.controller.apply_persona(persona);
                self.set_status(format!("{} {} applied", persona.icon, persona.name));
                self.tab = Tab::Chat;
            }
            _ => {}
        }
    }

    fn handle_config_key(&mut self, key: KeyEvent) {
        let catalog = models::chat_models();
        match key.code {
            KeyCode::Up => {
                self.model_index = (self.model_index + catalog.len() - 1) % catalog.len();
            }
            KeyCode::Down => {
                self.model_index = (self.model_index + 1) % catalog.len();
            }
            KeyCode::Enter => {
                let model = catalog[self.model_index].id;
                self.controller.set_model(model);
                self.set_status(format!("Model set to {}", models::display_name(model)));
            }
            KeyCode::Char('+') => {
                let config = self.controller.config();
                self.controller.set_temperature(config.temperature + 0.1);
            }
            KeyCode::Char('-') => {
                let config = self.controller.config();
                self.controller.set_temperature(config.temperature - 0.1);
            }
            KeyCode::Char('s') => self.export_settings(),
            _ => {}
        }
    }

    /// Take the input line and act on it: app commands run inline,
    /// everything else becomes a submission on a background task.
    fn submit_input(&mut self) {
        let raw = self.input.text().to_string();
        let trimmed = raw.trim();

        if trimmed.starts_with('/') && self.handle_command(trimmed) {
            self.input.take();
            return;
        }

        if trimmed.is_empty() && self.controller.pending().is_empty() {
            return;
        }
        if self.controller.is_busy() {
            // Rejected, not queued; keep the draft so nothing is lost
            self.set_error("Fahz is still working on the previous request".to_string());
            return;
        }

        self.input.take();
        let submission = parse_submission(&raw);
        let controller = self.controller.clone();
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = controller.submit(submission.kind, &submission.prompt).await;
            let _ = events.send(AppEvent::SubmissionFinished(outcome));
        });
    }

    /// Handle an app-level slash command. Returns false for inputs that
    /// should be treated as submissions instead (`/image`, `/video`).
    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim();

        match command {
            "/help" => {
                self.show_help = true;
                true
            }
            "/quit" | "/exit" => {
                self.should_quit = true;
                true
            }
            "/clear" => {
                self.controller.clear_conversation();
                self.set_status("New conversation started".to_string());
                true
            }
            "/persona" => {
                match personas::find(rest) {
                    Some(persona) => {
                        self.controller.apply_persona(persona);
                        self.set_status(format!("{} {} applied", persona.icon, persona.name));
                    }
                    None => {
                        self.set_error(format!(
                            "Unknown persona '{}'; see the Personas tab",
                            rest
                        ));
                    }
                }
                true
            }
            "/model" => {
                if self.controller.set_model(rest) {
                    self.set_status(format!("Model set to {}", models::display_name(rest)));
                } else {
                    self.set_error(format!("Unknown model '{}'; see the Config tab", rest));
                }
                true
            }
            "/temp" => {
                match rest.parse::<f32>() {
                    Ok(value) => {
                        self.controller.set_temperature(value);
                        self.set_status(format!(
                            "Temperature set to {}",
                            self.controller.config().temperature
                        ));
                    }
                    Err(_) => {
                        self.set_error(format!("'{}' is not a number", rest));
                    }
                }
                true
            }
            "/attach" => {
                if rest.is_empty() {
                    self.set_error("Usage: /attach <path>".to_string());
                } else {
                    self.spawn_attachment_read(PathBuf::from(rest));
                }
                true
            }
            _ => false,
        }
    }

    /// Read a file into the pending queue on a background task. Each read
    /// completes independently of submission state.
    fn spawn_attachment_read(&self, path: PathBuf) {
        let pending = self.controller.pending().clone();
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            match attachments::read_attachment(&path).await {
                Ok(attachment) => {
                    let label = attachment.label();
                    pending.push(attachment);
                    let _ = events.send(AppEvent::AttachmentLoaded(label));
                }
                Err(error) => {
                    let _ = events.send(AppEvent::AttachmentFailed(error.to_string()));
                }
            }
        });
    }

    /// Write the active generation config back to the settings file.
    fn export_settings(&mut self) {
        let config = self.controller.config();
        self.settings.defaults.model = config.model;
        self.settings.defaults.temperature = config.temperature;
        self.settings.defaults.system_prompt = config.system_prompt;

        match self.settings.save_to(&self.settings_path) {
            Ok(()) => self.set_status(format!("Saved to {}", self.settings_path.display())),
            Err(error) => self.set_error(error.to_string()),
        }
    }

    /// Temperature ceiling, surfaced for the config view
    pub fn temperature_max(&self) -> f32 {
        TEMPERATURE_MAX
    }

    fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_is_error = false;
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_is_error = true;
    }
}
