// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Terminal interface for Fahz GPT
//!
//! Four client-side views: the conversation, the persona catalog, an
//! informational page, and the configuration/export page. Selection is pure
//! in-memory state; nothing survives a restart except exported settings.

pub mod app;
pub mod input;
pub mod ui;

use std::io;
use std::path::PathBuf;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::config::Settings;
use crate::controller::Controller;
use crate::error::{FahzError, Result};

pub use app::{App, Tab, TickResult};

/// Run the chat TUI until the user quits.
pub async fn run_tui(controller: Controller, settings: Settings, settings_path: PathBuf) -> Result<()> {
    // Setup terminal with panic hook to restore terminal on crash
    let original_panic_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_panic_hook(panic_info);
    }));

    enable_raw_mode().map_err(|e| FahzError::Tui(e.to_string()))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| FahzError::Tui(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| FahzError::Tui(e.to_string()))?;

    let mut app = App::new(controller, settings, settings_path);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    let _ = std::panic::take_hook();
    disable_raw_mode().map_err(|e| FahzError::Tui(e.to_string()))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| FahzError::Tui(e.to_string()))?;
    terminal
        .show_cursor()
        .map_err(|e| FahzError::Tui(e.to_string()))?;

    result
}

/// Main application loop
async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| FahzError::Tui(e.to_string()))?;

        match app.tick().await? {
            TickResult::Continue => {}
            TickResult::Quit => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_app_quits_immediately() {
        let controller = Controller::new(Arc::new(MockGateway::new()));
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = App::new(
            controller,
            Settings::default(),
            dir.path().join("settings.json"),
        );
        app.should_quit = true;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        let result = run_app(&mut terminal, &mut app).await;
        assert!(result.is_ok());
    }
}
