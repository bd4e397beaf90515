// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Rendering for the Fahz TUI

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};

use crate::conversation::{Message, Role};
use crate::models;
use crate::personas;
use crate::tui::app::{App, Tab};

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Draw the whole interface
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_tab_bar(frame, app, chunks[0]);
    match app.tab {
        Tab::Chat => draw_chat(frame, app, chunks[1]),
        Tab::Personas => draw_personas(frame, app, chunks[1]),
        Tab::About => draw_about(frame, chunks[1]),
        Tab::Config => draw_config(frame, app, chunks[1]),
    }
    draw_status_line(frame, app, chunks[2]);

    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let model = app.controller.config().model;
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Fahz GPT ")
                .title_bottom(Line::from(format!(" {} ", models::display_name(&model))).right_aligned()),
        );
    frame.render_widget(tabs, area);
}

fn draw_chat(frame: &mut Frame, app: &mut App, area: Rect) {
    let pending = app.controller.pending().snapshot();
    let pending_height = if pending.is_empty() { 0 } else { 1 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(pending_height),
            Constraint::Length(3),
        ])
        .split(area);

    draw_messages(frame, app, chunks[0]);

    if !pending.is_empty() {
        let labels: Vec<String> = pending.iter().map(|a| a.label()).collect();
        let strip = Paragraph::new(format!("📎 pending: {}", labels.join(", ")))
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(strip, chunks[1]);
    }

    let input = Paragraph::new(app.input.text())
        .block(Block::default().borders(Borders::ALL).title(" Message "));
    frame.render_widget(input, chunks[2]);
    frame.set_cursor_position((
        chunks[2].x + 1 + app.input.cursor_chars() as u16,
        chunks[2].y + 1,
    ));
}

fn draw_messages(frame: &mut Frame, app: &mut App, area: Rect) {
    let messages = app.controller.messages();

    let mut lines: Vec<Line> = Vec::new();
    if messages.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from("Hello! I'm Fahz GPT.").bold());
        lines.push(Line::from(
            "Chat with me, analyze images, or generate media. Type /help for commands.",
        ));
    }
    for message in &messages {
        lines.extend(message_lines(message));
        lines.push(Line::from(""));
    }

    let inner_height = area.height.saturating_sub(2);
    let total = lines.len() as u16;
    let max_scroll = total.saturating_sub(inner_height);
    // Stick to the bottom, offset by however far the user scrolled up
    app.scroll_up = app.scroll_up.min(max_scroll);
    let offset = max_scroll - app.scroll_up;

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0))
        .block(Block::default().borders(Borders::ALL).title(" Conversation "));
    frame.render_widget(paragraph, area);
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (label, style) = match message.role {
        Role::User => ("you", Style::default().fg(Color::Green).bold()),
        Role::Assistant => ("fahz", Style::default().fg(Color::Cyan).bold()),
    };

    let mut lines = vec![Line::from(Span::styled(format!("{}:", label), style))];
    for text_line in message.content.lines() {
        lines.push(Line::from(text_line.to_string()));
    }

    if !message.attachments.is_empty() {
        let labels: Vec<String> = message.attachments.iter().map(|a| a.label()).collect();
        lines.push(Line::from(Span::styled(
            format!("📎 {}", labels.join(", ")),
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(image) = &message.generated_image {
        lines.push(Line::from(Span::styled(
            format!("🖼 image saved to {}", image.path.display()),
            Style::default().fg(Color::Magenta),
        )));
    }
    if let Some(video) = &message.generated_video {
        lines.push(Line::from(Span::styled(
            format!("🎬 video saved to {}", video.path.display()),
            Style::default().fg(Color::Magenta),
        )));
    }
    lines
}

fn draw_personas(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = personas::builtin()
        .iter()
        .map(|p| {
            ListItem::new(vec![
                Line::from(format!("{} {}", p.icon, p.name)).bold(),
                Line::from(format!("   {}", p.description)).dim(),
            ])
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.persona_index));

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Personas (↑/↓ select, Enter apply) "),
        );
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_about(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from("Fahz GPT").bold(),
        Line::from(""),
        Line::from("Your personal AI assistant by Fahz-Company, powered by Google Gemini."),
        Line::from(""),
        Line::from("What it can do:"),
        Line::from("  • Chat about anything, with a choice of personas and models"),
        Line::from("  • Analyze images you attach with /attach <path>"),
        Line::from("  • Generate images with /image <prompt>"),
        Line::from("  • Generate videos with /video <prompt> (needs Veo access)"),
        Line::from(""),
        Line::from("Everything lives in memory for this session only; generated"),
        Line::from("media is written under your media directory."),
        Line::from(""),
        Line::from(format!("Version {}", env!("CARGO_PKG_VERSION"))).dim(),
    ];
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" About "));
    frame.render_widget(paragraph, area);
}

fn draw_config(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let config = app.controller.config();

    let items: Vec<ListItem> = models::chat_models()
        .iter()
        .map(|m| {
            let marker = if m.id == config.model { "●" } else { " " };
            ListItem::new(vec![
                Line::from(format!("{} {}", marker, m.display_name)).bold(),
                Line::from(format!("   {}", m.description)).dim(),
            ])
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(app.model_index));
    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Model (Enter apply, +/- temperature, s save) "),
        );
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let exported = serde_json::to_string_pretty(&config)
        .unwrap_or_else(|_| "<unserializable>".to_string());
    let mut lines = vec![
        Line::from(format!(
            "temperature: {:.1} (0.0 - {:.1})",
            config.temperature,
            app.temperature_max()
        )),
        Line::from(""),
    ];
    lines.extend(exported.lines().map(|l| Line::from(l.to_string())));
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Active configuration "));
    frame.render_widget(paragraph, chunks[1]);
}

fn draw_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.controller.is_busy() {
        let frame_char = SPINNER_FRAMES[app.tick_count % SPINNER_FRAMES.len()];
        Line::from(format!(" {} Fahz is thinking...", frame_char))
            .style(Style::default().fg(Color::Cyan))
    } else if let Some(message) = &app.status_message {
        let color = if app.status_is_error { Color::Red } else { Color::Green };
        Line::from(format!(" {}", message)).style(Style::default().fg(color))
    } else {
        Line::from(" Enter send · Tab views · /help commands · Ctrl+C quit")
            .style(Style::default().dim())
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help_overlay(frame: &mut Frame) {
    let area = centered_rect(60, 50, frame.area());
    let text = vec![
        Line::from("Commands").bold(),
        Line::from(""),
        Line::from("/image <prompt>    generate an image"),
        Line::from("/video <prompt>    generate a video"),
        Line::from("/attach <path>     attach an image file"),
        Line::from("/persona <id>      switch persona"),
        Line::from("/model <id>        switch chat model"),
        Line::from("/temp <value>      set temperature"),
        Line::from("/clear             new conversation"),
        Line::from("/quit              exit"),
        Line::from(""),
        Line::from("Press any key to close").dim(),
    ];
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Help "));
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// A centered rectangle taking the given percentages of the frame
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
