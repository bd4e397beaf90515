// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Interaction controller
//!
//! Turns a user submission into exactly one gateway call, appends the
//! resulting messages to the conversation log, and serializes submissions
//! behind a single busy flag. Failures never escape this boundary: every
//! error is rendered into a regular assistant message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::attachments::PendingAttachments;
use crate::conversation::{ConversationLog, GenerationConfig, Message};
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::personas::Persona;

/// Which gateway operation a submission requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    Chat,
    Image,
    Video,
}

/// What happened to a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The submission ran to completion (success or rendered failure)
    Done,
    /// Guarded no-op: empty input and no pending attachments
    EmptyInput,
    /// Guarded no-op: another submission is in flight
    Busy,
}

/// A parsed input line: the action kind plus the prompt text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub kind: SubmitKind,
    pub prompt: String,
}

/// Parse an input line into a submission.
///
/// `/image <prompt>` and `/video <prompt>` select the generation kind;
/// anything else is a chat message.
pub fn parse_submission(input: &str) -> Submission {
    let trimmed = input.trim();
    if let Some(rest) = strip_command(trimmed, "/image") {
        return Submission {
            kind: SubmitKind::Image,
            prompt: rest.to_string(),
        };
    }
    if let Some(rest) = strip_command(trimmed, "/video") {
        return Submission {
            kind: SubmitKind::Video,
            prompt: rest.to_string(),
        };
    }
    Submission {
        kind: SubmitKind::Chat,
        prompt: trimmed.to_string(),
    }
}

/// Strip a leading command word, requiring a word boundary after it.
fn strip_command<'a>(input: &'a str, command: &str) -> Option<&'a str> {
    let rest = input.strip_prefix(command)?;
    if rest.is_empty() {
        Some("")
    } else if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Render a gateway failure as user-facing assistant text, with a remedy
/// where one exists.
pub fn render_failure(error: &GatewayError) -> String {
    let explanation = match error {
        GatewayError::CredentialMissing(variable) => format!(
            "No API credential was found. Set {} in your environment and try again.",
            variable
        ),
        GatewayError::InvalidCredential => {
            "The API key was rejected. Check it in the Google AI Studio dashboard.".to_string()
        }
        GatewayError::ModelUnavailable(model) => format!(
            "Model '{}' was not found or your key does not support it yet. \
             Pick another model in settings.",
            model
        ),
        GatewayError::QuotaExceeded => {
            "The request quota is exhausted. Wait a moment or switch to a lower-tier model."
                .to_string()
        }
        GatewayError::EmptyResponse => {
            "The model responded but produced no text. Try another model or instruction."
                .to_string()
        }
        GatewayError::NoImageProduced => {
            "No image came back for that prompt. Try rephrasing it.".to_string()
        }
        GatewayError::AccessDenied => {
            "Video access was denied. Veo requires an API key from a GCP project with \
             billing enabled."
                .to_string()
        }
        GatewayError::Upstream(message) => format!(
            "The AI backend reported a problem: {}\n\nCheck that your API key is set \
             correctly and has quota remaining.",
            message
        ),
    };
    format!("⚠️ {}", explanation)
}

/// Orchestrates submissions between the UI, the pending-attachment queue,
/// the conversation log, and the gateway.
///
/// Cheaply cloneable; clones share the same state so the UI can run
/// `submit` on a spawned task while rendering from the original handle.
#[derive(Clone)]
pub struct Controller {
    gateway: Arc<dyn Gateway>,
    log: Arc<Mutex<ConversationLog>>,
    config: Arc<Mutex<GenerationConfig>>,
    pending: PendingAttachments,
    busy: Arc<AtomicBool>,
}

impl Controller {
    /// Create a controller over a gateway with the default configuration
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_config(gateway, GenerationConfig::default())
    }

    /// Create a controller with an explicit starting configuration
    pub fn with_config(gateway: Arc<dyn Gateway>, config: GenerationConfig) -> Self {
        Self {
            gateway,
            log: Arc::new(Mutex::new(ConversationLog::new())),
            config: Arc::new(Mutex::new(config)),
            pending: PendingAttachments::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The pending-attachment queue fed by file reads
    pub fn pending(&self) -> &PendingAttachments {
        &self.pending
    }

    /// Whether a submission is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Snapshot of the conversation messages, for rendering
    pub fn messages(&self) -> Vec<Message> {
        self.log_lock().messages().to_vec()
    }

    /// Number of messages in the log
    pub fn log_len(&self) -> usize {
        self.log_lock().len()
    }

    /// Snapshot of the active generation config
    pub fn config(&self) -> GenerationConfig {
        self.config_lock().clone()
    }

    /// Replace the system prompt
    pub fn set_system_prompt(&self, prompt: impl Into<String>) {
        self.config_lock().system_prompt = prompt.into();
    }

    /// Set the sampling temperature (clamped to the accepted range)
    pub fn set_temperature(&self, temperature: f32) {
        self.config_lock().set_temperature(temperature);
    }

    /// Switch the chat model; false if the id is not in the catalog
    pub fn set_model(&self, model: &str) -> bool {
        self.config_lock().set_model(model)
    }

    /// Start a new conversation, keeping the configuration
    pub fn clear_conversation(&self) {
        self.log_lock().clear();
    }

    /// Apply a persona template: new system prompt, fresh log, greeting
    pub fn apply_persona(&self, persona: &Persona) {
        let mut config = self.config_lock();
        self.log_lock().apply_persona(persona, &mut config);
    }

    /// Run one submission through the spec state machine.
    ///
    /// Ordering within a submission: the user message is appended before the
    /// gateway call is dispatched, and the result or error message is
    /// appended after the call settles. Concurrent submissions are rejected,
    /// not queued.
    pub async fn submit(&self, kind: SubmitKind, input: &str) -> SubmitOutcome {
        if input.trim().is_empty() && self.pending.is_empty() {
            return SubmitOutcome::EmptyInput;
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            return SubmitOutcome::Busy;
        }

        // Snapshot-and-clear is atomic with respect to concurrent file-read
        // completions; anything arriving later joins the next message.
        let attachments = self.pending.take_all();
        let prompt = input.to_string();

        self.log_lock()
            .append(Message::user_with_attachments(prompt.clone(), attachments.clone()));
        let config = self.config();

        let result = match kind {
            SubmitKind::Chat => self
                .gateway
                .complete_text(&prompt, &config, &attachments)
                .await
                .map(Message::assistant),
            SubmitKind::Image => self.gateway.complete_image(&prompt).await.map(|media| {
                Message::assistant_with_media(
                    format!("Sure - I generated an image for: \"{}\"", prompt),
                    media,
                )
            }),
            SubmitKind::Video => self.gateway.complete_video(&prompt).await.map(|media| {
                Message::assistant_with_media(
                    format!("Here is the video generated for: \"{}\"", prompt),
                    media,
                )
            }),
        };

        let message = match result {
            Ok(message) => message,
            Err(error) => {
                tracing::debug!(target: "fahz.controller", %error, "submission failed");
                Message::assistant(render_failure(&error))
            }
        };
        self.log_lock().append(message);

        self.busy.store(false, Ordering::SeqCst);
        SubmitOutcome::Done
    }

    fn log_lock(&self) -> MutexGuard<'_, ConversationLog> {
        match self.log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("conversation log lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn config_lock(&self) -> MutexGuard<'_, GenerationConfig> {
        match self.config.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("generation config lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
