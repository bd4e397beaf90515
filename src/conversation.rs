// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation data model
//!
//! Messages, attachments, generated-media references, the per-session
//! generation configuration, and the append-only conversation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::models;
use crate::personas::Persona;

/// Lowest accepted sampling temperature
pub const TEMPERATURE_MIN: f32 = 0.0;

/// Highest accepted sampling temperature
pub const TEMPERATURE_MAX: f32 = 1.5;

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant response
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A user-selected file encoded for inline transport.
///
/// Held in the pending queue until the enclosing message is appended, then
/// referenced read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Mime type of the payload (e.g. "image/png")
    pub mime_type: String,

    /// Base64-encoded file contents
    pub data: String,

    /// Local path the file was read from, kept for preview display
    pub source: PathBuf,
}

impl Attachment {
    /// Short label for display (file name, falling back to the full path).
    pub fn label(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Kind of generated media
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A locally addressable reference to a generated artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    /// Image or video
    pub kind: MediaKind,

    /// Mime type reported by the backend
    pub mime_type: String,

    /// Where the artifact was written locally
    pub path: PathBuf,
}

/// A message in a conversation.
///
/// Immutable once appended to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for the message
    pub id: Uuid,

    /// Role of the message sender
    pub role: Role,

    /// Text content of the message
    pub content: String,

    /// When the message was created
    pub created_at: DateTime<Utc>,

    /// Files the user attached to this message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// Generated image carried by an assistant message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_image: Option<MediaRef>,

    /// Generated video carried by an assistant message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_video: Option<MediaRef>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::user_with_attachments(content, vec![])
    }

    /// Create a new user message carrying attachments
    pub fn user_with_attachments(content: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
            attachments,
            generated_image: None,
            generated_video: None,
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
            attachments: vec![],
            generated_image: None,
            generated_video: None,
        }
    }

    /// Create an assistant message carrying a generated media reference
    pub fn assistant_with_media(content: impl Into<String>, media: MediaRef) -> Self {
        let mut msg = Self::assistant(content);
        match media.kind {
            MediaKind::Image => msg.generated_image = Some(media),
            MediaKind::Video => msg.generated_video = Some(media),
        }
        msg
    }

    /// Whether this message carries any generated media
    pub fn has_media(&self) -> bool {
        self.generated_image.is_some() || self.generated_video.is_some()
    }
}

/// Generation parameters for gateway calls.
///
/// Owned by whichever component issues gateway calls and passed by reference;
/// there is no process-wide singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Active system prompt
    pub system_prompt: String,

    /// Sampling temperature in `[TEMPERATURE_MIN, TEMPERATURE_MAX]`
    pub temperature: f32,

    /// Chat model identifier, always one of the known catalog ids
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            system_prompt: crate::personas::INITIAL_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            model: models::DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

impl GenerationConfig {
    /// Set the sampling temperature, clamped to the accepted range.
    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    }

    /// Set the chat model. Returns false (leaving the config untouched) if
    /// the id is not in the catalog.
    pub fn set_model(&mut self, model: &str) -> bool {
        if models::is_chat_model(model) {
            self.model = model.to_string();
            true
        } else {
            false
        }
    }
}

/// Append-only, insertion-ordered log of conversation messages.
///
/// Messages are never mutated after insertion; the only destructive
/// operation is clearing the whole log for a new conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the log
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove every message, starting a new conversation
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of messages in the log
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All messages, in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently appended message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Apply a persona template: overwrite the system prompt, reset the log,
    /// and greet the user from the new persona.
    pub fn apply_persona(&mut self, persona: &Persona, config: &mut GenerationConfig) {
        config.system_prompt = persona.system_prompt.to_string();
        self.messages.clear();
        self.messages.push(Message::assistant(format!(
            "Switched to {}! Now using model {}. How can I help you today?",
            persona.name, config.model
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personas;

    #[test]
    fn test_message_user() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(msg.attachments.is_empty());
        assert!(!msg.has_media());
    }

    #[test]
    fn test_message_user_with_attachments() {
        let att = Attachment {
            mime_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
            source: PathBuf::from("/tmp/shot.png"),
        };
        let msg = Message::user_with_attachments("Look at this", vec![att]);
        assert_eq!(msg.attachments.len(), 1);
        assert_eq!(msg.attachments[0].label(), "shot.png");
    }

    #[test]
    fn test_message_assistant_with_image() {
        let media = MediaRef {
            kind: MediaKind::Image,
            mime_type: "image/png".to_string(),
            path: PathBuf::from("/tmp/out.png"),
        };
        let msg = Message::assistant_with_media("Here you go", media);
        assert!(msg.generated_image.is_some());
        assert!(msg.generated_video.is_none());
        assert!(msg.has_media());
    }

    #[test]
    fn test_message_assistant_with_video() {
        let media = MediaRef {
            kind: MediaKind::Video,
            mime_type: "video/mp4".to_string(),
            path: PathBuf::from("/tmp/out.mp4"),
        };
        let msg = Message::assistant_with_media("Here you go", media);
        assert!(msg.generated_video.is_some());
        assert!(msg.generated_image.is_none());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_config_default_model_is_known() {
        let config = GenerationConfig::default();
        assert!(models::is_chat_model(&config.model));
    }

    #[test]
    fn test_config_set_temperature_clamps() {
        let mut config = GenerationConfig::default();

        config.set_temperature(2.0);
        assert_eq!(config.temperature, TEMPERATURE_MAX);

        config.set_temperature(-0.3);
        assert_eq!(config.temperature, TEMPERATURE_MIN);

        config.set_temperature(1.5);
        assert_eq!(config.temperature, 1.5);

        config.set_temperature(0.0);
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_config_set_model_rejects_unknown() {
        let mut config = GenerationConfig::default();
        let before = config.model.clone();

        assert!(!config.set_model("gpt-4"));
        assert_eq!(config.model, before);

        assert!(config.set_model(models::CHAT_MODEL_PRO));
        assert_eq!(config.model, models::CHAT_MODEL_PRO);
    }

    #[test]
    fn test_log_append_preserves_order() {
        let mut log = ConversationLog::new();
        log.append(Message::user("first"));
        log.append(Message::assistant("second"));
        log.append(Message::user("third"));

        assert_eq!(log.len(), 3);
        let contents: Vec<&str> = log.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_log_clear_leaves_config_untouched() {
        let mut log = ConversationLog::new();
        let config = GenerationConfig::default();
        log.append(Message::user("hello"));

        let config_before = config.clone();
        log.clear();

        assert_eq!(log.len(), 0);
        assert!(log.is_empty());
        assert_eq!(config.system_prompt, config_before.system_prompt);
        assert_eq!(config.model, config_before.model);
    }

    #[test]
    fn test_apply_persona_resets_log_and_prompt() {
        let mut log = ConversationLog::new();
        let mut config = GenerationConfig::default();
        log.append(Message::user("old conversation"));
        log.append(Message::assistant("old reply"));

        let persona = &personas::builtin()[1];
        log.apply_persona(persona, &mut config);

        assert_eq!(log.len(), 1);
        assert_eq!(config.system_prompt, persona.system_prompt);

        let greeting = log.last().unwrap();
        assert_eq!(greeting.role, Role::Assistant);
        assert!(greeting.content.contains(&config.model));
    }
}
