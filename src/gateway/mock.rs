// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock gateway for testing
//!
//! Provides a configurable mock implementation of the Gateway trait that can
//! be used in unit tests without making real network calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::conversation::{Attachment, GenerationConfig, MediaKind, MediaRef};
use crate::error::GatewayError;
use crate::gateway::{Gateway, GatewayResult};

/// Which gateway operation a recorded call went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Text,
    Image,
    Video,
}

/// A recorded gateway call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Operation the call dispatched to
    pub kind: CallKind,
    /// Prompt text
    pub prompt: String,
    /// Generation config (text calls only)
    pub config: Option<GenerationConfig>,
    /// Inline attachments (text calls only)
    pub attachments: Vec<Attachment>,
}

/// A queued reply for the mock gateway
#[derive(Debug)]
pub enum MockReply {
    /// Successful text completion
    Text(String),
    /// Successful media generation
    Media(MediaRef),
    /// Failure of any kind
    Error(GatewayError),
}

/// A configurable mock gateway
#[derive(Clone, Default)]
pub struct MockGateway {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    call_count: Arc<AtomicUsize>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
}

/// Handle releasing a gated mock gateway call
pub struct GateHandle {
    notify: Arc<Notify>,
}

impl GateHandle {
    /// Let one pending gateway call proceed
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

impl MockGateway {
    /// Create a new mock gateway
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply
    pub fn with_text_reply(self, text: impl Into<String>) -> Self {
        self.push_reply(MockReply::Text(text.into()));
        self
    }

    /// Queue a media reply
    pub fn with_media_reply(self, media: MediaRef) -> Self {
        self.push_reply(MockReply::Media(media));
        self
    }

    /// Queue an error reply
    pub fn with_error_reply(self, error: GatewayError) -> Self {
        self.push_reply(MockReply::Error(error));
        self
    }

    /// Respond only after this much time has passed
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every call until the returned handle releases it
    pub fn gated(mut self) -> (Self, GateHandle) {
        let notify = Arc::new(Notify::new());
        self.gate = Some(notify.clone());
        (self, GateHandle { notify })
    }

    /// Queue a reply without consuming self
    pub fn push_reply(&self, reply: MockReply) {
        self.replies_lock().push_back(reply);
    }

    /// Number of gateway calls observed
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// All recorded calls, in dispatch order
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls_lock().clone()
    }

    /// The most recent recorded call
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls_lock().last().cloned()
    }

    fn replies_lock(&self) -> std::sync::MutexGuard<'_, VecDeque<MockReply>> {
        match self.replies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn calls_lock(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        match self.calls.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn respond(&self, call: RecordedCall, default: MockReply) -> MockReply {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls_lock().push(call);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.replies_lock().pop_front().unwrap_or(default)
    }

    fn default_media(kind: MediaKind) -> MediaRef {
        match kind {
            MediaKind::Image => MediaRef {
                kind,
                mime_type: "image/png".to_string(),
                path: PathBuf::from("/tmp/mock-image.png"),
            },
            MediaKind::Video => MediaRef {
                kind,
                mime_type: "video/mp4".to_string(),
                path: PathBuf::from("/tmp/mock-video.mp4"),
            },
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete_text(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        attachments: &[Attachment],
    ) -> GatewayResult<String> {
        let call = RecordedCall {
            kind: CallKind::Text,
            prompt: prompt.to_string(),
            config: Some(config.clone()),
            attachments: attachments.to_vec(),
        };
        match self.respond(call, MockReply::Text("mock reply".to_string())).await {
            MockReply::Text(text) => Ok(text),
            MockReply::Media(media) => Ok(format!("[media: {}]", media.path.display())),
            MockReply::Error(err) => Err(err),
        }
    }

    async fn complete_image(&self, prompt: &str) -> GatewayResult<MediaRef> {
        let call = RecordedCall {
            kind: CallKind::Image,
            prompt: prompt.to_string(),
            config: None,
            attachments: vec![],
        };
        let default = MockReply::Media(Self::default_media(MediaKind::Image));
        match self.respond(call, default).await {
            MockReply::Media(media) => Ok(media),
            MockReply::Text(_) => Err(GatewayError::NoImageProduced),
            MockReply::Error(err) => Err(err),
        }
    }

    async fn complete_video(&self, prompt: &str) -> GatewayResult<MediaRef> {
        let call = RecordedCall {
            kind: CallKind::Video,
            prompt: prompt.to_string(),
            config: None,
            attachments: vec![],
        };
        let default = MockReply::Media(Self::default_media(MediaKind::Video));
        match self.respond(call, default).await {
            MockReply::Media(media) => Ok(media),
            MockReply::Text(_) => Err(GatewayError::Upstream("no video produced".to_string())),
            MockReply::Error(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_queued_replies_in_order() {
        let mock = MockGateway::new()
            .with_text_reply("first")
            .with_text_reply("second");
        let config = GenerationConfig::default();

        assert_eq!(mock.complete_text("a", &config, &[]).await.unwrap(), "first");
        assert_eq!(mock.complete_text("b", &config, &[]).await.unwrap(), "second");
        // Queue exhausted: falls back to the default reply
        assert_eq!(
            mock.complete_text("c", &config, &[]).await.unwrap(),
            "mock reply"
        );
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = MockGateway::new();
        let mut config = GenerationConfig::default();
        config.set_temperature(1.5);

        mock.complete_text("hello", &config, &[]).await.unwrap();
        mock.complete_image("a cube").await.unwrap();

        assert_eq!(mock.call_count(), 2);
        let calls = mock.recorded_calls();
        assert_eq!(calls[0].kind, CallKind::Text);
        assert_eq!(calls[0].prompt, "hello");
        assert_eq!(calls[0].config.as_ref().unwrap().temperature, 1.5);
        assert_eq!(calls[1].kind, CallKind::Image);
        assert!(calls[1].config.is_none());
    }

    #[tokio::test]
    async fn test_mock_error_reply() {
        let mock = MockGateway::new().with_error_reply(GatewayError::NoImageProduced);
        let err = mock.complete_image("a cube").await.unwrap_err();
        assert!(matches!(err, GatewayError::NoImageProduced));
    }

    #[tokio::test]
    async fn test_mock_gate_blocks_until_released() {
        let (mock, gate) = MockGateway::new().with_text_reply("late").gated();
        let config = GenerationConfig::default();

        let task = tokio::spawn({
            let mock = mock.clone();
            async move { mock.complete_text("x", &config, &[]).await }
        });

        // The call is recorded immediately but held open
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(mock.call_count(), 1);
        assert!(!task.is_finished());

        gate.release();
        assert_eq!(task.await.unwrap().unwrap(), "late");
    }
}
