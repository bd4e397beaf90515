// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Gateway to the generative backend
//!
//! Defines the boundary trait for the three external operations and the
//! implementations behind it.

use async_trait::async_trait;

use crate::conversation::{Attachment, GenerationConfig, MediaRef};
use crate::error::GatewayError;

pub mod gemini;
pub mod mock;

pub use gemini::GeminiGateway;
pub use mock::MockGateway;

/// Result type for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Boundary component issuing calls to the external generative backend.
///
/// Every operation requires a valid credential and performs network calls
/// only; nothing is persisted by the gateway itself beyond the media files
/// written for generated artifacts.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Name of the backing provider (e.g. "gemini")
    fn name(&self) -> &str;

    /// Synchronous text completion for a prompt, the active generation
    /// config, and optional inline attachments.
    async fn complete_text(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        attachments: &[Attachment],
    ) -> GatewayResult<String>;

    /// Single-shot image generation. Expects exactly one inline image
    /// payload in the response.
    async fn complete_image(&self, prompt: &str) -> GatewayResult<MediaRef>;

    /// Video generation through a long-running operation handle, polled
    /// until completion, with the resulting media fetched locally.
    async fn complete_video(&self, prompt: &str) -> GatewayResult<MediaRef>;
}
