// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model catalog
//!
//! The known Gemini model identifiers and their Fahz-branded display names.
//! The chat catalog backs the invariant that the active generation config
//! only ever names a known model.

/// Default chat model, the lite tier for free-account stability
pub const DEFAULT_CHAT_MODEL: &str = "gemini-flash-lite-latest";

/// Fast chat model ("Fahz Flash")
pub const CHAT_MODEL_FLASH: &str = "gemini-3-flash-preview";

/// Deep-analysis chat model ("Fahz Pro")
pub const CHAT_MODEL_PRO: &str = "gemini-3-pro-preview";

/// Model used for image generation requests
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Model used for video generation requests
pub const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Information about a selectable chat model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model identifier sent to the backend
    pub id: &'static str,

    /// Human-readable name
    pub display_name: &'static str,

    /// One-line description shown in the model picker
    pub description: &'static str,
}

/// The selectable chat models
pub fn chat_models() -> &'static [ModelInfo] {
    const MODELS: &[ModelInfo] = &[
        ModelInfo {
            id: DEFAULT_CHAT_MODEL,
            display_name: "Fahz Lite",
            description: "Stable default for everyday questions.",
        },
        ModelInfo {
            id: CHAT_MODEL_FLASH,
            display_name: "Fahz Flash",
            description: "Very fast for daily tasks.",
        },
        ModelInfo {
            id: CHAT_MODEL_PRO,
            display_name: "Fahz Pro",
            description: "Deep analysis and expert coding.",
        },
    ];
    MODELS
}

/// Whether `id` names a known chat model
pub fn is_chat_model(id: &str) -> bool {
    chat_models().iter().any(|m| m.id == id)
}

/// Look up a chat model by id
pub fn find_chat_model(id: &str) -> Option<&'static ModelInfo> {
    chat_models().iter().find(|m| m.id == id)
}

/// Display name for a model id, falling back to the raw id
pub fn display_name(id: &str) -> &str {
    find_chat_model(id).map(|m| m.display_name).unwrap_or(id)
}
