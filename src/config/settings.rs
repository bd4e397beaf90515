// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for Fahz
//!
//! Handles loading and saving settings from ~/.fahz/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::conversation::{GenerationConfig, TEMPERATURE_MAX, TEMPERATURE_MIN};
use crate::error::{FahzError, Result};
use crate::models;
use crate::personas;

/// Main settings structure, stored in ~/.fahz/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Default generation parameters for new sessions
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Video generation polling settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Generated media storage settings
    #[serde(default)]
    pub media: MediaConfig,
}

/// Default generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Chat model id used when no flag overrides it
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// System prompt used before any persona is applied
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Video operation polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Seconds between operation status checks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// How many status checks to issue before giving up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

/// Generated media storage settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MediaConfig {
    /// Where generated images and videos are written.
    /// Defaults to ~/.fahz/media when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_model() -> String {
    models::DEFAULT_CHAT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_system_prompt() -> String {
    personas::INITIAL_SYSTEM_PROMPT.to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_max_poll_attempts() -> u32 {
    90
}

impl Settings {
    /// Get the Fahz home directory (~/.fahz)
    pub fn fahz_home() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fahz")
    }

    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        Self::fahz_home().join("settings.json")
    }

    /// Directory generated media is written to.
    pub fn media_dir(&self) -> PathBuf {
        self.media
            .dir
            .clone()
            .unwrap_or_else(|| Self::fahz_home().join("media"))
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from a specific path. A missing file yields defaults.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check invariants a settings file must satisfy.
    pub fn validate(&self) -> Result<()> {
        if !models::is_chat_model(&self.defaults.model) {
            return Err(FahzError::Config(format!(
                "unknown default model '{}'",
                self.defaults.model
            )));
        }
        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&self.defaults.temperature) {
            return Err(FahzError::Config(format!(
                "temperature {} outside [{}, {}]",
                self.defaults.temperature, TEMPERATURE_MIN, TEMPERATURE_MAX
            )));
        }
        if self.video.poll_interval_secs == 0 {
            return Err(FahzError::Config(
                "video poll interval must be at least 1 second".to_string(),
            ));
        }
        if self.video.max_poll_attempts == 0 {
            return Err(FahzError::Config(
                "video poll budget must be at least 1 attempt".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the starting generation config for a session.
    pub fn generation_config(&self) -> GenerationConfig {
        let mut config = GenerationConfig {
            system_prompt: self.defaults.system_prompt.clone(),
            temperature: default_temperature(),
            model: self.defaults.model.clone(),
        };
        config.set_temperature(self.defaults.temperature);
        config
    }
}
