// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Media store
//!
//! Persists generated artifacts (images, videos) under a local directory and
//! hands out the locally addressable references carried by assistant
//! messages. Nothing here survives a deliberate clear of the directory; the
//! store is a sink, not a database.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::conversation::{MediaKind, MediaRef};
use crate::error::{FahzError, Result};

/// Writes generated media to a local directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| FahzError::Media(format!("cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// The directory artifacts are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode a base64 payload and persist it, returning its reference.
    pub fn save_base64(&self, kind: MediaKind, mime_type: &str, data: &str) -> Result<MediaRef> {
        let bytes = BASE64
            .decode(data)
            .map_err(|e| FahzError::Media(format!("invalid media payload: {}", e)))?;
        self.save_bytes(kind, mime_type, &bytes)
    }

    /// Persist raw bytes, returning their reference.
    pub fn save_bytes(&self, kind: MediaKind, mime_type: &str, bytes: &[u8]) -> Result<MediaRef> {
        let path = self.allocate_path(mime_type);
        std::fs::write(&path, bytes)
            .map_err(|e| FahzError::Media(format!("cannot write {}: {}", path.display(), e)))?;
        Ok(MediaRef {
            kind,
            mime_type: mime_type.to_string(),
            path,
        })
    }

    /// Allocate a fresh file path for a payload of the given mime type.
    pub fn allocate_path(&self, mime_type: &str) -> PathBuf {
        let ext = extension_for(mime_type);
        self.dir.join(format!("{}.{}", Uuid::new_v4().simple(), ext))
    }
}

/// File extension for a mime type, with sensible fallbacks for the
/// payload types the backend actually produces.
fn extension_for(mime_type: &str) -> &str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        _ => {
            if mime_type.starts_with("image/") {
                "img"
            } else if mime_type.starts_with("video/") {
                "vid"
            } else {
                "bin"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_base64_writes_decoded_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = MediaStore::new(dir.path()).unwrap();

        let payload = BASE64.encode(b"image-bytes");
        let media = store
            .save_base64(MediaKind::Image, "image/png", &payload)
            .unwrap();

        assert_eq!(media.kind, MediaKind::Image);
        assert_eq!(media.mime_type, "image/png");
        assert_eq!(media.path.extension().unwrap(), "png");
        assert_eq!(std::fs::read(&media.path).unwrap(), b"image-bytes");
    }

    #[test]
    fn test_save_base64_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = MediaStore::new(dir.path()).unwrap();

        let err = store
            .save_base64(MediaKind::Image, "image/png", "!!not-base64!!")
            .unwrap_err();
        assert!(err.to_string().contains("Media error"));
    }

    #[test]
    fn test_save_bytes_video() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = MediaStore::new(dir.path()).unwrap();

        let media = store
            .save_bytes(MediaKind::Video, "video/mp4", b"mp4-bytes")
            .unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.path.extension().unwrap(), "mp4");
    }

    #[test]
    fn test_allocate_path_is_unique() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = MediaStore::new(dir.path()).unwrap();

        let a = store.allocate_path("image/png");
        let b = store.allocate_path("image/png");
        assert_ne!(a, b);
    }

    #[test]
    fn test_extension_fallbacks() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/avif"), "img");
        assert_eq!(extension_for("video/ogg"), "vid");
        assert_eq!(extension_for("application/pdf"), "bin");
    }

    #[test]
    fn test_new_creates_nested_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = MediaStore::new(&nested).unwrap();
        assert!(store.dir().exists());
    }
}
