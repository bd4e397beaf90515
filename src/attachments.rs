// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Pending attachment intake
//!
//! Files selected by the user are read and base64-encoded independently;
//! each completed read appends one attachment to the shared pending queue.
//! The queue's mutex is the serialization point between those producer
//! completions and the controller's snapshot-and-clear at submission time,
//! so a read finishing after a submission begins simply lands in the next
//! message's queue.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::conversation::Attachment;
use crate::error::{FahzError, Result};

/// Shared queue of attachments waiting to be bound to the next message.
#[derive(Debug, Clone, Default)]
pub struct PendingAttachments {
    inner: Arc<Mutex<Vec<Attachment>>>,
}

impl PendingAttachments {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Attachment>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("pending attachment lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Append an attachment produced by a completed file read
    pub fn push(&self, attachment: Attachment) {
        self.lock().push(attachment);
    }

    /// Remove the attachment at `index`, if it exists
    pub fn remove(&self, index: usize) {
        let mut queue = self.lock();
        if index < queue.len() {
            queue.remove(index);
        }
    }

    /// Atomically take every pending attachment, leaving the queue empty.
    ///
    /// This is the snapshot-and-clear used at submission time.
    pub fn take_all(&self) -> Vec<Attachment> {
        std::mem::take(&mut *self.lock())
    }

    /// Copy of the current queue, for display
    pub fn snapshot(&self) -> Vec<Attachment> {
        self.lock().clone()
    }

    /// Number of pending attachments
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Read a file and encode it as an inline attachment.
///
/// The mime type is guessed from the file extension; files without a
/// recognizable extension are sent as `application/octet-stream`.
pub async fn read_attachment(path: impl AsRef<Path>) -> Result<Attachment> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FahzError::Attachment(format!("cannot read {}: {}", path.display(), e)))?;

    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string();

    Ok(Attachment {
        mime_type,
        data: BASE64.encode(&bytes),
        source: path.to_path_buf(),
    })
}
