//! Note domain model.
//!
//! # Responsibility
//! - Define the freeform note record (plain text, rich text, drawing).
//!
//! # Invariants
//! - `plain_text` stays consistent with `rich_content` when the latter is set.
//! - `rich_content` and `drawing_content` are opaque; core never parses them.
//! - Absent optional payloads are omitted from the persisted JSON.

use super::TaskId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Freeform note with optional rich-text and drawing payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTask {
    pub id: TaskId,
    /// Display label.
    pub name: String,
    /// Plain-text projection of the note body.
    pub plain_text: String,
    /// Archived formatted text produced by the UI. Base64 on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::bytes")]
    pub rich_content: Option<Vec<u8>>,
    /// Serialized freehand strokes produced by the UI. Base64 on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::bytes")]
    pub drawing_content: Option<Vec<u8>>,
}

impl NoteTask {
    /// Creates a text-only note with a freshly generated ID.
    pub fn new(name: impl Into<String>, plain_text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, plain_text)
    }

    /// Creates a text-only note with a caller-provided ID.
    pub fn with_id(id: TaskId, name: impl Into<String>, plain_text: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            plain_text: plain_text.into(),
            rich_content: None,
            drawing_content: None,
        }
    }

    /// Replaces the rich-text payload together with its plain-text projection.
    pub fn set_rich_content(&mut self, rich_content: Vec<u8>, plain_text: impl Into<String>) {
        self.rich_content = Some(rich_content);
        self.plain_text = plain_text.into();
    }

    /// Drops the rich-text payload, keeping the current plain text.
    pub fn clear_rich_content(&mut self) {
        self.rich_content = None;
    }

    pub fn set_drawing_content(&mut self, drawing_content: Option<Vec<u8>>) {
        self.drawing_content = drawing_content;
    }

    /// Returns whether the note carries freehand strokes.
    pub fn has_drawing(&self) -> bool {
        self.drawing_content
            .as_ref()
            .is_some_and(|bytes| !bytes.is_empty())
    }
}
