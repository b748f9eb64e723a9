//! Domain model for reminders and notes.
//!
//! # Responsibility
//! - Define the two record shapes owned by the task store.
//! - Keep persisted wire naming stable across releases.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil `TaskId`.
//! - Reminders and notes never reference each other.

mod bytes;
pub mod note;
pub mod reminder;

use uuid::Uuid;

/// Stable identifier shared by reminders, notes and scheduled alerts.
///
/// Used as the join key between a reminder and its pending alert.
pub type TaskId = Uuid;
