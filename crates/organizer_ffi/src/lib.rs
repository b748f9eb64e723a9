//! Flutter bridge for the organizer core.

pub mod api;
pub mod outbox;
