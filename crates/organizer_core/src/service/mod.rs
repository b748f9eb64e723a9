//! Core use-case services.
//!
//! # Responsibility
//! - Own in-memory collections and their persistence (`task_store`).
//! - Wire store mutations to alert synchronization (`organizer`).

pub mod organizer;
pub mod task_store;
