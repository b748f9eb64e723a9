//! Core domain logic for the personal organizer app.
//! Reminder/note persistence and reminder alert synchronization live here;
//! rendering and input collection stay in the UI layer.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod service;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock, TriggerCalendar};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::NoteTask;
pub use model::reminder::{ReminderTask, Urgency};
pub use model::TaskId;
pub use notify::memory::AuthorizationResponse;
pub use notify::{
    AlertRequest, AuthorizationOptions, InMemoryNotificationCenter, NotificationCenter,
    NotificationError, NotificationSynchronizer, PresentationPolicy,
};
pub use service::organizer::Organizer;
pub use service::task_store::{
    StoreError, StoreEvent, StoreResult, SubscriptionId, TaskStore, NOTES_KEY, REMINDERS_KEY,
};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
