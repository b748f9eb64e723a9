//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `organizer_core` linkage without the Flutter/FFI runtime.
//! - Run one in-memory reminder/note pass and print what the core produced.

use chrono::{Duration, Utc};
use organizer_core::{
    InMemoryNotificationCenter, MemoryKeyValueStore, NoteTask, Organizer, ReminderTask,
    SystemClock, Urgency,
};
use std::sync::Arc;

fn main() {
    println!("organizer_core ping={}", organizer_core::ping());
    println!("organizer_core version={}", organizer_core::core_version());

    let center = Arc::new(InMemoryNotificationCenter::default());
    let mut organizer = Organizer::open(
        MemoryKeyValueStore::new(),
        center.clone(),
        Arc::new(SystemClock),
    );
    organizer.request_permission();
    organizer.add_reminder(ReminderTask::new(
        "smoke reminder",
        Utc::now() + Duration::minutes(5),
        Urgency::Medium,
    ));
    organizer.add_note(NoteTask::new("smoke note", "hello"));

    let store = organizer.store();
    println!(
        "reminders={} upcoming={} notes={} pending_alerts={}",
        store.reminders().len(),
        store.upcoming_reminders().count(),
        store.notes().len(),
        center.pending_count()
    );
}
