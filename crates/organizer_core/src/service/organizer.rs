//! Organizer use-case facade.
//!
//! # Responsibility
//! - Route reminder mutations through the store, then reconcile alerts.
//! - Expose note use-cases unchanged from the store.
//!
//! # Invariants
//! - Store mutation happens before alert synchronization.
//! - Alert work never changes store contents.

use crate::clock::Clock;
use crate::model::note::NoteTask;
use crate::model::reminder::ReminderTask;
use crate::model::TaskId;
use crate::notify::{NotificationCenter, NotificationSynchronizer};
use crate::service::task_store::TaskStore;
use crate::storage::KeyValueStore;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Owner of the task store and its notification synchronizer.
pub struct Organizer<S: KeyValueStore> {
    store: TaskStore<S>,
    notifications: NotificationSynchronizer,
}

impl<S: KeyValueStore> Organizer<S> {
    /// Loads the store from `storage` and wires a synchronizer over `center`.
    ///
    /// Does not touch pending alerts; call `reconcile_alerts` on cold start.
    pub fn open(storage: S, center: Arc<dyn NotificationCenter>, clock: Arc<dyn Clock>) -> Self {
        let store = TaskStore::open(storage, clock.clone());
        let notifications = NotificationSynchronizer::new(center, clock);
        Self {
            store,
            notifications,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Mutable store access for subscriptions and explicit saves.
    ///
    /// Reminder mutations made here bypass alert synchronization.
    pub fn store_mut(&mut self) -> &mut TaskStore<S> {
        &mut self.store
    }

    pub fn notifications(&self) -> &NotificationSynchronizer {
        &self.notifications
    }

    pub fn request_permission(&self) {
        self.notifications.request_permission();
    }

    /// Rebuilds pending alerts from the stored reminders, dropping orphans.
    pub fn reconcile_alerts(&self) -> usize {
        self.notifications.reconcile(self.store.reminders())
    }

    pub fn add_reminder(&mut self, task: ReminderTask) -> TaskId {
        let id = task.id;
        self.store.add_reminder(task.clone());
        self.notifications.schedule(&task);
        id
    }

    /// Returns `false` and leaves alerts untouched when the ID is unknown.
    pub fn update_reminder(&mut self, task: ReminderTask) -> bool {
        if !self.store.update_reminder(task.clone()) {
            return false;
        }
        self.notifications.reschedule(&task);
        true
    }

    pub fn delete_reminders(&mut self, ids: impl IntoIterator<Item = TaskId>) -> Vec<ReminderTask> {
        let removed = self.store.delete_reminders(ids);
        for reminder in &removed {
            self.notifications.cancel(reminder);
        }
        removed
    }

    pub fn delete_reminders_at(&mut self, offsets: &BTreeSet<usize>) -> Vec<ReminderTask> {
        let removed = self.store.delete_reminders_at(offsets);
        for reminder in &removed {
            self.notifications.cancel(reminder);
        }
        removed
    }

    pub fn add_note(&mut self, task: NoteTask) -> TaskId {
        let id = task.id;
        self.store.add_note(task);
        id
    }

    pub fn update_note(&mut self, task: NoteTask) -> bool {
        self.store.update_note(task)
    }

    pub fn delete_notes(&mut self, ids: impl IntoIterator<Item = TaskId>) -> Vec<NoteTask> {
        self.store.delete_notes(ids)
    }

    pub fn into_store(self) -> TaskStore<S> {
        self.store
    }
}
