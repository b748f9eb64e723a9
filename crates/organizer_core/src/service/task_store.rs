//! Reminder/note collection owner with persist-on-every-mutation semantics.
//!
//! # Responsibility
//! - Own the canonical reminder and note collections.
//! - Persist each collection as one JSON blob under a fixed key.
//! - Notify subscribers after every effective mutation.
//!
//! # Invariants
//! - Reminders are always sorted ascending by `due_at`.
//! - Notes keep pure insertion order.
//! - Update/delete of unknown IDs is a silent no-op.
//! - Encode and storage failures never surface through mutators; the last
//!   successful write stays authoritative.
//! - Loading isolates faults per record: malformed records are skipped, a
//!   blob that is not a JSON array yields an empty collection.

use crate::clock::Clock;
use crate::model::note::NoteTask;
use crate::model::reminder::ReminderTask;
use crate::model::TaskId;
use crate::storage::{KeyValueStore, StorageError};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Storage key of the persisted reminder collection.
pub const REMINDERS_KEY: &str = "reminderTasks";
/// Storage key of the persisted note collection.
pub const NOTES_KEY: &str = "noteTasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persist failure reported by `try_save_*`.
#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Collection-changed notification delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    RemindersChanged,
    NotesChanged,
}

/// Handle returned by `TaskStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(StoreEvent)>;

/// Single-threaded owner of reminders and notes.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    clock: Arc<dyn Clock>,
    reminders: Vec<ReminderTask>,
    notes: Vec<NoteTask>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Creates a store over `storage` and restores both collections.
    pub fn open(storage: S, clock: Arc<dyn Clock>) -> Self {
        let mut store = Self {
            storage,
            clock,
            reminders: Vec::new(),
            notes: Vec::new(),
            observers: Vec::new(),
            next_subscription: 0,
        };
        store.load();
        store
    }

    /// Restores both collections from storage.
    ///
    /// Reminders and notes fail independently; either may come back empty.
    pub fn load(&mut self) {
        self.reminders = load_collection(&self.storage, REMINDERS_KEY);
        self.sort_reminders();
        self.notes = load_collection(&self.storage, NOTES_KEY);
        info!(
            "event=store_load module=store status=ok reminders={} notes={}",
            self.reminders.len(),
            self.notes.len()
        );
        self.emit(StoreEvent::RemindersChanged);
        self.emit(StoreEvent::NotesChanged);
    }

    /// Reminders sorted ascending by `due_at`.
    pub fn reminders(&self) -> &[ReminderTask] {
        &self.reminders
    }

    /// Notes in insertion order.
    pub fn notes(&self) -> &[NoteTask] {
        &self.notes
    }

    pub fn reminder(&self, id: TaskId) -> Option<&ReminderTask> {
        self.reminders.iter().find(|task| task.id == id)
    }

    pub fn note(&self, id: TaskId) -> Option<&NoteTask> {
        self.notes.iter().find(|task| task.id == id)
    }

    /// Appends a reminder, re-sorts and persists. Input is not validated.
    pub fn add_reminder(&mut self, task: ReminderTask) {
        self.reminders.push(task);
        self.sort_reminders();
        self.save_reminders();
        self.emit(StoreEvent::RemindersChanged);
    }

    /// Replaces the reminder with the same ID.
    ///
    /// Returns `false` (and changes nothing) when the ID is unknown.
    pub fn update_reminder(&mut self, task: ReminderTask) -> bool {
        let Some(index) = self.reminders.iter().position(|item| item.id == task.id) else {
            debug!("event=reminder_update module=store status=skipped reason=not_found");
            return false;
        };
        self.reminders[index] = task;
        self.sort_reminders();
        self.save_reminders();
        self.emit(StoreEvent::RemindersChanged);
        true
    }

    /// Removes reminders by ID and returns the removed records.
    ///
    /// Unknown IDs are ignored; nothing is persisted when nothing matched.
    pub fn delete_reminders(&mut self, ids: impl IntoIterator<Item = TaskId>) -> Vec<ReminderTask> {
        let ids = ids.into_iter().collect::<BTreeSet<_>>();
        let removed = drain_where(&mut self.reminders, |task| ids.contains(&task.id));
        if !removed.is_empty() {
            self.save_reminders();
            self.emit(StoreEvent::RemindersChanged);
        }
        removed
    }

    /// Removes reminders by list position; out-of-range offsets are ignored.
    pub fn delete_reminders_at(&mut self, offsets: &BTreeSet<usize>) -> Vec<ReminderTask> {
        let ids = ids_at(&self.reminders, offsets, |task| task.id);
        self.delete_reminders(ids)
    }

    /// Appends a note and persists. Notes are never re-sorted.
    pub fn add_note(&mut self, task: NoteTask) {
        self.notes.push(task);
        self.save_notes();
        self.emit(StoreEvent::NotesChanged);
    }

    /// Replaces the note with the same ID in place.
    ///
    /// Returns `false` (and changes nothing) when the ID is unknown.
    pub fn update_note(&mut self, task: NoteTask) -> bool {
        let Some(slot) = self.notes.iter_mut().find(|item| item.id == task.id) else {
            debug!("event=note_update module=store status=skipped reason=not_found");
            return false;
        };
        *slot = task;
        self.save_notes();
        self.emit(StoreEvent::NotesChanged);
        true
    }

    /// Removes notes by ID and returns the removed records.
    pub fn delete_notes(&mut self, ids: impl IntoIterator<Item = TaskId>) -> Vec<NoteTask> {
        let ids = ids.into_iter().collect::<BTreeSet<_>>();
        let removed = drain_where(&mut self.notes, |task| ids.contains(&task.id));
        if !removed.is_empty() {
            self.save_notes();
            self.emit(StoreEvent::NotesChanged);
        }
        removed
    }

    /// Removes notes by list position; out-of-range offsets are ignored.
    pub fn delete_notes_at(&mut self, offsets: &BTreeSet<usize>) -> Vec<NoteTask> {
        let ids = ids_at(&self.notes, offsets, |task| task.id);
        self.delete_notes(ids)
    }

    /// Reminders due strictly after now, ascending by `due_at`.
    pub fn upcoming_reminders(&self) -> impl Iterator<Item = &ReminderTask> + '_ {
        let now = self.clock.now();
        self.reminders
            .iter()
            .filter(move |task| task.is_upcoming_at(now))
    }

    /// Reminders due strictly before now, ascending by `due_at`.
    pub fn overdue_reminders(&self) -> impl Iterator<Item = &ReminderTask> + '_ {
        let now = self.clock.now();
        self.reminders
            .iter()
            .filter(move |task| task.is_overdue_at(now))
    }

    pub fn is_overdue(&self, task: &ReminderTask) -> bool {
        task.is_overdue_at(self.clock.now())
    }

    /// Persists the reminder collection; failures are logged and swallowed.
    pub fn save_reminders(&mut self) {
        if let Err(err) = self.try_save_reminders() {
            warn!("event=store_save module=store status=error key={REMINDERS_KEY} error={err}");
        }
    }

    /// Persists the note collection; failures are logged and swallowed.
    pub fn save_notes(&mut self) {
        if let Err(err) = self.try_save_notes() {
            warn!("event=store_save module=store status=error key={NOTES_KEY} error={err}");
        }
    }

    pub fn try_save_reminders(&mut self) -> StoreResult<()> {
        save_collection(&mut self.storage, REMINDERS_KEY, &self.reminders)
    }

    pub fn try_save_notes(&mut self) -> StoreResult<()> {
        save_collection(&mut self.storage, NOTES_KEY, &self.notes)
    }

    /// Registers a collection-changed callback.
    pub fn subscribe(&mut self, observer: impl FnMut(StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drops a subscription. Returns `false` for unknown handles.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn sort_reminders(&mut self) {
        self.reminders.sort_by_key(|task| task.due_at);
    }

    fn emit(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
    }
}

fn save_collection<S, T>(storage: &mut S, key: &str, items: &[T]) -> StoreResult<()>
where
    S: KeyValueStore,
    T: Serialize,
{
    let encoded = serde_json::to_vec(items)?;
    storage.set(key, &encoded)?;
    debug!(
        "event=store_save module=store status=ok key={key} count={} bytes={}",
        items.len(),
        encoded.len()
    );
    Ok(())
}

fn load_collection<S, T>(storage: &S, key: &str) -> Vec<T>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let blob = match storage.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!("event=store_load module=store status=empty key={key}");
            return Vec::new();
        }
        Err(err) => {
            warn!("event=store_load module=store status=error key={key} error={err}");
            return Vec::new();
        }
    };

    let records = match serde_json::from_slice::<Vec<serde_json::Value>>(&blob) {
        Ok(records) => records,
        Err(err) => {
            warn!(
                "event=store_load module=store status=error key={key} error_code=blob_decode_failed error={err}"
            );
            return Vec::new();
        }
    };

    let total = records.len();
    let items = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<T>(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=skipped key={key} index={index} error={err}"
                );
                None
            }
        })
        .collect::<Vec<_>>();

    if items.len() != total {
        warn!(
            "event=store_load module=store status=partial key={key} kept={} dropped={}",
            items.len(),
            total - items.len()
        );
    }
    items
}

fn drain_where<T>(items: &mut Vec<T>, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if predicate(&item) {
            removed.push(item);
        } else {
            kept.push(item);
        }
    }
    *items = kept;
    removed
}

fn ids_at<T>(items: &[T], offsets: &BTreeSet<usize>, id_of: impl Fn(&T) -> TaskId) -> Vec<TaskId> {
    offsets
        .iter()
        .filter_map(|offset| items.get(*offset).map(&id_of))
        .collect()
}
