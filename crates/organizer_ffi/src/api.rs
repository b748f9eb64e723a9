//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose reminder/note use-cases and alert plumbing to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` plus a message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Organizer access is serialized; each call loads, mutates and persists.
//! - Alert side effects only reach the platform through `notifications_drain_commands`.

use crate::outbox::{AlertCommand, AlertOutbox};
use chrono::{Local, TimeZone, Utc};
use log::warn;
use once_cell::sync::Lazy;
use organizer_core::db::open_db;
use organizer_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    NoteTask, NotificationError, Organizer, ReminderTask, SqliteKeyValueStore, SystemClock,
    TaskId, Urgency,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use uuid::Uuid;

const ENTRY_DB_FILE_NAME: &str = "organizer.sqlite3";
const DB_PATH_ENV: &str = "ORGANIZER_DB_PATH";

static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static ALERT_OUTBOX: Lazy<Arc<AlertOutbox>> = Lazy::new(|| Arc::new(AlertOutbox::default()));
static ORGANIZER_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
/// Repeating the same `level + log_dir` is idempotent.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Reminder row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub id: String,
    pub name: String,
    pub due_at_epoch_ms: i64,
    /// Device-local display text, e.g. `Oct 19, 9:00 AM`.
    pub due_label: String,
    pub urgency_level: u8,
    pub urgency_label: String,
    pub color_asset: String,
    pub overdue: bool,
}

/// Label and color for one urgency level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrgencyStyle {
    pub urgency_level: u8,
    pub urgency_label: String,
    pub color_asset: String,
}

/// Note card/detail payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub name: String,
    pub plain_text: String,
    pub rich_content: Option<Vec<u8>>,
    pub drawing_content: Option<Vec<u8>>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    /// Whether the call reached the store.
    pub ok: bool,
    /// ID of the created or updated record, when there is one.
    pub task_id: Option<String>,
    pub message: String,
}

impl EntryActionResponse {
    fn success(message: impl Into<String>, task_id: Option<TaskId>) -> Self {
        Self {
            ok: true,
            task_id: task_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Adds a reminder and queues its alert when due in the future.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_add(name: String, due_at_epoch_ms: i64, urgency_level: u8) -> EntryActionResponse {
    let task = match build_reminder(Uuid::new_v4(), name, due_at_epoch_ms, urgency_level) {
        Ok(task) => task,
        Err(message) => return EntryActionResponse::failure(message),
    };
    match with_organizer(|organizer| organizer.add_reminder(task)) {
        Ok(id) => EntryActionResponse::success("Reminder added.", Some(id)),
        Err(err) => EntryActionResponse::failure(format!("reminder_add failed: {err}")),
    }
}

/// Replaces a reminder by ID and reschedules its alert.
///
/// Unknown IDs are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_update(
    id: String,
    name: String,
    due_at_epoch_ms: i64,
    urgency_level: u8,
) -> EntryActionResponse {
    let Some(task_id) = parse_task_id(&id) else {
        return EntryActionResponse::success("Reminder not found; nothing changed.", None);
    };
    let task = match build_reminder(task_id, name, due_at_epoch_ms, urgency_level) {
        Ok(task) => task,
        Err(message) => return EntryActionResponse::failure(message),
    };
    match with_organizer(|organizer| organizer.update_reminder(task)) {
        Ok(true) => EntryActionResponse::success("Reminder updated.", Some(task_id)),
        Ok(false) => EntryActionResponse::success("Reminder not found; nothing changed.", None),
        Err(err) => EntryActionResponse::failure(format!("reminder_update failed: {err}")),
    }
}

/// Deletes reminders by ID and cancels their alerts. Unknown IDs are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_delete(ids: Vec<String>) -> EntryActionResponse {
    let ids = ids.iter().filter_map(|id| parse_task_id(id)).collect::<Vec<_>>();
    match with_organizer(|organizer| organizer.delete_reminders(ids).len()) {
        Ok(count) => EntryActionResponse::success(format!("Deleted {count} reminder(s)."), None),
        Err(err) => EntryActionResponse::failure(format!("reminder_delete failed: {err}")),
    }
}

/// All reminders, ascending by due time. Empty when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_list() -> Vec<ReminderItem> {
    list_or_empty("reminders_list", |organizer| {
        let store = organizer.store();
        store
            .reminders()
            .iter()
            .map(|task| to_reminder_item(task, store.is_overdue(task)))
            .collect()
    })
}

/// Reminders due strictly in the future, ascending by due time.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_upcoming() -> Vec<ReminderItem> {
    list_or_empty("reminders_upcoming", |organizer| {
        organizer
            .store()
            .upcoming_reminders()
            .map(|task| to_reminder_item(task, false))
            .collect()
    })
}

/// Adds a note. Rich and drawing payloads are stored byte-for-byte.
#[flutter_rust_bridge::frb(sync)]
pub fn note_add(
    name: String,
    plain_text: String,
    rich_content: Option<Vec<u8>>,
    drawing_content: Option<Vec<u8>>,
) -> EntryActionResponse {
    let task = build_note(Uuid::new_v4(), name, plain_text, rich_content, drawing_content);
    match with_organizer(|organizer| organizer.add_note(task)) {
        Ok(id) => EntryActionResponse::success("Note added.", Some(id)),
        Err(err) => EntryActionResponse::failure(format!("note_add failed: {err}")),
    }
}

/// Replaces a note by ID. Unknown IDs are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(
    id: String,
    name: String,
    plain_text: String,
    rich_content: Option<Vec<u8>>,
    drawing_content: Option<Vec<u8>>,
) -> EntryActionResponse {
    let Some(task_id) = parse_task_id(&id) else {
        return EntryActionResponse::success("Note not found; nothing changed.", None);
    };
    let task = build_note(task_id, name, plain_text, rich_content, drawing_content);
    match with_organizer(|organizer| organizer.update_note(task)) {
        Ok(true) => EntryActionResponse::success("Note updated.", Some(task_id)),
        Ok(false) => EntryActionResponse::success("Note not found; nothing changed.", None),
        Err(err) => EntryActionResponse::failure(format!("note_update failed: {err}")),
    }
}

/// Deletes notes by ID. Unknown IDs are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(ids: Vec<String>) -> EntryActionResponse {
    let ids = ids.iter().filter_map(|id| parse_task_id(id)).collect::<Vec<_>>();
    match with_organizer(|organizer| organizer.delete_notes(ids).len()) {
        Ok(count) => EntryActionResponse::success(format!("Deleted {count} note(s)."), None),
        Err(err) => EntryActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

/// All notes in insertion order. Empty when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> Vec<NoteItem> {
    list_or_empty("notes_list", |organizer| {
        organizer
            .store()
            .notes()
            .iter()
            .map(|note| NoteItem {
                id: note.id.to_string(),
                name: note.name.clone(),
                plain_text: note.plain_text.clone(),
                rich_content: note.rich_content.clone(),
                drawing_content: note.drawing_content.clone(),
            })
            .collect()
    })
}

/// Queues a one-time alert/sound/badge permission prompt.
///
/// The outcome must be reported back via `notifications_report_permission`.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_request_permission() -> EntryActionResponse {
    match with_organizer(|organizer| organizer.request_permission()) {
        Ok(()) => EntryActionResponse::success("Permission request queued.", None),
        Err(err) => {
            EntryActionResponse::failure(format!("notifications_request_permission failed: {err}"))
        }
    }
}

/// Reports the platform permission outcome; only logged by core.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_report_permission(granted: bool, error: Option<String>) -> u32 {
    let outcome = match error {
        Some(message) if !message.trim().is_empty() => Err(NotificationError::Platform(message)),
        _ => Ok(granted),
    };
    ALERT_OUTBOX.resolve_authorization(outcome) as u32
}

/// Cold-start hook: replaces pending alerts with one per future reminder.
///
/// Queues `CancelAll` first, so alerts whose cancel was lost are dropped, and
/// re-queues the presentation policy for a freshly started UI.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_reconcile() -> EntryActionResponse {
    ALERT_OUTBOX.forget_presentation_policy();
    match with_organizer(|organizer| organizer.reconcile_alerts()) {
        Ok(count) => EntryActionResponse::success(format!("Scheduled {count} alert(s)."), None),
        Err(err) => EntryActionResponse::failure(format!("notifications_reconcile failed: {err}")),
    }
}

/// Presentation style for the `urgencyLevel` metadata of a delivered alert.
///
/// Unknown levels fall back to medium.
#[flutter_rust_bridge::frb(sync)]
pub fn alert_urgency_style(urgency_level: i64) -> UrgencyStyle {
    let urgency = Urgency::from_metadata_level(urgency_level);
    UrgencyStyle {
        urgency_level: urgency.level(),
        urgency_label: urgency.label().to_string(),
        color_asset: urgency.color_asset().to_string(),
    }
}

/// Takes queued alert commands for forwarding to the platform plugin.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_drain_commands() -> Vec<AlertCommand> {
    ALERT_OUTBOX.drain()
}

fn build_reminder(
    id: TaskId,
    name: String,
    due_at_epoch_ms: i64,
    urgency_level: u8,
) -> Result<ReminderTask, String> {
    let urgency = Urgency::from_level(i64::from(urgency_level))
        .ok_or_else(|| format!("unsupported urgency level `{urgency_level}`; expected 1..=4"))?;
    let due_at = Utc
        .timestamp_millis_opt(due_at_epoch_ms)
        .single()
        .ok_or_else(|| format!("due_at_epoch_ms out of range: {due_at_epoch_ms}"))?;
    Ok(ReminderTask::with_id(id, name, due_at, urgency))
}

fn build_note(
    id: TaskId,
    name: String,
    plain_text: String,
    rich_content: Option<Vec<u8>>,
    drawing_content: Option<Vec<u8>>,
) -> NoteTask {
    let mut note = NoteTask::with_id(id, name, plain_text);
    note.rich_content = rich_content;
    note.drawing_content = drawing_content;
    note
}

fn parse_task_id(raw: &str) -> Option<TaskId> {
    Uuid::parse_str(raw.trim()).ok()
}

fn to_reminder_item(task: &ReminderTask, overdue: bool) -> ReminderItem {
    ReminderItem {
        id: task.id.to_string(),
        name: task.name.clone(),
        due_at_epoch_ms: task.due_at.timestamp_millis(),
        due_label: task.due_label(&Local),
        urgency_level: task.urgency.level(),
        urgency_label: task.urgency.label().to_string(),
        color_asset: task.urgency.color_asset().to_string(),
        overdue,
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn with_organizer<T>(
    f: impl FnOnce(&mut Organizer<SqliteKeyValueStore<'_>>) -> T,
) -> Result<T, String> {
    let _guard = match ORGANIZER_LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let conn = open_db(resolve_entry_db_path())
        .map_err(|err| format!("entry DB open failed: {err}"))?;
    let outbox: Arc<AlertOutbox> = Arc::clone(&ALERT_OUTBOX);
    let mut organizer = Organizer::open(
        SqliteKeyValueStore::new(&conn),
        outbox,
        Arc::new(SystemClock),
    );
    Ok(f(&mut organizer))
}

fn list_or_empty<T>(
    operation: &str,
    f: impl FnOnce(&mut Organizer<SqliteKeyValueStore<'_>>) -> Vec<T>,
) -> Vec<T> {
    with_organizer(f).unwrap_or_else(|err| {
        warn!("event={operation} module=ffi status=error error={err}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::{
        alert_urgency_style, core_version, init_logging, note_add, note_delete, note_update, notes_list,
        notifications_drain_commands, notifications_reconcile, notifications_report_permission,
        notifications_request_permission, ping, reminder_add, reminder_delete, reminder_update,
        reminders_list, reminders_upcoming,
    };
    use crate::outbox::AlertCommand;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    // Serializes tests that inspect the process-wide alert outbox.
    static OUTBOX_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn future_ms(hours: i64) -> i64 {
        (Utc::now() + Duration::hours(hours)).timestamp_millis()
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn reminder_add_rejects_unknown_urgency_level() {
        let response = reminder_add("bad".to_string(), future_ms(1), 9);
        assert!(!response.ok);
        assert!(response.message.contains("urgency"));
    }

    #[test]
    fn reminder_lifecycle_queues_schedule_and_cancel() {
        let _lock = OUTBOX_TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        notifications_drain_commands();

        let created = reminder_add("Pay rent".to_string(), future_ms(24), 3);
        assert!(created.ok, "{}", created.message);
        let id = created.task_id.clone().expect("reminder id");

        let listed = reminders_upcoming();
        let item = listed.iter().find(|item| item.id == id).expect("upcoming reminder");
        assert_eq!(item.urgency_label, "High");
        assert!(!item.overdue);

        let updated = reminder_update(id.clone(), "Pay rent".to_string(), future_ms(48), 4);
        assert!(updated.ok, "{}", updated.message);
        let deleted = reminder_delete(vec![id.clone(), "not-an-id".to_string()]);
        assert_eq!(deleted.message, "Deleted 1 reminder(s).");
        assert!(reminders_list().iter().all(|item| item.id != id));

        let commands = notifications_drain_commands();
        let schedules = commands
            .iter()
            .filter(|command| matches!(command, AlertCommand::Schedule { alert_id, .. } if *alert_id == id))
            .count();
        let cancels = commands
            .iter()
            .filter(|command| matches!(command, AlertCommand::Cancel { alert_ids } if alert_ids.contains(&id)))
            .count();
        assert_eq!(schedules, 2);
        assert_eq!(cancels, 2);
    }

    #[test]
    fn past_reminder_is_listed_overdue_without_alert() {
        let _lock = OUTBOX_TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        notifications_drain_commands();

        let created = reminder_add("missed".to_string(), future_ms(-2), 1);
        let id = created.task_id.expect("reminder id");
        assert!(reminders_list().iter().any(|item| item.id == id && item.overdue));
        assert!(reminders_upcoming().iter().all(|item| item.id != id));
        assert!(notifications_drain_commands()
            .iter()
            .all(|command| !matches!(command, AlertCommand::Schedule { alert_id, .. } if *alert_id == id)));

        reminder_delete(vec![id]);
    }

    #[test]
    fn reconcile_clears_then_schedules_future_reminders() {
        let _lock = OUTBOX_TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let created = reminder_add("Water plants".to_string(), future_ms(6), 2);
        let id = created.task_id.expect("reminder id");
        notifications_drain_commands();

        let response = notifications_reconcile();
        assert!(response.ok, "{}", response.message);

        let commands = notifications_drain_commands();
        assert_eq!(
            commands
                .iter()
                .filter(|command| matches!(command, AlertCommand::PresentationPolicy { .. }))
                .count(),
            1
        );
        let cancel_all = commands
            .iter()
            .position(|command| *command == AlertCommand::CancelAll)
            .expect("cancel all queued");
        let schedule = commands
            .iter()
            .position(|command| matches!(command, AlertCommand::Schedule { alert_id, .. } if *alert_id == id))
            .expect("schedule queued");
        assert!(cancel_all < schedule);
        match &commands[schedule] {
            AlertCommand::Schedule { metadata, .. } => {
                assert_eq!(metadata[0].key, "urgencyLevel");
                assert_eq!(metadata[0].value, 2);
            }
            other => panic!("unexpected command {other:?}"),
        }

        reminder_delete(vec![id]);
        notifications_drain_commands();
    }

    #[test]
    fn alert_urgency_style_falls_back_to_medium() {
        let critical = alert_urgency_style(4);
        assert_eq!(critical.urgency_label, "Very High");
        assert_eq!(critical.color_asset, "UrgencyLevelFourColor");

        let unknown = alert_urgency_style(42);
        assert_eq!(unknown.urgency_level, 2);
        assert_eq!(unknown.urgency_label, "Medium");
    }

    #[test]
    fn update_with_unknown_id_is_successful_noop() {
        let response = reminder_update(uuid::Uuid::new_v4().to_string(), "x".to_string(), 0, 2);
        assert!(response.ok);
        assert_eq!(response.task_id, None);
    }

    #[test]
    fn note_payloads_round_trip_through_storage() {
        let created = note_add(
            "Sketch".to_string(),
            "tree".to_string(),
            Some(vec![1, 2, 3]),
            None,
        );
        let id = created.task_id.expect("note id");
        let stored = notes_list().into_iter().find(|note| note.id == id).expect("note");
        assert_eq!(stored.rich_content, Some(vec![1, 2, 3]));
        assert_eq!(stored.drawing_content, None);

        let updated = note_update(id.clone(), "Sketch".to_string(), "tree".to_string(), None, Some(vec![7]));
        assert!(updated.ok);
        let stored = notes_list().into_iter().find(|note| note.id == id).expect("note");
        assert_eq!(stored.rich_content, None);
        assert_eq!(stored.drawing_content, Some(vec![7]));

        assert_eq!(note_delete(vec![id]).message, "Deleted 1 note(s).");
    }

    #[test]
    fn permission_request_waits_for_report() {
        let _lock = OUTBOX_TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        notifications_drain_commands();
        notifications_report_permission(true, None);

        assert!(notifications_request_permission().ok);
        assert!(notifications_drain_commands()
            .iter()
            .any(|command| matches!(command, AlertCommand::RequestAuthorization { .. })));
        assert_eq!(notifications_report_permission(false, None), 1);
        assert_eq!(notifications_report_permission(false, None), 0);
    }
}
