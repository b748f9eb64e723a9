use chrono::{TimeZone, Utc};
use organizer_core::{NoteTask, ReminderTask, Urgency};
use uuid::Uuid;

const FIXED_ID: &str = "11111111-2222-4333-8444-555555555555";

#[test]
fn reminder_serializes_with_expected_wire_fields() {
    let id = Uuid::parse_str(FIXED_ID).unwrap();
    let due_at = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
    let reminder = ReminderTask::with_id(id, "Pay rent", due_at, Urgency::Critical);

    let json = serde_json::to_value(&reminder).unwrap();
    assert_eq!(json["id"], FIXED_ID);
    assert_eq!(json["name"], "Pay rent");
    assert_eq!(json["due_at"], "2026-10-19T09:00:00Z");
    assert_eq!(json["urgency"], "critical");

    let decoded: ReminderTask = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, reminder);
}

#[test]
fn note_payloads_are_base64_strings() {
    let id = Uuid::parse_str(FIXED_ID).unwrap();
    let mut note = NoteTask::with_id(id, "Sketch", "hello");
    note.set_rich_content(b"rtf".to_vec(), "hello");
    note.set_drawing_content(Some(vec![0, 1, 2]));

    let json = serde_json::to_value(&note).unwrap();
    assert_eq!(json["rich_content"], "cnRm");
    assert_eq!(json["drawing_content"], "AAEC");
    assert!(note.has_drawing());
}

#[test]
fn note_decodes_with_absent_or_null_payloads() {
    let absent = serde_json::json!({
        "id": FIXED_ID,
        "name": "Idea",
        "plain_text": "buy milk"
    });
    let null = serde_json::json!({
        "id": FIXED_ID,
        "name": "Idea",
        "plain_text": "buy milk",
        "rich_content": null,
        "drawing_content": null
    });

    for value in [absent, null] {
        let note: NoteTask = serde_json::from_value(value).unwrap();
        assert_eq!(note.rich_content, None);
        assert_eq!(note.drawing_content, None);
        assert!(!note.has_drawing());
    }
}

#[test]
fn note_rejects_non_base64_payload() {
    let value = serde_json::json!({
        "id": FIXED_ID,
        "name": "Idea",
        "plain_text": "",
        "drawing_content": "***"
    });
    let err = serde_json::from_value::<NoteTask>(value).unwrap_err();
    assert!(err.to_string().contains("base64"), "unexpected error: {err}");
}

#[test]
fn clearing_rich_content_keeps_plain_text() {
    let mut note = NoteTask::new("n", "");
    note.set_rich_content(vec![9], "formatted");
    note.clear_rich_content();
    assert_eq!(note.rich_content, None);
    assert_eq!(note.plain_text, "formatted");
}
