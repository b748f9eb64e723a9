//! Reminder domain model.
//!
//! # Responsibility
//! - Define the timed reminder record and its urgency scale.
//! - Provide presentation helpers (label, color asset, due-time text).
//!
//! # Invariants
//! - `id` is generated once and kept across edits.
//! - `urgency` never affects scheduling order; only `due_at` does.

use super::TaskId;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

const DUE_LABEL_FORMAT: &str = "%b %-d, %-I:%M %p";

/// Ordered urgency classification for reminders.
///
/// Drives presentation color and alert metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// All levels in ascending order.
    pub const ALL: [Urgency; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Stable numeric level carried in alert metadata (`1..=4`).
    pub fn level(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Parses a numeric level, returning `None` outside `1..=4`.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            4 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Parses alert metadata, falling back to `Medium` for unknown levels.
    pub fn from_metadata_level(level: i64) -> Self {
        Self::from_level(level).unwrap_or(Self::Medium)
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Very High",
        }
    }

    /// Color asset name used by the UI for rows and alert tint.
    pub fn color_asset(self) -> &'static str {
        match self {
            Self::Low => "UrgencyLevelOneColor",
            Self::Medium => "UrgencyLevelTwoColor",
            Self::High => "UrgencyLevelThreeColor",
            Self::Critical => "UrgencyLevelFourColor",
        }
    }
}

/// Named, time-triggered reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderTask {
    /// Stable ID, also the key of the reminder's scheduled alert.
    pub id: TaskId,
    /// Display label; may be empty.
    pub name: String,
    /// Absolute instant the reminder fires at.
    pub due_at: DateTime<Utc>,
    pub urgency: Urgency,
}

impl ReminderTask {
    /// Creates a reminder with a freshly generated ID.
    pub fn new(name: impl Into<String>, due_at: DateTime<Utc>, urgency: Urgency) -> Self {
        Self::with_id(Uuid::new_v4(), name, due_at, urgency)
    }

    /// Creates a reminder with a caller-provided ID.
    ///
    /// Used by edit flows that must keep the original identity.
    pub fn with_id(
        id: TaskId,
        name: impl Into<String>,
        due_at: DateTime<Utc>,
        urgency: Urgency,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            due_at,
            urgency,
        }
    }

    /// Returns whether `due_at` lies strictly before `now`.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.due_at < now
    }

    /// Returns whether `due_at` lies strictly after `now`.
    pub fn is_upcoming_at(&self, now: DateTime<Utc>) -> bool {
        self.due_at > now
    }

    /// Formats the due time for list rows, e.g. `Oct 19, 9:00 AM`.
    pub fn due_label<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: Display,
    {
        self.due_at
            .with_timezone(tz)
            .format(DUE_LABEL_FORMAT)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ReminderTask, Urgency};
    use chrono::{TimeZone, Utc};

    #[test]
    fn urgency_levels_are_ordered_and_reversible() {
        for urgency in Urgency::ALL {
            assert_eq!(Urgency::from_level(i64::from(urgency.level())), Some(urgency));
        }
        assert!(Urgency::Low < Urgency::Critical);
        assert_eq!(Urgency::from_level(0), None);
        assert_eq!(Urgency::from_metadata_level(9), Urgency::Medium);
    }

    #[test]
    fn critical_is_labelled_very_high() {
        assert_eq!(Urgency::Critical.label(), "Very High");
        assert_eq!(Urgency::Critical.color_asset(), "UrgencyLevelFourColor");
    }

    #[test]
    fn due_label_uses_short_month_and_twelve_hour_clock() {
        let due_at = Utc.with_ymd_and_hms(2026, 10, 19, 21, 5, 0).unwrap();
        let reminder = ReminderTask::new("Pay rent", due_at, Urgency::High);
        assert_eq!(reminder.due_label(&Utc), "Oct 19, 9:05 PM");
    }

    #[test]
    fn overdue_and_upcoming_are_strict() {
        let due_at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let reminder = ReminderTask::new("", due_at, Urgency::Low);
        assert!(!reminder.is_overdue_at(due_at));
        assert!(!reminder.is_upcoming_at(due_at));
    }
}
