//! Time source and wall-clock resolution.
//!
//! # Responsibility
//! - Provide "now" to overdue/upcoming checks and alert scheduling.
//! - Resolve instants to calendar fields for one-shot alert triggers.
//!
//! # Invariants
//! - Calendar resolution drops seconds and sub-second precision.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use std::sync::Mutex;

/// Wall-clock fields an alert trigger matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerCalendar {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl TriggerCalendar {
    /// Resolves `instant` to calendar fields in `tz`.
    pub fn resolve<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> Self {
        let local = instant.with_timezone(tz);
        Self {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
        }
    }
}

/// Source of the current instant and of the user's wall-clock zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Resolves an instant to trigger calendar fields in the user's zone.
    fn calendar_fields(&self, instant: DateTime<Utc>) -> TriggerCalendar;
}

/// Production clock: system time, device-local calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn calendar_fields(&self, instant: DateTime<Utc>) -> TriggerCalendar {
        TriggerCalendar::resolve(instant, &Local)
    }
}

/// Manually driven clock with a UTC calendar.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    /// Advances the clock by `delta`.
    pub fn advance(&self, delta: chrono::Duration) {
        let next = self.now() + delta;
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn calendar_fields(&self, instant: DateTime<Utc>) -> TriggerCalendar {
        TriggerCalendar::resolve(instant, &Utc)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, TriggerCalendar};
    use chrono::{Duration, FixedOffset, TimeZone, Utc};

    #[test]
    fn resolve_drops_seconds() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 59).unwrap();
        let fields = TriggerCalendar::resolve(instant, &Utc);
        assert_eq!(
            fields,
            TriggerCalendar {
                year: 2026,
                month: 3,
                day: 4,
                hour: 5,
                minute: 6,
            }
        );
    }

    #[test]
    fn resolve_applies_zone_offset() {
        let instant = Utc.with_ymd_and_hms(2026, 12, 31, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let fields = TriggerCalendar::resolve(instant, &plus_two);
        assert_eq!((fields.year, fields.month, fields.day), (2027, 1, 1));
        assert_eq!((fields.hour, fields.minute), (1, 30));
    }

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::hours(1));
        assert_eq!(clock.now(), start + Duration::hours(1));
    }
}
