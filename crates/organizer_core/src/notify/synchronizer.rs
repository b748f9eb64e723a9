//! Maps reminder lifecycle events onto scheduled one-shot alerts.
//!
//! # Responsibility
//! - Schedule, cancel and reschedule alerts keyed by reminder ID.
//! - Request alert permission once, best-effort.
//!
//! # Invariants
//! - Reminders due at or before now are never scheduled.
//! - `reschedule` cancels before scheduling, so at most one alert per ID
//!   is pending.
//! - Permission outcome never changes store or scheduling behavior.
//! - After `reconcile`, pending alerts are exactly the future reminders given.

use super::{
    AlertRequest, AuthorizationOptions, NotificationCenter, NotificationError, PresentationPolicy,
};
use crate::clock::Clock;
use crate::model::reminder::ReminderTask;
use log::{debug, info, warn};
use std::sync::Arc;

/// Alert scheduler injected into whatever owns reminder mutations.
pub struct NotificationSynchronizer {
    center: Arc<dyn NotificationCenter>,
    clock: Arc<dyn Clock>,
}

impl NotificationSynchronizer {
    /// Creates a synchronizer and installs the foreground presentation override.
    pub fn new(center: Arc<dyn NotificationCenter>, clock: Arc<dyn Clock>) -> Self {
        center.set_presentation_policy(PresentationPolicy::FOREGROUND_BANNER);
        Self { center, clock }
    }

    /// Asks the platform for alert, sound and badge rights.
    ///
    /// Returns immediately; the outcome is only logged.
    pub fn request_permission(&self) {
        info!("event=notify_permission module=notify status=start");
        self.center.request_authorization(
            AuthorizationOptions::ALL,
            Box::new(|outcome: Result<bool, NotificationError>| match outcome {
                Ok(true) => info!("event=notify_permission module=notify status=ok granted=true"),
                Ok(false) => {
                    warn!("event=notify_permission module=notify status=denied granted=false")
                }
                Err(err) => {
                    warn!("event=notify_permission module=notify status=error error={err}")
                }
            }),
        );
    }

    /// Registers a one-shot alert for `reminder` if it is due in the future.
    ///
    /// Returns whether a request was handed to the platform.
    pub fn schedule(&self, reminder: &ReminderTask) -> bool {
        if !reminder.is_upcoming_at(self.clock.now()) {
            debug!(
                "event=notify_schedule module=notify status=skipped reason=not_in_future id={}",
                reminder.id
            );
            return false;
        }

        let request = AlertRequest {
            id: reminder.id,
            headline: reminder.name.clone(),
            trigger: self.clock.calendar_fields(reminder.due_at),
            urgency: reminder.urgency,
            sound: true,
        };
        let id = reminder.id;
        self.center.schedule_one_shot(
            request,
            Box::new(move |outcome: Result<(), NotificationError>| match outcome {
                Ok(()) => debug!("event=notify_schedule module=notify status=ok id={id}"),
                Err(err) => {
                    warn!("event=notify_schedule module=notify status=error id={id} error={err}")
                }
            }),
        );
        true
    }

    /// Removes the pending alert for `reminder`, if any.
    pub fn cancel(&self, reminder: &ReminderTask) {
        self.center.cancel_scheduled(&[reminder.id]);
        debug!("event=notify_cancel module=notify status=ok id={}", reminder.id);
    }

    /// Cancels then schedules, leaving at most one pending alert.
    pub fn reschedule(&self, reminder: &ReminderTask) -> bool {
        self.cancel(reminder);
        self.schedule(reminder)
    }

    /// Replaces every pending alert with one per future reminder in `reminders`.
    ///
    /// Alerts whose reminder is gone (a cancel lost before reaching the
    /// platform) are dropped. Returns the number of alerts handed to the platform.
    pub fn reconcile<'a>(&self, reminders: impl IntoIterator<Item = &'a ReminderTask>) -> usize {
        self.center.cancel_all_pending();
        let scheduled = reminders
            .into_iter()
            .filter(|reminder| self.schedule(reminder))
            .count();
        info!("event=notify_reconcile module=notify status=ok scheduled={scheduled}");
        scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationSynchronizer;
    use crate::clock::{Clock, FixedClock};
    use crate::model::reminder::{ReminderTask, Urgency};
    use crate::notify::memory::AuthorizationResponse;
    use crate::notify::{InMemoryNotificationCenter, PresentationPolicy};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn fixture() -> (Arc<FixedClock>, Arc<InMemoryNotificationCenter>, NotificationSynchronizer) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        ));
        let center = Arc::new(InMemoryNotificationCenter::default());
        let sync = NotificationSynchronizer::new(center.clone(), clock.clone());
        (clock, center, sync)
    }

    #[test]
    fn new_installs_foreground_presentation() {
        let (_, center, _) = fixture();
        assert_eq!(
            center.presentation_policy(),
            Some(PresentationPolicy::FOREGROUND_BANNER)
        );
    }

    #[test]
    fn schedule_carries_name_urgency_and_minute_precision() {
        let (clock, center, sync) = fixture();
        let due_at = clock.now() + Duration::hours(1) + Duration::seconds(42);
        let reminder = ReminderTask::new("Stretch", due_at, Urgency::Critical);

        assert!(sync.schedule(&reminder));
        let alert = center.pending_for(reminder.id).unwrap();
        assert_eq!(alert.headline, "Stretch");
        assert_eq!(alert.urgency, Urgency::Critical);
        assert_eq!(alert.metadata(), vec![("urgencyLevel", 4)]);
        assert_eq!((alert.trigger.hour, alert.trigger.minute), (13, 0));
    }

    #[test]
    fn schedule_skips_reminder_due_exactly_now() {
        let (clock, center, sync) = fixture();
        let reminder = ReminderTask::new("now", clock.now(), Urgency::Low);
        assert!(!sync.schedule(&reminder));
        assert_eq!(center.pending_count(), 0);
    }

    #[test]
    fn denied_permission_does_not_block_scheduling() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
        let center = Arc::new(InMemoryNotificationCenter::new(AuthorizationResponse::Deny));
        let sync = NotificationSynchronizer::new(center.clone(), clock.clone());

        sync.request_permission();
        assert_eq!(center.granted(), Some(false));

        let reminder = ReminderTask::new("silent", clock.now() + Duration::minutes(5), Urgency::Low);
        assert!(sync.schedule(&reminder));
        assert_eq!(center.pending_count(), 1);
    }

    #[test]
    fn platform_schedule_failure_is_absorbed() {
        let (clock, center, sync) = fixture();
        center.fail_scheduling(Some("quota".to_string()));
        let reminder = ReminderTask::new("x", clock.now() + Duration::hours(2), Urgency::Medium);

        assert!(sync.schedule(&reminder));
        assert_eq!(center.pending_count(), 0);
    }
}
