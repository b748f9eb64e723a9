//! Local alert scheduling for reminders.
//!
//! # Responsibility
//! - Define the platform notification capability the core talks to.
//! - Keep at most one pending one-shot alert per reminder ID.
//!
//! # Invariants
//! - Alert identifiers are reminder IDs; no other keys are scheduled.
//! - Platform callbacks are fire-and-forget: they log, never retry or block.

use crate::clock::TriggerCalendar;
use crate::model::reminder::Urgency;
use crate::model::TaskId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod synchronizer;

pub use memory::InMemoryNotificationCenter;
pub use synchronizer::NotificationSynchronizer;

/// Metadata key carrying `Urgency::level()` on scheduled alerts.
pub const URGENCY_METADATA_KEY: &str = "urgencyLevel";

/// Capabilities requested from the platform in one authorization prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationOptions {
    pub alert: bool,
    pub sound: bool,
    pub badge: bool,
}

impl AuthorizationOptions {
    pub const ALL: Self = Self {
        alert: true,
        sound: true,
        badge: true,
    };
}

/// How alerts are shown while the app is the foreground context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationPolicy {
    pub allow_while_foreground: bool,
    pub banner: bool,
    pub sound: bool,
}

impl PresentationPolicy {
    /// Present foreground alerts as banner plus sound instead of suppressing them.
    pub const FOREGROUND_BANNER: Self = Self {
        allow_while_foreground: true,
        banner: true,
        sound: true,
    };
}

/// One-shot alert registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    /// Reminder ID; doubles as the platform request identifier.
    pub id: TaskId,
    /// Alert title, taken from the reminder name.
    pub headline: String,
    /// Calendar fields the non-repeating trigger matches.
    pub trigger: TriggerCalendar,
    /// Presentation-only metadata; never changes alert priority.
    pub urgency: Urgency,
    pub sound: bool,
}

impl AlertRequest {
    /// Metadata entries attached to the platform request.
    pub fn metadata(&self) -> Vec<(&'static str, i64)> {
        vec![(URGENCY_METADATA_KEY, i64::from(self.urgency.level()))]
    }
}

/// Platform-side failure reported through a completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// User or policy refused alert permission.
    Denied,
    Platform(String),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied => write!(f, "notification permission denied"),
            Self::Platform(message) => write!(f, "notification platform error: {message}"),
        }
    }
}

impl Error for NotificationError {}

/// Completion of an authorization prompt: `Ok(granted)` or a platform error.
pub type AuthorizationCallback = Box<dyn FnOnce(Result<bool, NotificationError>) + Send>;
/// Acknowledgement of a scheduling request.
pub type ScheduleCallback = Box<dyn FnOnce(Result<(), NotificationError>) + Send>;

/// Host notification service.
///
/// Implementations may complete callbacks synchronously or later.
pub trait NotificationCenter: Send + Sync {
    fn request_authorization(&self, options: AuthorizationOptions, on_complete: AuthorizationCallback);
    fn schedule_one_shot(&self, request: AlertRequest, on_complete: ScheduleCallback);
    /// Removes pending alerts; unknown IDs are ignored.
    fn cancel_scheduled(&self, ids: &[TaskId]);
    /// Removes every pending alert registered by this app.
    fn cancel_all_pending(&self);
    fn set_presentation_policy(&self, policy: PresentationPolicy);
}
