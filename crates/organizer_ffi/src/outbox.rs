//! Process-wide alert outbox bridging core scheduling to the Dart side.
//!
//! # Responsibility
//! - Queue alert side effects as plain commands for the UI to forward to the
//!   platform notification plugin.
//! - Hold authorization callbacks until the UI reports the prompt outcome.
//!
//! # Invariants
//! - Commands are drained in the order they were queued.
//! - Presentation policy is queued only when it changes, or again after
//!   `forget_presentation_policy` (UI cold start).

use organizer_core::{
    AlertRequest, AuthorizationOptions, NotificationCenter, NotificationError,
    PresentationPolicy, TaskId,
};
use organizer_core::notify::{AuthorizationCallback, ScheduleCallback};
use std::sync::{Mutex, MutexGuard};

/// Alert side effect for the platform notification plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertCommand {
    RequestAuthorization {
        alert: bool,
        sound: bool,
        badge: bool,
    },
    /// Non-repeating calendar trigger; replaces any pending alert with the same id.
    Schedule {
        alert_id: String,
        headline: String,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        /// Platform user-info entries, e.g. `urgencyLevel`.
        metadata: Vec<AlertMetadataEntry>,
        sound: bool,
    },
    Cancel {
        alert_ids: Vec<String>,
    },
    /// Remove every pending alert the app registered.
    CancelAll,
    PresentationPolicy {
        allow_while_foreground: bool,
        banner: bool,
        sound: bool,
    },
}

/// One key/value pair attached to a scheduled alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMetadataEntry {
    pub key: String,
    pub value: i64,
}

impl From<AlertRequest> for AlertCommand {
    fn from(request: AlertRequest) -> Self {
        let metadata = request
            .metadata()
            .into_iter()
            .map(|(key, value)| AlertMetadataEntry {
                key: key.to_string(),
                value,
            })
            .collect();
        Self::Schedule {
            alert_id: request.id.to_string(),
            headline: request.headline,
            year: request.trigger.year,
            month: request.trigger.month,
            day: request.trigger.day,
            hour: request.trigger.hour,
            minute: request.trigger.minute,
            metadata,
            sound: request.sound,
        }
    }
}

#[derive(Default)]
struct OutboxState {
    commands: Vec<AlertCommand>,
    pending_authorization: Vec<AuthorizationCallback>,
    policy: Option<PresentationPolicy>,
}

/// `NotificationCenter` that queues commands instead of calling the platform.
#[derive(Default)]
pub struct AlertOutbox {
    state: Mutex<OutboxState>,
}

impl AlertOutbox {
    /// Takes every queued command.
    pub fn drain(&self) -> Vec<AlertCommand> {
        std::mem::take(&mut self.lock().commands)
    }

    /// Completes waiting authorization callbacks; returns how many were waiting.
    pub fn resolve_authorization(&self, outcome: Result<bool, NotificationError>) -> usize {
        let callbacks = std::mem::take(&mut self.lock().pending_authorization);
        let count = callbacks.len();
        for callback in callbacks {
            callback(outcome.clone());
        }
        count
    }

    /// Makes the next policy install queue a command even if unchanged.
    pub fn forget_presentation_policy(&self) {
        self.lock().policy = None;
    }

    fn lock(&self) -> MutexGuard<'_, OutboxState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl NotificationCenter for AlertOutbox {
    fn request_authorization(&self, options: AuthorizationOptions, on_complete: AuthorizationCallback) {
        let mut state = self.lock();
        state.commands.push(AlertCommand::RequestAuthorization {
            alert: options.alert,
            sound: options.sound,
            badge: options.badge,
        });
        state.pending_authorization.push(on_complete);
    }

    fn schedule_one_shot(&self, request: AlertRequest, on_complete: ScheduleCallback) {
        self.lock().commands.push(request.into());
        on_complete(Ok(()));
    }

    fn cancel_scheduled(&self, ids: &[TaskId]) {
        if ids.is_empty() {
            return;
        }
        self.lock().commands.push(AlertCommand::Cancel {
            alert_ids: ids.iter().map(ToString::to_string).collect(),
        });
    }

    fn cancel_all_pending(&self) {
        self.lock().commands.push(AlertCommand::CancelAll);
    }

    fn set_presentation_policy(&self, policy: PresentationPolicy) {
        let mut state = self.lock();
        if state.policy == Some(policy) {
            return;
        }
        state.policy = Some(policy);
        state.commands.push(AlertCommand::PresentationPolicy {
            allow_while_foreground: policy.allow_while_foreground,
            banner: policy.banner,
            sound: policy.sound,
        });
    }
}
