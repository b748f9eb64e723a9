//! Recording notification center for tests and headless runs.

use super::{
    AlertRequest, AuthorizationCallback, AuthorizationOptions, NotificationCenter,
    NotificationError, PresentationPolicy, ScheduleCallback,
};
use crate::clock::TriggerCalendar;
use crate::model::TaskId;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Canned answer to authorization prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResponse {
    Grant,
    Deny,
    Fail(String),
}

#[derive(Debug)]
struct CenterState {
    pending: BTreeMap<TaskId, AlertRequest>,
    authorization_response: AuthorizationResponse,
    authorization_requests: Vec<AuthorizationOptions>,
    granted: Option<bool>,
    schedule_failure: Option<String>,
    policy: Option<PresentationPolicy>,
}

/// In-process `NotificationCenter` that completes callbacks synchronously.
///
/// Scheduling an existing ID replaces the pending alert, like the platform.
#[derive(Debug)]
pub struct InMemoryNotificationCenter {
    state: Mutex<CenterState>,
}

impl Default for InMemoryNotificationCenter {
    fn default() -> Self {
        Self::new(AuthorizationResponse::Grant)
    }
}

impl InMemoryNotificationCenter {
    pub fn new(authorization_response: AuthorizationResponse) -> Self {
        Self {
            state: Mutex::new(CenterState {
                pending: BTreeMap::new(),
                authorization_response,
                authorization_requests: Vec::new(),
                granted: None,
                schedule_failure: None,
                policy: None,
            }),
        }
    }

    /// Makes subsequent scheduling requests fail with `message`.
    pub fn fail_scheduling(&self, message: Option<String>) {
        self.lock().schedule_failure = message;
    }

    /// Pending alerts ordered by ID.
    pub fn pending(&self) -> Vec<AlertRequest> {
        self.lock().pending.values().cloned().collect()
    }

    pub fn pending_for(&self, id: TaskId) -> Option<AlertRequest> {
        self.lock().pending.get(&id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Delivers every alert whose trigger is at or before `now`.
    pub fn fire_due(&self, now: TriggerCalendar) -> Vec<AlertRequest> {
        let mut state = self.lock();
        let due_ids = state
            .pending
            .iter()
            .filter(|(_, request)| request.trigger <= now)
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        due_ids
            .into_iter()
            .filter_map(|id| state.pending.remove(&id))
            .collect()
    }

    pub fn authorization_requests(&self) -> Vec<AuthorizationOptions> {
        self.lock().authorization_requests.clone()
    }

    /// Last authorization outcome; `None` before any prompt or after a failure.
    pub fn granted(&self) -> Option<bool> {
        self.lock().granted
    }

    pub fn presentation_policy(&self) -> Option<PresentationPolicy> {
        self.lock().policy
    }

    fn lock(&self) -> MutexGuard<'_, CenterState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl NotificationCenter for InMemoryNotificationCenter {
    fn request_authorization(&self, options: AuthorizationOptions, on_complete: AuthorizationCallback) {
        let outcome = {
            let mut state = self.lock();
            state.authorization_requests.push(options);
            let outcome = match &state.authorization_response {
                AuthorizationResponse::Grant => Ok(true),
                AuthorizationResponse::Deny => Ok(false),
                AuthorizationResponse::Fail(message) => {
                    Err(NotificationError::Platform(message.clone()))
                }
            };
            state.granted = outcome.as_ref().ok().copied();
            outcome
        };
        on_complete(outcome);
    }

    fn schedule_one_shot(&self, request: AlertRequest, on_complete: ScheduleCallback) {
        let outcome = {
            let mut state = self.lock();
            match state.schedule_failure.clone() {
                Some(message) => Err(NotificationError::Platform(message)),
                None => {
                    state.pending.insert(request.id, request);
                    Ok(())
                }
            }
        };
        on_complete(outcome);
    }

    fn cancel_scheduled(&self, ids: &[TaskId]) {
        let mut state = self.lock();
        for id in ids {
            state.pending.remove(id);
        }
    }

    fn cancel_all_pending(&self) {
        self.lock().pending.clear();
    }

    fn set_presentation_policy(&self, policy: PresentationPolicy) {
        self.lock().policy = Some(policy);
    }
}
