//! Records successful logins.

use chrono::Utc;

use crate::config::RecordFailurePolicy;
use crate::error_handling::RecorderError;

use super::models::{LoginHistoryEntry, LoginRequest};
use super::store::UserStore;

/// Result of a record attempt that did not fail the login.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// The entry was appended and the user's last-login fields now equal it.
    Recorded(LoginHistoryEntry),
    /// Persistence failed under [`RecordFailurePolicy::Warn`]; nothing was written.
    Skipped { reason: String },
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded(_))
    }
}

/// Appends one history entry per successful authentication.
#[derive(Debug, Clone)]
pub struct LoginRecorder {
    store: UserStore,
    policy: RecordFailurePolicy,
}

impl LoginRecorder {
    pub fn new(store: UserStore, policy: RecordFailurePolicy) -> Self {
        LoginRecorder { store, policy }
    }

    pub fn policy(&self) -> RecordFailurePolicy {
        self.policy
    }

    /// Persists the login described by `request` for `user_id`, stamped with
    /// the current time.
    ///
    /// An unknown user is always an error. Other persistence failures are
    /// returned under `Reject` and downgraded to [`RecordOutcome::Skipped`]
    /// under `Warn`.
    pub async fn record(
        &self,
        user_id: i64,
        request: &LoginRequest,
    ) -> Result<RecordOutcome, RecorderError> {
        let entry = LoginHistoryEntry::from_request(request, Utc::now());

        match self.store.append_login(user_id, &entry).await {
            Ok(()) => {
                log::info!(
                    "Recorded login for user {} from {} ({}, {})",
                    user_id,
                    entry.ip_address,
                    entry.city,
                    entry.country
                );
                Ok(RecordOutcome::Recorded(entry))
            }
            Err(e @ RecorderError::UserNotFound(_)) => Err(e),
            Err(e) => match self.policy {
                RecordFailurePolicy::Reject => {
                    log::error!("Failed to record login for user {}: {}", user_id, e);
                    Err(e)
                }
                RecordFailurePolicy::Warn => {
                    log::warn!(
                        "Failed to record login for user {}, continuing: {}",
                        user_id,
                        e
                    );
                    Ok(RecordOutcome::Skipped {
                        reason: e.to_string(),
                    })
                }
            },
        }
    }
}
