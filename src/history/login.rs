//! Login flow: find the account, record the login, notify.

use crate::error_handling::LoginError;
use crate::notify::{NoticeLevel, NotificationBus};

use super::models::{LoginRequest, User};
use super::recorder::{LoginRecorder, RecordOutcome};
use super::store::UserStore;

/// What a completed login returns to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    /// The user as stored after recording, including the updated projection.
    pub user: User,
    pub recorded: RecordOutcome,
}

/// Handles a login submission end to end.
///
/// Credential checks happen upstream; an account found by email is treated
/// as authenticated.
#[derive(Debug, Clone)]
pub struct LoginService {
    store: UserStore,
    recorder: LoginRecorder,
    bus: NotificationBus,
}

impl LoginService {
    pub fn new(store: UserStore, recorder: LoginRecorder, bus: NotificationBus) -> Self {
        LoginService {
            store,
            recorder,
            bus,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, LoginError> {
        let result = self.try_login(request).await;
        match &result {
            Ok(outcome) if outcome.recorded.is_recorded() => {
                self.bus.publish(
                    NoticeLevel::Success,
                    format!("Welcome back, {}", outcome.user.name),
                );
            }
            Ok(_) => {
                self.bus.publish(
                    NoticeLevel::Error,
                    "Logged in, but this login could not be saved to your history",
                );
            }
            Err(e) => {
                self.bus.publish(NoticeLevel::Error, format!("Login failed: {e}"));
            }
        }
        result
    }

    async fn try_login(&self, request: &LoginRequest) -> Result<LoginOutcome, LoginError> {
        let user = self
            .store
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| LoginError::UnknownUser(request.email.trim().to_string()))?;

        let recorded = self.recorder.record(user.id, request).await?;

        // Re-read so the returned projection reflects what was committed
        let user = match &recorded {
            RecordOutcome::Recorded(_) => self.store.get_user(user.id).await?.unwrap_or(user),
            RecordOutcome::Skipped { .. } => user,
        };

        Ok(LoginOutcome { user, recorded })
    }
}
