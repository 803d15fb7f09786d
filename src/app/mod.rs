//! Application wiring.
//!
//! `LoginTracker` owns the shared resources (database pool, HTTP client,
//! notification bus) and exposes the operations the CLI drives.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::error_handling::LoginError;
use crate::history::{
    LoginHistoryEntry, LoginOutcome, LoginRecorder, LoginRequest, LoginService, Role, User,
    UserStore,
};
use crate::initialization::init_client;
use crate::ip::{IpLookupResult, IpResolver};
use crate::notify::NotificationBus;
use crate::storage::{init_db_pool_with_path, run_migrations};

/// A user together with a window of their login history.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHistory {
    pub user: User,
    pub total_logins: i64,
    pub history: Vec<LoginHistoryEntry>,
}

/// Fully initialized application.
pub struct LoginTracker {
    store: UserStore,
    resolver: IpResolver,
    service: LoginService,
    bus: NotificationBus,
}

impl LoginTracker {
    /// Validates `config`, opens and migrates the database and builds the
    /// HTTP client and resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the database cannot
    /// be opened or migrated, or the HTTP client cannot be built.
    pub async fn init(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .context("Failed to initialize database pool")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        let client = init_client(config).context("Failed to initialize HTTP client")?;
        let bus = NotificationBus::new();
        let resolver = IpResolver::from_config(config, client).with_notifications(bus.clone());

        let store = UserStore::new(pool);
        let recorder = LoginRecorder::new(store.clone(), config.on_record_failure);
        let service = LoginService::new(store.clone(), recorder, bus.clone());

        log::debug!(
            "Initialized with database {} and cache dir {}",
            config.db_path.display(),
            config.cache_dir.display()
        );

        Ok(LoginTracker {
            store,
            resolver,
            service,
            bus,
        })
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn resolver(&self) -> &IpResolver {
        &self.resolver
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub async fn resolve(&self) -> IpLookupResult {
        self.resolver.resolve().await
    }

    pub async fn add_user(&self, name: &str, email: &str, role: Role) -> Result<User> {
        self.store
            .create_user(name, email, role)
            .await
            .with_context(|| format!("Failed to create user {email}"))
    }

    /// Resolves the current IP bundle and runs the login flow for `email`.
    pub async fn login(&self, email: &str) -> Result<LoginOutcome, LoginError> {
        let lookup = self.resolver.resolve().await;
        let request = LoginRequest::with_lookup(email, Some(&lookup));
        self.service.login(&request).await
    }

    /// Returns the user's projection and up to `limit` most recent logins.
    pub async fn history(&self, email: &str, limit: u32) -> Result<UserHistory> {
        let user = self
            .store
            .find_by_email(email)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| LoginError::UnknownUser(email.to_string()))?;
        let history = self
            .store
            .login_history(user.id, limit)
            .await
            .context("Failed to read login history")?;
        let total_logins = self
            .store
            .login_count(user.id)
            .await
            .context("Failed to count logins")?;

        Ok(UserHistory {
            user,
            total_logins,
            history,
        })
    }
}
