//! login_tracker library: login IP capture and per-user login history
//!
//! This library resolves the client's public IP address and coarse location
//! (with a 24-hour local cache and a chain of fallback providers), and records
//! every successful login in an append-only SQLite history while keeping a
//! "last login" snapshot on the user record.
//!
//! # Example
//!
//! ```no_run
//! use login_tracker::{Config, LoginTracker, Role};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     db_path: std::path::PathBuf::from("lms.db"),
//!     ..Default::default()
//! };
//!
//! let tracker = LoginTracker::init(&config).await?;
//! tracker.add_user("Ada", "ada@example.com", Role::Student).await?;
//!
//! let outcome = tracker.login("ada@example.com").await?;
//! println!("Last login from {:?}", outcome.user.last_login_ip);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod config;
pub mod error_handling;
pub mod history;
pub mod initialization;
pub mod ip;
pub mod notify;
pub mod storage;
mod utils;

// Re-export public API
pub use app::{LoginTracker, UserHistory};
pub use config::{Config, LogFormat, LogLevel, RecordFailurePolicy};
pub use error_handling::{LoginError, LookupStats, RecorderError};
pub use history::{
    LoginHistoryEntry, LoginOutcome, LoginRecorder, LoginRequest, LoginService, RecordOutcome,
    Role, User, UserStore,
};
pub use ip::{IpLookupResult, IpResolver};
pub use notify::{NoticeLevel, Notification, NotificationBus, Subscription};
pub use storage::{init_db_pool_with_path, run_migrations};
pub use utils::first_success;
