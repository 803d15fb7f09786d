//! Users, login recording and the login flow.

mod login;
mod models;
mod recorder;
mod store;

pub use login::{LoginOutcome, LoginService};
pub use models::{IpDetails, LastLogin, LoginHistoryEntry, LoginRequest, Role, User};
pub use recorder::{LoginRecorder, RecordOutcome};
pub use store::UserStore;
