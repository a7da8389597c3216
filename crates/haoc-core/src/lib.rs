//! HAOC Core
//!
//! Application root for the HAOC marketplace client. `Client` owns the one
//! database, token store, API client, session controller and navigator of
//! a process; everything else borrows them from here.

mod client;
mod config;
mod error;

pub use client::Client;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use haoc_http::{ApiClient, ApiConfig, ApiError};
pub use haoc_navigation::{
    evaluate, Access, Decision, Navigation, NavigationError, Navigator, RouteTable,
};
pub use haoc_session::{
    Credentials, EmailRequest, Operation, OtpVerification, PasswordReset, PasswordUpdate,
    Registration, Role, Session, SessionController, SessionError, User, UserUpdate,
};
pub use haoc_storage::{Database, StorageError, TokenStore, UserCache};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
