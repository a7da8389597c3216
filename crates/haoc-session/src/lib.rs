//! HAOC Session Management
//!
//! - One `Session` per client, owned by `SessionController` and observable
//!   through a `tokio::sync::watch` channel
//! - Every operation goes pending -> fulfilled | rejected; pending clears both
//!   messages, rejected records the server message or a fixed fallback
//! - `is_authenticated` is only set by login and current-user checks, never
//!   inferred from a stored token
//! - Retrying on 401 belongs to `haoc-http`; nothing here retries

mod controller;
mod error;
mod operation;
mod payload;
mod session;

pub use controller::SessionController;
pub use error::SessionError;
pub use operation::Operation;
pub use payload::{
    Credentials, EmailRequest, OtpVerification, PasswordReset, PasswordUpdate, Registration,
    UserUpdate,
};
pub use session::{Role, Session, User};

pub type Result<T> = std::result::Result<T, SessionError>;
