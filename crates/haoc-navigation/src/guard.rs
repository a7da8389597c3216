//! Route guard
//!
//! Checked in order:
//! 1. An operation in flight -> show loading
//! 2. No token, no user or not authenticated -> login
//! 3. Required role differs from the user's -> unauthorized
//! 4. Otherwise allow

use serde::{Deserialize, Serialize};

use haoc_session::{Role, Session};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToUnauthorized,
    ShowLoading,
}

impl Decision {
    /// Target of a redirecting decision
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            Decision::RedirectToLogin => Some(LOGIN_PATH),
            Decision::RedirectToUnauthorized => Some(UNAUTHORIZED_PATH),
            Decision::Allow | Decision::ShowLoading => None,
        }
    }
}

/// Decide whether `session` may enter a page that requires `required`
/// (`None`: any signed-in user).
pub fn evaluate(session: &Session, required: Option<Role>) -> Decision {
    if session.loading {
        return Decision::ShowLoading;
    }

    let user = match (&session.access_token, &session.user) {
        (Some(_), Some(user)) if session.is_authenticated => user,
        _ => return Decision::RedirectToLogin,
    };

    match required {
        Some(role) if user.role != role => Decision::RedirectToUnauthorized,
        _ => Decision::Allow,
    }
}
