//! Cached user record
//!
//! The last known user, serialized as JSON so a restarted client can show
//! who was signed in before the backend confirms it. Failures are logged and
//! otherwise ignored, same as `TokenStore`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Database, Result};

/// Key the serialized user record is persisted under
pub const USER_KEY: &str = "user";

#[derive(Clone)]
pub struct UserCache {
    db: Database,
}

impl UserCache {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn store<T: Serialize>(&self, user: &T) {
        if let Err(e) = self.try_store(user) {
            tracing::error!(error = %e, "Failed to store user");
        }
    }

    fn try_store<T: Serialize>(&self, user: &T) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.db.set_value(USER_KEY, &json)
    }

    /// Load the cached user. A missing, unreadable or malformed record is `None`.
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let json = match self.db.get_value(USER_KEY) {
            Ok(json) => json?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored user");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse stored user");
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.db.delete_value(USER_KEY) {
            tracing::error!(error = %e, "Failed to remove user");
        }
    }
}
