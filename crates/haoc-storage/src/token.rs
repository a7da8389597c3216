//! Access token store
//!
//! Holds the single opaque bearer token under a fixed key. Every operation
//! swallows storage failures: a failed write reports `None`, a failed read
//! looks like an absent token and a failed delete is only logged.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};

use crate::Database;

/// Key the access token is persisted under
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

#[derive(Clone)]
pub struct TokenStore {
    db: Database,
}

impl TokenStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a token. Returns the token when it was written, `None` for an
    /// empty token or when the write failed.
    pub fn save(&self, token: &str) -> Option<String> {
        if token.is_empty() {
            return None;
        }

        match self.db.set_value(ACCESS_TOKEN_KEY, token) {
            Ok(()) => Some(token.to_string()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to save access token");
                None
            }
        }
    }

    pub fn get(&self) -> Option<String> {
        match self.db.get_value(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read access token");
                None
            }
        }
    }

    pub fn remove(&self) {
        if let Err(e) = self.db.delete_value(ACCESS_TOKEN_KEY) {
            tracing::warn!(error = %e, "Failed to remove access token");
        }
    }

    /// Whether the stored token is a JWT whose `exp` claim lies in the future.
    ///
    /// The signature is not checked. Tokens without a readable `exp` count as
    /// invalid. Nothing in the request path depends on this.
    pub fn has_valid_token(&self) -> bool {
        self.get()
            .and_then(|token| token_expiry(&token))
            .is_some_and(|exp| Utc::now() < exp)
    }
}

/// Read the `exp` claim of a JWT without verifying it
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Access token payload is not base64url");
            return None;
        }
    };

    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?;
    let seconds = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;

    DateTime::from_timestamp(seconds, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u-1","exp":{exp}}}"#));
        format!("{header}.{payload}.signature")
    }

    fn broken_store() -> TokenStore {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            conn.execute_batch("DROP TABLE client_state")?;
            Ok(())
        })
        .unwrap();
        TokenStore::new(db)
    }

    #[test]
    fn test_save_then_get_round_trips() {
        let store = TokenStore::new(Database::open_in_memory().unwrap());
        assert_eq!(store.save("abc.def.ghi").as_deref(), Some("abc.def.ghi"));
        assert_eq!(store.get().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_remove_then_get_is_none() {
        let store = TokenStore::new(Database::open_in_memory().unwrap());
        store.save("token");
        store.remove();
        assert_eq!(store.get(), None);

        // Removing an absent token is fine
        store.remove();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_save_overwrites_previous_token() {
        let store = TokenStore::new(Database::open_in_memory().unwrap());
        store.save("first");
        store.save("second");
        assert_eq!(store.get().as_deref(), Some("second"));
    }

    #[test]
    fn test_empty_token_is_not_saved() {
        let store = TokenStore::new(Database::open_in_memory().unwrap());
        store.save("kept");
        assert_eq!(store.save(""), None);
        assert_eq!(store.get().as_deref(), Some("kept"));
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let store = broken_store();
        assert_eq!(store.save("token"), None);
        assert_eq!(store.get(), None);
        store.remove();
        assert!(!store.has_valid_token());
    }

    #[test]
    fn test_token_expiry() {
        let exp = Utc::now().timestamp() + 3600;
        let expiry = token_expiry(&jwt_with_exp(exp)).unwrap();
        assert_eq!(expiry.timestamp(), exp);

        assert!(token_expiry("opaque-token").is_none());
        assert!(token_expiry("a.!!!.c").is_none());
    }

    #[test]
    fn test_has_valid_token() {
        let store = TokenStore::new(Database::open_in_memory().unwrap());
        assert!(!store.has_valid_token());

        let future = (Utc::now() + Duration::hours(1)).timestamp();
        store.save(&jwt_with_exp(future));
        assert!(store.has_valid_token());

        let past = (Utc::now() - Duration::hours(1)).timestamp();
        store.save(&jwt_with_exp(past));
        assert!(!store.has_valid_token());

        store.save("opaque-token");
        assert!(!store.has_valid_token());
    }
}
