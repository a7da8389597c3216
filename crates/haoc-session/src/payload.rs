//! Request bodies and reply shapes for the auth and user endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::{Role, User};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpVerification {
    pub email: String,
    pub otp: String,
}

/// Body of the resend-OTP and forgot-password calls
#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    /// Reset token from the emailed link; also sent as a path segment
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdate {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Partial user update for profile edits and admin user management
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageReply {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenReply {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// First of `keys` holding a non-empty value, else the reply itself.
///
/// The backend wraps records inconsistently (`{data}`, `{user}` or bare).
pub(crate) fn unwrap_reply(reply: Value, keys: &[&str]) -> Value {
    for key in keys {
        if let Some(inner) = reply.get(key) {
            if is_present(inner) {
                return inner.clone();
            }
        }
    }
    reply
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_reply() {
        let reply = json!({ "data": { "_id": "1" }, "user": { "_id": "2" } });
        assert_eq!(unwrap_reply(reply, &["data", "user"])["_id"], "1");

        let reply = json!({ "data": null, "user": { "_id": "2" } });
        assert_eq!(unwrap_reply(reply, &["data", "user"])["_id"], "2");

        let reply = json!({ "_id": "3", "name": "Ada" });
        assert_eq!(unwrap_reply(reply, &["data", "user"])["_id"], "3");
    }

    #[test]
    fn test_request_bodies_use_backend_field_names() {
        let body = serde_json::to_value(PasswordReset {
            token: "t".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw".to_string(),
        })
        .unwrap();
        assert_eq!(body["confirmPassword"], "pw");

        let body = serde_json::to_value(UserUpdate {
            role: Some(Role::Agent),
            ..UserUpdate::default()
        })
        .unwrap();
        assert_eq!(body, json!({ "role": "Agent" }));
    }
}
