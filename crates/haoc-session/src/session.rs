//! Session data structures

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(alias = "user")]
    User,
    #[serde(alias = "agent")]
    Agent,
    #[serde(alias = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Agent => "Agent",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "agent" => Ok(Role::Agent),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UserDocument")]
pub struct User {
    /// Backend document id (`_id` on the wire)
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Profile fields this client does not interpret (phone, avatar, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User as the backend sends it: `_id`, a virtual `id` or both, and
/// nullable profile fields
#[derive(Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", default)]
    document_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<UserDocument> for User {
    type Error = String;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        let id = doc
            .document_id
            .or(doc.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "user record has no id".to_string())?;

        Ok(Self {
            id,
            name: doc.name.unwrap_or_default(),
            email: doc.email.unwrap_or_default(),
            role: doc.role.unwrap_or_default(),
            extra: doc.extra,
        })
    }
}

/// Client-wide authentication state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    /// Signed-in user, restored from cache at start-up
    pub user: Option<User>,
    /// Mirror of the persisted access token
    pub access_token: Option<String>,
    /// Set only by a successful login or current-user check
    pub is_authenticated: bool,
    /// An operation is in flight
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    /// Admin user listing
    pub users: Vec<User>,
}

impl Session {
    /// Session for a freshly started client. Not authenticated even when a
    /// token and user survived the restart.
    pub fn restored(user: Option<User>, access_token: Option<String>) -> Self {
        Self {
            user,
            access_token,
            ..Self::default()
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_backend_document() {
        let user: User = serde_json::from_value(json!({
            "_id": "665f",
            "name": "Ada",
            "email": "ada@example.com",
            "role": "Agent",
            "phone": "+254700000000"
        }))
        .unwrap();

        assert_eq!(user.id, "665f");
        assert_eq!(user.role, Role::Agent);
        assert_eq!(user.extra["phone"], "+254700000000");

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["_id"], "665f");
        assert_eq!(back["role"], "Agent");
        assert_eq!(back["phone"], "+254700000000");
    }

    #[test]
    fn test_role_defaults_and_aliases() {
        let user: User = serde_json::from_value(json!({ "id": "1", "role": "admin" })).unwrap();
        assert_eq!(user.role, Role::Admin);

        let user: User = serde_json::from_value(json!({ "_id": "2" })).unwrap();
        assert_eq!(user.role, Role::User);

        assert!(serde_json::from_value::<User>(json!({ "_id": "3", "role": "Owner" })).is_err());
    }

    #[test]
    fn test_user_with_both_id_keys() {
        let user: User = serde_json::from_value(json!({
            "_id": "u-1",
            "id": "u-1",
            "name": "Ada",
            "role": "Agent"
        }))
        .unwrap();

        assert_eq!(user.id, "u-1");
        assert!(!user.extra.contains_key("id"));
        assert_eq!(serde_json::to_value(&user).unwrap()["_id"], "u-1");
    }

    #[test]
    fn test_user_with_null_fields() {
        let user: User = serde_json::from_value(json!({
            "_id": "u-2",
            "name": null,
            "email": null,
            "role": null
        }))
        .unwrap();

        assert_eq!(user.name, "");
        assert_eq!(user.email, "");
        assert_eq!(user.role, Role::User);

        assert!(serde_json::from_value::<User>(json!({ "name": "Nobody" })).is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("agent".parse::<Role>().unwrap(), Role::Agent);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_restored_session_is_not_authenticated() {
        let session = Session::restored(None, Some("token".to_string()));
        assert!(!session.is_authenticated);
        assert!(!session.loading);
        assert_eq!(session.access_token.as_deref(), Some("token"));
    }
}
