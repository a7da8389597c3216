//! Application state container
//!
//! One per process, injected at the root of the UI. The session lives in
//! the controller; navigation reads it on demand and never mutates it.

use haoc_http::ApiClient;
use haoc_navigation::{Navigation, Navigator};
use haoc_session::{SessionController, User};
use haoc_storage::{Database, TokenStore, UserCache};

use crate::config::Config;
use crate::Result;

pub struct Client {
    config: Config,
    db: Database,
    session: SessionController,
    navigator: Navigator,
}

impl Client {
    /// Open the database at `config.database_path` and wire everything to it
    pub fn new(config: Config) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db)
    }

    pub fn with_database(config: Config, db: Database) -> Result<Self> {
        let tokens = TokenStore::new(db.clone());
        let api = ApiClient::new(config.to_api_config(), tokens)?;
        let session = SessionController::new(api, UserCache::new(db.clone()));

        tracing::info!(api_base_url = %config.api_base_url, "Client initialized");

        Ok(Self {
            config,
            db,
            session,
            navigator: Navigator::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Where `path` leads for the current session
    pub fn navigate(&self, path: &str) -> Navigation {
        self.navigator.navigate(path, &self.session.snapshot())
    }

    /// Start-up re-validation: with a stored token, ask the backend who we
    /// are. Without one there is nothing to check.
    pub async fn bootstrap(&self) -> Result<Option<User>> {
        if self.session.api().tokens().get().is_none() {
            tracing::debug!("No stored token, skipping session check");
            return Ok(None);
        }

        let user = self.session.get_current_user().await?;
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use haoc_session::Role;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> (Client, Database) {
        let config = Config {
            api_base_url: server.uri(),
            ..Config::default()
        };
        let db = Database::open_in_memory().unwrap();
        (Client::with_database(config, db.clone()).unwrap(), db)
    }

    #[tokio::test]
    async fn test_bootstrap_without_token_stays_offline() {
        let server = MockServer::start().await;
        let (client, _db) = client_for(&server);

        assert_eq!(client.bootstrap().await.unwrap(), None);
        assert!(server.received_requests().await.unwrap().is_empty());
        assert_eq!(
            client.navigate("/user/profile"),
            Navigation::Redirect("/login".to_string())
        );
    }

    #[tokio::test]
    async fn test_bootstrap_revalidates_stored_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "_id": "a-1", "name": "Root", "email": "root@example.com", "role": "Admin" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, db) = client_for(&server);
        TokenStore::new(db).save("stored-token");

        // Token alone does not open guarded pages
        assert_eq!(
            client.navigate("/admin/dashboard"),
            Navigation::Redirect("/login".to_string())
        );

        let user = client.bootstrap().await.unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(matches!(
            client.navigate("/admin/dashboard"),
            Navigation::Render { .. }
        ));
        assert_eq!(
            client.navigate("/agent/dashboard"),
            Navigation::Redirect("/unauthorized".to_string())
        );
    }

    #[tokio::test]
    async fn test_bootstrap_rejection_clears_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh-token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (client, db) = client_for(&server);
        TokenStore::new(db.clone()).save("expired");

        let err = client.bootstrap().await.unwrap_err();
        assert!(matches!(err, CoreError::Session(_)));
        assert_eq!(TokenStore::new(db).get(), None);
        assert_eq!(client.session().snapshot().error.as_deref(), Some("Failed to fetch user"));
    }
}
