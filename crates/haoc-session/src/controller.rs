//! Session controller
//!
//! Runs the authentication, profile and admin-user operations against the
//! API and folds each outcome into the shared `Session`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use haoc_http::{ApiClient, ApiRequest};
use haoc_storage::{TokenStore, UserCache};

use crate::error::SessionError;
use crate::operation::Operation;
use crate::payload::{
    unwrap_reply, Credentials, EmailRequest, LoginReply, MessageReply, OtpVerification,
    PasswordReset, PasswordUpdate, Registration, TokenReply, UserUpdate,
};
use crate::session::{Session, User};
use crate::Result;

#[derive(Clone)]
pub struct SessionController {
    /// The session; receivers see every transition
    state: Arc<watch::Sender<Session>>,
    /// Operations between pending and settled. Only changed inside
    /// `send_modify`, so it moves in step with `loading`.
    in_flight: Arc<AtomicUsize>,
    api: ApiClient,
    tokens: TokenStore,
    user_cache: UserCache,
}

impl SessionController {
    /// Build the controller, restoring the persisted token and cached user
    pub fn new(api: ApiClient, user_cache: UserCache) -> Self {
        let tokens = api.tokens().clone();
        let session = Session::restored(user_cache.load(), tokens.get());

        tracing::info!(
            has_token = session.access_token.is_some(),
            has_user = session.user.is_some(),
            "Restored session"
        );

        let (state, _) = watch::channel(session);

        Self {
            state: Arc::new(state),
            in_flight: Arc::new(AtomicUsize::new(0)),
            api,
            tokens,
            user_cache,
        }
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // === Authentication ===

    pub async fn register(&self, registration: &Registration) -> Result<String> {
        let op = Operation::Register;
        let reply: MessageReply = self
            .perform(op, self.api.post("/auth/register", registration))
            .await?;

        Ok(self.succeed_with(op, reply.message, "Registration successful"))
    }

    pub async fn verify_otp(&self, verification: &OtpVerification) -> Result<String> {
        let op = Operation::VerifyOtp;
        let reply: MessageReply = self
            .perform(op, self.api.post("/auth/verify-otp", verification))
            .await?;

        Ok(self.succeed_with(op, reply.message, "Verification successful"))
    }

    pub async fn resend_otp(&self, request: &EmailRequest) -> Result<String> {
        let op = Operation::ResendOtp;
        let reply: MessageReply = self
            .perform(op, self.api.post("/auth/otp/resend", request))
            .await?;

        Ok(self.succeed_with(op, reply.message, "OTP sent successfully"))
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Option<User>> {
        let op = Operation::Login;
        let reply: LoginReply = self
            .perform(op, self.api.post("/auth/login", credentials))
            .await?;

        // A previous account's token must not outlive this login
        self.tokens.remove();
        let access_token = reply
            .access_token
            .as_deref()
            .and_then(|token| self.tokens.save(token));

        if let Some(user) = &reply.user {
            self.user_cache.store(user);
            tracing::info!(user_id = %user.id, role = %user.role, "Logged in");
        }

        let user = reply.user;
        let message = reply
            .message
            .unwrap_or_else(|| "Login successful".to_string());

        self.fulfil(op, |s| {
            s.success = Some(message);
            s.access_token = access_token;
            s.is_authenticated = user.is_some();
            s.user = user.clone();
        });

        Ok(user)
    }

    /// Explicit refresh through the API client. Does not touch the user.
    pub async fn refresh(&self) -> Result<Option<String>> {
        let op = Operation::Refresh;
        let reply: TokenReply = self
            .perform(op, self.api.send(&ApiRequest::post("/auth/refresh-token")))
            .await?;

        let saved = reply
            .access_token
            .as_deref()
            .and_then(|token| self.tokens.save(token));

        self.fulfil(op, |s| {
            if saved.is_some() {
                s.access_token = saved.clone();
            }
        });

        Ok(saved)
    }

    /// Re-validate the session with the backend (`GET /auth/me`)
    pub async fn get_current_user(&self) -> Result<User> {
        let op = Operation::GetCurrentUser;
        let reply: Value = self.perform(op, self.api.get("/auth/me")).await?;
        let user: User = self.decode(op, unwrap_reply(reply, &["user"]))?;

        self.user_cache.store(&user);

        self.fulfil(op, |s| {
            s.user = Some(user.clone());
            s.is_authenticated = true;
        });

        Ok(user)
    }

    pub async fn forgot_password(&self, request: &EmailRequest) -> Result<String> {
        let op = Operation::ForgotPassword;
        let reply: MessageReply = self
            .perform(op, self.api.post("/auth/password/forgot", request))
            .await?;

        Ok(self.succeed_with(op, reply.message, "Password reset email sent"))
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<String> {
        let op = Operation::ResetPassword;
        let path = format!("/auth/password/reset/{}", reset.token);
        let reply: MessageReply = self.perform(op, self.api.put(&path, reset)).await?;

        Ok(self.succeed_with(op, reply.message, "Password reset successful"))
    }

    pub async fn update_password(&self, update: &PasswordUpdate) -> Result<String> {
        let op = Operation::UpdatePassword;
        let reply: MessageReply = self
            .perform(op, self.api.put("/auth/password/update", update))
            .await?;

        Ok(self.succeed_with(op, reply.message, "Password updated successfully"))
    }

    /// Log out remotely, then clear local state whatever the server said.
    /// Never rejected.
    pub async fn logout(&self) {
        let op = Operation::Logout;
        self.begin(op);

        if let Err(e) = self.api.send(&ApiRequest::post("/auth/logout")).await {
            tracing::warn!(error = %e, "Logout request failed, clearing client state anyway");
        }

        self.tokens.remove();
        self.user_cache.clear();

        self.fulfil(op, |s| {
            s.user = None;
            s.access_token = None;
            s.is_authenticated = false;
            s.success = Some("Logged out".to_string());
        });

        tracing::info!("Logged out");
    }

    /// Drop the session locally without calling the backend
    pub fn logout_local(&self) {
        self.tokens.remove();
        self.user_cache.clear();

        self.state.send_modify(|s| {
            s.user = None;
            s.access_token = None;
            s.is_authenticated = false;
            s.loading = false;
            s.error = None;
            s.success = None;
        });
    }

    /// Reset the transient fields: loading, error and success
    pub fn clear_messages(&self) {
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = None;
            s.success = None;
        });
    }

    // === Profile ===

    pub async fn fetch_profile(&self) -> Result<User> {
        let op = Operation::FetchProfile;
        let reply: Value = self.perform(op, self.api.get("/user/profile")).await?;
        let user: User = self.decode(op, unwrap_reply(reply, &["data", "user"]))?;

        self.fulfil(op, |s| {
            s.user = Some(user.clone());
            s.success = Some("Profile fetched successfully".to_string());
        });

        Ok(user)
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User> {
        let op = Operation::UpdateProfile;
        let reply: Value = self.perform(op, self.api.put("/user/profile", update)).await?;
        let user: User = self.decode(op, unwrap_reply(reply, &["data", "user"]))?;

        self.user_cache.store(&user);

        self.fulfil(op, |s| {
            s.user = Some(user.clone());
            s.success = Some("Profile updated successfully".to_string());
        });

        Ok(user)
    }

    // === Admin user management ===

    pub async fn fetch_all_users(&self) -> Result<Vec<User>> {
        let op = Operation::FetchAllUsers;
        let reply: Value = self.perform(op, self.api.get("/user/all")).await?;

        let list = unwrap_reply(reply, &["data", "users"]);
        let users: Vec<User> = if list.is_array() {
            self.decode(op, list)?
        } else {
            Vec::new()
        };

        self.fulfil(op, |s| s.users = users.clone());

        Ok(users)
    }

    pub async fn update_user_by_id(&self, id: &str, update: &UserUpdate) -> Result<Option<User>> {
        let op = Operation::UpdateUserById;
        let path = format!("/admin/users/{id}");
        let reply: Value = self.perform(op, self.api.put(&path, update)).await?;
        let updated: Option<User> = self.decode(op, reply.get("user").cloned().unwrap_or_default())?;

        self.fulfil(op, |s| {
            if let Some(updated) = &updated {
                for user in s.users.iter_mut().filter(|u| u.id == updated.id) {
                    *user = updated.clone();
                }
            }
        });

        Ok(updated)
    }

    pub async fn delete_user_by_id(&self, id: &str) -> Result<()> {
        let op = Operation::DeleteUserById;
        let path = format!("/admin/users/{id}");
        let _: Value = self.perform(op, self.api.delete(&path)).await?;

        self.fulfil(op, |s| s.users.retain(|u| u.id != id));

        tracing::info!(user_id = %id, "Deleted user");

        Ok(())
    }

    pub async fn register_admin(&self, registration: &Registration) -> Result<Option<User>> {
        let op = Operation::RegisterAdmin;
        let reply: Value = self
            .perform(op, self.api.post("/admin/register", registration))
            .await?;
        let admin: Option<User> = self.decode(op, reply.get("user").cloned().unwrap_or_default())?;

        self.fulfil(op, |s| {
            if let Some(admin) = &admin {
                s.users.push(admin.clone());
            }
        });

        Ok(admin)
    }

    // === Phases ===

    /// Pending: mark loading and clear both messages
    fn begin(&self, operation: Operation) {
        self.state.send_modify(|s| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            s.loading = true;
            s.error = None;
            s.success = None;
        });
        tracing::debug!(%operation, "Operation pending");
    }

    fn settle(&self, apply: impl FnOnce(&mut Session)) {
        self.state.send_modify(|s| {
            let remaining = self
                .in_flight
                .fetch_sub(1, Ordering::SeqCst)
                .saturating_sub(1);
            s.loading = remaining > 0;
            apply(s);
        });
    }

    fn fulfil(&self, operation: Operation, apply: impl FnOnce(&mut Session)) {
        self.settle(apply);
        tracing::debug!(%operation, "Operation fulfilled");
    }

    /// Fulfil with a success message, returning it
    fn succeed_with(&self, operation: Operation, message: Option<String>, fallback: &str) -> String {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        let stored = message.clone();
        self.fulfil(operation, |s| s.success = Some(stored));

        message
    }

    fn reject(&self, operation: Operation, server_message: Option<&str>) -> SessionError {
        let message = server_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(operation.fallback_error())
            .to_string();

        // A failed refresh or identity check invalidates the stored token
        let forget_token = matches!(operation, Operation::Refresh | Operation::GetCurrentUser);
        if forget_token {
            self.tokens.remove();
        }

        let error = message.clone();
        self.settle(|s| {
            s.error = Some(error);
            if forget_token {
                s.access_token = None;
            }
        });

        tracing::warn!(%operation, error = %message, "Operation rejected");

        SessionError::Rejected { operation, message }
    }

    /// Run `request` as `operation`: pending first, rejected on failure.
    /// The caller fulfils.
    async fn perform<T, F>(&self, operation: Operation, request: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Future<Output = haoc_http::Result<Value>>,
    {
        self.begin(operation);

        match request.await {
            Ok(reply @ Value::Object(_)) => self.decode(operation, reply),
            // Empty and plain-text bodies carry no fields
            Ok(_) => self.decode(operation, Value::Object(Default::default())),
            Err(e) => {
                tracing::debug!(%operation, error = %e, "Request failed");
                Err(self.reject(operation, e.server_message()))
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, operation: Operation, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| {
            tracing::error!(%operation, error = %e, "Unexpected response shape");
            self.reject(operation, None)
        })
    }
}
