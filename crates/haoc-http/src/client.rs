//! API client with refresh-and-retry

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use haoc_storage::TokenStore;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::Result;

/// Which dispatch of a request this is. A request is refreshed-and-retried
/// at most once; a 401 on the retry is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retried,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ApiConfig>,
    tokens: TokenStore,
    /// Serializes refreshes so concurrent 401s share one
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, tokens: TokenStore) -> Result<Self> {
        // The refresh credential travels as an HttpOnly cookie
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
            tokens,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.send(&ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(&ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(&ApiRequest::delete(path)).await
    }

    /// Send a request and return its decoded JSON body (`Null` when empty,
    /// a string when the server answered in plain text).
    ///
    /// A 401 outside the skip list is answered by one refresh and one retry
    /// carrying the new token. Every other failure is returned unchanged.
    pub async fn send(&self, request: &ApiRequest) -> Result<Value> {
        let mut bearer = self.tokens.get();
        let mut attempt = Attempt::First;

        loop {
            let response = self.dispatch(request, bearer.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return read_body(response).await;
            }

            let error = ApiError::from_response(response).await;

            if attempt == Attempt::Retried {
                tracing::debug!(path = %request.path, "Retried request rejected again");
                return Err(error);
            }

            if self.config.skips_refresh(&request.path) {
                return Err(error);
            }

            attempt = Attempt::Retried;
            let token = self.refreshed_token(bearer.as_deref()).await?;
            bearer = Some(token);

            tracing::debug!(
                method = %request.method,
                path = %request.path,
                "Retrying request with refreshed token"
            );
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = self.config.url(&request.path)?;
        let mut builder = self.http.request(request.method.clone(), url);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    /// A token to replace the rejected `sent` one.
    ///
    /// Under the lock, a stored token that differs from `sent` was written by
    /// a refresh (or login) that finished after this request went out, and is
    /// reused. Otherwise this request performs the refresh.
    async fn refreshed_token(&self, sent: Option<&str>) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(stored) = self.tokens.get() {
            if Some(stored.as_str()) != sent {
                tracing::debug!("Reusing token from concurrent refresh");
                return Ok(stored);
            }
        }

        match self.request_new_token().await {
            Ok(token) => {
                if self.tokens.save(&token).is_none() {
                    tracing::warn!("Refreshed token could not be persisted");
                }
                tracing::info!("Access token refreshed");
                Ok(token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing stored token");
                self.tokens.remove();
                Err(e)
            }
        }
    }

    /// Call the refresh endpoint. No bearer header; the session cookie is the
    /// credential.
    async fn request_new_token(&self) -> Result<String> {
        let url = self.config.url(&self.config.refresh_path)?;
        let response = self.http.post(url).json(&json!({})).send().await?;
        let body = read_body(response).await?;

        body.get("accessToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(ApiError::MissingToken)
    }
}

async fn read_body(response: reqwest::Response) -> Result<Value> {
    if !response.status().is_success() {
        return Err(ApiError::from_response(response).await);
    }

    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    // Plain-text success bodies ("User deleted") come back as a JSON string
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(_) => String::from_utf8(bytes.to_vec())
            .map(Value::String)
            .map_err(|e| ApiError::Decode(e.to_string())),
    }
}
