//! HAOC HTTP Client
//!
//! Single funnel for every call to the marketplace REST API:
//! - `Authorization: Bearer <token>` is attached whenever a token is stored
//! - a 401 on an endpoint outside the skip list triggers one refresh through
//!   the cookie-authenticated refresh endpoint, then one retry
//! - a failed refresh clears the stored token and surfaces the refresh error
//! - concurrent refreshes are coalesced into a single call

mod client;
mod config;
mod error;
mod request;

pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_SKIP_REFRESH, REFRESH_PATH};
pub use error::ApiError;
pub use request::ApiRequest;

pub use reqwest::Method;

pub type Result<T> = std::result::Result<T, ApiError>;
