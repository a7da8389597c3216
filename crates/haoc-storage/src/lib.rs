//! HAOC Storage Layer
//!
//! SQLite-backed key/value persistence for client state that must survive
//! a restart: the bearer access token and the last known user record.
//! Reads and writes through `TokenStore` and `UserCache` never fail; a broken
//! store degrades to "nothing stored".

mod database;
mod error;
mod migrations;
mod token;
mod user_cache;

pub use database::Database;
pub use error::StorageError;
pub use token::{token_expiry, TokenStore, ACCESS_TOKEN_KEY};
pub use user_cache::{UserCache, USER_KEY};

pub type Result<T> = std::result::Result<T, StorageError>;
