//! Navigation error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid route pattern: {0}")]
    InvalidPattern(String),

    #[error("Route already registered: {0}")]
    DuplicateRoute(String),
}
