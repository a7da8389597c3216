//! Session error types

use thiserror::Error;

use crate::operation::Operation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The rejected phase of an operation. `message` is what the session's
    /// `error` field was set to.
    #[error("{operation} rejected: {message}")]
    Rejected { operation: Operation, message: String },
}

impl SessionError {
    pub fn message(&self) -> &str {
        match self {
            SessionError::Rejected { message, .. } => message,
        }
    }
}
