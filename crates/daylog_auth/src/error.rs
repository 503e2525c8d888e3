//! Error types for credential and session operations.

use daylog_store::StoreError;
use thiserror::Error;

/// Result type for credential and session operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur in credential and session operations.
///
/// Bad credentials and invalid/expired sessions are deliberately not
/// errors: those resolve to `Ok(None)` since "no valid session" is an
/// expected, common outcome.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed registration input.
    #[error("validation failed: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// An account with this email already exists.
    #[error("email already registered: {email}")]
    DuplicateEmail {
        /// The conflicting email, normalized.
        email: String,
    },

    /// Underlying store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a duplicate-email error.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}
