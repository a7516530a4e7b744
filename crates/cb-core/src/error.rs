//! # AppError
//!
//! Centralized error handling for the community board.
//! Business-rule failures and storage faults share one enum so callers can
//! match on the outcome without downcasting.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all cb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced resource is absent (e.g., Member, Post, Comment)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// The member has already voted on this post
    #[error("user {user_id} already liked post {post_id}")]
    AlreadyLiked { user_id: String, post_id: Uuid },

    /// Resource already exists (e.g., taken user id or nickname)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Login id/password pair did not match
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Request is well-formed but breaks a domain rule (e.g., reply to a reply)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Infrastructure failure (connection, transaction, unclassified constraint)
    #[error("storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        AppError::NotFound(entity.to_string(), id.to_string())
    }

    /// True for expected outcomes the caller caused, false for system faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Storage(_))
    }
}

/// A specialized Result type for community board logic.
pub type Result<T> = std::result::Result<T, AppError>;
