//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// illegal transitions, actor mismatches). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, non-positive quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The caller is not the actor the transition requires.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested event is not legal from the current state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The requested quantity exceeds what the source instance carries.
    #[error("insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity { requested: u32, available: u32 },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced entity does not exist (domain-level).
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn insufficient_quantity(requested: u32, available: u32) -> Self {
        Self::InsufficientQuantity {
            requested,
            available,
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
