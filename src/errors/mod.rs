//! Domain error types for the capstone tracker
//!
//! Every service in this crate reports failures through [`TrackerError`],
//! keeping the mapping to HTTP status codes in one place (`server::error`)
//! and out of the domain logic.
//!
//! # Examples
//!
//! ```rust
//! use capstone::errors::{TrackerError, TrackerResult};
//!
//! fn require_body(body: &str) -> TrackerResult<()> {
//!     if body.trim().is_empty() {
//!         return Err(TrackerError::validation("comment body must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_body("looks good").is_ok());
//!
//! let err = TrackerError::not_found("project", 42);
//! assert_eq!(err.to_string(), "project 42 not found");
//! ```

use thiserror::Error;

/// Errors produced by the tracker's services
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Input failed a domain rule (bad grade letter, empty text, illegal transition)
    #[error("validation failed: {0}")]
    Validation(String),

    /// The caller's role or assignment does not permit the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Underlying store failure
    #[error("database error: {0}")]
    Persistence(#[from] sea_orm::DbErr),
}

impl TrackerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

/// Result type alias for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity_and_id() {
        let err = TrackerError::not_found("comment", 7);
        assert_eq!(err.to_string(), "comment 7 not found");
    }

    #[test]
    fn test_persistence_wraps_db_err() {
        let db_err = sea_orm::DbErr::Custom("disk gone".to_string());
        let err: TrackerError = db_err.into();
        assert!(matches!(err, TrackerError::Persistence(_)));
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_result_alias() {
        let result: TrackerResult<i32> = Err(TrackerError::validation("nope"));
        assert!(result.is_err());
    }
}
