//! Error types that cross module boundaries.
//!
//! Field-level validation failures never appear here: they live in
//! [`FieldErrors`](crate::validation::FieldErrors) and stay inside the wizard.
//!
//! # The Error Boundary Rule
//!
//! Repository and auth failures are caught by effects and turned into events.
//! Stores only ever see the message, never the error value itself.

use thiserror::Error;

use crate::types::ListingId;

/// Failure reported by the Property Repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The transport failed before a response was read.
    #[error("network error: {0}")]
    Transport(String),

    /// The remote side rejected the query or returned malformed data.
    #[error("query failed: {0}")]
    Query(String),

    /// The record addressed by an update does not exist.
    #[error("property {0} not found")]
    NotFound(ListingId),

    /// The remote side refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Failure reported by the Authentication Provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication provider is not configured: {0}")]
    NotConfigured(String),

    #[error("authentication failed: {0}")]
    Failed(String),
}

/// Failure reading or writing the preference store.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("preference file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}
