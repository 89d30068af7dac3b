// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Pawline routing engine.

use thiserror::Error;

/// The primary error type used across all Pawline crates.
///
/// Expected user-visible outcomes (a duplicate webhook delivery, an offer
/// that is already resolved) are NOT errors; they are modeled as ordinary
/// return values so callers cannot confuse them with failures.
#[derive(Debug, Error)]
pub enum PawlineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Carrier provider errors (send failure, malformed payload, HTTP transport).
    #[error("carrier error: {message}")]
    Carrier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An inbound message could not be routed to an organization or thread.
    ///
    /// Carries a remediation hint for operators; the webhook path converts
    /// this into an audit entry and a neutral response, never a retry.
    #[error("routing failed: {reason}")]
    RoutingFailed { reason: String, remediation: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Caller-supplied input failed validation (bad window bounds, unknown strategy).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PawlineError {
    /// Shorthand for a storage error wrapping any boxed source.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        PawlineError::Storage {
            source: source.into(),
        }
    }
}
