// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lavka bot.

use thiserror::Error;

/// The primary error type used across the Lavka workspace.
///
/// The variants form a closed taxonomy: `Validation` errors are recovered
/// locally by reprompting the user, `NotFound` degrades to a user-visible
/// message, and everything else aborts the active conversation flow.
#[derive(Debug, Error)]
pub enum LavkaError {
    /// User input failed a local validity check (bad phone format,
    /// non-numeric quantity, empty address). Never advances flow state.
    #[error("validation error: {0}")]
    Validation(String),

    /// A record the flow depends on does not exist in the business-data
    /// service (unknown client, order number, courier).
    #[error("not found: {0}")]
    NotFound(String),

    /// Business-data service errors (non-2xx status, network failure,
    /// malformed JSON).
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat transport errors (send failure, closed inbound queue).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LavkaError {
    /// Shorthand for an `Upstream` error without a source.
    pub fn upstream(message: impl Into<String>) -> Self {
        LavkaError::Upstream {
            message: message.into(),
            source: None,
        }
    }

    /// True for the `NotFound` variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LavkaError::NotFound(_))
    }

    /// True for the `Validation` variant.
    pub fn is_validation(&self) -> bool {
        matches!(self, LavkaError::Validation(_))
    }
}
