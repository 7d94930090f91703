//! Error handling for the TRON access layer
//!
//! Every failure the crate surfaces is an [`AppError`] variant, so callers can
//! tell configuration mistakes, transient network failures and definitive
//! not-found answers apart without inspecting message text.

pub mod types;

use thiserror::Error;
use tracing::{error, warn};

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum AppError {
    // Caller or configuration mistakes. Never retried.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String, line: Option<usize> },

    #[error("Unknown connection: {name}")]
    UnknownConnection { name: String },

    // Remote API outcomes
    #[error("Transport error: {message}")]
    Transport { message: String, code: Option<u16> },

    #[error("Page not found: {path}")]
    NotFound { path: String },

    // Rotation cursor storage
    #[error("Cursor store failure: {message}")]
    Store { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO operation failed: {operation} - {message}")]
    Io { operation: String, message: String },
}

impl AppError {
    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>, code: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            code,
        }
    }

    /// Create a new store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigParse { .. }
                | Self::UnknownConnection { .. }
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the failure may go away on its own.
    ///
    /// Store outages count as transient: no key could be determined, which the
    /// caller treats like a failed network attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Store { .. })
    }

    /// Short machine-readable category, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. }
            | Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::UnknownConnection { .. } => "configuration",
            Self::Transport { .. } => "transport",
            Self::NotFound { .. } => "not_found",
            Self::Store { .. } => "store",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self, context: &str) {
        if self.is_transient() {
            warn!(error = %self, error_kind = self.kind(), context, "Operation failed");
        } else {
            error!(error = %self, error_kind = self.kind(), context, "Operation failed");
        }
    }
}

/// Result type alias for the crate
pub type Result<T, E = AppError> = std::result::Result<T, E>;
