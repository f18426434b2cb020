//! Error types for the external publishing system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for publishing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the external publishing system
#[derive(Error, Debug)]
pub enum Error {
    /// Requested provider name is not registered
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Requested document id did not resolve
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// A provider registration failed the capability contract
    #[error("Invalid provider ({provider}): {message}")]
    ProviderValidation {
        /// Provider name
        provider: String,
        /// What the contract check rejected
        message: String,
    },

    /// The provider's platform-specific call failed
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message, including any platform error payload
        message: String,
    },

    /// The publication-record append failed after a successful platform call
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Settings store errors
    #[error("Settings store error: {0}")]
    SettingsStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input from a caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors (document store persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "unknown provider" error
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider(name.into())
    }

    /// Create a "document not found" error
    pub fn document_not_found(doc_id: impl Into<String>) -> Self {
        Self::DocumentNotFound(doc_id.into())
    }

    /// Create a provider validation error
    pub fn provider_validation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderValidation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a settings store error
    pub fn settings_store(msg: impl Into<String>) -> Self {
        Self::SettingsStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
