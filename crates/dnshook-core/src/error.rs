//! Error types for dnshook
//!
//! Zone discovery failures abort a request before anything is cached.
//! Write failures carry the provider's status and body so the caller can
//! see exactly what the provider rejected.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for dnshook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which provider write failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOperation::Create => f.write_str("create"),
            WriteOperation::Update => f.write_str("update"),
            WriteOperation::Delete => f.write_str("delete"),
        }
    }
}

/// Core error type for dnshook
#[derive(Error, Debug)]
pub enum Error {
    /// No SOA answer arrived within the zone-resolution budget
    #[error("timed out looking up zone for {hostname} after {elapsed:?}")]
    ZoneLookupTimeout {
        hostname: String,
        elapsed: Duration,
    },

    /// The walk reached the two-label floor without any SOA answer
    #[error("no zone apex found for {hostname}")]
    ZoneNotFound { hostname: String },

    /// The zone exists in DNS but the provider account does not host it
    #[error("zone {zone} is not registered with the provider")]
    ZoneNotRegistered { zone: String },

    /// A create/update/delete came back with an unexpected status
    #[error("provider {operation} failed: status={status} response={body}")]
    ProviderWriteFailed {
        operation: WriteOperation,
        status: u16,
        body: String,
    },

    /// More than one page of records for a single name/type.
    ///
    /// Never returned; logged while processing continues on the first page.
    #[error("provider returned {total_pages} pages of records for {record_name} {record_type}, results are unpredictable")]
    ProviderReadAnomaly {
        record_name: String,
        record_type: String,
        total_pages: u32,
    },

    /// Provider request failed before a usable response arrived
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a write failure from a raw provider response
    pub fn write_failed(operation: WriteOperation, status: u16, body: impl Into<String>) -> Self {
        Self::ProviderWriteFailed {
            operation,
            status,
            body: body.into(),
        }
    }

    /// True for failures raised while discovering the zone
    pub fn is_zone_discovery(&self) -> bool {
        matches!(
            self,
            Error::ZoneLookupTimeout { .. }
                | Error::ZoneNotFound { .. }
                | Error::ZoneNotRegistered { .. }
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
