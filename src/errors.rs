//! Service-level error handling
//!
//! Failures that happen outside a single request: loading configuration,
//! installing the log subscriber, binding and running the HTTP server.
//! Request failures live in [`crate::api_errors`].

use thiserror::Error;

/// Main error type for the scoring service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error")]
    Serve {
        #[source]
        source: std::io::Error,
    },

    #[error("Logging setup failed: {message}")]
    Logging { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a bind error
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// Create a logging error
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

/// Convert from figment extraction errors
impl From<figment::Error> for ServiceError {
    fn from(err: figment::Error) -> Self {
        ServiceError::config(err.to_string())
    }
}
