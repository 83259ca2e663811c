//! Error types for input operations.

use crate::codec::DecodeError;
use thiserror::Error;

/// Result type for input operations
pub type InputResult<T> = Result<T, InputError>;

/// Error types for input operations
#[derive(Error, Debug)]
pub enum InputError {
    /// Transport failures - connect, read and subscribe errors against the remote service
    ///
    /// These are retried by the runtime until the retry budget runs out.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The retry budget ran out without an intervening resumption
    #[error("Connection failed too many times (retries: {retries})")]
    RetriesExhausted {
        retries: u32,
        #[source]
        source: Box<InputError>,
    },

    /// A payload could not be turned into an event
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Configuration error - detected at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl InputError {
    /// Check if this error is a transport failure (and therefore retryable)
    pub fn is_transport(&self) -> bool {
        matches!(self, InputError::Transport { .. })
    }

    /// Check if this error must stop the input
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InputError::RetriesExhausted { .. } | InputError::Configuration(_)
        )
    }

    /// Check if this error is due to an undecodable payload
    pub fn is_decode(&self) -> bool {
        matches!(self, InputError::Decode(_))
    }

    /// Create a transport error from a message
    pub fn transport(message: impl Into<String>) -> Self {
        InputError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error with source
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        InputError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create the fatal error raised once the retry budget is spent
    pub fn retries_exhausted(retries: u32, last: InputError) -> Self {
        InputError::RetriesExhausted {
            retries,
            source: Box::new(last),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        InputError::Configuration(message.into())
    }
}

/// Socket errors from a transport are connection failures and get retried
impl From<std::io::Error> for InputError {
    fn from(err: std::io::Error) -> Self {
        InputError::transport_with_source(format!("I/O failure: {}", err), err)
    }
}

impl From<serde_json::Error> for InputError {
    fn from(err: serde_json::Error) -> Self {
        InputError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_classification() {
        let transport = InputError::transport("connection reset");
        assert!(transport.is_transport());
        assert!(!transport.is_fatal());

        let exhausted = InputError::retries_exhausted(5, transport);
        assert!(exhausted.is_fatal());
        assert!(!exhausted.is_transport());

        let config = InputError::config("key is required");
        assert!(config.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = InputError::transport("timed out");
        assert_eq!(err.to_string(), "Transport error: timed out");

        let err = InputError::retries_exhausted(2, InputError::transport("refused"));
        assert_eq!(
            err.to_string(),
            "Connection failed too many times (retries: 2)"
        );
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Transport error: refused"));
    }

    #[test]
    fn test_transport_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = InputError::transport_with_source("connect failed", io);
        assert!(err.is_transport());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_is_transport() {
        fn read() -> InputResult<usize> {
            let socket: std::io::Result<usize> = Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset by peer",
            ));
            Ok(socket?)
        }

        let err = read().unwrap_err();
        assert!(err.is_transport());
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Transport error: I/O failure: reset by peer");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("reset by peer"));
    }
}
