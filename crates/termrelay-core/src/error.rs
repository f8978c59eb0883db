//! Error types for the terminal relay.

use thiserror::Error;

/// Main error type for relay operations.
///
/// The protocol engine itself never fails; these cover the collaborators
/// around it (configuration, PTY slots, sockets).
#[derive(Debug, Error)]
pub enum Error {
    /// PTY-related errors
    #[error("PTY error: {0}")]
    Pty(String),

    /// Client limit reached
    #[error("Client limit reached (max: {0})")]
    ClientLimitReached(usize),

    /// Invalid terminal dimensions
    #[error("Invalid dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Number of rows
        rows: u16,
        /// Number of columns
        cols: u16,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pty_error() {
        let err = Error::Pty("spawn failed".to_string());
        assert_eq!(err.to_string(), "PTY error: spawn failed");
    }

    #[test]
    fn test_client_limit_reached_error() {
        let err = Error::ClientLimitReached(10);
        assert_eq!(err.to_string(), "Client limit reached (max: 10)");
    }

    #[test]
    fn test_invalid_dimensions_error() {
        let err = Error::InvalidDimensions { rows: 0, cols: 100 };
        assert_eq!(err.to_string(), "Invalid dimensions: 0x100");
    }

    #[test]
    fn test_config_error() {
        let err = Error::Config("missing field: command".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field: command");
    }

    #[test]
    fn test_other_error() {
        let err = Error::Other("unknown error".to_string());
        assert_eq!(err.to_string(), "unknown error");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_type() {
        let success: Result<i32> = Ok(42);
        assert!(success.is_ok());

        let failure: Result<i32> = Err(Error::Other("test error".to_string()));
        assert!(failure.is_err());
    }
}
