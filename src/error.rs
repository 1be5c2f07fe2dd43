use thiserror::Error;

/// Main error type for ftdex operations
#[derive(Error, Debug)]
pub enum FtdexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid config file: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("Invalid match mode: {0} (expected exact, prefix or infix)")]
    InvalidMatchMode(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Index file name for '{0}' cannot be shortened any further")]
    TermTooLong(String),

    #[error("Indexer has been shut down")]
    ShutDown,
}

/// Result type alias for ftdex operations
pub type Result<T> = std::result::Result<T, FtdexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FtdexError::InvalidMatchMode("fuzzy".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid match mode: fuzzy (expected exact, prefix or infix)"
        );
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: FtdexError = io.into();
        assert!(matches!(err, FtdexError::Io(_)));
        assert_eq!(err.to_string(), "IO error: disk full");
    }
}
