//! Errors that stop a run
//!
//! Only setup can fail: a bad target or output path, a malformed templates
//! file, an unknown framework id, an unusable state file location. Trouble
//! with a single entry while scanning or building a snapshot is logged and
//! the entry skipped or annotated instead.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Templates file or state file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown framework, duplicate template id, no cache directory
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target directory, output directory or templates file is missing
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// A numeric option is out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, SnapError>;

/// Build a message-carrying variant: `error!(Config, "bad id {}", id)`
#[macro_export]
macro_rules! error {
    ($variant:ident, $($fmt:tt)*) => {
        $crate::error::SnapError::$variant(format!($($fmt)*))
    };
}

/// Return early with [`error!`]
#[macro_export]
macro_rules! bail {
    ($variant:ident, $($fmt:tt)*) => {
        return Err($crate::error!($variant, $($fmt)*))
    };
}

/// [`bail!`] unless `cond` holds
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $variant:ident, $($fmt:tt)*) => {
        if !($cond) {
            $crate::bail!($variant, $($fmt)*)
        }
    };
}

// The binary returns `io::Result`; keep the kinds that map cleanly.
impl From<SnapError> for io::Error {
    fn from(err: SnapError) -> Self {
        match err {
            SnapError::Io(e) => e,
            SnapError::PathNotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            SnapError::InvalidArgument(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_budget(tokens: usize) -> Result<usize> {
        ensure!(tokens > 0, InvalidArgument, "token budget must be positive, got {}", tokens);
        Ok(tokens * 4)
    }

    #[test]
    fn test_ensure_returns_early() {
        assert_eq!(chunk_budget(10).unwrap(), 40);
        let err = chunk_budget(0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: token budget must be positive, got 0");
    }

    #[test]
    fn test_io_kinds_survive_conversion() {
        let err: io::Error = SnapError::PathNotFound("/nope".to_string()).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err: io::Error = error!(InvalidArgument, "threads = {}", 0).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err: io::Error = error!(Config, "Unknown framework: {}", "cobol").into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.to_string().contains("Unknown framework: cobol"));
    }
}
