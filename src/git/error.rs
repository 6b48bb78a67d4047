/*!
 * Error types for Git operations
 */

use thiserror::Error;

/// Errors that can occur while reading repository status
#[derive(Error, Debug)]
pub enum GitError {
    /// No repository contains the path
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// Repository has no working directory
    #[error("Bare repository has no working tree: {0}")]
    BareRepository(String),

    /// Error reading the status list
    #[error("Failed to read status: {0}")]
    StatusError(git2::Error),

    /// IO error during Git operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Specialized Result type for Git operations
pub type GitResult<T> = Result<T, GitError>;
