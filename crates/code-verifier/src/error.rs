//! Verifier error taxonomy.
//!
//! Problems with the generated files themselves are reported as
//! [`crate::VerificationIssue`]s, never as errors. These cover the cases where
//! verification cannot run at all.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("verification root does not exist or is not a directory: {0}")]
    RootNotFound(PathBuf),
}

/// Result type for verifier operations.
pub type Result<T> = std::result::Result<T, VerifierError>;
