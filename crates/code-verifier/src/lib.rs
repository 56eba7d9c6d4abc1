//! Three-layer verification of a generated file set.
//!
//! Layer 1 checks that declared files exist and are non-empty, Layer 2 runs
//! per-language static analysis, and Layer 3 checks cross-file integration
//! (script loading, stylesheet usage, form and event handler wiring).

pub mod analysis;
pub mod config;
pub mod error;
pub mod guidance;
pub mod resolve;
pub mod semantics;
pub mod structure;
pub mod symbols;
pub mod types;
pub mod verifier;

pub use config::VerifierConfig;
pub use error::{Result, VerifierError};
pub use guidance::{Guidance, GuidanceTopic};
pub use symbols::{SymbolEntry, SymbolTable};
pub use types::{
    FileCheck, FileSpec, Layer, Severity, VerificationIssue, VerificationResult, SUMMARY_LIMIT,
};
pub use verifier::{verify_generated_code, CodeVerifier};
