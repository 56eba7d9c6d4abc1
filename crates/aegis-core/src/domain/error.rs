//! Error taxonomy for the cycle layer.

/// Aegis core errors.
#[derive(Debug, thiserror::Error)]
pub enum AegisError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for aegis core operations.
pub type Result<T> = std::result::Result<T, AegisError>;
