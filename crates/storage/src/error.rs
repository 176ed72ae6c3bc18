use std::path::PathBuf;

/// Errors from loading or validating a [`PoolConfig`](crate::PoolConfig).
///
/// Pool operations themselves never fail; only human-authored configuration
/// is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("capacity must be positive, got {0}")]
    InvalidCapacity(i64),
    #[error("{field} must not be negative, got {value}")]
    NegativeRate { field: &'static str, value: i64 },
    #[error("initial stored energy {stored} outside [0, {capacity}]")]
    StoredOutOfRange { stored: i64, capacity: i64 },
}
