//! Shared error type across GenMetr crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, GenMetrError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum GenMetrError {
    /// A metric with this name exists with a different kind, help or label set.
    #[error("metric already registered with a different shape: {name}")]
    AlreadyRegistered { name: String },
    #[error("invalid metric descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("label mismatch for {metric}: expected {expected} values, got {got}")]
    LabelMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },
    #[error("unknown or missing label for {metric}: {label}")]
    UnknownLabel { metric: String, label: String },
    /// The handle belongs to a different registry.
    #[error("metric {metric} is not registered on this registry")]
    ForeignHandle { metric: String },
    #[error("operation does not apply to {metric}")]
    KindMismatch { metric: String },
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl GenMetrError {
    /// Stable short code, used in logs and config test assertions.
    pub fn code(&self) -> &'static str {
        match self {
            GenMetrError::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            GenMetrError::InvalidDescriptor(_) => "INVALID_DESCRIPTOR",
            GenMetrError::LabelMismatch { .. } | GenMetrError::UnknownLabel { .. } => {
                "LABEL_MISMATCH"
            }
            GenMetrError::ForeignHandle { .. } => "FOREIGN_HANDLE",
            GenMetrError::KindMismatch { .. } => "KIND_MISMATCH",
            GenMetrError::InvalidValue(_) => "INVALID_VALUE",
            GenMetrError::BadRequest(_) => "BAD_REQUEST",
            GenMetrError::Internal(_) => "INTERNAL",
        }
    }
}
