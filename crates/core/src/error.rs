//! Error types for content-stream rendering.

use thiserror::Error;

/// How an error affects an in-progress render under the default
/// (lenient) policy. Structural errors abort the whole render because
/// the state machine cannot guarantee consistency past a malformed
/// operator; everything else drops the operator and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the entire render.
    Fatal,
    /// Drop the operator's visible effect and keep going.
    SkipOperator,
}

/// Primary error type for rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("type error: expected {expected}, got {got}")]
    Type {
        expected: &'static str,
        got: &'static str,
    },

    #[error("range error: {0}")]
    Range(String),

    #[error("{kind} resource not found: {name}")]
    ResourceNotFound { kind: &'static str, name: String },

    #[error("required attribute missing: {0}")]
    MissingAttribute(&'static str),

    #[error("cyclic form reference: {0}")]
    CyclicReference(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("colorspace {0} is not RGB-convertible")]
    ColorConversion(&'static str),

    #[error("graphics state stack underflow")]
    StateUnderflow,
}

impl RenderError {
    /// Classify this error under the lenient propagation policy.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Type { .. } | Self::Range(_) | Self::StateUnderflow => Severity::Fatal,
            Self::ResourceNotFound { .. }
            | Self::MissingAttribute(_)
            | Self::CyclicReference(_)
            | Self::Decode(_)
            | Self::ColorConversion(_) => Severity::SkipOperator,
        }
    }
}

/// Convenience Result type alias for RenderError.
pub type Result<T> = std::result::Result<T, RenderError>;
