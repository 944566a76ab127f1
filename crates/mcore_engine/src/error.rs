//! Engine error types

use mcore_a11y::A11yError;
use mcore_text::TextError;
use thiserror::Error;

/// Errors reported by a render backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Surface is gone; the host should recreate the context
    #[error("surface lost")]
    SurfaceLost,

    #[error("failed to configure surface: {0}")]
    Configure(String),

    #[error("failed to render frame: {0}")]
    Render(String),

    #[error("failed to present frame: {0}")]
    Present(String),
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid surface: {0}")]
    InvalidSurface(String),

    #[error("no frame in progress")]
    NoFrame,

    #[error("cannot resize while a frame is in progress")]
    FrameInProgress,

    /// Re-entrant call into state that is already in use
    #[error("render context is busy")]
    Busy,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Text(#[from] TextError),

    #[error(transparent)]
    Accessibility(#[from] A11yError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
