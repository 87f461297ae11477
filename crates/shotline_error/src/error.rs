//! Top-level error wrapper types.

use crate::{
    BackendError, ConfigError, JsonError, PipelineError, StorageError, WorkspaceError,
};

/// Every failure a Shotline operation can surface.
///
/// # Examples
///
/// ```
/// use shotline_error::{BackendError, ShotlineError};
///
/// let err: ShotlineError = BackendError::new("timeout").into();
/// assert!(format!("{}", err).contains("Backend Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ShotlineErrorKind {
    /// Language-model transport or provider failure
    #[from(BackendError)]
    Backend(BackendError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Persistence failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Stored shot entry operation failure
    #[from(WorkspaceError)]
    Workspace(WorkspaceError),
    /// Batch pipeline failure
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Shotline error with kind discrimination.
///
/// # Examples
///
/// ```
/// use shotline_error::{ConfigError, ShotlineErrorKind, ShotlineResult};
///
/// fn might_fail() -> ShotlineResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), ShotlineErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Shotline Error: {}", _0)]
pub struct ShotlineError(Box<ShotlineErrorKind>);

impl ShotlineError {
    /// Create a new error from a kind.
    pub fn new(kind: ShotlineErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ShotlineErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ShotlineErrorKind
impl<T> From<T> for ShotlineError
where
    T: Into<ShotlineErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Shotline operations.
pub type ShotlineResult<T> = std::result::Result<T, ShotlineError>;
