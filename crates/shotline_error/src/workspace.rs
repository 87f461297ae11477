//! Episode workspace error types.

/// Specific error conditions for operations on stored shot entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum WorkspaceErrorKind {
    /// No entry with the given identity exists in the episode
    #[display("Shot entry '{}' not found in episode '{}'", entry, episode)]
    EntryNotFound {
        /// Entry identity
        entry: String,
        /// Episode identity
        episode: String,
    },
    /// The entry has no revision with the requested version
    #[display("Shot entry '{}' has no revision {}", entry, version)]
    RevisionNotFound {
        /// Entry identity
        entry: String,
        /// Requested version
        version: u32,
    },
    /// A user edit tried to move a shot onto a number already used in its scene
    #[display("Shot number {} is already used in scene '{}'", shot_number, scene)]
    DuplicateShotNumber {
        /// Scene identity
        scene: String,
        /// Conflicting shot number
        shot_number: u32,
    },
    /// Shot numbers start at 1 and stay below the shot-number ceiling
    #[display("Shot number must be positive and within range")]
    InvalidShotNumber,
}

/// Error type for episode workspace operations.
///
/// # Examples
///
/// ```
/// use shotline_error::{WorkspaceError, WorkspaceErrorKind};
///
/// let err = WorkspaceError::new(WorkspaceErrorKind::InvalidShotNumber);
/// assert!(format!("{}", err).contains("positive"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Workspace Error: {} at line {} in {}", kind, line, file)]
pub struct WorkspaceError {
    /// The specific error condition
    pub kind: WorkspaceErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl WorkspaceError {
    /// Create a new WorkspaceError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WorkspaceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
