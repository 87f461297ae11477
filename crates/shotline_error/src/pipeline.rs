//! Batch pipeline error types.

/// Specific error conditions for the batch pipeline controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// The pipeline was started without any episodes
    #[display("Batch pipeline needs at least one episode")]
    NoEpisodes,
    /// The target episode has no scenes to attach shots to
    #[display("Episode '{}' has no scenes; write the script before generating a storyboard", _0)]
    NoScenes(String),
    /// Event is not valid in the current phase
    #[display("Cannot {} while the pipeline is {}", event, phase)]
    InvalidTransition {
        /// Current phase
        phase: String,
        /// Rejected event
        event: String,
    },
    /// A generation request is already in flight for the current step
    #[display("A generation request is already in flight ({})", _0)]
    RequestInFlight(String),
    /// Confirmation requested with no draft to confirm
    #[display("Nothing to confirm for {}", _0)]
    NoDraft(String),
    /// Confirmation attempted while the context sections are incomplete
    #[display("Context is missing sections: {}", _0)]
    IncompleteContext(String),
    /// Prompt authoring requires a confirmed storyboard
    #[display("Storyboard for episode '{}' has not been confirmed", _0)]
    StoryboardNotConfirmed(String),
    /// The prompt-authoring reply yielded no shot prompts
    #[display("No shot prompts found in reply for episode '{}'", _0)]
    EmptyPromptMap(String),
    /// Failed to build a generation request
    #[display("Failed to build request: {}", _0)]
    RequestBuild(String),
}

/// Error type for batch pipeline operations.
///
/// # Examples
///
/// ```
/// use shotline_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::NoScenes("ep-1".to_string()));
/// assert!(format!("{}", err).contains("no scenes"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
