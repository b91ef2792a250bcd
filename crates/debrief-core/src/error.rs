use thiserror::Error;

pub type Result<T> = std::result::Result<T, DebriefError>;

/// Shown to the user whenever an analysis session fails, whatever the cause.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";

#[derive(Debug, Error)]
pub enum DebriefError {
    #[error("API key not set: environment variable {0} is empty or missing")]
    MissingApiKey(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Service returned no text content")]
    EmptyResponse,

    #[error("Malformed report JSON: {0}")]
    MalformedReport(#[from] serde_json::Error),

    #[error("Invalid upload payload for {name}: {reason}")]
    InvalidUpload { name: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl DebriefError {
    /// The only failure text a user ever sees. Details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        ANALYSIS_FAILED_MESSAGE
    }

    /// Short machine-readable tag, used for metrics labels and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DebriefError::MissingApiKey(_) => "missing_api_key",
            DebriefError::Transport(_) => "transport",
            DebriefError::Service { .. } => "service",
            DebriefError::EmptyResponse => "empty_response",
            DebriefError::MalformedReport(_) => "malformed_report",
            DebriefError::InvalidUpload { .. } => "invalid_upload",
            DebriefError::Validation(_) => "validation",
        }
    }
}
