use thiserror::Error;

/// Every way an analysis call can fail. Produced once where the failure is
/// detected and propagated unchanged up to the tool layer.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("Image file not found: {0}")]
    ImageNotFound(String),

    #[error("failed to read image file {path}: {source}")]
    ImageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("completion request failed: {0}")]
    Service(String),

    #[error("no response content from completion service")]
    EmptyReply,

    #[error("failed to decode completion reply: {0}")]
    Decode(String),
}

impl AnalysisError {
    /// True for failures caused by the caller's input rather than the
    /// environment or the upstream service.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AnalysisError::ImageNotFound(_))
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Config(_) => "config",
            AnalysisError::ImageNotFound(_) | AnalysisError::ImageRead { .. } => "input",
            AnalysisError::Service(_) | AnalysisError::EmptyReply => "service",
            AnalysisError::Decode(_) => "decode",
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Decode(e.to_string())
    }
}
