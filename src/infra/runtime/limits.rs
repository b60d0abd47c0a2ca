use crate::core::error::AnalysisError;
use crate::infra::config::OpenAiConfig;

/// Build a reqwest client for the completion endpoint. Requests are
/// unbounded unless the operator configured a timeout.
pub fn make_http_client(cfg: &OpenAiConfig) -> Result<reqwest::Client, AnalysisError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = cfg.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| AnalysisError::Config(format!("failed to build HTTP client: {e}")))
}
