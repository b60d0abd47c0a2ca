use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::AnalysisError;

pub const DEFAULT_MODEL: &str = "gpt-4.1";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PORT: u16 = 8080;

pub struct Config {
    pub mode: String, // "stdio" or "server"
    pub port: u16,
    pub openai: OpenAiConfig,
}

/// Everything the completion client needs. Captured once at boot and handed
/// to the tool service; nothing below this reads the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl OpenAiConfig {
    /// The credential, or a configuration error if it is unset or blank.
    pub fn require_api_key(&self) -> Result<&str, AnalysisError> {
        match self.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => Ok(k),
            _ => Err(AnalysisError::Config(
                "OPENAI_API_KEY environment variable is not set.".into(),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    openai: OpenAiSection,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    mode: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiSection {
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Environment only.
    pub fn from_env() -> Self {
        Self::layered(FileConfig::default())
    }

    /// Optional TOML file named by `ANALYZE_IMAGE_CONFIG`, overridden by
    /// environment variables.
    pub fn from_env_and_toml() -> anyhow::Result<Self> {
        let file = match env_nonempty("ANALYZE_IMAGE_CONFIG") {
            Some(path) => load_file(Path::new(&path))?,
            None => FileConfig::default(),
        };
        Ok(Self::layered(file))
    }

    fn layered(file: FileConfig) -> Self {
        let mode = env_nonempty("MODE")
            .or(file.server.mode)
            .unwrap_or_else(|| "stdio".into());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);

        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(file.openai.timeout_secs);
        let openai = OpenAiConfig {
            api_key: env_nonempty("OPENAI_API_KEY"),
            model: env_nonempty("OPENAI_COMPLETION_MODEL")
                .or(file.openai.model)
                .unwrap_or_else(|| DEFAULT_MODEL.into()),
            base_url: env_nonempty("OPENAI_BASE_URL")
                .or(file.openai.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
        };

        Self { mode, port, openai }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.mode.as_str(), "server" | "stdio") {
            return Err(format!(
                "Invalid MODE: {}. Must be 'server' or 'stdio'",
                self.mode
            ));
        }
        if self.mode == "server" && self.port == 0 {
            return Err("PORT cannot be 0".into());
        }
        if self.openai.model.trim().is_empty() {
            return Err("model identifier cannot be empty".into());
        }
        if !(self.openai.base_url.starts_with("http://")
            || self.openai.base_url.starts_with("https://"))
        {
            return Err(format!(
                "Invalid OPENAI_BASE_URL: {}",
                self.openai.base_url
            ));
        }
        Ok(())
    }
}

fn load_file(path: &Path) -> anyhow::Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
    let parsed: FileConfig = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(parsed)
}
