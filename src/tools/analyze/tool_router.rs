use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{ErrorData, Json};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::clients::openai::OpenAiChat;
use crate::core::error::AnalysisError;
use crate::domain::{ImageAnalysis, ImagePairAnalysis};
use crate::infra::config::OpenAiConfig;
use crate::infra::logging::{count_error, log_metric};
use crate::infra::runtime::mcp_transport::ServerHandler;

use super::analyzer::ImageAnalyzer;

pub const ANALYZE_IMAGE: &str = "analyze_image";
pub const ANALYZE_TWO_IMAGES: &str = "analyze_two_images";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeImageArgs {
    /// Absolute path of the image file to analyze. Must be an absolute path, e.g. /path/to/image.jpg
    pub image_path: String,
    /// Prompt used for the image analysis
    pub prompt: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeTwoImagesArgs {
    /// Absolute path of the first image file to analyze. Must be an absolute path, e.g. /path/to/image1.jpg
    pub image_path1: String,
    /// Absolute path of the second image file to analyze. Must be an absolute path, e.g. /path/to/image2.jpg
    pub image_path2: String,
    /// Prompt used for the image analysis
    pub prompt: String,
}

/// MCP handler for the image analysis tools. Holds only the completion
/// settings; every call builds its own client.
#[derive(Clone)]
pub struct AnalyzeSvc {
    settings: Arc<OpenAiConfig>,
}

impl AnalyzeSvc {
    pub fn new(settings: OpenAiConfig) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    fn analyzer(&self) -> Result<ImageAnalyzer<OpenAiChat>, AnalysisError> {
        let chat = OpenAiChat::from_config(&self.settings)?;
        Ok(ImageAnalyzer::new(chat, self.settings.model.clone()))
    }
}

impl ServerHandler for AnalyzeSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Analyze local image files with a multimodal model: extract text, describe, and answer a prompt. Paths must be absolute."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn to_mcp_error(tool: &'static str, context: &str, err: AnalysisError) -> ErrorData {
    count_error(tool, err.kind());
    tracing::warn!(tool, kind = err.kind(), error = %err, "analysis failed");
    let message = format!("{context}: {err}");
    if err.is_input_error() {
        ErrorData::invalid_params(message, None)
    } else {
        ErrorData::internal_error(message, None)
    }
}

#[rmcp::tool_router]
impl AnalyzeSvc {
    #[rmcp::tool(
        name = "analyze_image",
        description = "Analyze the given image with the given prompt: extract its text, describe it, and answer the prompt."
    )]
    async fn analyze_image(
        &self,
        Parameters(args): Parameters<AnalyzeImageArgs>,
    ) -> Result<Json<ImageAnalysis>, ErrorData> {
        tracing::debug!(image_path = %args.image_path, "analyze_image invoked");
        let start = Instant::now();
        let result = match self.analyzer() {
            Ok(analyzer) => analyzer.analyze_image(&args.image_path, &args.prompt).await,
            Err(e) => Err(e),
        };
        let out = result.map_err(|e| to_mcp_error(ANALYZE_IMAGE, "Failed to analyze image", e))?;
        log_metric(ANALYZE_IMAGE, "analysis_latency_ms", start.elapsed().as_millis() as f64);
        Ok(Json(out))
    }

    #[rmcp::tool(
        name = "analyze_two_images",
        description = "Analyze two images together with the given prompt: extract text from and describe each image, and answer the prompt."
    )]
    async fn analyze_two_images(
        &self,
        Parameters(args): Parameters<AnalyzeTwoImagesArgs>,
    ) -> Result<Json<ImagePairAnalysis>, ErrorData> {
        tracing::debug!(
            image_path1 = %args.image_path1,
            image_path2 = %args.image_path2,
            "analyze_two_images invoked"
        );
        let start = Instant::now();
        let result = match self.analyzer() {
            Ok(analyzer) => {
                analyzer
                    .analyze_two_images(&args.image_path1, &args.image_path2, &args.prompt)
                    .await
            }
            Err(e) => Err(e),
        };
        let out = result
            .map_err(|e| to_mcp_error(ANALYZE_TWO_IMAGES, "Failed to analyze image pair", e))?;
        log_metric(ANALYZE_TWO_IMAGES, "analysis_latency_ms", start.elapsed().as_millis() as f64);
        Ok(Json(out))
    }
}

pub type AnalyzeRouter = ToolRouter<AnalyzeSvc>;

impl AnalyzeSvc {
    pub fn router() -> AnalyzeRouter {
        // Wrapper to expose the macro-generated private tool_router
        Self::tool_router()
    }
}
