use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod image;

pub use image::{encode_image, EncodedImage};

/// Result of analyzing a single image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageAnalysis {
    /// Path of the analyzed image file
    pub image_path: String,
    /// Prompt used for the analysis
    pub prompt: String,
    /// Text extracted from the image (empty if none)
    #[serde(default)]
    pub extracted_text: String,
    /// Description of the image (empty if not needed)
    #[serde(default)]
    pub description: String,
    /// Response to the prompt (empty if no prompt)
    #[serde(default)]
    pub prompt_response: String,
}

/// Result of analyzing two images together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImagePairAnalysis {
    /// Path of the first image file
    pub image1_path: String,
    /// Text extracted from the first image
    #[serde(default)]
    pub image1_extracted_text: String,
    /// Description of the first image
    #[serde(default)]
    pub image1_description: String,
    /// Path of the second image file
    pub image2_path: String,
    /// Text extracted from the second image
    #[serde(default)]
    pub image2_extracted_text: String,
    /// Description of the second image
    #[serde(default)]
    pub image2_description: String,
    /// Prompt used for the analysis
    pub prompt: String,
    /// Response to the prompt
    #[serde(default)]
    pub prompt_response: String,
}
