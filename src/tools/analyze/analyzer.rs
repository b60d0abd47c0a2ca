use crate::core::completion::{ChatCompletion, ChatMessage, ContentPart};
use crate::core::error::AnalysisError;
use crate::domain::{encode_image, ImageAnalysis, ImagePairAnalysis};

use super::prompt::{image_pair_instructions, single_image_instructions};
use super::reply::{object_field, parse_object, string_field};

/// Sends one or two images plus instructions to a completion backend and
/// maps the JSON reply onto the result types. Holds no per-call state.
pub struct ImageAnalyzer<C> {
    chat: C,
    model: String,
}

impl<C: ChatCompletion> ImageAnalyzer<C> {
    pub fn new(chat: C, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    pub async fn analyze_image(
        &self,
        image_path: &str,
        prompt: &str,
    ) -> Result<ImageAnalysis, AnalysisError> {
        let instructions = single_image_instructions(prompt);
        let image = encode_image(image_path)?;
        let message = ChatMessage::user(vec![
            ContentPart::image_url(image.data_url()),
            ContentPart::text(instructions),
        ]);

        let reply = self.ask(message).await?;
        let obj = parse_object(&reply)?;
        Ok(ImageAnalysis {
            image_path: image_path.to_string(),
            prompt: prompt.to_string(),
            extracted_text: string_field(&obj, "extracted_text")?,
            description: string_field(&obj, "description")?,
            prompt_response: string_field(&obj, "prompt_response")?,
        })
    }

    pub async fn analyze_two_images(
        &self,
        image_path1: &str,
        image_path2: &str,
        prompt: &str,
    ) -> Result<ImagePairAnalysis, AnalysisError> {
        let instructions = image_pair_instructions(prompt);
        let image1 = encode_image(image_path1)?;
        let image2 = encode_image(image_path2)?;
        let message = ChatMessage::user(vec![
            ContentPart::image_url(image1.data_url()),
            ContentPart::image_url(image2.data_url()),
            ContentPart::text(instructions),
        ]);

        let reply = self.ask(message).await?;
        let obj = parse_object(&reply)?;
        let first = object_field(&obj, "image1")?;
        let second = object_field(&obj, "image2")?;
        Ok(ImagePairAnalysis {
            image1_path: image_path1.to_string(),
            image1_extracted_text: string_field(&first, "extracted_text")?,
            image1_description: string_field(&first, "description")?,
            image2_path: image_path2.to_string(),
            image2_extracted_text: string_field(&second, "extracted_text")?,
            image2_description: string_field(&second, "description")?,
            prompt: prompt.to_string(),
            prompt_response: string_field(&obj, "prompt_response")?,
        })
    }

    async fn ask(&self, message: ChatMessage) -> Result<String, AnalysisError> {
        let reply = self.chat.complete(&self.model, vec![message]).await?;
        if reply.trim().is_empty() {
            return Err(AnalysisError::EmptyReply);
        }
        Ok(reply)
    }
}
