//! Reading image files into inline data URLs.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;

use crate::core::error::AnalysisError;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub media_type: String,
    pub data_base64: String,
}

impl EncodedImage {
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data_base64: BASE64_ENGINE.encode(bytes),
        }
    }

    /// `data:<media type>;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data_base64)
    }
}

pub fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string()
}

/// Read the whole file at `path` and encode it. Fails with `ImageNotFound`
/// unless `path` is an existing regular file.
pub fn encode_image(path: &str) -> Result<EncodedImage, AnalysisError> {
    let p = Path::new(path);
    if !p.is_file() {
        return Err(AnalysisError::ImageNotFound(path.to_string()));
    }
    let bytes = std::fs::read(p).map_err(|source| AnalysisError::ImageRead {
        path: path.to_string(),
        source,
    })?;
    let media_type = media_type_for(p);
    tracing::debug!(path, media_type = %media_type, bytes = bytes.len(), "image encoded");
    Ok(EncodedImage::from_bytes(media_type, &bytes))
}
