use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_image_mime;

/// Inline image payload for the vision endpoints.
#[derive(Debug, Deserialize, Validate)]
pub struct ExtractImageRequest {
    #[validate(length(min = 1, message = "Image data is required"))]
    pub image_base64: String,

    #[validate(custom(function = "validate_image_mime"))]
    pub mime_type: String,
}

/// One labeled section of a recognized tax notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextSection {
    pub section: String,
    pub content: String,
}

/// OCR result for a tax notice image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxNoticeData {
    pub extracted_text: String,
    pub text_sections: Vec<TextSection>,
}

/// Structured guess extracted from station signage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationGuess {
    pub station_name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: String,
}

/// Envelope for extraction results.
#[derive(Debug, Serialize)]
pub struct ExtractionResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub analysis: String,
}
