//! Vision provider backed by Google's Gemini API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{GenerationParams, ImagePart, ProviderError, VisionProvider};
use crate::config::GenaiConfig;
use crate::services::metrics::record_provider_call;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiVisionProvider {
    config: GenaiConfig,
    client: Client,
}

impl GeminiVisionProvider {
    pub fn new(config: GenaiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            GEMINI_API_BASE, self.config.model, method, self.config.api_key
        )
    }
}

#[async_trait]
impl VisionProvider for GeminiVisionProvider {
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        image: Option<&ImagePart>,
        params: &GenerationParams,
    ) -> Result<Option<String>, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "Vision provider is not enabled".to_string(),
            ));
        }
        if self.config.api_key.is_empty() {
            return Err(ProviderError::Configuration(
                "Gemini API key not configured".to_string(),
            ));
        }

        let mut parts = Vec::new();
        if let Some(image) = image {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data_base64.clone(),
                },
            });
        }
        parts.push(ContentPart::Text {
            text: prompt.to_string(),
        });

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: system.map(|text| Content {
                role: None,
                parts: vec![ContentPart::Text {
                    text: text.to_string(),
                }],
            }),
            generation_config: Some(GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            }),
        };

        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            has_image = image.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                record_provider_call("gemini", "error");
                ProviderError::Connection(format!("Gemini request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            record_provider_call("gemini", "error");

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }
            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            record_provider_call("gemini", "error");
            ProviderError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        record_provider_call("gemini", "success");

        // A blocked or empty candidate surfaces as no text; callers
        // degrade rather than fail.
        let text = api_response.candidates.first().map(|c| {
            c.content
                .parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("")
        });

        Ok(text.filter(|t| !t.is_empty()))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if !self.config.enabled {
            return Ok(());
        }
        if self.config.api_key.is_empty() {
            return Err(ProviderError::Configuration(
                "Gemini API key not configured".to_string(),
            ));
        }

        let url = format!("{}/models?key={}", GEMINI_API_BASE, self.config.api_key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Gemini unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Gemini health check returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

/// Mock vision provider for testing. Replies with canned output keyed
/// off the requested JSON shape so the extraction pipeline can run end
/// to end without the real API.
pub struct MockVisionProvider {
    enabled: bool,
    call_count: AtomicU64,
}

const MOCK_TAX_NOTICE_JSON: &str = r#"```json
{
  "extracted_text": "2025년 재산세 납세 고지서\n납부 금액: 1,250,000원\n납부 기한: 2025-07-31",
  "text_sections": [
    {"section": "제목", "content": "2025년 재산세 납세 고지서"},
    {"section": "금액", "content": "납부 금액: 1,250,000원"},
    {"section": "기한", "content": "납부 기한: 2025-07-31"}
  ]
}
```"#;

const MOCK_STATION_JSON: &str = r#"{
  "station_name": "테스트 충전소",
  "location": "서울특별시 강남구",
  "address": "테헤란로 123",
  "status": "operating"
}"#;

const MOCK_ANALYSIS: &str =
    "현재 세금 현황은 안정적입니다. 미납 건수가 적고 연체된 항목이 없어 위험도는 낮습니다. \
     이번 달과 이번 주의 납부 일정도 무리 없이 소화할 수 있는 수준입니다.";

impl MockVisionProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            call_count: AtomicU64::new(0),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn generate(
        &self,
        prompt: &str,
        _system: Option<&str>,
        _image: Option<&ImagePart>,
        _params: &GenerationParams,
    ) -> Result<Option<String>, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock vision provider is not enabled".to_string(),
            ));
        }

        self.call_count.fetch_add(1, Ordering::SeqCst);
        tracing::info!(prompt_len = prompt.len(), "[MOCK] Vision generation");

        let text = if prompt.contains("extracted_text") {
            MOCK_TAX_NOTICE_JSON
        } else if prompt.contains("station_name") {
            MOCK_STATION_JSON
        } else {
            MOCK_ANALYSIS
        };

        Ok(Some(text.to_string()))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
