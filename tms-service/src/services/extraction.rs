//! Vision extraction flows.
//!
//! Tax-notice OCR degrades to placeholder results instead of failing;
//! station signage extraction and insight generation surface real
//! errors. All three go through the `VisionProvider` seam.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use service_core::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::dtos::extraction::{StationGuess, TaxNoticeData, TextSection};
use crate::services::metrics::EXTRACTIONS_TOTAL;
use crate::services::providers::{GenerationParams, ImagePart, VisionProvider};
use crate::services::statistics::TaxAggregates;

const TAX_NOTICE_PROMPT: &str = r#"이미지에서 인식되는 모든 텍스트를 정확히 읽어서 JSON 형태로 정리해주세요.

다음과 같이 정리해주세요:
- 이미지에서 읽을 수 있는 모든 한글, 영어, 숫자를 포함
- 텍스트의 위치나 순서대로 정리
- 표, 양식, 라벨, 값 등 모든 내용 포함
- 읽기 어려운 부분도 최대한 추측해서 포함

반드시 다음 JSON 형식으로만 응답하세요:
{
  "extracted_text": "인식된 모든 텍스트 내용을 여기에 정리",
  "text_sections": [
    {
      "section": "섹션명 또는 영역",
      "content": "해당 영역의 텍스트 내용"
    }
  ]
}

JSON 외에는 어떤 텍스트도 포함하지 마세요."#;

const TAX_NOTICE_SYSTEM: &str = "You are an expert OCR text extraction system. You specialize in \
    reading all text from images including Korean, English, and numbers. Extract every visible \
    text accurately and organize it systematically. Return ONLY valid JSON format without any \
    additional text, explanations, or markdown formatting.";

const STATION_PROMPT: &str = r#"이 이미지는 전기차 충전소 관련 사진입니다. 다음 정보를 추출해주세요:

1. 충전소명 (브랜드명, 회사명 등)
2. 위치 (도시, 구역, 지역명)
3. 상세 주소 (있다면)
4. 운영 상태 (운영중, 점검중, 운영예정 중 하나)

이미지에서 텍스트나 표지판을 읽어서 정확한 정보를 추출해주세요. 한국어로 응답해주세요.

반드시 다음 JSON 형식으로만 응답하세요:
{
  "station_name": "충전소 이름 또는 브랜드명",
  "location": "충전소 위치 (도시, 구역, 지역명)",
  "address": "상세 주소 (없으면 생략)",
  "status": "operating | maintenance | planned"
}"#;

const INSIGHTS_SYSTEM: &str =
    "한국 세무 전문가로서 마크다운 형식 없이 일반 텍스트로만 간결한 분석을 제공하세요.";

static MEANINGFUL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[가-힣a-zA-Z0-9]").expect("valid meaningful-chars regex"));

static NOISE_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^0-9A-Za-z_가-힣]*$|^\.{3,}$|^-{3,}$|^_{3,}$").expect("valid noise regex")
});

/// OCR quality gate. Rejects output too short, too thin on real
/// characters, too repetitive, or matching a noise pattern.
pub fn is_meaningful_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < 10 {
        return false;
    }

    if MEANINGFUL_CHARS.find_iter(text).count() < 5 {
        return false;
    }

    let distinct: HashSet<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if distinct.len() < 3 {
        return false;
    }

    !NOISE_PATTERNS.is_match(trimmed)
}

/// Slice out the outermost JSON object, dropping markdown fences or
/// any other text around it.
pub fn strip_to_json(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

// Lenient parse targets; missing or mistyped fields become None
// instead of aborting the whole response.
#[derive(Debug, Deserialize)]
struct RawNotice {
    #[serde(default)]
    extracted_text: Option<String>,
    #[serde(default)]
    text_sections: Option<Vec<RawSection>>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

fn record_extraction(kind: &str, outcome: &str) {
    EXTRACTIONS_TOTAL.with_label_values(&[kind, outcome]).inc();
}

fn placeholder(text: &str) -> TaxNoticeData {
    TaxNoticeData {
        extracted_text: text.to_string(),
        text_sections: Vec::new(),
    }
}

#[derive(Clone)]
pub struct ExtractionService {
    vision: Arc<dyn VisionProvider>,
}

impl ExtractionService {
    pub fn new(vision: Arc<dyn VisionProvider>) -> Self {
        Self { vision }
    }

    /// OCR a tax notice image. Never fails: provider and parse
    /// problems degrade to localized placeholder results.
    #[instrument(skip(self, image))]
    pub async fn extract_tax_notice(&self, image: &ImagePart) -> TaxNoticeData {
        let result = self
            .vision
            .generate(
                TAX_NOTICE_PROMPT,
                Some(TAX_NOTICE_SYSTEM),
                Some(image),
                &GenerationParams::default(),
            )
            .await;

        let raw = match result {
            Ok(Some(text)) => text,
            Ok(None) => {
                record_extraction("tax_notice", "degraded");
                return placeholder("AI가 응답을 생성하지 못했습니다.");
            }
            Err(e) => {
                warn!(error = %e, "Vision provider call failed");
                record_extraction("tax_notice", "degraded");
                return placeholder("AI 서비스에 연결할 수 없습니다.");
            }
        };

        let parsed: RawNotice =
            match strip_to_json(&raw).and_then(|json| serde_json::from_str(json).ok()) {
                Some(parsed) => parsed,
                None => {
                    warn!("Unparseable OCR response");
                    record_extraction("tax_notice", "degraded");
                    return placeholder("AI 분석 결과를 파싱할 수 없습니다.");
                }
            };

        let extracted_text = parsed.extracted_text.unwrap_or_default();
        let text_valid = is_meaningful_text(&extracted_text);

        let valid_sections: Vec<TextSection> = parsed
            .text_sections
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| match (s.section, s.content) {
                (Some(section), Some(content))
                    if !section.trim().is_empty() && is_meaningful_text(&content) =>
                {
                    Some(TextSection { section, content })
                }
                _ => None,
            })
            .collect();

        if !text_valid && valid_sections.is_empty() {
            record_extraction("tax_notice", "degraded");
            return TaxNoticeData {
                extracted_text:
                    "이미지에서 의미있는 텍스트를 찾을 수 없습니다. 더 선명한 이미지를 업로드해주세요."
                        .to_string(),
                text_sections: vec![TextSection {
                    section: "안내".to_string(),
                    content: "텍스트가 명확하게 보이는 고화질 이미지를 사용해주세요.".to_string(),
                }],
            };
        }

        record_extraction("tax_notice", "ok");
        let text_sections = if valid_sections.is_empty() {
            // Only reachable when the text itself passed the gate
            vec![TextSection {
                section: "추출 결과".to_string(),
                content: extracted_text.clone(),
            }]
        } else {
            valid_sections
        };
        let extracted_text = if text_valid {
            extracted_text
        } else {
            "추출된 텍스트의 품질이 낮습니다.".to_string()
        };

        TaxNoticeData {
            extracted_text,
            text_sections,
        }
    }

    /// Extract a structured station guess from signage. Unlike the
    /// notice flow, failures here are real errors.
    #[instrument(skip(self, image))]
    pub async fn extract_station(&self, image: &ImagePart) -> Result<StationGuess, AppError> {
        let params = GenerationParams {
            temperature: Some(0.1),
            max_output_tokens: None,
        };

        let raw = self
            .vision
            .generate(STATION_PROMPT, None, Some(image), &params)
            .await
            .map_err(|e| {
                record_extraction("station", "error");
                AppError::InternalError(anyhow::anyhow!("Vision provider error: {e}"))
            })?
            .ok_or_else(|| {
                record_extraction("station", "error");
                AppError::InternalError(anyhow::anyhow!("Vision provider returned no text"))
            })?;

        let guess: StationGuess = strip_to_json(&raw)
            .and_then(|json| serde_json::from_str(json).ok())
            .ok_or_else(|| {
                record_extraction("station", "error");
                AppError::InternalError(anyhow::anyhow!("Unparseable station extraction response"))
            })?;

        if !matches!(guess.status.as_str(), "operating" | "maintenance" | "planned") {
            record_extraction("station", "error");
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Unexpected station status: {}",
                guess.status
            )));
        }

        record_extraction("station", "ok");
        Ok(guess)
    }

    /// Generate a short Korean analysis of the current tax posture.
    #[instrument(skip(self))]
    pub async fn generate_insights(&self, aggregates: &TaxAggregates) -> Result<String, AppError> {
        let prompt = format!(
            "세금 데이터: 총 {}개, 미납 {}개, 연체 {}개, 이번달 {}개, 이번주 {}개\n\n\
             현재 세금 현황 요약\n\
             위 데이터를 바탕으로 현재 세금 상황을 3-4문단으로 간결하게 분석해주세요. \
             미납 비율, 연체 상태, 납부 일정 압박도, 위험도 평가, 한 줄 요약을 포함하세요.\n\n\
             중요: 마크다운 형식(#, ##, ###)을 사용하지 말고 일반 텍스트로만 작성하세요.",
            aggregates.total,
            aggregates.unpaid,
            aggregates.overdue,
            aggregates.monthly_due,
            aggregates.weekly_due
        );
        let params = GenerationParams {
            temperature: None,
            max_output_tokens: Some(500),
        };

        let analysis = self
            .vision
            .generate(&prompt, Some(INSIGHTS_SYSTEM), None, &params)
            .await
            .map_err(|e| {
                record_extraction("insights", "error");
                AppError::InternalError(anyhow::anyhow!("Vision provider error: {e}"))
            })?
            .ok_or_else(|| {
                record_extraction("insights", "error");
                AppError::InternalError(anyhow::anyhow!("Vision provider returned no analysis"))
            })?;

        record_extraction("insights", "ok");
        Ok(analysis)
    }
}
