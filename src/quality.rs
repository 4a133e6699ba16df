//! quality.rs — stage 2: best-effort quality/sentiment/risk assessment.
//!
//! This stage never fails the pipeline. Whatever goes wrong — service error,
//! unparseable response, missing keys — the caller gets an empty `Enrichment`
//! and the already-extracted signal is stored without it.

use serde::Deserialize;
use tracing::debug;

use crate::completion::CompletionClient;
use crate::sanitize::sanitize_response;
use crate::signal::{Enrichment, ExtractedFields, Sentiment};

pub const QUALITY_SYSTEM_PROMPT: &str = r#"You are an expert Forex trading analyst. Assess the quality of an extracted trading signal and return ONLY valid JSON.

Given the extracted signal fields and the original message, return:
- quality_score: Overall signal quality (0.0-1.0), judging completeness and clarity
- sentiment: BULLISH, BEARISH, or NEUTRAL
- risk_reward_ratio: Reward-to-risk ratio implied by the levels (may be negative)
- analysis: One short sentence of reasoning

Return JSON format:
{
  "quality_score": 0.85,
  "sentiment": "BULLISH",
  "risk_reward_ratio": 1.4,
  "analysis": "Clear levels with a favorable ratio."
}

ONLY return valid JSON, no explanations."#;

/// Raw stage-2 response. `quality_score` and `sentiment` must be present for
/// the object to count; `risk_reward_ratio` may be omitted when the levels
/// needed to compute it are missing.
#[derive(Deserialize)]
struct RawAssessment {
    quality_score: f64,
    sentiment: String,
    #[serde(default)]
    risk_reward_ratio: Option<f64>,
}

/// Run stage 2. Returns the empty enrichment on any failure.
pub async fn analyze(
    client: &dyn CompletionClient,
    fields: &ExtractedFields,
    message: &str,
) -> Enrichment {
    let serialized = match serde_json::to_string(fields) {
        Ok(s) => s,
        Err(_) => return Enrichment::default(),
    };
    let prompt = format!(
        "Extracted signal: {serialized}\n\nOriginal message: {message}\n\nAssess this signal."
    );

    let raw = match client.complete(QUALITY_SYSTEM_PROMPT, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "quality analysis call failed; storing signal without enrichment");
            return Enrichment::default();
        }
    };

    let clean = sanitize_response(&raw);
    match serde_json::from_str::<RawAssessment>(&clean) {
        Ok(a) => Enrichment {
            quality_score: Some(a.quality_score),
            sentiment: Sentiment::parse(&a.sentiment),
            risk_reward_ratio: a.risk_reward_ratio,
        },
        Err(e) => {
            debug!(error = %e, "unusable quality analysis response; storing signal without enrichment");
            Enrichment::default()
        }
    }
}
