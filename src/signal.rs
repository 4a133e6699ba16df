//! signal.rs — core data model: extracted fields, enrichment, and the stored Signal.
//!
//! A `Signal` is created once by the two-stage pipeline (extraction, then
//! best-effort enrichment) and never mutated afterwards. Stage 2 is strictly
//! additive: its absence leaves the enrichment fields empty, nothing more.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trade direction. The model may answer in any case; `parse` normalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Action::Buy),
            "SELL" => Some(Action::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        }
    }
}

/// Sentiment label from the enrichment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BULLISH" => Some(Sentiment::Bullish),
            "BEARISH" => Some(Sentiment::Bearish),
            "NEUTRAL" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "BULLISH",
            Sentiment::Bearish => "BEARISH",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

/// Validated output of stage 1. Symbol is non-empty and the action parsed;
/// everything else is whatever the model produced, taken as-is.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedFields {
    pub symbol: String,
    pub action: Action,
    pub entry: Option<f64>,
    pub zone_low: Option<f64>,
    pub zone_high: Option<f64>,
    pub tp1: Option<f64>,
    pub tp2: Option<f64>,
    pub tp3: Option<f64>,
    pub sl: Option<f64>,
    pub confidence: Option<f64>,
}

/// Output of stage 2. `Default` is the empty enrichment used on any failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Enrichment {
    pub quality_score: Option<f64>,
    pub sentiment: Option<Sentiment>,
    pub risk_reward_ratio: Option<f64>,
}

/// The stored record: one per successfully extracted message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub symbol: String,
    pub action: Action,
    pub entry: Option<f64>,
    pub zone_low: Option<f64>,
    pub zone_high: Option<f64>,
    pub tp1: Option<f64>,
    pub tp2: Option<f64>,
    pub tp3: Option<f64>,
    pub sl: Option<f64>,
    /// RFC 3339, assigned at creation.
    pub timestamp: String,
    /// The original message, verbatim.
    pub source_message: String,
    /// `None` when the caller explicitly sent a null group.
    pub group_name: Option<String>,
    pub confidence: Option<f64>,
    pub quality_score: Option<f64>,
    pub sentiment: Option<Sentiment>,
    pub risk_reward_ratio: Option<f64>,
}

impl Signal {
    /// Assemble the final record from both pipeline stages. The id and
    /// timestamp are generated here and never change.
    pub fn assemble(
        fields: ExtractedFields,
        enrichment: Enrichment,
        source_message: &str,
        group_name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: fields.symbol,
            action: fields.action,
            entry: fields.entry,
            zone_low: fields.zone_low,
            zone_high: fields.zone_high,
            tp1: fields.tp1,
            tp2: fields.tp2,
            tp3: fields.tp3,
            sl: fields.sl,
            timestamp: Utc::now().to_rfc3339(),
            source_message: source_message.to_string(),
            group_name,
            confidence: fields.confidence,
            quality_score: enrichment.quality_score,
            sentiment: enrichment.sentiment,
            risk_reward_ratio: enrichment.risk_reward_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parse_is_case_insensitive() {
        assert_eq!(Action::parse("buy"), Some(Action::Buy));
        assert_eq!(Action::parse(" SELL "), Some(Action::Sell));
        assert_eq!(Action::parse("hold"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn sentiment_parse_matches_labels() {
        assert_eq!(Sentiment::parse("bullish"), Some(Sentiment::Bullish));
        assert_eq!(Sentiment::parse("NEUTRAL"), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::parse("sideways"), None);
    }

    #[test]
    fn action_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Action::Buy).unwrap(), "\"BUY\"");
        let back: Action = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(back, Action::Sell);
    }

    #[test]
    fn assemble_keeps_message_verbatim_and_stamps_identity() {
        let fields = ExtractedFields {
            symbol: "EURUSD".into(),
            action: Action::Buy,
            entry: Some(1.0945),
            zone_low: None,
            zone_high: None,
            tp1: Some(1.0980),
            tp2: None,
            tp3: None,
            sl: Some(1.0920),
            confidence: Some(0.95),
        };
        let msg = "EURUSD BUY 1.0945 TP1=1.0980 SL=1.0920";
        let s = Signal::assemble(fields, Enrichment::default(), msg, Some("G1".into()));
        assert_eq!(s.source_message, msg);
        assert_eq!(s.group_name.as_deref(), Some("G1"));
        assert!(s.quality_score.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&s.timestamp).is_ok());
    }
}
