//! extractor.rs — stage 1: turn a free-text alert into validated signal fields.
//!
//! Every failure path (service error, unparseable response, explicit
//! "no signal" marker, missing required fields) folds into `None` here; the
//! route layer never sees an error from this module.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::completion::CompletionClient;
use crate::sanitize::sanitize_response;
use crate::signal::{Action, ExtractedFields};

pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a Forex signal extraction expert. Extract trading signals from messages and return ONLY valid JSON.

Extract these fields from forex trading messages:
- symbol: Currency pair (e.g., EURUSD, GBPJPY)
- action: BUY or SELL
- entry: Entry price (single number)
- zone_low: Lower bound of entry zone (if zone is mentioned)
- zone_high: Upper bound of entry zone (if zone is mentioned)
- tp1, tp2, tp3: Take profit levels (numbers)
- sl: Stop loss (number)
- confidence: Your confidence in extraction accuracy (0.0-1.0)

Return JSON format:
{
  "symbol": "EURUSD",
  "action": "BUY",
  "entry": 1.0945,
  "zone_low": null,
  "zone_high": null,
  "tp1": 1.0980,
  "tp2": 1.1000,
  "tp3": 1.1020,
  "sl": 1.0920,
  "confidence": 0.95
}

If no valid signal found, return: {"error": "No valid signal found"}

ONLY return valid JSON, no explanations."#;

/// Why stage 1 produced nothing. Logged, then collapsed to `None`.
enum ExtractError {
    Service(anyhow::Error),
    Parse(serde_json::Error),
    NoSignal,
}

/// The field set as the model reports it, before validation. Missing keys are
/// tolerated; validation decides whether the object is usable.
#[derive(Deserialize)]
struct RawFields {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    entry: Option<f64>,
    #[serde(default)]
    zone_low: Option<f64>,
    #[serde(default)]
    zone_high: Option<f64>,
    #[serde(default)]
    tp1: Option<f64>,
    #[serde(default)]
    tp2: Option<f64>,
    #[serde(default)]
    tp3: Option<f64>,
    #[serde(default)]
    sl: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Run stage 1 against the completion service. `None` means "no signal in
/// this message" for every failure class.
pub async fn extract_fields(
    client: &dyn CompletionClient,
    message: &str,
) -> Option<ExtractedFields> {
    match extract_inner(client, message).await {
        Ok(fields) => Some(fields),
        Err(ExtractError::Service(e)) => {
            warn!(error = %e, "signal extraction call failed");
            None
        }
        Err(ExtractError::Parse(e)) => {
            warn!(error = %e, "failed to parse extraction response as JSON");
            None
        }
        Err(ExtractError::NoSignal) => {
            debug!("no extractable signal in message");
            None
        }
    }
}

async fn extract_inner(
    client: &dyn CompletionClient,
    message: &str,
) -> Result<ExtractedFields, ExtractError> {
    let prompt = format!("Extract signal from: {message}");
    let raw = client
        .complete(EXTRACTION_SYSTEM_PROMPT, &prompt)
        .await
        .map_err(ExtractError::Service)?;

    let clean = sanitize_response(&raw);
    let value: serde_json::Value =
        serde_json::from_str(&clean).map_err(ExtractError::Parse)?;

    // The model reports "no signal" as an object with an error key.
    if value.get("error").is_some() {
        return Err(ExtractError::NoSignal);
    }

    let raw_fields: RawFields =
        serde_json::from_value(value).map_err(ExtractError::Parse)?;
    validate(raw_fields).ok_or(ExtractError::NoSignal)
}

/// A usable signal needs a non-empty symbol and a recognizable action;
/// anything less is treated the same as "no signal found". Prices are taken
/// as-is with no range or cross-field checks.
fn validate(raw: RawFields) -> Option<ExtractedFields> {
    let symbol = raw.symbol?.trim().to_string();
    if symbol.is_empty() {
        return None;
    }
    let action = Action::parse(raw.action.as_deref()?)?;
    Some(ExtractedFields {
        symbol,
        action,
        entry: raw.entry,
        zone_low: raw.zone_low,
        zone_high: raw.zone_high,
        tp1: raw.tp1,
        tp2: raw.tp2,
        tp3: raw.tp3,
        sl: raw.sl,
        confidence: raw.confidence,
    })
}
