//! export.rs — read-only projections of the signal collection: a fixed-column
//! CSV table and a JSON envelope. Neither validates nor filters the data.

use chrono::Utc;
use serde_json::json;

use crate::signal::Signal;

/// Column order is fixed and part of the export contract.
const CSV_HEADER: [&str; 17] = [
    "id",
    "symbol",
    "action",
    "entry",
    "zone_low",
    "zone_high",
    "tp1",
    "tp2",
    "tp3",
    "sl",
    "timestamp",
    "group_name",
    "confidence",
    "quality_score",
    "sentiment",
    "risk_reward_ratio",
    "source_message",
];

/// Serialize the collection as CSV, header row first. Absent optional fields
/// become empty cells.
pub fn to_csv(signals: &[Signal]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for s in signals {
        writer.write_record([
            s.id.to_string(),
            s.symbol.clone(),
            s.action.as_str().to_string(),
            opt_num(s.entry),
            opt_num(s.zone_low),
            opt_num(s.zone_high),
            opt_num(s.tp1),
            opt_num(s.tp2),
            opt_num(s.tp3),
            opt_num(s.sl),
            s.timestamp.clone(),
            s.group_name.clone().unwrap_or_default(),
            opt_num(s.confidence),
            opt_num(s.quality_score),
            s.sentiment.map(|v| v.as_str()).unwrap_or_default().to_string(),
            opt_num(s.risk_reward_ratio),
            s.source_message.clone(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV writer: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

/// JSON envelope: export timestamp, total count, and the full records.
pub fn to_json_envelope(signals: &[Signal]) -> serde_json::Value {
    json!({
        "export_timestamp": Utc::now().to_rfc3339(),
        "total_signals": signals.len(),
        "signals": signals,
    })
}

fn opt_num(v: Option<f64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Action, Enrichment, ExtractedFields, Sentiment};

    fn sample() -> Signal {
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
        let enrichment = Enrichment {
            quality_score: Some(0.8),
            sentiment: Some(Sentiment::Bullish),
            risk_reward_ratio: Some(1.4),
        };
        Signal::assemble(
            fields,
            enrichment,
            "EURUSD BUY 1.0945 TP1=1.0980 SL=1.0920",
            Some("G1".into()),
        )
    }

    #[test]
    fn csv_has_header_plus_one_row_per_signal() {
        let signals = vec![sample(), sample()];
        let out = to_csv(&signals).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER.join(","));
    }

    #[test]
    fn csv_renders_absent_fields_as_empty_cells() {
        let mut s = sample();
        s.entry = None;
        s.sentiment = None;
        s.group_name = None;
        let out = to_csv(&[s]).unwrap();
        let row = out.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split(',').collect();
        assert_eq!(cells[3], "", "entry cell");
        assert_eq!(cells[11], "", "group_name cell");
        assert_eq!(cells[14], "", "sentiment cell");
    }

    #[test]
    fn json_envelope_roundtrips_every_field() {
        let signal = sample();
        let envelope = to_json_envelope(std::slice::from_ref(&signal));
        assert_eq!(envelope["total_signals"], 1);
        assert!(envelope["export_timestamp"].is_string());

        let back: Vec<Signal> =
            serde_json::from_value(envelope["signals"].clone()).unwrap();
        assert_eq!(back.len(), 1);
        let b = &back[0];
        assert_eq!(b.id, signal.id);
        assert_eq!(b.symbol, signal.symbol);
        assert_eq!(b.action, signal.action);
        assert_eq!(b.entry, signal.entry);
        assert_eq!(b.tp1, signal.tp1);
        assert_eq!(b.sl, signal.sl);
        assert_eq!(b.timestamp, signal.timestamp);
        assert_eq!(b.source_message, signal.source_message);
        assert_eq!(b.group_name, signal.group_name);
        assert_eq!(b.confidence, signal.confidence);
        assert_eq!(b.quality_score, signal.quality_score);
        assert_eq!(b.sentiment, signal.sentiment);
        assert_eq!(b.risk_reward_ratio, signal.risk_reward_ratio);
    }
}
