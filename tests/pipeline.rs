// tests/pipeline.rs
//
// Stage-level tests for the extraction and enrichment pipeline, driving each
// stage directly with a scripted mock completion client.

use serde_json::json;

use forex_signal_extractor::completion::MockClient;
use forex_signal_extractor::signal::{Action, Sentiment};
use forex_signal_extractor::{extractor, quality};

fn fields_reply() -> String {
    json!({
        "symbol": "GBPJPY",
        "action": "SELL",
        "entry": 185.50,
        "tp1": 184.80,
        "sl": 186.00,
        "confidence": 0.8
    })
    .to_string()
}

#[tokio::test]
async fn extraction_parses_a_plain_json_reply() {
    let client = MockClient::replying(&fields_reply());
    let fields = extractor::extract_fields(&client, "GBPJPY SELL 185.50")
        .await
        .expect("fields extracted");
    assert_eq!(fields.symbol, "GBPJPY");
    assert_eq!(fields.action, Action::Sell);
    assert_eq!(fields.entry, Some(185.50));
    assert_eq!(fields.confidence, Some(0.8));
    assert_eq!(fields.zone_low, None);
}

#[tokio::test]
async fn extraction_unwraps_tagged_and_untagged_fences() {
    for wrapper in [
        format!("```json\n{}\n```", fields_reply()),
        format!("```\n{}\n```", fields_reply()),
    ] {
        let client = MockClient::replying(&wrapper);
        let fields = extractor::extract_fields(&client, "GBPJPY SELL 185.50")
            .await
            .expect("fenced reply should still parse");
        assert_eq!(fields.symbol, "GBPJPY");
    }
}

#[tokio::test]
async fn extraction_treats_service_error_as_no_signal() {
    let client = MockClient::with_script([Err("connection refused".to_string())]);
    assert!(extractor::extract_fields(&client, "EURUSD BUY 1.0945")
        .await
        .is_none());
}

#[tokio::test]
async fn extraction_rejects_objects_missing_required_fields() {
    // Parseable, but no action: folded into "no signal found".
    let client = MockClient::replying(&json!({ "symbol": "EURUSD", "entry": 1.0945 }).to_string());
    assert!(extractor::extract_fields(&client, "EURUSD 1.0945")
        .await
        .is_none());
}

#[tokio::test]
async fn quality_parses_a_full_assessment() {
    let fields_client = MockClient::replying(&fields_reply());
    let fields = extractor::extract_fields(&fields_client, "GBPJPY SELL 185.50")
        .await
        .unwrap();

    let quality_client = MockClient::replying(
        &json!({
            "quality_score": 0.7,
            "sentiment": "bearish",
            "risk_reward_ratio": 1.4,
            "analysis": "Levels are coherent for a short."
        })
        .to_string(),
    );
    let enrichment = quality::analyze(&quality_client, &fields, "GBPJPY SELL 185.50").await;
    assert_eq!(enrichment.quality_score, Some(0.7));
    assert_eq!(enrichment.sentiment, Some(Sentiment::Bearish));
    assert_eq!(enrichment.risk_reward_ratio, Some(1.4));
}

#[tokio::test]
async fn quality_failure_yields_empty_enrichment() {
    let fields_client = MockClient::replying(&fields_reply());
    let fields = extractor::extract_fields(&fields_client, "GBPJPY SELL 185.50")
        .await
        .unwrap();

    // Service error, unparseable text, and missing keys all degrade the same.
    for script in [
        vec![Err("timeout".to_string())],
        vec![Ok("not json at all".to_string())],
        vec![Ok(json!({ "analysis": "looks fine" }).to_string())],
    ] {
        let client = MockClient::with_script(script);
        let enrichment = quality::analyze(&client, &fields, "GBPJPY SELL 185.50").await;
        assert!(enrichment.quality_score.is_none());
        assert!(enrichment.sentiment.is_none());
        assert!(enrichment.risk_reward_ratio.is_none());
    }
}

#[tokio::test]
async fn quality_tolerates_missing_risk_reward_only() {
    let fields_client = MockClient::replying(&fields_reply());
    let fields = extractor::extract_fields(&fields_client, "GBPJPY SELL 185.50")
        .await
        .unwrap();

    let client = MockClient::replying(
        &json!({ "quality_score": 0.4, "sentiment": "NEUTRAL", "analysis": "No stop given." })
            .to_string(),
    );
    let enrichment = quality::analyze(&client, &fields, "GBPJPY SELL").await;
    assert_eq!(enrichment.quality_score, Some(0.4));
    assert_eq!(enrichment.sentiment, Some(Sentiment::Neutral));
    assert_eq!(enrichment.risk_reward_ratio, None);
}
