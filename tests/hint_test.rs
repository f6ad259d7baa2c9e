// Classifier response and model reply parsing

use smart_compress::compress::{ContentHint, Strategy};
use smart_compress::hint::{
    ClassifierResponse, ImageType, Recommendation, load_hint_file, parse_model_reply,
};

// ============================================================
// 1. Classifier response envelope
// ============================================================

#[test]
fn test_successful_response_yields_hint() {
    let json = r#"{
        "success": true,
        "imageType": "portrait",
        "confidence": 0.85,
        "recommendation": {
            "strategy": "quality-priority",
            "suggestedQuality": 85,
            "reason": "portrait detected",
            "tips": "keep 85-90"
        }
    }"#;
    let response = ClassifierResponse::from_json(json).expect("should parse envelope");

    assert_eq!(response.image_type, ImageType::Portrait);
    assert_eq!(response.confidence, Some(0.85));
    assert_eq!(
        response.hint(),
        Some(ContentHint::new(Strategy::QualityPriority, 85))
    );
}

#[test]
fn test_failed_response_yields_no_hint() {
    let json = r#"{
        "success": false,
        "error": "missing image",
        "recommendation": {
            "imageType": "unknown",
            "strategy": "balanced",
            "suggestedQuality": 80,
            "reason": "fallback"
        }
    }"#;
    let response = ClassifierResponse::from_json(json).unwrap();

    assert!(response.hint().is_none());
    assert_eq!(response.error.as_deref(), Some("missing image"));
}

#[test]
fn test_response_without_recommendation_yields_no_hint() {
    let response = ClassifierResponse::from_json(r#"{"success": true}"#).unwrap();
    assert!(response.hint().is_none());
}

#[test]
fn test_unknown_strategy_maps_to_balanced() {
    let json = r#"{"success": true,
        "recommendation": {"strategy": "ultra", "suggestedQuality": 70}}"#;
    let hint = ClassifierResponse::from_json(json).unwrap().hint().unwrap();
    assert_eq!(hint, ContentHint::new(Strategy::Balanced, 70));
}

#[test]
fn test_out_of_range_quality_is_clamped() {
    let json = r#"{"success": true,
        "recommendation": {"strategy": "size-priority", "suggestedQuality": 180}}"#;
    let hint = ClassifierResponse::from_json(json).unwrap().hint().unwrap();
    assert_eq!(hint.suggested_quality, 100);

    let json = r#"{"success": true,
        "recommendation": {"strategy": "size-priority", "suggestedQuality": -4}}"#;
    let hint = ClassifierResponse::from_json(json).unwrap().hint().unwrap();
    assert_eq!(hint.suggested_quality, 0);
}

#[test]
fn test_string_quality_is_accepted() {
    let json = r#"{"success": true,
        "recommendation": {"strategy": "balanced", "suggestedQuality": "75"}}"#;
    let hint = ClassifierResponse::from_json(json).unwrap().hint().unwrap();
    assert_eq!(hint.suggested_quality, 75);
}

#[test]
fn test_invalid_json_is_hint_error() {
    assert!(ClassifierResponse::from_json("not json").is_err());
}

#[test]
fn test_load_hint_file_ignores_unreadable_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(load_hint_file(&missing).is_none());

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{{{{").unwrap();
    assert!(load_hint_file(&garbage).is_none());
}

#[test]
fn test_load_hint_file_reads_successful_response() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.json");
    std::fs::write(
        &path,
        r#"{"success": true, "recommendation": {"strategy": "size-priority", "suggestedQuality": 60}}"#,
    )
    .unwrap();

    assert_eq!(
        load_hint_file(&path),
        Some(ContentHint::new(Strategy::SizePriority, 60))
    );
}

#[test]
fn test_fallback_recommendation() {
    let fallback = Recommendation::fallback();
    assert_eq!(fallback.strategy, Strategy::Balanced);
    assert_eq!(fallback.suggested_quality, 80);
    assert_eq!(fallback.to_hint(), ContentHint::new(Strategy::Balanced, 80));
}

// ============================================================
// 2. Free-text model replies
// ============================================================

#[test]
fn test_parse_model_reply_embedded_json() {
    let reply = r#"Here is my analysis:
```json
{
  "imageType": "text",
  "confidence": 0.92,
  "strategy": "quality-priority",
  "suggestedQuality": 92,
  "reason": "document with small text",
  "tips": "keep 90-95"
}
```
Hope this helps."#;

    let analysis = parse_model_reply(reply).expect("should find JSON object");
    assert_eq!(analysis.image_type, ImageType::Text);
    assert_eq!(analysis.confidence, 0.92);
    assert_eq!(analysis.recommendation.strategy, Strategy::QualityPriority);
    assert_eq!(analysis.recommendation.suggested_quality, 92);
    assert_eq!(analysis.recommendation.reason, "document with small text");
    assert_eq!(analysis.recommendation.tips, "keep 90-95");
}

#[test]
fn test_parse_model_reply_fills_defaults() {
    let analysis = parse_model_reply("{}").expect("empty object is still an analysis");
    assert_eq!(analysis.image_type, ImageType::Unknown);
    assert_eq!(analysis.confidence, 0.8);
    assert_eq!(analysis.recommendation.strategy, Strategy::Balanced);
    assert_eq!(analysis.recommendation.suggested_quality, 80);
    assert!(analysis.recommendation.tips.is_empty());
}

#[test]
fn test_parse_model_reply_clamps_quality() {
    let analysis =
        parse_model_reply(r#"{"imageType": "landscape", "suggestedQuality": 400}"#).unwrap();
    assert_eq!(analysis.image_type, ImageType::Landscape);
    assert_eq!(analysis.recommendation.suggested_quality, 100);
}

#[test]
fn test_parse_model_reply_without_json() {
    assert!(parse_model_reply("I cannot analyze this image.").is_none());
    assert!(parse_model_reply("} backwards {").is_none());
    assert!(parse_model_reply("{ not: valid json }").is_none());
}

#[test]
fn test_image_type_names() {
    assert_eq!(ImageType::from_name("screenshot"), ImageType::Screenshot);
    assert_eq!(ImageType::from_name("product"), ImageType::Product);
    assert_eq!(ImageType::from_name("other"), ImageType::Other);
    assert_eq!(ImageType::from_name("selfie"), ImageType::Unknown);
}
