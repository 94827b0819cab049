//! Error taxonomy and envelope behavior.

use firmscope_core::{
    CompanyName, Envelope, EnvelopeError, EnvelopeMeta, FieldExtractor, SourceError, SourceId,
    ValidationError,
};

// =============================================================================
// Validation errors
// =============================================================================

#[test]
fn empty_and_whitespace_names_are_rejected() {
    for input in ["", "   ", "\t\n"] {
        let err = CompanyName::parse(input).expect_err("blank input must fail");
        assert_eq!(err, ValidationError::EmptyCompanyName);
    }
}

#[test]
fn validation_messages_are_actionable() {
    assert_eq!(
        ValidationError::EmptyCompanyName.to_string(),
        "company name cannot be empty"
    );
    assert!(ValidationError::InvalidSource {
        value: String::from("bloomberg"),
    }
    .to_string()
    .contains("crunchbase"));
}

// =============================================================================
// Source errors
// =============================================================================

#[test]
fn source_error_codes_are_namespaced_and_stable() {
    let cases = [
        (SourceError::not_found("x"), "source.not_found"),
        (SourceError::unavailable("x"), "source.unavailable"),
        (SourceError::rate_limited("x"), "source.rate_limited"),
        (SourceError::timeout("x"), "source.timeout"),
        (SourceError::invalid_query("x"), "source.invalid_query"),
        (SourceError::internal("x"), "source.internal"),
    ];

    for (error, code) in cases {
        assert_eq!(error.code(), code);
        assert!(error.to_string().contains(code));
    }
}

#[test]
fn definitive_outcomes_are_not_retryable_transient_ones_are() {
    assert!(!SourceError::not_found("no entity").retryable());
    assert!(!SourceError::invalid_query("blank").retryable());
    assert!(!SourceError::internal("bug").retryable());

    assert!(SourceError::unavailable("refused").retryable());
    assert!(SourceError::rate_limited("429").retryable());
    assert!(SourceError::timeout("budget").retryable());
}

// =============================================================================
// Extraction misses are not errors
// =============================================================================

#[test]
fn extraction_miss_yields_absence_not_failure() {
    let extractor = FieldExtractor::with_current_year(2026);
    let record = extractor.extract("nothing useful in this sentence", &[]);
    assert!(record.is_empty());
}

#[test]
fn extractor_tolerates_hostile_input() {
    let extractor = FieldExtractor::with_current_year(2026);
    for text in [
        "",
        "$",
        "$,M",
        "CEO",
        "founded by 12345",
        "\u{FEFF}\u{202E}mixed\u{0000}bytes",
    ] {
        let record = extractor.extract(text, &[]);
        record.validate(2026).expect("output always satisfies invariants");
    }
}

// =============================================================================
// Envelope validation
// =============================================================================

#[test]
fn envelope_rejects_malformed_metadata() {
    assert!(matches!(
        EnvelopeMeta::new("short", "v1.0.0", vec![SourceId::Crunchbase], 0),
        Err(ValidationError::InvalidRequestId)
    ));
    assert!(matches!(
        EnvelopeMeta::new("request-12345", "one-point-oh", vec![SourceId::Crunchbase], 0),
        Err(ValidationError::InvalidSchemaVersion { .. })
    ));
    assert!(matches!(
        EnvelopeMeta::new("request-12345", "v1.0.0", Vec::new(), 0),
        Err(ValidationError::EmptySourceChain)
    ));
}

#[test]
fn envelope_surfaces_source_failures_with_attribution() {
    let meta = EnvelopeMeta::new(
        "request-12345",
        "v1.0.0",
        vec![SourceId::Crunchbase, SourceId::Linkedin],
        7,
    )
    .expect("valid meta");

    let errors = vec![EnvelopeError::from_source_error(
        SourceId::Crunchbase,
        &SourceError::timeout("exceeded 45000ms budget"),
    )];

    let envelope = Envelope::with_errors(meta, serde_json::json!({}), errors)
        .expect("valid envelope");

    let value = serde_json::to_value(&envelope).expect("serializes");
    assert_eq!(value["errors"][0]["code"], serde_json::json!("source.timeout"));
    assert_eq!(value["errors"][0]["source"], serde_json::json!("crunchbase"));
    assert_eq!(value["errors"][0]["retryable"], serde_json::json!(true));
}

#[test]
fn blank_error_fields_are_rejected() {
    assert!(matches!(
        EnvelopeError::new("", "message"),
        Err(ValidationError::EmptyErrorCode)
    ));
    assert!(matches!(
        EnvelopeError::new("source.internal", "  "),
        Err(ValidationError::EmptyErrorMessage)
    ));
}
