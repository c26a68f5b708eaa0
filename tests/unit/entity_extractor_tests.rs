/*!
 * Tests for entity span extraction
 */

use ner2re::app_config::{Config, SpanPolicy};
use ner2re::entity_extractor::{EntityExtractor, EntitySpan};
use ner2re::errors::ValidationError;

/// Test the three-character person name from the file format example
#[test]
fn test_extract_withBeginInsideInside_shouldCoverAllTokens() {
    let spans = EntityExtractor::default()
        .extract(&["查", "尔", "斯"], &["B-人物", "I-人物", "I-人物"])
        .unwrap();

    assert_eq!(spans, vec![EntitySpan::new("查 尔 斯", "人物", 0, 2)]);
}

/// Test that a trailing O label is not part of the span
#[test]
fn test_extract_withTrailingOutsideLabel_shouldEndAtLastMatchingLabel() {
    let spans = EntityExtractor::default()
        .extract(&["查", "尔", "斯"], &["B-PER", "I-PER", "O"])
        .unwrap();

    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].entity_type, "PER");
    assert_eq!(spans[0].start_index, 0);
    assert_eq!(spans[0].end_index, 1);
    assert_eq!(spans[0].text, "查 尔");
}

/// Test the lenient scan across an O gap
#[test]
fn test_extract_withOutsideGap_shouldExtendToLaterSameTypeLabel() {
    let tokens = ["a", "b", "c", "d"];
    let labels = ["B-ORG", "O", "I-ORG", "O"];

    let lenient = EntityExtractor::default().extract(&tokens, &labels).unwrap();
    assert_eq!(lenient, vec![EntitySpan::new("a b c", "ORG", 0, 2)]);

    let strict = EntityExtractor::new("B-", "I-", SpanPolicy::Strict)
        .extract(&tokens, &labels)
        .unwrap();
    assert_eq!(strict, vec![EntitySpan::new("a", "ORG", 0, 0)]);
}

/// Test that spans never reach past the next begin label
#[test]
fn test_extract_withConsecutiveEntities_shouldStopBeforeNextBegin() {
    let tokens = ["a", "b", "c", "d", "e"];
    let labels = ["B-PER", "I-PER", "B-LOC", "I-PER", "I-LOC"];
    let spans = EntityExtractor::default().extract(&tokens, &labels).unwrap();

    assert_eq!(
        spans,
        vec![
            EntitySpan::new("a b", "PER", 0, 1),
            EntitySpan::new("c d e", "LOC", 2, 4),
        ]
    );
}

/// Test that a document without begin labels has no spans
#[test]
fn test_extract_withOnlyOutsideAndInsideLabels_shouldReturnEmpty() {
    let spans = EntityExtractor::default()
        .extract(&["a", "b", "c"], &["O", "I-PER", "O"])
        .unwrap();

    assert!(spans.is_empty());
}

/// Test that empty input is fine
#[test]
fn test_extract_withEmptySequences_shouldReturnEmpty() {
    let tokens: [&str; 0] = [];
    let spans = EntityExtractor::default().extract(&tokens, &tokens).unwrap();

    assert!(spans.is_empty());
}

/// Test that unequal lengths are rejected
#[test]
fn test_extract_withMismatchedLengths_shouldFailValidation() {
    let err = EntityExtractor::default()
        .extract(&["a", "b", "c"], &["B-PER", "O"])
        .unwrap_err();

    assert_eq!(
        err,
        ValidationError::LengthMismatch { docid: None, tokens: 3, labels: 2 }
    );
}

/// Test that custom prefixes from the configuration are honoured
#[test]
fn test_extract_withConfiguredPrefixes_shouldUseThem() {
    let config = Config {
        begin_prefix: "S_".to_string(),
        inside_prefix: "M_".to_string(),
        ..Config::default()
    };
    let spans = EntityExtractor::from_config(&config)
        .extract(&["x", "y", "z"], &["S_GEO", "M_GEO", "B-GEO"])
        .unwrap();

    assert_eq!(spans, vec![EntitySpan::new("x y", "GEO", 0, 1)]);
}

/// Test label type stripping
#[test]
fn test_label_type_shouldStripKnownPrefixesOnly() {
    let extractor = EntityExtractor::default();

    assert_eq!(extractor.label_type("B-人物"), "人物");
    assert_eq!(extractor.label_type("I-人物"), "人物");
    assert_eq!(extractor.label_type("O"), "O");
    assert_eq!(extractor.label_type("E-PER"), "E-PER");
}

/// Test that extracting twice gives the same spans under both policies
#[test]
fn test_extract_withRepeatedCalls_shouldBeIdempotent() {
    let tokens = ["李", "治", "见", "萧", "淑", "妃", "于", "长", "安"];
    let labels = ["B-人物", "I-人物", "O", "B-人物", "I-地点", "I-人物", "O", "B-地点", "I-地点"];

    for policy in [SpanPolicy::Lenient, SpanPolicy::Strict] {
        let extractor = EntityExtractor::new("B-", "I-", policy);
        let first = extractor.extract(&tokens, &labels).unwrap();
        let second = extractor.extract(&tokens, &labels).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
