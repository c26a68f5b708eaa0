/*!
 * Tests for relation candidate generation
 */

use ner2re::document_reader::{Document, TaggedToken};
use ner2re::entity_extractor::{EntityExtractor, EntitySpan};
use ner2re::relation_generator::{RelationCandidate, RelationCandidateGenerator};

fn document_from_chars(id: &str, chars: &str, labels: &[&str]) -> Document {
    let tokens = chars
        .chars()
        .zip(labels.iter())
        .map(|(c, label)| TaggedToken::new(c.to_string(), *label, *label))
        .collect();
    Document::new(id, tokens)
}

/// Reference behaviour: plain first-occurrence string replacement
fn replace_first(text: &str, needle: &str, replacement: &str) -> String {
    text.replacen(needle, replacement, 1)
}

/// Test the two-person example with repeated mentions
#[test]
fn test_generate_withRepeatedMentions_shouldMaskFirstOccurrences() {
    let chars = "李治即位后萧淑妃受宠王皇后排挤萧淑妃答应李治";
    let doc = Document::new(
        "dev-0",
        chars.chars().map(|c| TaggedToken::new(c.to_string(), "O", "O")).collect(),
    );
    let entities = vec![
        EntitySpan::new("李 治", "人物", 0, 1),
        EntitySpan::new("萧 淑 妃", "人物", 5, 7),
    ];

    let candidates = RelationCandidateGenerator::default().generate(&doc, &entities);

    assert_eq!(candidates.len(), 2);
    assert_eq!(
        candidates[0],
        RelationCandidate::new(
            "dev-0",
            "[MASK][MASK] 即 位 后 [MASK] 受 宠 王 皇 后 排 挤 萧 淑 妃 答 应 李 治"
        )
    );
    assert_eq!(
        candidates[1],
        RelationCandidate::new(
            "dev-0",
            "[MASK] 即 位 后 [MASK][MASK] 受 宠 王 皇 后 排 挤 萧 淑 妃 答 应 李 治"
        )
    );
}

/// Test that output matches two-step string replacement for every pair
#[test]
fn test_generate_withOverlappingTexts_shouldMatchStringReplacement() {
    let labels = ["B-A", "I-A", "O", "B-B", "B-C", "I-C", "I-C"];
    let doc = document_from_chars("d", "王后说后王皇后", &labels);
    let entities = EntityExtractor::default()
        .extract(&doc.words(), &doc.pred_labels())
        .unwrap();
    assert_eq!(entities.len(), 3);

    let mask = "[MASK]";
    let text = doc.text();
    let candidates = RelationCandidateGenerator::new(mask).generate(&doc, &entities);

    let mut expected = Vec::new();
    for (i, subject) in entities.iter().enumerate() {
        for (j, object) in entities.iter().enumerate() {
            if i != j {
                let step = replace_first(&text, &subject.text, &format!("{}{}", mask, mask));
                expected.push(replace_first(&step, &object.text, mask));
            }
        }
    }

    let actual: Vec<String> = candidates.into_iter().map(|c| c.text_a).collect();
    assert_eq!(actual, expected);
}

/// Test that identical entity texts still produce every ordered pair
#[test]
fn test_generate_withIdenticalEntityTexts_shouldMaskSuccessiveOccurrences() {
    let doc = document_from_chars("d", "甲乙甲", &["B-X", "O", "B-X"]);
    let entities = EntityExtractor::default()
        .extract(&doc.words(), &doc.pred_labels())
        .unwrap();

    let candidates = RelationCandidateGenerator::new("M").generate(&doc, &entities);

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].text_a, "MM 乙 M");
    assert_eq!(candidates[1].text_a, "MM 乙 M");
}

/// Test that the docid is copied to every candidate
#[test]
fn test_generate_withManyEntities_shouldCopyDocid() {
    let doc = document_from_chars("doc-42", "abcd", &["B-X", "B-X", "B-X", "B-X"]);
    let entities = EntityExtractor::default()
        .extract(&doc.words(), &doc.pred_labels())
        .unwrap();

    let candidates = RelationCandidateGenerator::default().generate(&doc, &entities);

    assert_eq!(candidates.len(), 12);
    assert!(candidates.iter().all(|c| c.docid == "doc-42"));
}

/// Test that a single entity produces nothing
#[test]
fn test_generate_withSingleEntity_shouldReturnEmpty() {
    let doc = document_from_chars("d", "ab", &["B-X", "O"]);
    let entities = vec![EntitySpan::new("a", "X", 0, 0)];

    assert!(RelationCandidateGenerator::default().generate(&doc, &entities).is_empty());
}

/// Test that the TSV row rendering is tab-separated
#[test]
fn test_candidate_display_shouldBeTabSeparated() {
    let candidate = RelationCandidate::new("dev-1", "[MASK][MASK] 在 [MASK]");

    assert_eq!(candidate.to_string(), "dev-1\t[MASK][MASK] 在 [MASK]");
}
