use std::fmt;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::app_config::Config;
use crate::document_reader::Document;
use crate::entity_extractor::EntitySpan;
use crate::file_utils::tsv_field;

// @module: Pairwise relation candidate generation

/// One output row: a document text with a subject and an object masked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationCandidate {
    /// Id of the source document
    pub docid: String,

    /// Document text, subject masked twice, object masked once
    pub text_a: String,
}

impl RelationCandidate {
    pub fn new(docid: impl Into<String>, text_a: impl Into<String>) -> Self {
        RelationCandidate {
            docid: docid.into(),
            text_a: text_a.into(),
        }
    }
}

/// Formats the candidate as a tab-separated `docid\ttext_a` row
impl fmt::Display for RelationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}", tsv_field(&self.docid), tsv_field(&self.text_a))
    }
}

/// Counters describing how masks landed in the text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskStats {
    /// Candidates produced
    pub candidates: usize,

    /// Masks whose first textual match was not the annotated occurrence
    pub misaligned: usize,
}

impl MaskStats {
    pub fn merge(&mut self, other: MaskStats) {
        self.candidates += other.candidates;
        self.misaligned += other.misaligned;
    }
}

/// Builds masked relation candidates for every ordered entity pair
///
/// Masks replace the first textual occurrence of an entity's text, which is
/// the historical behaviour consumers rely on. When an entity's text is a
/// substring of another mention that occurs earlier, the earlier occurrence
/// is masked instead of the annotated one. Such cases are counted in
/// [`MaskStats::misaligned`] but left as they are.
#[derive(Debug, Clone)]
pub struct RelationCandidateGenerator {
    mask_token: String,
}

impl Default for RelationCandidateGenerator {
    fn default() -> Self {
        Self::new("[MASK]")
    }
}

impl RelationCandidateGenerator {
    pub fn new(mask_token: impl Into<String>) -> Self {
        RelationCandidateGenerator {
            mask_token: mask_token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.mask_token)
    }

    /// Candidates for all n*(n-1) ordered pairs, subject-major order
    pub fn generate(&self, document: &Document, entities: &[EntitySpan]) -> Vec<RelationCandidate> {
        self.generate_with_stats(document, entities).0
    }

    /// Same as [`generate`](Self::generate), also reporting mask alignment
    pub fn generate_with_stats(&self, document: &Document, entities: &[EntitySpan]) -> (Vec<RelationCandidate>, MaskStats) {
        let mut stats = MaskStats::default();
        if entities.len() < 2 {
            return (Vec::new(), stats);
        }

        let text = document.text();
        let offsets = token_offsets(document);
        let subject_mask = self.mask_token.repeat(2);

        let mut candidates = Vec::with_capacity(entities.len() * (entities.len() - 1));
        for (i, subject) in entities.iter().enumerate() {
            for (j, object) in entities.iter().enumerate() {
                if i == j {
                    continue;
                }

                let mut masked = text.clone();
                let subject_at = mask_first(&mut masked, &subject.text, &subject_mask);
                let object_at = mask_first(&mut masked, &object.text, &self.mask_token);

                let subject_expected = offsets.get(subject.start_index).copied();
                let object_expected = offsets.get(object.start_index).copied().and_then(|at| {
                    shift_after_mask(at, object.text.len(), subject_at, subject.text.len(), subject_mask.len())
                });

                if subject_at != subject_expected {
                    stats.misaligned += 1;
                    debug!(
                        "Document '{}': subject '{}' masked at byte {:?}, annotated at {:?}",
                        document.id, subject.text, subject_at, subject_expected
                    );
                }
                if object_at != object_expected {
                    stats.misaligned += 1;
                    debug!(
                        "Document '{}': object '{}' masked at byte {:?}, annotated at {:?}",
                        document.id, object.text, object_at, object_expected
                    );
                }

                candidates.push(RelationCandidate::new(document.id.clone(), masked));
            }
        }

        stats.candidates = candidates.len();
        (candidates, stats)
    }
}

// @returns: Byte offset of each token in the space-joined text
fn token_offsets(document: &Document) -> Vec<usize> {
    let mut offset = 0;
    document
        .tokens
        .iter()
        .map(|t| {
            let at = offset;
            offset += t.token.len() + 1;
            at
        })
        .collect()
}

// @returns: Where the annotated object sits once the subject mask is in place,
// or None when the subject mask swallowed it
fn shift_after_mask(at: usize, len: usize, subject_at: Option<usize>, subject_len: usize, mask_len: usize) -> Option<usize> {
    match subject_at {
        None => Some(at),
        Some(s) if at + len <= s => Some(at),
        Some(s) if at >= s + subject_len => Some(at - subject_len + mask_len),
        Some(_) => None,
    }
}

// @returns: Byte offset of the replaced match, if the needle occurs
fn mask_first(text: &mut String, needle: &str, replacement: &str) -> Option<usize> {
    let at = text.find(needle)?;
    text.replace_range(at..at + needle.len(), replacement);
    Some(at)
}
