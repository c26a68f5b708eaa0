/*!
 * Entity-level comparison of predicted spans against gold spans.
 *
 * Both label columns go through the same `EntityExtractor`, and a predicted
 * span counts as correct only when type, start and end all match a gold
 * span of the same document. Scores follow the usual seqeval definitions;
 * a ratio with a zero denominator is reported as 0.
 */

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use log::debug;
use serde::Serialize;
use crate::document_reader::Document;
use crate::entity_extractor::{EntityExtractor, EntitySpan};
use crate::errors::ValidationError;

/// True positive / false positive / false negative tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpanCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl SpanCounts {
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }

    /// Number of gold spans
    pub fn support(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    fn add(&mut self, other: SpanCounts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

/// Scores per entity type plus the micro-averaged total
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub documents: usize,
    pub per_type: BTreeMap<String, SpanCounts>,
    pub overall: SpanCounts,
}

impl EvaluationReport {
    /// Compare gold and predicted spans across documents
    pub fn evaluate(extractor: &EntityExtractor, documents: &[Document]) -> Result<Self, ValidationError> {
        let mut report = EvaluationReport::default();
        debug!("Scoring {} documents with {} span boundaries", documents.len(), extractor.policy());

        for doc in documents {
            let words = doc.words();
            let gold = extractor
                .extract(&words, &doc.gold_labels())
                .map_err(|e| e.in_document(&doc.id))?;
            let pred = extractor
                .extract(&words, &doc.pred_labels())
                .map_err(|e| e.in_document(&doc.id))?;

            report.add_document(&gold, &pred);
        }

        Ok(report)
    }

    fn add_document(&mut self, gold: &[EntitySpan], pred: &[EntitySpan]) {
        self.documents += 1;

        let key = |s: &EntitySpan| (s.entity_type.clone(), s.start_index, s.end_index);
        let gold_keys: HashSet<_> = gold.iter().map(key).collect();
        let pred_keys: HashSet<_> = pred.iter().map(key).collect();

        for k in &pred_keys {
            let counts = self.per_type.entry(k.0.clone()).or_default();
            if gold_keys.contains(k) {
                counts.true_positives += 1;
            } else {
                counts.false_positives += 1;
            }
        }
        for k in gold_keys.difference(&pred_keys) {
            self.per_type.entry(k.0.clone()).or_default().false_negatives += 1;
        }

        self.overall = self.per_type.values().fold(SpanCounts::default(), |mut acc, c| {
            acc.add(*c);
            acc
        });
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self
            .per_type
            .keys()
            .map(|k| k.chars().count())
            .max()
            .unwrap_or(0)
            .max("micro avg".len());

        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9}  {:>7}",
            "", "precision", "recall", "f1-score", "support",
            width = width
        )?;
        writeln!(f)?;
        for (entity_type, counts) in &self.per_type {
            write_row(f, entity_type, counts, width)?;
        }
        writeln!(f)?;
        write_row(f, "micro avg", &self.overall, width)
    }
}

fn write_row(f: &mut fmt::Formatter, name: &str, counts: &SpanCounts, width: usize) -> fmt::Result {
    // Pad by char count so CJK type names line up
    let pad = width.saturating_sub(name.chars().count());
    writeln!(
        f,
        "{}{}  {:>9.4}  {:>9.4}  {:>9.4}  {:>7}",
        " ".repeat(pad),
        name,
        counts.precision(),
        counts.recall(),
        counts.f1(),
        counts.support()
    )
}
