use std::fmt;
use log::trace;
use serde::{Deserialize, Serialize};
use crate::app_config::{Config, SpanPolicy};
use crate::errors::ValidationError;

// @module: Entity span extraction from BIO label sequences

/// One entity mention found in a label sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Tokens `[start_index, end_index]` joined by single spaces
    pub text: String,

    /// Entity category, the begin label minus its prefix
    #[serde(rename = "type")]
    pub entity_type: String,

    /// First token of the span
    #[serde(rename = "start_token")]
    pub start_index: usize,

    /// Last token of the span, inclusive
    #[serde(rename = "end_token")]
    pub end_index: usize,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, entity_type: impl Into<String>, start_index: usize, end_index: usize) -> Self {
        EntitySpan {
            text: text.into(),
            entity_type: entity_type.into(),
            start_index,
            end_index,
        }
    }
}

impl fmt::Display for EntitySpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}) [{}..={}]", self.text, self.entity_type, self.start_index, self.end_index)
    }
}

/// Turns a token sequence and its parallel labels into entity spans
///
/// Every label starting with the begin prefix opens a span. Under
/// [`SpanPolicy::Lenient`] the span's right edge is the last label of the
/// same type before the next begin label; labels of another type in between
/// are skipped rather than closing the span. Under [`SpanPolicy::Strict`]
/// the span stops at the first label that is not `<inside prefix><type>`.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    begin_prefix: String,
    inside_prefix: String,
    policy: SpanPolicy,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new("B-", "I-", SpanPolicy::Lenient)
    }
}

impl EntityExtractor {
    pub fn new(begin_prefix: impl Into<String>, inside_prefix: impl Into<String>, policy: SpanPolicy) -> Self {
        EntityExtractor {
            begin_prefix: begin_prefix.into(),
            inside_prefix: inside_prefix.into(),
            policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.begin_prefix, &config.inside_prefix, config.span_policy)
    }

    pub fn policy(&self) -> SpanPolicy {
        self.policy
    }

    /// Extract spans in left-to-right order
    pub fn extract<T, L>(&self, tokens: &[T], labels: &[L]) -> Result<Vec<EntitySpan>, ValidationError>
    where
        T: AsRef<str>,
        L: AsRef<str>,
    {
        if tokens.len() != labels.len() {
            return Err(ValidationError::LengthMismatch {
                docid: None,
                tokens: tokens.len(),
                labels: labels.len(),
            });
        }

        let mut begins: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.as_ref().starts_with(self.begin_prefix.as_str()))
            .map(|(i, _)| i)
            .collect();

        if begins.is_empty() {
            return Ok(Vec::new());
        }

        // Sentinel past the last label
        begins.push(labels.len());

        let spans: Vec<EntitySpan> = begins
            .windows(2)
            .map(|pair| {
                let (start, next_start) = (pair[0], pair[1]);
                let entity_type = &labels[start].as_ref()[self.begin_prefix.len()..];
                let end = self.right_edge(labels, start, next_start, entity_type);

                let text = tokens[start..=end]
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<&str>>()
                    .join(" ");

                let span = EntitySpan::new(text, entity_type, start, end);
                trace!("Span {}", span);
                span
            })
            .collect();

        Ok(spans)
    }

    // @returns: Inclusive end of the span opened at `start`
    fn right_edge<L: AsRef<str>>(&self, labels: &[L], start: usize, next_start: usize, entity_type: &str) -> usize {
        match self.policy {
            SpanPolicy::Lenient => (start..next_start)
                .rev()
                .find(|&j| self.label_type(labels[j].as_ref()) == entity_type)
                .unwrap_or(start),
            SpanPolicy::Strict => (start + 1..next_start)
                .take_while(|&j| {
                    labels[j]
                        .as_ref()
                        .strip_prefix(self.inside_prefix.as_str())
                        .is_some_and(|t| t == entity_type)
                })
                .last()
                .unwrap_or(start),
        }
    }

    // @returns: Label with any begin/inside prefix removed; `O` stays `O`
    pub fn label_type<'a>(&self, label: &'a str) -> &'a str {
        label
            .strip_prefix(self.begin_prefix.as_str())
            .or_else(|| label.strip_prefix(self.inside_prefix.as_str()))
            .unwrap_or(label)
    }
}
