/*!
 * # ner2re - NER output to relation extraction examples
 *
 * Turns a row-wise, tab-separated NER result file (one character per row,
 * with gold and predicted BIO labels) into masked training examples for a
 * relation classifier: one row per ordered pair of predicted entities in
 * each document.
 *
 * ## Architecture
 *
 * - `document_reader`: parses the tagged file into documents
 * - `entity_extractor`: turns a BIO label sequence into entity spans
 * - `relation_generator`: masks entity pairs in the document text
 * - `pipeline`: wires the stages together and writes the outputs
 * - `evaluation`: compares predicted spans with gold spans
 * - `app_config`: pipeline constants (prefixes, mask token, span policy)
 * - `file_utils`: file reading and atomic writes
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod document_reader;
pub mod entity_extractor;
pub mod errors;
pub mod evaluation;
pub mod file_utils;
pub mod pipeline;
pub mod relation_generator;

// Re-export main types for easier usage
pub use app_config::{Config, SpanPolicy};
pub use document_reader::{Document, DocumentReader, TaggedToken};
pub use entity_extractor::{EntityExtractor, EntitySpan};
pub use errors::{AppError, ParseError, ValidationError};
pub use pipeline::{Pipeline, PipelineOutput};
pub use relation_generator::{RelationCandidate, RelationCandidateGenerator};
