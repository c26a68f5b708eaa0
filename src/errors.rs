/*!
 * Error types for the ner2re application.
 *
 * Parsing, validation and I/O failures each get their own enum, built with
 * the thiserror crate. `AppError` is the umbrella type returned by the
 * pipeline driver.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the tagged NER file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input has no header line at all
    #[error("Missing header line: the input is empty")]
    MissingHeader,

    /// The header has fewer than the three required columns
    #[error("Malformed header at line {line}: expected at least {expected} tab-separated columns, found {found}")]
    MalformedHeader {
        /// 1-based line number
        line: usize,
        /// Minimum number of columns
        expected: usize,
        /// Columns actually present
        found: usize,
    },

    /// No line starts with the document boundary prefix
    #[error("No document boundary markers (lines starting with '{prefix}') were found")]
    NoDocumentBoundaries {
        /// The configured boundary prefix
        prefix: String,
    },

    /// A data row does not have exactly three fields
    #[error("Malformed row at line {line}: expected {expected} tab-separated fields, found {found}: {content:?}")]
    WrongFieldCount {
        /// 1-based line number
        line: usize,
        /// Required number of fields
        expected: usize,
        /// Fields actually present
        found: usize,
        /// The offending line
        content: String,
    },
}

impl ParseError {
    /// Line number the error points at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedHeader { line, .. } | Self::WrongFieldCount { line, .. } => Some(*line),
            Self::MissingHeader => Some(1),
            Self::NoDocumentBoundaries { .. } => None,
        }
    }
}

/// Errors raised when in-memory sequences break an invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Tokens and labels are not parallel
    #[error("Token/label length mismatch{}: {tokens} tokens vs {labels} labels", doc_suffix(.docid))]
    LengthMismatch {
        /// Document the sequences came from, when known
        docid: Option<String>,
        /// Number of tokens
        tokens: usize,
        /// Number of labels
        labels: usize,
    },
}

fn doc_suffix(docid: &Option<String>) -> String {
    docid
        .as_ref()
        .map(|id| format!(" in document '{}'", id))
        .unwrap_or_default()
}

impl ValidationError {
    /// Attach the document id to an error raised without one
    pub fn in_document(self, id: &str) -> Self {
        match self {
            Self::LengthMismatch { tokens, labels, .. } => Self::LengthMismatch {
                docid: Some(id.to_string()),
                tokens,
                labels,
            },
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Input unreadable or output unwritable
    #[error("File access error for {path:?}: {message}")]
    FileAccess {
        /// Path that failed
        path: PathBuf,
        /// Underlying cause
        message: String,
    },

    /// Input file is malformed
    #[error("Format error: {0}")]
    Format(#[from] ParseError),

    /// Sequences inside a document are inconsistent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Build a file access error from an I/O failure
    pub fn file_access(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self::FileAccess {
            path: path.into(),
            message: error.to_string(),
        }
    }
}
