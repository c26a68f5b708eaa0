use std::collections::HashSet;
use std::path::Path;
use log::{debug, warn};
use serde::Serialize;
use crate::errors::{AppError, ParseError};
use crate::file_utils::FileManager;

// @module: Tagged NER file parsing

// @const: Columns every header and data row must carry
pub const COLUMN_COUNT: usize = 3;

// @struct: One token with its reference and predicted labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedToken {
    // @field: Token text, usually a single character
    pub token: String,

    // @field: Reference annotation
    pub gold: String,

    // @field: System prediction
    pub pred: String,
}

impl TaggedToken {
    pub fn new(token: impl Into<String>, gold: impl Into<String>, pred: impl Into<String>) -> Self {
        TaggedToken {
            token: token.into(),
            gold: gold.into(),
            pred: pred.into(),
        }
    }

    // @creates: Token from a tab-separated data row
    // @validates: Exactly three fields
    pub fn from_row(row: &str, line: usize) -> Result<Self, ParseError> {
        let fields: Vec<&str> = row.split('\t').collect();
        match fields.as_slice() {
            [token, gold, pred] => Ok(Self::new(*token, *gold, *pred)),
            _ => Err(ParseError::WrongFieldCount {
                line,
                expected: COLUMN_COUNT,
                found: fields.len(),
                content: row.to_string(),
            }),
        }
    }
}

/// A document: identifier plus its ordered tagged tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Identifier recovered from the boundary marker line
    pub id: String,

    /// Tokens in file order, never empty once parsed
    pub tokens: Vec<TaggedToken>,
}

impl Document {
    pub fn new(id: impl Into<String>, tokens: Vec<TaggedToken>) -> Self {
        Document {
            id: id.into(),
            tokens,
        }
    }

    /// Token strings in order
    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.token.as_str()).collect()
    }

    /// Predicted labels, parallel to `words`
    pub fn pred_labels(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.pred.as_str()).collect()
    }

    /// Gold labels, parallel to `words`
    pub fn gold_labels(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.gold.as_str()).collect()
    }

    /// Full text: tokens joined by single spaces
    pub fn text(&self) -> String {
        self.words().join(" ")
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Reader for the row-wise tagged file
#[derive(Debug, Clone)]
pub struct DocumentReader {
    /// Lines starting with this prefix open a new document
    boundary_prefix: String,
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new("#")
    }
}

impl DocumentReader {
    pub fn new(boundary_prefix: impl Into<String>) -> Self {
        DocumentReader {
            boundary_prefix: boundary_prefix.into(),
        }
    }

    /// Read and parse a tagged file from disk
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Document>, AppError> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)
            .map_err(|e| AppError::file_access(path, format!("{:#}", e)))?;
        Ok(self.parse_str(&content)?)
    }

    /// Parse tagged file content into documents
    ///
    /// Line numbers in errors and warnings are 1-based and count the header.
    pub fn parse_str(&self, content: &str) -> Result<Vec<Document>, ParseError> {
        let mut lines = content.lines().map(str::trim_end);

        let header = lines.next().ok_or(ParseError::MissingHeader)?;
        let columns: Vec<&str> = header.split('\t').collect();
        if header.is_empty() || columns.len() < COLUMN_COUNT {
            return Err(ParseError::MalformedHeader {
                line: 1,
                expected: COLUMN_COUNT,
                found: if header.is_empty() { 0 } else { columns.len() },
            });
        }
        if columns.len() > COLUMN_COUNT {
            warn!(
                "Header has {} columns, only the first {} are used: {:?}",
                columns.len(), COLUMN_COUNT, columns
            );
        }
        debug!("Header columns (token, gold, pred): {:?}", &columns[..COLUMN_COUNT]);

        // Body lines paired with their 1-based file line number
        let body: Vec<(usize, &str)> = lines.enumerate().map(|(i, line)| (i + 2, line)).collect();

        let mut doc_starts: Vec<usize> = body
            .iter()
            .enumerate()
            .filter(|(_, (_, line))| line.starts_with(self.boundary_prefix.as_str()))
            .map(|(i, _)| i)
            .collect();

        if doc_starts.is_empty() {
            return Err(ParseError::NoDocumentBoundaries {
                prefix: self.boundary_prefix.clone(),
            });
        }

        let orphans = body[..doc_starts[0]]
            .iter()
            .filter(|(_, line)| !line.is_empty());
        for (line_no, line) in orphans {
            warn!("Skipping row at line {} before the first document marker: {}", line_no, line);
        }

        // Synthetic end-of-file boundary
        doc_starts.push(body.len());

        let mut docs = Vec::with_capacity(doc_starts.len() - 1);
        let mut seen_ids: HashSet<String> = HashSet::new();
        for window in doc_starts.windows(2) {
            let (start, end) = (window[0], window[1]);
            let (marker_line, marker) = body[start];
            let id = self.document_id(marker);

            let tokens = body[start + 1..end]
                .iter()
                .filter(|(_, line)| !line.is_empty())
                .map(|(line_no, line)| TaggedToken::from_row(line, *line_no))
                .collect::<Result<Vec<_>, _>>()?;

            if tokens.is_empty() {
                warn!("Document '{}' at line {} has no tokens, skipping", id, marker_line);
                continue;
            }

            if !seen_ids.insert(id.clone()) {
                warn!("Duplicate document id '{}' at line {}", id, marker_line);
            }

            docs.push(Document::new(id, tokens));
        }

        debug!("Parsed {} documents", docs.len());
        Ok(docs)
    }

    // @returns: Marker line with repeated prefixes trimmed from both ends
    fn document_id(&self, marker: &str) -> String {
        let prefix = self.boundary_prefix.as_str();
        marker
            .trim_start_matches(prefix)
            .trim_end_matches(prefix)
            .trim()
            .to_string()
    }
}
