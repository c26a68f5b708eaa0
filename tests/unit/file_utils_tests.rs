/*!
 * Tests for file utilities
 */

use anyhow::Result;
use std::fmt;
use std::fs;
use serde::Serialize;
use ner2re::file_utils::{tsv_field, FileManager};
use crate::common;

struct Row(&'static str, &'static str);

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}", tsv_field(self.0), tsv_field(self.1))
    }
}

#[derive(Serialize)]
struct Record {
    id: u32,
    name: &'static str,
}

/// Test file existence checks
#[test]
fn test_file_exists_withFileAndDirectory_shouldOnlyAcceptFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.txt", "x")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing")));
    Ok(())
}

/// Test directory creation
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;

    assert!(nested.is_dir());
    Ok(())
}

/// Test a TSV table with header, plain and quoted rows
#[test]
fn test_write_tsv_withRows_shouldWriteHeaderThenRows() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("table.tsv");

    FileManager::write_tsv(&path, &["docid", "text_a"], &[Row("d1", "a b"), Row("d2", "x\ty")])?;

    assert_eq!(fs::read_to_string(&path)?, "docid\ttext_a\nd1\ta b\nd2\t\"x\ty\"\n");
    Ok(())
}

/// Test a header-only table
#[test]
fn test_write_tsv_withNoRows_shouldWriteHeaderOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("empty.tsv");
    let rows: [Row; 0] = [];

    FileManager::write_tsv(&path, &["docid", "text_a"], &rows)?;

    assert_eq!(fs::read_to_string(&path)?, "docid\ttext_a\n");
    Ok(())
}

/// Test that an existing file is replaced
#[test]
fn test_write_tsv_withExistingFile_shouldOverwrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "t.tsv", "old content that is longer\n")?;

    FileManager::write_tsv(&path, &["h"], &[Row("a", "b")])?;

    assert_eq!(fs::read_to_string(&path)?, "h\na\tb\n");
    Ok(())
}

/// Test JSON Lines output
#[test]
fn test_write_json_lines_withRecords_shouldWriteOneObjectPerLine() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("records.jsonl");

    FileManager::write_json_lines(&path, &[Record { id: 1, name: "李治" }, Record { id: 2, name: "x" }])?;

    let content = fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec![r#"{"id":1,"name":"李治"}"#, r#"{"id":2,"name":"x"}"#]);
    Ok(())
}

/// Test reading back a file
#[test]
fn test_read_to_string_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let err = FileManager::read_to_string(temp_dir.path().join("nope.tsv")).unwrap_err();

    assert!(err.to_string().contains("Failed to read file"));
    Ok(())
}

/// Test field quoting rules
#[test]
fn test_tsv_field_withSpecialCharacters_shouldQuoteMinimally() {
    assert_eq!(tsv_field("[MASK] 在 [MASK][MASK]"), "[MASK] 在 [MASK][MASK]");
    assert_eq!(tsv_field("line\nbreak"), "\"line\nbreak\"");
    assert_eq!(tsv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
}
