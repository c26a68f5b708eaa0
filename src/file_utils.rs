use anyhow::{Context, Result};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Display;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a file through a temporary sibling that replaces the target only
    /// once `write` succeeded, so a failed run never leaves a partial file
    pub fn write_atomically<P, F>(path: P, write: F) -> Result<()>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        Self::stage(path, write)?.commit()
    }

    /// Fill a temporary sibling of `path` without touching `path` itself
    ///
    /// The temporary file gets the permissions a plain create would give it
    /// (`0o666` less the umask on Unix), or those of the file it replaces.
    pub fn stage<P, F>(path: P, write: F) -> Result<StagedFile>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::ensure_dir(parent)?;

        let existing = fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.permissions());

        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut builder = Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // The umask applies on creation, as for File::create
            builder.permissions(fs::Permissions::from_mode(0o666));
        }

        let temp = builder
            .tempfile_in(parent)
            .with_context(|| format!("Failed to create temporary file in: {}", parent.display()))?;

        if let Some(permissions) = existing {
            temp.as_file()
                .set_permissions(permissions)
                .with_context(|| format!("Failed to copy permissions of: {:?}", path))?;
        }

        {
            let mut writer = BufWriter::new(temp.as_file());
            write(&mut writer)?;
            writer
                .flush()
                .with_context(|| format!("Failed to write to file: {:?}", path))?;
        }

        Ok(StagedFile {
            temp,
            target: path.to_path_buf(),
        })
    }

    /// Stage a tab-separated table: a header row then one row per item
    pub fn stage_tsv<P, R>(path: P, header: &[&str], rows: &[R]) -> Result<StagedFile>
    where
        P: AsRef<Path>,
        R: Display,
    {
        Self::stage(path, |out| {
            writeln!(out, "{}", header.join("\t"))?;
            for row in rows {
                writeln!(out, "{}", row)?;
            }
            Ok(())
        })
    }

    /// Stage one compact JSON object per line
    pub fn stage_json_lines<P, T>(path: P, records: &[T]) -> Result<StagedFile>
    where
        P: AsRef<Path>,
        T: Serialize,
    {
        Self::stage(path, |out| {
            for record in records {
                serde_json::to_writer(&mut *out, record).context("Failed to serialize record")?;
                writeln!(out)?;
            }
            Ok(())
        })
    }

    /// Write a tab-separated table: a header row then one row per item
    pub fn write_tsv<P, R>(path: P, header: &[&str], rows: &[R]) -> Result<()>
    where
        P: AsRef<Path>,
        R: Display,
    {
        Self::stage_tsv(path, header, rows)?.commit()
    }

    /// Write one compact JSON object per line
    pub fn write_json_lines<P, T>(path: P, records: &[T]) -> Result<()>
    where
        P: AsRef<Path>,
        T: Serialize,
    {
        Self::stage_json_lines(path, records)?.commit()
    }
}

/// A fully written temporary file waiting to replace its target
///
/// Dropping it without [`commit`](Self::commit) deletes the temporary file
/// and leaves the target as it was.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    // @replaces: Target with the staged content
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        self.temp
            .persist(&target)
            .with_context(|| format!("Failed to write to file: {:?}", target))?;
        Ok(())
    }
}

/// Quote a TSV field when it holds a tab, quote or line break
///
/// Quoting is minimal: the field is wrapped in double quotes and inner
/// quotes are doubled.
pub fn tsv_field(value: &str) -> Cow<'_, str> {
    if value.contains(['\t', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
