use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module holds the immutable constants the pipeline runs with:
/// marker prefixes, the mask token and the span extension policy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Prefix of a document boundary line (`#doc-0`)
    #[serde(default = "default_boundary_prefix")]
    pub boundary_prefix: String,

    /// Prefix of a label that begins an entity
    #[serde(default = "default_begin_prefix")]
    pub begin_prefix: String,

    /// Prefix of a label that continues an entity
    #[serde(default = "default_inside_prefix")]
    pub inside_prefix: String,

    /// Placeholder substituted for masked entity mentions
    #[serde(default = "default_mask_token")]
    pub mask_token: String,

    /// How far an entity span extends to the right
    #[serde(default)]
    pub span_policy: SpanPolicy,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Draw a progress bar while generating candidates
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

/// Right-edge rule for entity spans
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanPolicy {
    // @policy: Extend to the last same-type label before the next begin label,
    // skipping differently typed labels in between
    #[default]
    Lenient,
    // @policy: Stop at the first label that is not an inside label of the same type
    Strict,
}

impl SpanPolicy {
    // @returns: Lowercase policy identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl std::fmt::Display for SpanPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SpanPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(anyhow!("Invalid span policy: {}", s)),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_boundary_prefix() -> String {
    "#".to_string()
}

fn default_begin_prefix() -> String {
    "B-".to_string()
}

fn default_inside_prefix() -> String {
    "I-".to_string()
}

fn default_mask_token() -> String {
    "[MASK]".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file, filling missing fields with defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.boundary_prefix.is_empty() {
            return Err(anyhow!("Boundary prefix must not be empty"));
        }

        if self.begin_prefix.is_empty() || self.inside_prefix.is_empty() {
            return Err(anyhow!("Begin and inside label prefixes must not be empty"));
        }

        if self.begin_prefix == self.inside_prefix {
            return Err(anyhow!(
                "Begin and inside label prefixes must differ (both are '{}')",
                self.begin_prefix
            ));
        }

        if self.mask_token.is_empty() {
            return Err(anyhow!("Mask token must not be empty"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            boundary_prefix: default_boundary_prefix(),
            begin_prefix: default_begin_prefix(),
            inside_prefix: default_inside_prefix(),
            mask_token: default_mask_token(),
            span_policy: SpanPolicy::default(),
            log_level: LogLevel::default(),
            show_progress: default_true(),
        }
    }
}
