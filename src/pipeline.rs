use log::{debug, info};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use crate::app_config::Config;
use crate::document_reader::{Document, DocumentReader};
use crate::entity_extractor::{EntityExtractor, EntitySpan};
use crate::errors::{AppError, ValidationError};
use crate::evaluation::EvaluationReport;
use crate::file_utils::FileManager;
use crate::relation_generator::{MaskStats, RelationCandidate, RelationCandidateGenerator};

// @module: Pipeline driver: read, extract, generate, write

// @const: Header of the relation candidate table
pub const OUTPUT_HEADER: [&str; 2] = ["docid", "text_a"];

/// Entities found in one document, as written to the entity dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntities {
    pub docid: String,
    pub entity_list: Vec<EntitySpan>,
}

/// Run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub documents: usize,
    pub entities: usize,
    pub candidates: usize,
    pub misaligned_masks: usize,
}

/// Everything a run produced, in document order
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub candidates: Vec<RelationCandidate>,
    pub entities: Vec<DocumentEntities>,
    pub stats: PipelineStats,
}

/// Wires reader, extractor and generator together
pub struct Pipeline {
    // @field: App configuration
    config: Config,
    reader: DocumentReader,
    extractor: EntityExtractor,
    generator: RelationCandidateGenerator,
}

impl Pipeline {
    /// Create a pipeline, rejecting an inconsistent configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        debug!(
            "Boundary prefix '{}', span policy {}, mask token '{}'",
            config.boundary_prefix, config.span_policy, config.mask_token
        );

        Ok(Self {
            reader: DocumentReader::new(&config.boundary_prefix),
            extractor: EntityExtractor::from_config(&config),
            generator: RelationCandidateGenerator::from_config(&config),
            config,
        })
    }

    /// Parse the input file
    pub fn read<P: AsRef<Path>>(&self, input: P) -> Result<Vec<Document>, AppError> {
        let input = input.as_ref();
        info!("Reading tagged file: {}", input.display());
        let documents = self.reader.read(input)?;
        info!("Parsed {} documents", documents.len());
        Ok(documents)
    }

    /// Read the input file and generate every candidate
    pub fn run<P: AsRef<Path>>(&self, input: P) -> Result<PipelineOutput, AppError> {
        let start_time = Instant::now();
        let documents = self.read(input)?;
        let output = self.process(&documents)?;

        info!(
            "Generated {} relation candidates from {} entities in {}",
            output.stats.candidates,
            output.stats.entities,
            Self::format_duration(start_time.elapsed())
        );
        Ok(output)
    }

    /// Extract entities from predicted labels and build candidates
    pub fn process(&self, documents: &[Document]) -> Result<PipelineOutput, ValidationError> {
        let progress_bar = self.progress_bar(documents.len() as u64);
        let mut output = PipelineOutput::default();
        let mut mask_stats = MaskStats::default();

        for doc in documents {
            let entities = self
                .extractor
                .extract(&doc.words(), &doc.pred_labels())
                .map_err(|e| e.in_document(&doc.id))?;

            let (candidates, stats) = self.generator.generate_with_stats(doc, &entities);
            debug!(
                "Document '{}': {} tokens, {} entities, {} candidates",
                doc.id, doc.len(), entities.len(), candidates.len()
            );

            mask_stats.merge(stats);
            output.stats.entities += entities.len();
            output.candidates.extend(candidates);
            output.entities.push(DocumentEntities {
                docid: doc.id.clone(),
                entity_list: entities,
            });
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        output.stats.documents = documents.len();
        output.stats.candidates = output.candidates.len();
        output.stats.misaligned_masks = mask_stats.misaligned;

        if mask_stats.misaligned > 0 {
            info!(
                "{} masks landed on an earlier occurrence of the entity text than the annotated one",
                mask_stats.misaligned
            );
        }
        Ok(output)
    }

    /// Write the candidate table and, when `entities_path` is given, the
    /// per-document entity lists as JSON Lines
    ///
    /// Both files are fully written to temporary siblings first; targets are
    /// replaced only once every write succeeded.
    pub fn write_outputs(&self, output: &PipelineOutput, candidates_path: &Path, entities_path: Option<&Path>) -> Result<(), AppError> {
        let candidates = FileManager::stage_tsv(candidates_path, &OUTPUT_HEADER, output.candidates.as_slice())
            .map_err(|e| AppError::file_access(candidates_path, format!("{:#}", e)))?;

        let entities = entities_path
            .map(|path| {
                FileManager::stage_json_lines(path, output.entities.as_slice())
                    .map_err(|e| AppError::file_access(path, format!("{:#}", e)))
            })
            .transpose()?;

        if let Some(staged) = entities {
            let path = staged.target().to_path_buf();
            staged
                .commit()
                .map_err(|e| AppError::file_access(&path, format!("{:#}", e)))?;
            debug!("Wrote entity lists for {} documents to {}", output.entities.len(), path.display());
        }

        candidates
            .commit()
            .map_err(|e| AppError::file_access(candidates_path, format!("{:#}", e)))?;
        debug!("Wrote {} rows to {}", output.candidates.len(), candidates_path.display());
        Ok(())
    }

    /// Score predicted spans against gold spans
    pub fn evaluate<P: AsRef<Path>>(&self, input: P) -> Result<EvaluationReport, AppError> {
        let documents = self.read(input)?;
        Ok(EvaluationReport::evaluate(&self.extractor, &documents)?)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
