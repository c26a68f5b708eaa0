// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use ner2re::app_config::{self, Config, SpanPolicy};
use ner2re::file_utils::FileManager;
use ner2re::pipeline::Pipeline;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert NER output into relation candidates (default command)
    Convert(ConvertArgs),

    /// Score predicted entity spans against the gold column
    Evaluate(EvaluateArgs),

    /// Generate shell completions for ner2re
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings shared by every command that runs the pipeline
#[derive(Args, Debug, Clone, Default)]
struct SettingsArgs {
    /// JSON configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// End entity spans at the first label that does not continue them
    #[arg(long, conflicts_with = "span_policy")]
    strict_spans: bool,

    /// How far entity spans extend to the right (lenient or strict)
    #[arg(long, value_name = "POLICY")]
    span_policy: Option<SpanPolicy>,

    /// Placeholder used to mask entity mentions
    #[arg(long, value_name = "TOKEN")]
    mask_token: Option<String>,

    /// Prefix of document boundary lines
    #[arg(long, value_name = "PREFIX")]
    boundary_prefix: Option<String>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct ConvertArgs {
    /// 3-column NER output file (token, gold label, predicted label)
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output TSV file for relation classification
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Also write each document's entity list as JSON Lines
    #[arg(short, long, value_name = "PATH")]
    entities: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Args, Debug, Clone)]
struct EvaluateArgs {
    /// 3-column NER output file (token, gold label, predicted label)
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,
}

/// ner2re - NER output to relation extraction examples
///
/// Reads a tab-separated, per-character NER result file and writes one masked
/// example per ordered pair of predicted entities in each document.
#[derive(Parser, Debug)]
#[command(name = "ner2re")]
#[command(version)]
#[command(about = "Turn NER output into relation extraction candidates")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "ner2re reads a tab-separated NER result file (token, gold label, predicted label)
with '#<docid>' document markers, extracts the predicted entities of every document and
writes one masked example per ordered entity pair.

EXAMPLES:
    ner2re --input ner_output.tsv --output re_input.tsv
    ner2re -i ner_output.tsv -o re_input.tsv --entities entities.jsonl
    ner2re -i ner_output.tsv -o re_input.tsv --strict-spans --mask-token '<e>'
    ner2re evaluate --input ner_output.tsv
    ner2re completions bash > ner2re.bash")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
}

// @struct: Custom logger implementation
// Filtering relies on log::max_level so the level can change after init
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ner2re", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Evaluate(args)) => run_evaluate(args),
        None => run_convert(cli.convert),
    }
}

// @returns: The value of a required flag, or exits with a usage error
fn required_flag(value: Option<PathBuf>, flag: &str) -> PathBuf {
    value.unwrap_or_else(|| {
        CommandLineOptions::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                format!("the following required argument was not provided: {}", flag),
            )
            .exit()
    })
}

// @returns: The input path if it names a readable file, or exits with a usage error
fn readable_input(path: PathBuf) -> PathBuf {
    if FileManager::file_exists(&path) && File::open(&path).is_ok() {
        return path;
    }
    CommandLineOptions::command()
        .error(
            ErrorKind::ValueValidation,
            format!(
                "invalid value '{}' for '--input <PATH>': not a readable file",
                path.display()
            ),
        )
        .exit()
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let input = readable_input(required_flag(args.input, "--input <PATH>"));
    let output = required_flag(args.output, "--output <PATH>");

    let pipeline = build_pipeline(&args.settings)?;
    let result = pipeline.run(&input)?;

    pipeline.write_outputs(&result, &output, args.entities.as_deref())?;
    if let Some(entities_path) = &args.entities {
        debug!("Entity lists written to {}", entities_path.display());
    }

    match result.candidates.first() {
        Some(sample) => {
            let sample_json = serde_json::to_string_pretty(sample)
                .context("Failed to format sample candidate")?;
            println!("{}", sample_json);
        }
        None => {
            warn!("No document has two or more entities, the output only has a header");
            println!("No relation candidates were generated");
        }
    }
    println!("File written to {}", output.display());

    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let input = readable_input(args.input);
    let pipeline = build_pipeline(&args.settings)?;
    let report = pipeline.evaluate(&input)?;
    println!("Documents: {}", report.documents);
    print!("{}", report);
    Ok(())
}

// @creates: Pipeline from the config file (if any) and CLI overrides
fn build_pipeline(settings: &SettingsArgs) -> Result<Pipeline> {
    // If log level is set via command line, apply it immediately
    if let Some(cli_level) = settings.log_level {
        log::set_max_level(app_config::LogLevel::from(cli_level).to_level_filter());
    }

    let config = load_config(settings.config.as_deref(), settings)?;

    if settings.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }
    debug!("Effective configuration: {:?}", config);

    Ok(Pipeline::with_config(config)?)
}

fn load_config(path: Option<&Path>, settings: &SettingsArgs) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Override config with CLI options if provided
    if let Some(log_level) = settings.log_level {
        config.log_level = log_level.into();
    }
    if let Some(policy) = settings.span_policy {
        config.span_policy = policy;
    }
    if settings.strict_spans {
        config.span_policy = SpanPolicy::Strict;
    }
    if let Some(mask_token) = &settings.mask_token {
        config.mask_token = mask_token.clone();
    }
    if let Some(prefix) = &settings.boundary_prefix {
        config.boundary_prefix = prefix.clone();
    }
    if settings.no_progress {
        config.show_progress = false;
    }

    Ok(config)
}
