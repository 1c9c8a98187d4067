//! Docintake command-line interface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docintake::{
    BatchSummary, Content, Dispatcher, EntityRegistry, ExtractionConfig, ExtractionResult, PatternDefinition,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Characters of extracted text shown per file in text output.
const TEXT_PREVIEW_CHARS: usize = 200;

/// Rows shown per sheet in text output.
const SHEET_PREVIEW_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// JSON array of results
    Json,
    /// Human-readable summary
    Text,
}

#[derive(Parser)]
#[command(name = "docintake")]
#[command(version, about = "Extract text and identity fields from client documents", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (.toml, .yaml, .yml or .json). Defaults to a discovered docintake.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one or more documents
    Extract {
        /// Files to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Worker threads (defaults to the configured value, then the CPU count)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Print the active entity patterns
    Patterns {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { paths, format, workers } => extract(config, &paths, format, workers),
        Commands::Patterns { format } => {
            patterns(&config, format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "docintake=debug" } else { "docintake=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ExtractionConfig> {
    let config = match path {
        Some(path) => {
            let config = ExtractionConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            debug!("Loaded configuration from {}", path.display());
            config
        }
        None => match ExtractionConfig::discover().context("Failed to load discovered configuration")? {
            Some(config) => config,
            None => {
                debug!("No {} found, using defaults", docintake::core::config::CONFIG_FILE_NAME);
                ExtractionConfig::default()
            }
        },
    };
    Ok(config)
}

fn extract(
    mut config: ExtractionConfig,
    paths: &[PathBuf],
    format: OutputFormat,
    workers: Option<usize>,
) -> Result<ExitCode> {
    if workers.is_some() {
        config.max_workers = workers;
    }

    let dispatcher = Dispatcher::new(config).context("Invalid configuration")?;
    let results = dispatcher.batch_process(paths);
    let summary = BatchSummary::from_results(&results);
    summary.log();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for result in &results {
                print!("{}", render_result(result));
            }
            print!("{}", render_summary(&summary));
        }
    }

    Ok(if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn patterns(config: &ExtractionConfig, format: OutputFormat) -> Result<()> {
    let registry =
        EntityRegistry::from_config(config.entities.as_deref()).context("Invalid entity patterns in configuration")?;

    match format {
        OutputFormat::Json => {
            let definitions: Vec<PatternDefinition> = registry.patterns().iter().map(|p| p.to_definition()).collect();
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
        OutputFormat::Text => {
            for pattern in registry.patterns() {
                println!("{}", pattern.name());
                println!("  pattern: {}", pattern.regex().as_str());
                println!("  yields:  {}", pattern.output_names().join(", "));
            }
        }
    }
    Ok(())
}

fn render_result(result: &ExtractionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("File: {}\n", result.filename));
    out.push_str(&format!(
        "Type: {}\n",
        if result.file_type.is_empty() { "-" } else { result.file_type.as_str() }
    ));

    if let Some(error) = &result.error {
        out.push_str(&format!("Error: {}\n\n", error));
        return out;
    }

    match &result.content {
        Some(Content::Text(text)) => {
            out.push_str(&format!("Text: {}\n", preview(text, TEXT_PREVIEW_CHARS)));
        }
        Some(Content::Workbook(sheets)) => {
            for (name, rows) in sheets {
                out.push_str(&format!("Sheet: {} ({} rows)\n", name, rows.len()));
                for row in rows.iter().take(SHEET_PREVIEW_ROWS) {
                    let cells: Vec<String> = row.iter().map(|(column, value)| format!("{}={}", column, value)).collect();
                    out.push_str(&format!("  {}\n", cells.join(", ")));
                }
            }
        }
        None => {}
    }

    if result.structured_data.is_empty() {
        out.push_str("Entities: none\n");
    } else {
        out.push_str("Entities:\n");
        for (name, value) in &result.structured_data {
            out.push_str(&format!("  {}: {}\n", name, value));
        }
    }
    out.push('\n');
    out
}

fn render_summary(summary: &BatchSummary) -> String {
    let mut out = format!(
        "Processed {} file(s): {} succeeded, {} failed\n",
        summary.total,
        summary.succeeded,
        summary.failed.len()
    );
    if !summary.without_entities.is_empty() {
        out.push_str(&format!("No entities found in: {}\n", summary.without_entities.join(", ")));
    }
    if summary.engine_unavailable {
        out.push_str("WARNING: OCR engine unavailable; install tesseract or set ocr.tesseract_path\n");
    }
    out
}

fn preview(text: &str, limit: usize) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flattened.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &flattened[..cut]),
        None => flattened,
    }
}
