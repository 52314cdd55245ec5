//! specdiff command-line interface.
//!
//! Compares two OpenAPI 2.0 documents and reports breaking changes.

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use specdiff_compare::{CommonTypeRegistry, DocumentComparator, Level, ReportFormat, Summary};
use specdiff_parser::{parse_document_file, ApiDocument};
use specdiff_telemetry::{log_documents_loaded, LogFormat, Telemetry, TelemetryConfig};

use config::{parse_fail_on, ProjectManifest};

/// Exit code when a diff reaches the failure threshold.
const EXIT_DIFFS: u8 = 1;
/// Exit code for load, config and usage errors.
const EXIT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "specdiff",
    about = "Detect breaking changes between OpenAPI 2.0 documents",
    version
)]
struct Cli {
    /// Log level (RUST_LOG takes precedence).
    #[arg(long, global = true, env = "SPECDIFF_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log format (pretty or json).
    #[arg(long, global = true, env = "SPECDIFF_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare an old and a new document.
    ///
    /// Prints one line per difference on stdout. Exits 1 when a difference
    /// reaches the --fail-on level and 2 when a document cannot be loaded.
    Compare {
        /// The baseline document (YAML or JSON).
        #[arg(long)]
        old: String,

        /// The candidate document (YAML or JSON).
        #[arg(long)]
        new: String,

        /// Shared documents that references may point into.
        #[arg(long = "common-types", num_args = 1..)]
        common_types: Vec<String>,

        /// Project manifest (specdiff.yaml).
        #[arg(long)]
        config: Option<String>,

        /// Output format (text, markdown or json).
        #[arg(long, default_value = "text")]
        format: String,

        /// Lowest severity that fails the run (error or warning).
        ///
        /// Overrides `fail_on` from the manifest. Defaults to error.
        #[arg(long)]
        fail_on: Option<String>,
    },

    /// Load document(s) and report what the comparator would see.
    Check {
        /// Input document(s) (YAML or JSON).
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<String>,

        /// Output format (text or json).
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Resolved settings for a compare run.
struct CompareSettings {
    common_types: Vec<PathBuf>,
    format: ReportFormat,
    fail_on: Level,
}

/// Merge command-line flags with the optional manifest.
fn resolve_settings(
    config: Option<&str>,
    cli_common_types: &[String],
    format: &str,
    fail_on: Option<&str>,
) -> Result<CompareSettings, String> {
    let (manifest, manifest_path) = match config {
        Some(path) => {
            let path = Path::new(path);
            let manifest = ProjectManifest::load(path).map_err(|e| e.to_string())?;
            (manifest, Some(path))
        }
        None => (ProjectManifest::default(), None),
    };

    let mut common_types = manifest_path
        .map(|path| manifest.common_type_paths(path))
        .unwrap_or_default();
    common_types.extend(cli_common_types.iter().map(PathBuf::from));

    let format = ReportFormat::parse(format).ok_or_else(|| {
        format!("invalid format '{}' (expected text, markdown or json)", format)
    })?;

    let fail_on = match fail_on {
        Some(value) => parse_fail_on(value).map_err(|e| e.to_string())?,
        None => manifest
            .fail_on_level()
            .map_err(|e| e.to_string())?
            .unwrap_or(Level::Error),
    };

    Ok(CompareSettings {
        common_types,
        format,
        fail_on,
    })
}

fn load_document(path: &str) -> Result<ApiDocument, String> {
    parse_document_file(Path::new(path)).map_err(|e| format!("failed to load {}: {}", path, e))
}

/// Run the compare subcommand.
fn run_compare(
    old: &str,
    new: &str,
    common_types: &[String],
    config: Option<&str>,
    format: &str,
    fail_on: Option<&str>,
) -> ExitCode {
    let settings = match resolve_settings(config, common_types, format, fail_on) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (old_document, new_document) = match (load_document(old), load_document(new)) {
        (Ok(old_document), Ok(new_document)) => (old_document, new_document),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let registry = match CommonTypeRegistry::load(&settings.common_types) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: failed to load common types: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    log_documents_loaded!(
        old = %old,
        new = %new,
        common_types = registry.len(),
        "documents loaded"
    );

    let diffs = DocumentComparator::new(&old_document, &new_document)
        .with_common_types(&registry)
        .compare();

    match settings.format.render(&diffs) {
        Ok(report) => print!("{}", report),
        Err(e) => {
            eprintln!("error: failed to render report: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let summary = Summary::of(&diffs);
    eprintln!(
        "compared {} -> {}: {} error(s), {} warning(s)",
        old, new, summary.errors, summary.warnings
    );

    if summary.reaches(settings.fail_on) {
        ExitCode::from(EXIT_DIFFS)
    } else {
        ExitCode::SUCCESS
    }
}

/// Per-file result of the check subcommand.
#[derive(Debug, Serialize)]
struct CheckResult {
    file: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    swagger: Option<String>,
    operations: usize,
    definitions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the check subcommand.
fn run_check(specs: &[String], output_format: &str) -> ExitCode {
    let json = match output_format {
        "text" => false,
        "json" => true,
        other => {
            eprintln!("error: invalid format '{}' (expected text or json)", other);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let results: Vec<CheckResult> = specs
        .iter()
        .map(|file| match parse_document_file(Path::new(file)) {
            Ok(document) => CheckResult {
                file: file.clone(),
                valid: true,
                swagger: Some(document.swagger.clone()),
                operations: document
                    .operations()
                    .filter(|(_, _, op)| op.operation_id.is_some())
                    .count(),
                definitions: document.definitions.len(),
                error: None,
            },
            Err(e) => CheckResult {
                file: file.clone(),
                valid: false,
                swagger: None,
                operations: 0,
                definitions: 0,
                error: Some(e.to_string()),
            },
        })
        .collect();

    let invalid = results.iter().filter(|r| !r.valid).count();

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("error: failed to render results: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        for result in &results {
            match &result.error {
                None => eprintln!(
                    "✓ {} is valid ({} operation(s), {} definition(s))",
                    result.file, result.operations, result.definitions
                ),
                Some(e) => eprintln!("✗ {}: {}", result.file, e),
            }
        }
        eprintln!();
        eprintln!(
            "checked {} document(s): {} valid, {} invalid",
            results.len(),
            results.len() - invalid,
            invalid
        );
    }

    if invalid > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::SUCCESS
    }
}

/// Install the log subscriber. Logging goes to stderr.
fn init_telemetry(log_level: &str, log_format: &str) -> Result<Telemetry, String> {
    let format = LogFormat::parse(log_format).ok_or_else(|| {
        format!("invalid log format '{}' (expected pretty or json)", log_format)
    })?;
    let config = TelemetryConfig::new()
        .with_log_level(log_level)
        .with_log_format(format);
    Telemetry::init(config).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _telemetry = match init_telemetry(&cli.log_level, &cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::Compare {
            old,
            new,
            common_types,
            config,
            format,
            fail_on,
        } => run_compare(
            &old,
            &new,
            &common_types,
            config.as_deref(),
            &format,
            fail_on.as_deref(),
        ),
        Commands::Check { spec, format } => run_check(&spec, &format),
    }
}
