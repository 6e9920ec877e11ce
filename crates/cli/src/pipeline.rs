//! The multi-file translation driver.
//!
//! # Stages
//!
//! Files move through four stages. Each stage runs one task per file on the
//! rayon pool (or in order with `--sequential`):
//!
//! 1. **Adapt**: read the syntax tree, fetch the side tables through the
//!    shared retry gate, build IR.
//! 2. **Collect**: run the collection passes, filling one shared registry.
//! 3. *Barrier*: the registry is frozen once every file has been collected.
//! 4. **Transform and emit**: run the transformation passes against the
//!    frozen registry, then render Kotlin.
//!
//! # Failure model
//!
//! - **Fatal** (per file): unreadable or malformed input, an upstream query
//!   that still fails after the one refresh. The file is skipped, its
//!   siblings are not. Always exit code 1.
//! - **Error**: a node that could not be translated. The file is still
//!   written, with a marker at the site. Exit code 0, or 1 with `--strict`.
//! - **Warning**: a detected semantic risk. Exit code 0, or 1 with
//!   `--deny-warnings`.

use indexmap::IndexMap;
use owo_colors::OwoColorize;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tarn_codegen::{EmitConfig, OutputError, Translation, emit};
use tarn_core::error::{DiagnosticFormatter, ErrorConfig, ErrorContext};
use tarn_core::visitor::placeholder_diagnostics;
use tarn_core::{Diagnostic, DiagnosticCollector, ErrorCode, PassManager, PassManagerConfig, RegistryBuilder, SourceFile};
use tarn_frontend::{FileError, RetryGate, SymbolOriginCache, SyntaxNode, adapt_with_cache, load_side_tables};
use thiserror::Error;

use crate::inputs::{InputFile, JsonIndex};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no input files")]
    NoInputs,

    #[error("unknown pass '{0}' (see `tarn passes`)")]
    UnknownPass(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} and {} both write to {}", first.display(), second.display(), destination.display())]
    DuplicateDestination {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("could not write report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("translation failed: {files} file(s) skipped, {errors} error(s), {warnings} warning(s)")]
    Failed {
        files: usize,
        errors: usize,
        warnings: usize,
    },
}

/// Everything that shapes one translation run.
#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub passes: PassManagerConfig,
    pub emit: EmitConfig,
    /// Run each stage on the rayon pool.
    pub parallel: bool,
    /// Untranslatable nodes fail the run.
    pub strict: bool,
    pub warnings_as_errors: bool,
    pub statistics: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        TranslationConfig {
            passes: PassManagerConfig::default(),
            emit: EmitConfig::default(),
            parallel: true,
            strict: false,
            warnings_as_errors: false,
            statistics: false,
        }
    }
}

/// One file that made it through every stage.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: InputFile,
    pub translation: Translation,
    pub diagnostics: DiagnosticCollector,
}

#[derive(Debug)]
pub struct TranslationReport {
    /// Translated files, in input order.
    pub outcomes: Vec<FileOutcome>,
    /// Files abandoned at a fatal failure, in input order.
    pub failures: Vec<FileError>,
}

impl TranslationReport {
    pub fn error_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.diagnostics.error_count()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.diagnostics.warning_count()).sum()
    }

    /// The run's verdict under `config`'s strictness.
    pub fn check(&self, config: &TranslationConfig) -> PipelineResult<()> {
        let errors = self.error_count();
        let warnings = self.warning_count();
        let failed = !self.failures.is_empty()
            || (config.strict && errors > 0)
            || (config.warnings_as_errors && warnings > 0);
        if failed {
            Err(PipelineError::Failed {
                files: self.failures.len(),
                errors,
                warnings,
            })
        } else {
            Ok(())
        }
    }
}

/// A file between adaptation and transformation.
struct Adapted {
    input: InputFile,
    file: SourceFile,
    diagnostics: Vec<Diagnostic>,
}

/// Run `f` over every item, on the pool or in order. Results keep input order.
fn map_files<T, R, F>(items: Vec<T>, parallel: bool, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    if parallel {
        items.into_par_iter().map(f).collect()
    } else {
        items.into_iter().map(f).collect()
    }
}

pub fn build_pass_manager(config: PassManagerConfig) -> PipelineResult<PassManager> {
    let manager = PassManager::with_config(config);
    if let Some(unknown) = manager
        .config()
        .disabled_passes
        .iter()
        .find(|id| !manager.is_known_pass(id))
    {
        return Err(PipelineError::UnknownPass(unknown.clone()));
    }
    Ok(manager)
}

fn adapt_input(
    input: InputFile,
    index: &JsonIndex,
    gate: &RetryGate,
    origins: &SymbolOriginCache,
) -> Result<Adapted, FileError> {
    let text = fs::read_to_string(&input.syntax).map_err(|source| FileError::Io {
        path: input.syntax.clone(),
        source,
    })?;
    let root = SyntaxNode::from_json(&text).map_err(|source| FileError::Malformed {
        path: input.syntax.clone(),
        source,
    })?;
    let directives = input.read_directives()?;
    let tables = load_side_tables(&input.source, index, index, directives, gate)?;
    let adaptation = adapt_with_cache(&input.source, &root, &tables, origins);
    Ok(Adapted {
        input,
        file: adaptation.file,
        diagnostics: adaptation.diagnostics,
    })
}

/// Translate every input. Fatal per-file failures land in the report; only
/// configuration problems are returned as errors.
pub fn translate(
    inputs: Vec<InputFile>,
    config: &TranslationConfig,
    index: &JsonIndex,
) -> PipelineResult<TranslationReport> {
    if inputs.is_empty() {
        return Err(PipelineError::NoInputs);
    }
    let manager = build_pass_manager(config.passes.clone())?;
    let gate = RetryGate::new();
    let origins = SymbolOriginCache::new();

    log::info!("adapting {} file(s)", inputs.len());
    let adapted = map_files(inputs, config.parallel, |input| {
        adapt_input(input, index, &gate, &origins)
    });
    let mut files = Vec::new();
    let mut failures = Vec::new();
    for result in adapted {
        match result {
            Ok(file) => files.push(file),
            Err(error) => {
                log::error!("{}", error);
                failures.push(error);
            }
        }
    }

    let builder = RegistryBuilder::new();
    let collect = |adapted: &mut Adapted| {
        let reported = manager.run_collection(&mut adapted.file, &builder);
        adapted.diagnostics.extend(reported);
    };
    if config.parallel {
        files.par_iter_mut().for_each(collect);
    } else {
        files.iter_mut().for_each(collect);
    }
    let registry = builder.freeze();
    log::debug!("registry frozen with {} functions", registry.function_count());

    let outcomes = map_files(files, config.parallel, |adapted| {
        let Adapted {
            input,
            file,
            diagnostics: earlier,
        } = adapted;
        let (file, reported) = manager.run_transformation(file, &registry);
        let mut diagnostics = DiagnosticCollector::new();
        diagnostics.extend(earlier);
        diagnostics.extend(reported);
        diagnostics.extend(placeholder_diagnostics(&file));
        let translation = emit(&file, &registry, &config.emit);
        FileOutcome {
            input,
            translation,
            diagnostics,
        }
    });

    if config.statistics {
        manager.print_statistics();
    }
    Ok(TranslationReport { outcomes, failures })
}

/// Where every translation goes, rejecting two files claiming one path.
/// `None` means standard output.
pub fn plan_destinations(
    outcomes: &[FileOutcome],
    out_dir: Option<&Path>,
) -> PipelineResult<Vec<Option<PathBuf>>> {
    let mut claimed: IndexMap<PathBuf, &Path> = IndexMap::new();
    let mut destinations = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let destination = outcome.translation.destination(out_dir)?;
        if let Some(path) = &destination {
            let source = outcome.translation.source.as_path();
            if let Some(first) = claimed.insert(path.clone(), source) {
                return Err(PipelineError::DuplicateDestination {
                    destination: path.clone(),
                    first: first.to_path_buf(),
                    second: source.to_path_buf(),
                });
            }
        }
        destinations.push(destination);
    }
    Ok(destinations)
}

/// Write each translation to its destination, or to standard output in input order.
pub fn write_outputs(
    outcomes: &[FileOutcome],
    destinations: &[Option<PathBuf>],
) -> PipelineResult<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    for (outcome, destination) in outcomes.iter().zip(destinations) {
        match destination {
            Some(path) => outcome.translation.write_to(path)?,
            None => stdout
                .write_all(outcome.translation.text.as_bytes())
                .map_err(|source| PipelineError::Io {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?,
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ReportEntry<'a> {
    source: &'a Path,
    destination: Option<&'a Path>,
    markers: usize,
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct ReportFailure {
    path: PathBuf,
    message: String,
}

#[derive(Serialize)]
struct Report<'a> {
    files: Vec<ReportEntry<'a>>,
    failures: Vec<ReportFailure>,
}

/// Machine-readable summary of the run.
pub fn write_report(
    path: &Path,
    report: &TranslationReport,
    destinations: &[Option<PathBuf>],
) -> PipelineResult<()> {
    let summary = Report {
        files: report
            .outcomes
            .iter()
            .zip(destinations)
            .map(|(outcome, destination)| ReportEntry {
                source: &outcome.translation.source,
                destination: destination.as_deref(),
                markers: outcome.translation.marker_count(),
                diagnostics: outcome.diagnostics.diagnostics(),
            })
            .collect(),
        failures: report
            .failures
            .iter()
            .map(|failure| ReportFailure {
                path: failure.path().to_path_buf(),
                message: failure.to_string(),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(path, json).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert a path to a display-friendly string relative to the working
/// directory, falling back to the path as given.
fn path_to_display_string(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

/// Print every diagnostic to standard error, with source context when the
/// original source file is next to its syntax tree.
pub fn display_diagnostics(report: &TranslationReport, config: ErrorConfig) {
    let formatter = DiagnosticFormatter::new(config);
    for outcome in &report.outcomes {
        if outcome.diagnostics.diagnostics().is_empty() {
            continue;
        }
        let filename = path_to_display_string(&outcome.input.source);
        let source = outcome.input.source_text();
        let diagnostics: Vec<Diagnostic> = outcome
            .diagnostics
            .diagnostics()
            .iter()
            .cloned()
            .map(|mut diagnostic| {
                if let (Some(source), Some(range)) = (&source, diagnostic.range) {
                    diagnostic.context =
                        Some(ErrorContext::new(source.clone(), range).with_filename(filename.clone()));
                } else {
                    diagnostic.message = format!("{}: {}", filename, diagnostic.message);
                }
                diagnostic
            })
            .collect();
        let formatted = formatter.format_all(&diagnostics);
        if !formatted.is_empty() {
            eprintln!("{}", formatted);
        }
    }

    for failure in &report.failures {
        eprintln!("{} {}", "fatal:".red().bold(), failure);
    }
}

/// One summary line, e.g. `translated 3 files: 1 error, 2 warnings`.
pub fn summary_line(report: &TranslationReport) -> String {
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    };
    let mut line = format!(
        "translated {}: {}, {}",
        plural(report.outcomes.len(), "file"),
        plural(report.error_count(), "error"),
        plural(report.warning_count(), "warning")
    );
    if !report.failures.is_empty() {
        line.push_str(&format!(", {} skipped", report.failures.len()));
    }
    line
}

/// Verbose runs also print the IR snapshot attached to each diagnostic.
pub fn error_config(verbose: bool, suppressed: &[ErrorCode]) -> ErrorConfig {
    let mut config = if verbose {
        ErrorConfig::verbose()
    } else {
        ErrorConfig::new()
    };
    for code in suppressed {
        config.suppress(*code);
    }
    config
}
