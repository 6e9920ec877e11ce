//! Locating a file's syntax tree and its side tables on disk.
//!
//! The host tooling writes, next to each source file `shapes.swift`:
//!
//! - `shapes.ast.json`: the syntax tree (the file named on the command line)
//! - `shapes.types.json`: resolved expression types
//! - `shapes.symbols.json`: reference-site symbol origins
//! - `shapes.directives.json`: translator directives found in comments
//!
//! Every side table is optional; a missing one reads as empty.

use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tarn_frontend::source::{SymbolSource, TypeSource, UpstreamError};
use tarn_frontend::tables::{Directive, SymbolEntry, TypeEntry};
use tarn_frontend::{DirectiveTable, FileError, SymbolTable, TypeTable};

pub const SYNTAX_SUFFIX: &str = ".ast.json";
const TYPES_SUFFIX: &str = ".types.json";
const SYMBOLS_SUFFIX: &str = ".symbols.json";
const DIRECTIVES_SUFFIX: &str = ".directives.json";
const SOURCE_SUFFIX: &str = ".swift";

/// One translation unit as laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// The syntax tree named on the command line.
    pub syntax: PathBuf,
    /// The source file the tree was produced from. It need not exist.
    pub source: PathBuf,
}

impl InputFile {
    pub fn new(syntax: impl Into<PathBuf>) -> Self {
        let syntax = syntax.into();
        let source = sibling(&syntax, SOURCE_SUFFIX);
        InputFile { syntax, source }
    }

    pub fn directives(&self) -> PathBuf {
        sibling(&self.syntax, DIRECTIVES_SUFFIX)
    }

    /// The original source text, used only to show context under diagnostics.
    pub fn source_text(&self) -> Option<String> {
        fs::read_to_string(&self.source).ok()
    }

    pub fn read_directives(&self) -> Result<DirectiveTable, FileError> {
        let path = self.directives();
        let directives: Vec<Directive> = read_json(&path).map_err(|error| match error {
            JsonError::Io(source) => FileError::Io { path: path.clone(), source },
            JsonError::Malformed(source) => FileError::Malformed { path: path.clone(), source },
        })?;
        Ok(DirectiveTable::new(directives))
    }
}

/// `shapes.ast.json` (or `shapes.swift`) + `.types.json` → `shapes.types.json`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = [SYNTAX_SUFFIX, SOURCE_SUFFIX, ".json"]
        .into_iter()
        .find_map(|known| name.strip_suffix(known))
        .unwrap_or(&name);
    path.with_file_name(format!("{}{}", stem, suffix))
}

/// Expand the command-line inputs: files are taken as given, directories
/// contribute every syntax tree directly inside them, sorted by name.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>, FileError> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.is_dir() {
            inputs.push(InputFile::new(path));
            continue;
        }
        let unreadable = |source| FileError::Io {
            path: path.clone(),
            source,
        };
        let mut found = Vec::new();
        for entry in fs::read_dir(path).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?.path();
            if entry
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(SYNTAX_SUFFIX))
            {
                found.push(entry);
            }
        }
        found.sort();
        log::debug!("{}: {} syntax trees", path.display(), found.len());
        inputs.extend(found.into_iter().map(InputFile::new));
    }
    Ok(inputs)
}

enum JsonError {
    Io(io::Error),
    Malformed(serde_json::Error),
}

/// Read a JSON list, treating a missing file as an empty one.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, JsonError> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).map_err(JsonError::Malformed),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            log::trace!("{}: not present", path.display());
            Ok(T::default())
        }
        Err(error) => Err(JsonError::Io(error)),
    }
}

fn describe(path: &Path, error: JsonError) -> String {
    match error {
        JsonError::Io(error) => format!("{}: {}", path.display(), error),
        JsonError::Malformed(error) => format!("{}: {}", path.display(), error),
    }
}

/// Type and symbol source backed by the side-table files.
///
/// Tables are re-read on every query, so a refresh only has to rewrite the
/// files. With a refresh command configured, a failed query runs it (once
/// per process, through the retry gate) before the single retry.
#[derive(Debug, Clone, Default)]
pub struct JsonIndex {
    pub refresh_command: Option<String>,
}

impl JsonIndex {
    pub fn new(refresh_command: Option<String>) -> Self {
        JsonIndex { refresh_command }
    }

    fn run_refresh(&self) -> Result<(), UpstreamError> {
        let Some(command) = &self.refresh_command else {
            log::debug!("no refresh command, retrying with the files as they are");
            return Ok(());
        };
        log::info!("running refresh command `{}`", command);
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .map_err(|e| UpstreamError::Refresh(format!("`{}`: {}", command, e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(UpstreamError::Refresh(format!("`{}` exited with {}", command, status)))
        }
    }
}

impl TypeSource for JsonIndex {
    fn fetch_types(&self, path: &Path) -> Result<TypeTable, UpstreamError> {
        let types = sibling(path, TYPES_SUFFIX);
        let entries: Vec<TypeEntry> =
            read_json(&types).map_err(|e| UpstreamError::TypeQuery(describe(&types, e)))?;
        Ok(TypeTable::new(entries))
    }

    fn refresh(&self) -> Result<(), UpstreamError> {
        self.run_refresh()
    }
}

impl SymbolSource for JsonIndex {
    fn fetch_symbols(&self, path: &Path) -> Result<SymbolTable, UpstreamError> {
        let symbols = sibling(path, SYMBOLS_SUFFIX);
        let entries: Vec<SymbolEntry> =
            read_json(&symbols).map_err(|e| UpstreamError::SymbolQuery(describe(&symbols, e)))?;
        Ok(SymbolTable::new(entries))
    }

    // Both traits share one refresh; `load_side_tables` calls each in turn,
    // so the command runs from the type side only.
}
