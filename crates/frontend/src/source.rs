//! Upstream type and symbol sources, and the one-shot refresh-and-retry gate.
//!
//! Queries against the host compiler's index can fail when the index is
//! stale. A failing worker refreshes the inputs once for the whole process
//! and retries its own query once; any failure after that is fatal for the
//! file, never for its siblings.

use crate::tables::{DirectiveTable, SideTables, SymbolTable, TypeTable};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("type query failed: {0}")]
    TypeQuery(String),

    #[error("symbol query failed: {0}")]
    SymbolQuery(String),

    #[error("refreshing upstream inputs failed: {0}")]
    Refresh(String),
}

/// File-level failures. These abort one file's translation and nothing else.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{}: {source}", path.display())]
    Upstream {
        path: PathBuf,
        #[source]
        source: UpstreamError,
    },

    #[error("{}: malformed input: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    pub fn path(&self) -> &Path {
        match self {
            FileError::Upstream { path, .. } | FileError::Malformed { path, .. } | FileError::Io { path, .. } => path,
        }
    }
}

/// Resolved expression types for one file.
pub trait TypeSource: Send + Sync {
    fn fetch_types(&self, path: &Path) -> Result<TypeTable, UpstreamError>;

    /// Rebuild whatever the queries read from.
    fn refresh(&self) -> Result<(), UpstreamError> {
        Ok(())
    }
}

/// Reference-site symbol origins for one file.
pub trait SymbolSource: Send + Sync {
    fn fetch_symbols(&self, path: &Path) -> Result<SymbolTable, UpstreamError>;

    fn refresh(&self) -> Result<(), UpstreamError> {
        Ok(())
    }
}

/// The process-wide "already retried with refreshed inputs" flag.
///
/// The first caller runs the refresh while holding the lock; callers that
/// fail concurrently block on it and then reuse its outcome, so any number of
/// failures collapse into one refresh.
#[derive(Debug, Default)]
pub struct RetryGate {
    outcome: Mutex<Option<Result<(), UpstreamError>>>,
}

impl RetryGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_refreshed(&self) -> bool {
        self.outcome.lock().is_some()
    }

    /// Run `refresh` unless some caller already did, and return its outcome.
    pub fn refresh_once(&self, refresh: impl FnOnce() -> Result<(), UpstreamError>) -> Result<(), UpstreamError> {
        let mut outcome = self.outcome.lock();
        if let Some(previous) = outcome.as_ref() {
            return previous.clone();
        }
        log::info!("refreshing upstream inputs");
        let result = refresh();
        *outcome = Some(result.clone());
        result
    }

    /// Query once; on failure refresh through the gate and query exactly once more.
    pub fn fetch<T>(
        &self,
        path: &Path,
        fetch: impl Fn() -> Result<T, UpstreamError>,
        refresh: impl FnOnce() -> Result<(), UpstreamError>,
    ) -> Result<T, FileError> {
        let upstream = |source: UpstreamError| FileError::Upstream {
            path: path.to_path_buf(),
            source,
        };
        match fetch() {
            Ok(value) => Ok(value),
            Err(first) => {
                log::warn!("{}: {}; retrying with refreshed inputs", path.display(), first);
                self.refresh_once(refresh).map_err(upstream)?;
                fetch().map_err(upstream)
            }
        }
    }
}

/// Shared name → symbol origin cache.
///
/// Filled from every file's symbol table as the adapter goes; consulted when
/// a reference site has no entry of its own. Append-only: the first origin
/// recorded for a name wins.
#[derive(Debug, Default)]
pub struct SymbolOriginCache {
    origins: Mutex<HashMap<String, String>>,
}

impl SymbolOriginCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str, origin: &str) {
        self.origins
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| origin.to_string());
    }

    pub fn origin(&self, name: &str) -> Option<String> {
        self.origins.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.origins.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetch both tables for `path` through the gate and pair them with its directives.
pub fn load_side_tables(
    path: &Path,
    types: &dyn TypeSource,
    symbols: &dyn SymbolSource,
    directives: DirectiveTable,
    gate: &RetryGate,
) -> Result<SideTables, FileError> {
    let refresh = || {
        types.refresh()?;
        symbols.refresh()
    };
    let type_table = gate.fetch(path, || types.fetch_types(path), refresh)?;
    let symbol_table = gate.fetch(path, || symbols.fetch_symbols(path), refresh)?;
    log::debug!(
        "{}: {} types, {} symbols",
        path.display(),
        type_table.len(),
        symbol_table.len()
    );
    Ok(SideTables {
        types: type_table,
        symbols: symbol_table,
        directives,
    })
}
