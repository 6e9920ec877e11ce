//! Emitter error types

use std::path::PathBuf;
use thiserror::Error;

/// Failures while placing emitted text on disk. Emission itself never fails:
/// untranslatable nodes are rendered as markers in the text.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot create output directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input {} has no file name to derive an output from", path.display())]
    NoFileName { path: PathBuf },
}

pub type OutputResult<T> = Result<T, OutputError>;
