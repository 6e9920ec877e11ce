//! Emitted text and where it is written.

use crate::error::{OutputError, OutputResult};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Tag of the target-language output in a file's output table.
pub const KOTLIN_TAG: &str = "kt";

const MARKER: &str = "<<Error:";

/// One file's emitted text plus its output redirections.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// The source file the text was translated from.
    pub source: PathBuf,
    pub text: String,
    /// Output redirections by tag (a path's extension).
    pub outputs: IndexMap<String, PathBuf>,
}

impl Translation {
    /// Number of untranslatable sites marked in the text.
    pub fn marker_count(&self) -> usize {
        self.text.matches(MARKER).count()
    }

    /// Where the source's own directives asked for the text to go.
    pub fn redirected_path(&self) -> Option<&Path> {
        self.outputs.get(KOTLIN_TAG).map(PathBuf::as_path)
    }

    /// `out_dir/<source stem>.kt`.
    pub fn default_path(&self, out_dir: &Path) -> OutputResult<PathBuf> {
        let stem = self.source.file_stem().ok_or_else(|| OutputError::NoFileName {
            path: self.source.clone(),
        })?;
        let mut path = out_dir.join(stem);
        path.set_extension(KOTLIN_TAG);
        Ok(path)
    }

    /// The redirected path wins over `out_dir`; `None` means standard output.
    pub fn destination(&self, out_dir: Option<&Path>) -> OutputResult<Option<PathBuf>> {
        if let Some(path) = self.redirected_path() {
            return Ok(Some(path.to_path_buf()));
        }
        out_dir.map(|dir| self.default_path(dir)).transpose()
    }

    /// Write the text to `path`, creating missing parent directories.
    pub fn write_to(&self, path: &Path) -> OutputResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| OutputError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        log::debug!("writing {}", path.display());
        fs::write(path, &self.text).map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
