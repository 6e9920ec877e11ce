//! Per-file IR root.

use super::stmt::Stmt;
use indexmap::IndexMap;
use std::path::PathBuf;

/// One translated source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Type, function and global declarations.
    pub declarations: Vec<Stmt>,
    /// Top-level executable statements.
    pub statements: Vec<Stmt>,
    /// Output redirections requested by directives, keyed by tag (the path's extension).
    pub outputs: IndexMap<String, PathBuf>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceFile {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Record an output redirection; the tag is the path's extension.
    pub fn add_output(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let tag = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.outputs.insert(tag, path);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.statements.is_empty()
    }
}
