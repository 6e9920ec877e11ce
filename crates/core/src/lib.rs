//! Tarn core: the translator's intermediate representation and rewrite pipeline.
//!
//! The front end turns a foreign syntax tree into the IR in [`ast`]. The
//! [`passes`] then run in two phases:
//!
//! - **Collection** runs once per file and records whole-program facts
//!   (enum payload kinds, protocol names, parameter names, purity) into a
//!   shared [`RegistryBuilder`].
//! - **Transformation** runs per file once every file has been collected,
//!   reading the frozen [`Registry`].
//!
//! Node-level problems never stop a translation. They become error
//! placeholder nodes or warnings carried as [`Diagnostic`]s.
//!
//! ```
//! use tarn_core::ast::{SourceFile, dump_file};
//! use tarn_core::rewrite;
//!
//! let result = rewrite(SourceFile::new("empty.swift"));
//! assert!(!result.has_errors());
//! println!("{}", dump_file(&result.file));
//! ```

pub mod ast;
pub mod error;
pub mod passes;
pub mod registry;
pub mod visitor;

pub mod helpers;

pub use ast::{Expr, SourceFile, Stmt};
pub use error::{Diagnostic, DiagnosticCollector, ErrorCode, Severity};
pub use passes::{PassManager, PassManagerConfig, PassPhase, PassStatistics};
pub use registry::{Registry, RegistryBuilder};
pub use visitor::{Rewriter, Visitor};

/// One file after both pipeline phases, with its own frozen registry.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    pub file: SourceFile,
    pub registry: Registry,
    pub diagnostics: Vec<Diagnostic>,
}

impl RewriteResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

/// Run every enabled pass over one self-contained file.
///
/// Multi-file translations must collect all files before transforming any;
/// use [`PassManager::run_collection`] and [`PassManager::run_transformation`]
/// for that.
pub fn rewrite(file: SourceFile) -> RewriteResult {
    rewrite_with(file, PassManagerConfig::default())
}

pub fn rewrite_with(file: SourceFile, config: PassManagerConfig) -> RewriteResult {
    let manager = PassManager::with_config(config);
    let (file, registry, diagnostics) = manager.run_single(file);
    RewriteResult {
        file,
        registry,
        diagnostics,
    }
}
