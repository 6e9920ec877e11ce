//! Tarn front end: foreign syntax trees in, tarn IR out.
//!
//! The host compiler's tooling hands over, per file, a syntax tree plus three
//! side tables keyed by source offset:
//!
//! - resolved **types** of expression ranges,
//! - **symbols** each reference resolves to, with the referenced declaration's text,
//! - translator **directives** found in comments (`ignore`, `literal`, `pure`, `output`).
//!
//! [`source`] fetches the tables, retrying a failed query once after a single
//! shared refresh. [`adapter`] then builds a [`SourceFile`](tarn_core::SourceFile):
//! operator sequences are folded by precedence, call arguments are bound to
//! parameters, and anything it cannot translate becomes an error placeholder
//! instead of an abort.
//!
//! ```
//! use tarn_frontend::{SideTables, SyntaxKind, SyntaxNode, adapt};
//!
//! let root = SyntaxNode::new(SyntaxKind::SourceFile)
//!     .with_child(SyntaxNode::new(SyntaxKind::ImportDecl).with_text("Foundation"));
//! let adaptation = adapt("main.swift", &root, &SideTables::default());
//! assert_eq!(adaptation.file.declarations.len(), 1);
//! ```

pub mod adapter;
pub mod source;
pub mod syntax;
pub mod tables;

pub use adapter::{Adaptation, Adapter, adapt, adapt_with_cache};
pub use source::{FileError, RetryGate, SymbolOriginCache, SymbolSource, TypeSource, UpstreamError, load_side_tables};
pub use syntax::{SyntaxKind, SyntaxNode};
pub use tables::{DirectiveKind, DirectiveTable, SideTables, SymbolTable, TypeTable};
