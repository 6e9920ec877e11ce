//! Foreign syntax tree → IR.
//!
//! One [`Adapter`] handles one file. Its methods are spread over the
//! submodules by node family, all working on the same struct:
//!
//! - [`decls`]: type, function and variable declarations, including the
//!   dangling-binding carry for `let a, b: T`.
//! - [`stmts`]: control flow.
//! - [`exprs`]: expressions, literals and implicit members.
//! - [`operators`]: precedence folding of flat operator sequences.
//! - [`arguments`]: call-argument to parameter binding.
//! - [`patterns`]: `case` pattern destructuring.
//!
//! Nothing here fails: a node the adapter cannot translate becomes an error
//! placeholder with a snapshot of the foreign sub-tree, and the surrounding
//! construct carries on.

mod arguments;
mod decls;
mod exprs;
mod operators;
mod patterns;
mod stmts;

pub use arguments::{ParameterInfo, bind_arguments, parse_parameter, parse_parameter_clause};
pub use operators::{Associativity, PrecedenceGroup, precedence_group};

use crate::source::SymbolOriginCache;
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::tables::{DirectiveKind, SideTables};
use decls::PendingBinding;
use phf::phf_set;
use std::collections::VecDeque;
use std::path::Path;
use tarn_core::ast::*;
use tarn_core::error::{Diagnostic, ErrorCode};

static ACCESS_MODIFIERS: phf::Set<&'static str> = phf_set! {
    "open",
    "public",
    "internal",
    "fileprivate",
    "private",
};

/// The result of adapting one file.
#[derive(Debug, Clone)]
pub struct Adaptation {
    pub file: SourceFile,
    /// Warnings raised while adapting. Errors live inside placeholder nodes.
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Adapter<'a> {
    tables: &'a SideTables,
    origins: Option<&'a SymbolOriginCache>,
    diagnostics: Vec<Diagnostic>,
    /// Bindings of the last `PatternBindingDecl` not yet paired with a `VarDecl`.
    pending: VecDeque<PendingBinding>,
}

/// Adapt one file's syntax tree.
pub fn adapt(path: impl AsRef<Path>, root: &SyntaxNode, tables: &SideTables) -> Adaptation {
    Adapter::new(tables).adapt_file(path.as_ref(), root)
}

/// Adapt one file, sharing symbol origins with the other files of the translation.
pub fn adapt_with_cache(
    path: impl AsRef<Path>,
    root: &SyntaxNode,
    tables: &SideTables,
    origins: &SymbolOriginCache,
) -> Adaptation {
    Adapter::new(tables)
        .with_origin_cache(origins)
        .adapt_file(path.as_ref(), root)
}

impl<'a> Adapter<'a> {
    pub fn new(tables: &'a SideTables) -> Self {
        Adapter {
            tables,
            origins: None,
            diagnostics: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn with_origin_cache(mut self, origins: &'a SymbolOriginCache) -> Self {
        self.origins = Some(origins);
        self
    }

    pub fn adapt_file(mut self, path: &Path, root: &SyntaxNode) -> Adaptation {
        let mut file = SourceFile::new(path);
        for directive in self.tables.directives.all(DirectiveKind::Output) {
            if let Some(target) = &directive.payload {
                file.add_output(target);
            }
        }

        let items: Vec<&SyntaxNode> = if root.kind == SyntaxKind::SourceFile {
            root.children.iter().collect()
        } else {
            vec![root]
        };

        // Comments travel with whatever follows them.
        let mut comments = Vec::new();
        for node in items {
            let stmts = self.adapt_item(node);
            if node.kind == SyntaxKind::Comment {
                comments.extend(stmts);
                continue;
            }
            let target = if node.kind.is_declaration() {
                &mut file.declarations
            } else {
                &mut file.statements
            };
            target.append(&mut comments);
            target.extend(stmts);
        }
        file.statements.append(&mut comments);

        let leftovers = self.flush_pending();
        file.declarations.extend(leftovers);

        log::debug!(
            "{}: adapted {} declarations, {} statements",
            path.display(),
            file.declarations.len(),
            file.statements.len()
        );
        Adaptation {
            file,
            diagnostics: self.diagnostics,
        }
    }

    /// Statements of a code block, with their own binding buffer.
    pub(super) fn adapt_block(&mut self, block: Option<&SyntaxNode>) -> Vec<Stmt> {
        match block {
            Some(block) if block.kind == SyntaxKind::CodeBlock => self.adapt_sequence(block.children.iter()),
            Some(single) => self.adapt_sequence(std::iter::once(single)),
            None => Vec::new(),
        }
    }

    pub(super) fn adapt_sequence<'n>(&mut self, nodes: impl Iterator<Item = &'n SyntaxNode>) -> Vec<Stmt> {
        let outer = std::mem::take(&mut self.pending);
        let mut stmts = Vec::new();
        for node in nodes {
            stmts.extend(self.adapt_item(node));
        }
        stmts.extend(self.flush_pending());
        self.pending = outer;
        stmts
    }

    /// One declaration or statement, after its directives are applied.
    pub(super) fn adapt_item(&mut self, node: &SyntaxNode) -> Vec<Stmt> {
        if self.tables.directives.has(node.offset, DirectiveKind::Ignore) {
            log::trace!("ignoring {:?} at {}", node.kind, node.offset);
            return Vec::new();
        }
        if let Some(code) = self.tables.directives.payload(node.offset, DirectiveKind::Literal) {
            let expr = Expr::LiteralCode(LiteralCodeExpr {
                code: code.to_string(),
                ty: None,
                range: Some(node.range()),
            });
            return vec![Stmt::Expression(ExpressionStmt {
                expr,
                range: Some(node.range()),
            })];
        }

        if node.kind.is_declaration() {
            self.adapt_declaration(node)
        } else {
            self.adapt_statement(node)
        }
    }

    fn flush_pending(&mut self) -> Vec<Stmt> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|binding| {
                let diagnostic = Diagnostic::from_code(
                    ErrorCode::E2004,
                    format!("binding `{}` has no matching declaration", binding.name),
                )
                .with_range(binding.range);
                Stmt::Error(ErrorStmt {
                    diagnostic,
                    range: binding.range,
                })
            })
            .collect()
    }

    pub(super) fn diagnostic(&self, node: &SyntaxNode, code: ErrorCode, message: impl Into<String>) -> Diagnostic {
        Diagnostic::from_code(code, message)
            .with_range(Some(node.range()))
            .with_snapshot(node.to_string())
    }

    pub(super) fn error_stmt(&self, node: &SyntaxNode, code: ErrorCode, message: impl Into<String>) -> Stmt {
        log::debug!("placeholder for {:?} at {}", node.kind, node.offset);
        Stmt::Error(ErrorStmt {
            diagnostic: self.diagnostic(node, code, message),
            range: Some(node.range()),
        })
    }

    pub(super) fn error_expr(&self, node: &SyntaxNode, code: ErrorCode, message: impl Into<String>) -> Expr {
        log::debug!("placeholder for {:?} at {}", node.kind, node.offset);
        Expr::Error(ErrorExpr {
            diagnostic: self.diagnostic(node, code, message),
            range: Some(node.range()),
        })
    }

    pub(super) fn warn(&mut self, node: &SyntaxNode, code: ErrorCode, message: impl Into<String>) {
        let diagnostic = Diagnostic::from_code(code, message).with_range(Some(node.range()));
        self.diagnostics.push(diagnostic);
    }

    /// The resolved type of exactly this node's range.
    pub(super) fn type_of(&self, node: &SyntaxNode) -> Option<String> {
        self.tables.types.get(node.offset, node.length).map(str::to_string)
    }

    /// The spelled type of a `Type` child filling `role`.
    pub(super) fn type_name(node: &SyntaxNode, role: &str) -> Option<String> {
        node.child(role)
            .map(|t| t.text().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub(super) fn access(node: &SyntaxNode) -> Option<String> {
        node.modifiers()
            .find(|m| ACCESS_MODIFIERS.contains(m))
            .map(str::to_string)
    }

    /// Whether the reference at `offset` resolves into the standard library.
    /// Falls back to what other sites recorded for the same name.
    pub(super) fn is_standard_library(&self, offset: u32, name: &str) -> bool {
        if let Some(entry) = self.tables.symbols.get(offset) {
            if let Some(cache) = self.origins {
                cache.record(name, &entry.origin);
            }
            return entry.is_standard_library();
        }
        self.origins
            .and_then(|cache| cache.origin(name))
            .is_some_and(|origin| origin.starts_with(crate::tables::STANDARD_LIBRARY_PREFIX))
    }
}
