//! Traversal and rewriting of the IR.
//!
//! Two flavors, each split into a trait with overridable hooks and a module of
//! `walk_*` functions holding the default structural recursion:
//!
//! - [`Visitor`] + [`walk`]: read-only traversal, used by registry collection.
//! - [`Rewriter`] + [`mut_walk`]: ownership-passing rewrites, used by the
//!   transformation passes. A statement hook returns a `Vec<Stmt>` so a pass
//!   can delete (empty), keep (one) or expand (many).

pub mod mut_walk;
pub mod transform;
pub mod walk;

pub use transform::Rewriter;

use crate::ast::*;
use crate::error::Diagnostic;
use std::cell::RefCell;

/// Trait for visiting IR nodes without modifying them.
pub trait Visitor {
    fn visit_file(&self, file: &SourceFile) {
        walk::walk_file(self, file);
    }

    fn visit_stmt(&self, stmt: &Stmt) {
        walk::walk_stmt(self, stmt);
    }

    fn visit_expr(&self, expr: &Expr) {
        walk::walk_expr(self, expr);
    }
}

struct PlaceholderCollector {
    found: RefCell<Vec<Diagnostic>>,
}

impl Visitor for PlaceholderCollector {
    fn visit_stmt(&self, stmt: &Stmt) {
        if let Stmt::Error(e) = stmt {
            self.found.borrow_mut().push(e.diagnostic.clone());
        }
        walk::walk_stmt(self, stmt);
    }

    fn visit_expr(&self, expr: &Expr) {
        if let Expr::Error(e) = expr {
            self.found.borrow_mut().push(e.diagnostic.clone());
        }
        walk::walk_expr(self, expr);
    }
}

/// The diagnostics carried by every error placeholder in a file, in tree order.
pub fn placeholder_diagnostics(file: &SourceFile) -> Vec<Diagnostic> {
    let collector = PlaceholderCollector {
        found: RefCell::new(Vec::new()),
    };
    collector.visit_file(file);
    collector.found.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::build::*;

    #[test]
    fn test_placeholders_are_found_in_tree_order() {
        let file = source_file(
            "test.swift",
            vec![function("f", vec![error_stmt("first")])],
            vec![expr_stmt(call(decl("g"), vec![(None, error_expr("second"))]))],
        );
        let messages: Vec<String> = placeholder_diagnostics(&file)
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["first".to_string(), "second".to_string()]);
    }
}
