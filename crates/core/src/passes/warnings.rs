//! Passes that only report.

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode};
use crate::visitor::{Rewriter, mut_walk};

/// Value types become reference types in the target, so a mutable stored
/// property on a struct can now be changed through a shared copy.
#[derive(Default)]
pub struct MutableValueTypes {
    diagnostics: Vec<Diagnostic>,
}

impl Rewriter for MutableValueTypes {
    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn replace_struct(&mut self, decl: StructDecl) -> Vec<Stmt> {
        let decl = mut_walk::walk_struct(self, decl);
        for member in &decl.members {
            if let Stmt::Variable(v) = member
                && !v.is_let
                && !v.is_static
                && !v.is_computed()
            {
                self.diagnostics.push(
                    Diagnostic::from_code(
                        ErrorCode::W4001,
                        format!("struct `{}` has mutable stored property `{}`", decl.name, v.name),
                    )
                    .with_range(v.range),
                );
            }
        }
        vec![Stmt::Struct(decl)]
    }

    fn replace_expression(&mut self, expr: Expr) -> Expr {
        expr
    }
}
