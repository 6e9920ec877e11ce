//! Surface-syntax rewrites: parentheses, anonymous closure parameters and
//! negated guards.

use crate::ast::*;
use crate::visitor::{Rewriter, Visitor, mut_walk, walk};
use std::cell::Cell;

/// Removes parentheses the target syntax makes redundant.
pub struct RemoveParentheses;

/// Expressions that bind at least as tightly as any operator around them.
fn is_atomic(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Paren(_)
            | Expr::Literal(_)
            | Expr::DeclRef(_)
            | Expr::TypeRef(_)
            | Expr::Member(_)
            | Expr::Call(_)
            | Expr::Subscript(_)
            | Expr::Array(_)
            | Expr::Dictionary(_)
            | Expr::Tuple(_)
            | Expr::OptionalUnwrap(_)
            | Expr::ForceUnwrap(_)
            | Expr::Interpolation(_)
            | Expr::Error(_)
    )
}

/// Strip every enclosing pair of parentheses.
fn strip(expr: Expr) -> Expr {
    match expr {
        Expr::Paren(p) => strip(*p.expr),
        other => other,
    }
}

impl Rewriter for RemoveParentheses {
    fn replace_paren(&mut self, paren: ParenExpr) -> Expr {
        let inner = self.replace_expression(*paren.expr);
        if is_atomic(&inner) {
            inner
        } else {
            Expr::Paren(ParenExpr {
                expr: Box::new(inner),
                ..paren
            })
        }
    }

    fn replace_if(&mut self, stmt: IfStmt) -> Vec<Stmt> {
        let mut stmt = mut_walk::walk_if(self, stmt);
        stmt.conditions = stmt
            .conditions
            .into_iter()
            .map(|condition| match condition {
                IfCondition::Condition(e) => IfCondition::Condition(strip(e)),
                declaration => declaration,
            })
            .collect();
        vec![Stmt::If(stmt)]
    }

    fn replace_while(&mut self, stmt: WhileStmt) -> Vec<Stmt> {
        let mut stmt = mut_walk::walk_while(self, stmt);
        stmt.condition = strip(stmt.condition);
        vec![Stmt::While(stmt)]
    }

    fn replace_switch(&mut self, stmt: SwitchStmt) -> Vec<Stmt> {
        let mut stmt = mut_walk::walk_switch(self, stmt);
        stmt.subject = strip(stmt.subject);
        vec![Stmt::Switch(stmt)]
    }

    fn replace_return(&mut self, mut stmt: ReturnStmt) -> Vec<Stmt> {
        stmt.expr = stmt.expr.map(|e| strip(self.replace_expression(e)));
        vec![Stmt::Return(stmt)]
    }

    fn replace_tuple(&mut self, tuple: TupleExpr) -> Expr {
        let mut tuple = mut_walk::walk_tuple(self, tuple);
        for pair in &mut tuple.pairs {
            pair.expr = strip(mut_walk::take_expr(&mut pair.expr));
        }
        Expr::Tuple(tuple)
    }

    fn replace_tuple_shuffle(&mut self, shuffle: TupleShuffleExpr) -> Expr {
        let mut shuffle = mut_walk::walk_tuple_shuffle(self, shuffle);
        for slot in shuffle.expressions_mut() {
            *slot = strip(mut_walk::take_expr(slot));
        }
        Expr::TupleShuffle(shuffle)
    }
}

/// Names closure parameters the source left anonymous (`$0`, `$1`).
///
/// A closure using only `$0` gets the target's implicit `it`; one using more
/// gets explicit `argN` parameters.
pub struct AnonymousParameters;

fn anonymous_index(name: &str) -> Option<usize> {
    name.strip_prefix('$')?.parse().ok()
}

/// Highest `$n` referenced directly in a closure body, ignoring nested closures.
struct HighestAnonymous {
    highest: Cell<Option<usize>>,
}

impl Visitor for HighestAnonymous {
    fn visit_expr(&self, expr: &Expr) {
        match expr {
            Expr::Closure(_) => {}
            Expr::DeclRef(d) => {
                if let Some(index) = anonymous_index(&d.name) {
                    self.highest.set(Some(self.highest.get().map_or(index, |h| h.max(index))));
                }
            }
            _ => walk::walk_expr(self, expr),
        }
    }
}

struct RenameAnonymous {
    implicit: bool,
}

impl Rewriter for RenameAnonymous {
    fn replace_decl_ref(&mut self, mut decl_ref: DeclRefExpr) -> Expr {
        if let Some(index) = anonymous_index(&decl_ref.name) {
            decl_ref.name = if self.implicit {
                "it".to_string()
            } else {
                format!("arg{}", index)
            };
        }
        Expr::DeclRef(decl_ref)
    }

    // Nested closures name their own parameters.
    fn replace_closure(&mut self, closure: ClosureExpr) -> Expr {
        Expr::Closure(closure)
    }
}

impl Rewriter for AnonymousParameters {
    fn replace_closure(&mut self, mut closure: ClosureExpr) -> Expr {
        if closure.parameters.is_empty() {
            let scan = HighestAnonymous {
                highest: Cell::new(None),
            };
            for stmt in &closure.statements {
                scan.visit_stmt(stmt);
            }

            if let Some(highest) = scan.highest.get() {
                let mut rename = RenameAnonymous {
                    implicit: highest == 0,
                };
                closure.statements = rename.replace_statements(closure.statements);
                if highest > 0 {
                    closure.parameters = (0..=highest)
                        .map(|i| ClosureParameter {
                            name: format!("arg{}", i),
                            ty: None,
                        })
                        .collect();
                }
            }
        }
        Expr::Closure(mut_walk::walk_closure(self, closure))
    }
}

/// A guard is emitted as `if (!(condition))`. When the condition is itself a
/// negation, both negations cancel and the guard becomes a plain `if`.
pub struct DoubleNegativesInGuards;

impl Rewriter for DoubleNegativesInGuards {
    fn replace_if(&mut self, stmt: IfStmt) -> Vec<Stmt> {
        let mut stmt = mut_walk::walk_if(self, stmt);
        if !stmt.is_guard
            || stmt.conditions.len() != 1
            || !matches!(stmt.conditions[0], IfCondition::Condition(_))
        {
            return vec![Stmt::If(stmt)];
        }

        let Some(IfCondition::Condition(condition)) = stmt.conditions.pop() else {
            return vec![Stmt::If(stmt)];
        };

        let condition = match strip(condition) {
            Expr::Prefix(prefix) if prefix.op == "!" => {
                stmt.is_guard = false;
                *prefix.operand
            }
            Expr::Binary(mut binary) if binary.op == "!=" => {
                stmt.is_guard = false;
                binary.op = "==".to_string();
                Expr::Binary(binary)
            }
            other => other,
        };
        stmt.conditions.push(IfCondition::Condition(condition));
        vec![Stmt::If(stmt)]
    }
}
