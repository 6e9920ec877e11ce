//! Control-flow rewrites: deferred blocks and early nil returns.

use crate::ast::*;
use crate::visitor::{Rewriter, mut_walk};

/// `defer { d }; rest…` becomes `try { rest… } finally { d }`.
///
/// A later defer in the same block ends up in a nested try, so deferred
/// blocks still run in reverse order.
pub struct DefersToFinally;

fn wrap_defers(mut stmts: Vec<Stmt>) -> Vec<Stmt> {
    let Some(index) = stmts.iter().position(|s| matches!(s, Stmt::Defer(_))) else {
        return stmts;
    };

    let mut tail = stmts.split_off(index);
    let first = tail.remove(0);
    match first {
        Stmt::Defer(defer) if tail.is_empty() => {
            // Nothing left to protect.
            stmts.extend(defer.statements);
        }
        Stmt::Defer(defer) => {
            stmts.push(Stmt::Do(DoStmt {
                statements: wrap_defers(tail),
                finally_statements: defer.statements,
                range: defer.range,
            }));
        }
        other => {
            stmts.push(other);
            stmts.extend(tail);
        }
    }
    stmts
}

impl Rewriter for DefersToFinally {
    fn replace_statements(&mut self, stmts: Vec<Stmt>) -> Vec<Stmt> {
        let stmts = mut_walk::walk_statements(self, stmts);
        wrap_defers(stmts)
    }
}

/// `if (x == nil) { return }` becomes `x ?: return`.
pub struct ReturnIfNil;

/// The non-nil side of `x == nil` or `nil == x`.
fn nil_compared(condition: &Expr) -> Option<&Expr> {
    let Expr::Binary(binary) = condition.unparenthesized() else {
        return None;
    };
    if binary.op != "==" {
        return None;
    }
    match (binary.lhs.is_nil(), binary.rhs.is_nil()) {
        (false, true) => Some(&binary.lhs),
        (true, false) => Some(&binary.rhs),
        _ => None,
    }
}

impl Rewriter for ReturnIfNil {
    fn replace_if(&mut self, stmt: IfStmt) -> Vec<Stmt> {
        let stmt = mut_walk::walk_if(self, stmt);

        let matches_pattern = !stmt.is_guard
            && stmt.else_statements.is_none()
            && matches!(
                stmt.statements.as_slice(),
                [Stmt::Return(ReturnStmt { expr: None, .. })]
            );
        let checked = match stmt.conditions.as_slice() {
            [IfCondition::Condition(condition)] if matches_pattern => {
                nil_compared(condition).cloned()
            }
            _ => None,
        };

        match checked {
            Some(checked) => {
                let expr = Expr::Binary(BinaryExpr {
                    lhs: Box::new(checked),
                    op: "??".to_string(),
                    rhs: Box::new(Expr::LiteralCode(LiteralCodeExpr {
                        code: "return".to_string(),
                        ty: None,
                        range: None,
                    })),
                    ty: None,
                    range: stmt.range,
                });
                vec![Stmt::Expression(ExpressionStmt {
                    expr,
                    range: stmt.range,
                })]
            }
            None => vec![Stmt::If(stmt)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::build::*;

    fn run<R: Rewriter>(mut rewriter: R, statements: Vec<Stmt>) -> Vec<Stmt> {
        rewriter.rewrite_file(file_with_statements(statements)).statements
    }

    #[test]
    fn test_defer_wraps_the_rest_of_the_block() {
        let body = vec![
            expr_stmt(call(decl("open"), vec![])),
            defer(vec![expr_stmt(call(decl("close"), vec![]))]),
            expr_stmt(call(decl("read"), vec![])),
            expr_stmt(call(decl("parse"), vec![])),
        ];
        let out = run(DefersToFinally, vec![function("load", body)]);
        assert_eq!(
            dump_stmts(&out),
            "func load() -> ()\n  open()\n  do\n    read()\n    parse()\n  finally\n    close()\n"
        );
    }

    #[test]
    fn test_later_defers_nest_inside() {
        let out = run(
            DefersToFinally,
            vec![
                defer(vec![expr_stmt(decl("first"))]),
                defer(vec![expr_stmt(decl("second"))]),
                expr_stmt(decl("work")),
            ],
        );
        assert_eq!(
            dump_stmts(&out),
            "do\n  do\n    work\n  finally\n    second\nfinally\n  first\n"
        );
    }

    #[test]
    fn test_trailing_defer_is_inlined() {
        let out = run(
            DefersToFinally,
            vec![expr_stmt(decl("work")), defer(vec![expr_stmt(decl("cleanup"))])],
        );
        assert_eq!(dump_stmts(&out), "work\ncleanup\n");
    }

    #[test]
    fn test_return_if_nil() {
        let out = run(
            ReturnIfNil,
            vec![if_stmt(binary(decl("x"), "==", nil()), vec![ret_void()])],
        );
        assert_eq!(dump_stmts(&out), "x ?? return\n");
    }

    #[test]
    fn test_return_if_nil_accepts_reversed_comparison() {
        let out = run(
            ReturnIfNil,
            vec![if_stmt(paren(binary(nil(), "==", decl("x"))), vec![ret_void()])],
        );
        assert_eq!(dump_stmts(&out), "x ?? return\n");
    }

    #[test]
    fn test_return_if_nil_leaves_other_shapes() {
        let input = vec![
            if_stmt(binary(decl("x"), "==", nil()), vec![ret(int(1))]),
            if_else(binary(decl("x"), "==", nil()), vec![ret_void()], vec![]),
            if_stmt(binary(decl("x"), "!=", nil()), vec![ret_void()]),
            guard(binary(decl("x"), "==", nil()), vec![ret_void()]),
        ];
        let out = run(ReturnIfNil, input.clone());
        assert_eq!(out, input);
    }
}
