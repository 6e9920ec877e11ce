//! Ownership-passing IR rewriting.
//!
//! A [`Rewriter`] receives every node by value and hands back its
//! replacement. Default hook implementations recurse structurally through
//! [`mut_walk`](super::mut_walk), so a pass overrides only the hooks for the
//! node kinds it cares about:
//!
//! ```rust,ignore
//! struct RenamePrint;
//!
//! impl Rewriter for RenamePrint {
//!     fn replace_decl_ref(&mut self, mut decl_ref: DeclRefExpr) -> Expr {
//!         if decl_ref.name == "print" {
//!             decl_ref.name = "println".to_string();
//!         }
//!         Expr::DeclRef(decl_ref)
//!     }
//! }
//! ```
//!
//! Error placeholders are passed through untouched by every default hook.

use super::mut_walk;
use crate::ast::*;
use crate::error::Diagnostic;

/// Trait for rewriting IR nodes.
pub trait Rewriter {
    /// Clear call-scoped state. Called before each top-level declaration or statement.
    fn reset(&mut self) {}

    /// Diagnostics produced since the last call.
    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn rewrite_file(&mut self, file: SourceFile) -> SourceFile {
        mut_walk::walk_file(self, file)
    }

    fn replace_statements(&mut self, stmts: Vec<Stmt>) -> Vec<Stmt> {
        mut_walk::walk_statements(self, stmts)
    }

    fn replace_statement(&mut self, stmt: Stmt) -> Vec<Stmt> {
        mut_walk::walk_statement(self, stmt)
    }

    fn replace_class(&mut self, decl: ClassDecl) -> Vec<Stmt> {
        vec![Stmt::Class(mut_walk::walk_class(self, decl))]
    }

    fn replace_struct(&mut self, decl: StructDecl) -> Vec<Stmt> {
        vec![Stmt::Struct(mut_walk::walk_struct(self, decl))]
    }

    fn replace_protocol(&mut self, decl: ProtocolDecl) -> Vec<Stmt> {
        vec![Stmt::Protocol(mut_walk::walk_protocol(self, decl))]
    }

    fn replace_enum(&mut self, decl: EnumDecl) -> Vec<Stmt> {
        vec![Stmt::Enum(mut_walk::walk_enum(self, decl))]
    }

    fn replace_extension(&mut self, decl: ExtensionDecl) -> Vec<Stmt> {
        vec![Stmt::Extension(mut_walk::walk_extension(self, decl))]
    }

    fn replace_companion(&mut self, decl: CompanionDecl) -> Vec<Stmt> {
        vec![Stmt::Companion(mut_walk::walk_companion(self, decl))]
    }

    fn replace_function(&mut self, decl: FunctionDecl) -> Vec<Stmt> {
        vec![Stmt::Function(mut_walk::walk_function(self, decl))]
    }

    fn replace_variable(&mut self, decl: VariableDecl) -> Vec<Stmt> {
        vec![Stmt::Variable(mut_walk::walk_variable(self, decl))]
    }

    fn replace_if(&mut self, stmt: IfStmt) -> Vec<Stmt> {
        vec![Stmt::If(mut_walk::walk_if(self, stmt))]
    }

    fn replace_switch(&mut self, stmt: SwitchStmt) -> Vec<Stmt> {
        vec![Stmt::Switch(mut_walk::walk_switch(self, stmt))]
    }

    fn replace_for_each(&mut self, stmt: ForEachStmt) -> Vec<Stmt> {
        vec![Stmt::ForEach(mut_walk::walk_for_each(self, stmt))]
    }

    fn replace_while(&mut self, stmt: WhileStmt) -> Vec<Stmt> {
        vec![Stmt::While(mut_walk::walk_while(self, stmt))]
    }

    fn replace_do(&mut self, stmt: DoStmt) -> Vec<Stmt> {
        vec![Stmt::Do(mut_walk::walk_do(self, stmt))]
    }

    fn replace_catch(&mut self, stmt: CatchStmt) -> Vec<Stmt> {
        vec![Stmt::Catch(mut_walk::walk_catch(self, stmt))]
    }

    fn replace_defer(&mut self, stmt: DeferStmt) -> Vec<Stmt> {
        vec![Stmt::Defer(mut_walk::walk_defer(self, stmt))]
    }

    fn replace_throw(&mut self, mut stmt: ThrowStmt) -> Vec<Stmt> {
        stmt.expr = self.replace_expression(stmt.expr);
        vec![Stmt::Throw(stmt)]
    }

    fn replace_return(&mut self, mut stmt: ReturnStmt) -> Vec<Stmt> {
        stmt.expr = stmt.expr.map(|e| self.replace_expression(e));
        vec![Stmt::Return(stmt)]
    }

    fn replace_assignment(&mut self, mut stmt: AssignmentStmt) -> Vec<Stmt> {
        stmt.lhs = self.replace_expression(stmt.lhs);
        stmt.rhs = self.replace_expression(stmt.rhs);
        vec![Stmt::Assignment(stmt)]
    }

    fn replace_expression_statement(&mut self, mut stmt: ExpressionStmt) -> Vec<Stmt> {
        stmt.expr = self.replace_expression(stmt.expr);
        vec![Stmt::Expression(stmt)]
    }

    fn replace_expression(&mut self, expr: Expr) -> Expr {
        mut_walk::walk_expression(self, expr)
    }

    fn replace_decl_ref(&mut self, expr: DeclRefExpr) -> Expr {
        Expr::DeclRef(expr)
    }

    fn replace_member(&mut self, expr: MemberExpr) -> Expr {
        Expr::Member(mut_walk::walk_member(self, expr))
    }

    fn replace_call(&mut self, expr: CallExpr) -> Expr {
        Expr::Call(mut_walk::walk_call(self, expr))
    }

    fn replace_closure(&mut self, expr: ClosureExpr) -> Expr {
        Expr::Closure(mut_walk::walk_closure(self, expr))
    }

    fn replace_binary(&mut self, expr: BinaryExpr) -> Expr {
        Expr::Binary(mut_walk::walk_binary(self, expr))
    }

    fn replace_prefix(&mut self, expr: PrefixExpr) -> Expr {
        Expr::Prefix(mut_walk::walk_prefix(self, expr))
    }

    fn replace_paren(&mut self, expr: ParenExpr) -> Expr {
        Expr::Paren(mut_walk::walk_paren(self, expr))
    }

    fn replace_tuple(&mut self, expr: TupleExpr) -> Expr {
        Expr::Tuple(mut_walk::walk_tuple(self, expr))
    }

    fn replace_tuple_shuffle(&mut self, expr: TupleShuffleExpr) -> Expr {
        Expr::TupleShuffle(mut_walk::walk_tuple_shuffle(self, expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::build::*;

    struct RenamePrint;

    impl Rewriter for RenamePrint {
        fn replace_decl_ref(&mut self, mut decl_ref: DeclRefExpr) -> Expr {
            if decl_ref.name == "print" {
                decl_ref.name = "println".to_string();
            }
            Expr::DeclRef(decl_ref)
        }
    }

    struct DropComments;

    impl Rewriter for DropComments {
        fn replace_statement(&mut self, stmt: Stmt) -> Vec<Stmt> {
            match stmt {
                Stmt::Comment(_) => vec![],
                other => mut_walk::walk_statement(self, other),
            }
        }
    }

    struct Duplicate;

    impl Rewriter for Duplicate {
        fn replace_expression_statement(&mut self, stmt: ExpressionStmt) -> Vec<Stmt> {
            vec![Stmt::Expression(stmt.clone()), Stmt::Expression(stmt)]
        }
    }

    #[test]
    fn test_rewrites_nested_expressions() {
        let body = vec![if_stmt(
            binary(decl("a"), "==", int(1)),
            vec![expr_stmt(call(decl("print"), vec![(None, string("x"))]))],
        )];
        let file = file_with_statements(body);

        let rewritten = RenamePrint.rewrite_file(file);
        let dump = dump_stmts(&rewritten.statements);
        assert!(dump.contains("println(\"x\")"), "{}", dump);
    }

    #[test]
    fn test_statement_deletion_reaches_nested_blocks() {
        let func = function(
            "f",
            vec![comment("gone"), expr_stmt(decl("x")), while_stmt(bool_lit(true), vec![comment("also gone")])],
        );
        let file = file_with_declarations(vec![func]);

        let rewritten = DropComments.rewrite_file(file);
        let dump = dump_stmts(&rewritten.declarations);
        assert!(!dump.contains("gone"), "{}", dump);
        assert!(dump.contains("while true"));
    }

    #[test]
    fn test_statement_expansion() {
        let file = file_with_statements(vec![expr_stmt(decl("x"))]);
        let rewritten = Duplicate.rewrite_file(file);
        assert_eq!(rewritten.statements.len(), 2);
    }

    #[test]
    fn test_error_placeholders_pass_through() {
        let file = file_with_statements(vec![error_stmt("nope"), expr_stmt(error_expr("bad"))]);
        let rewritten = RenamePrint.rewrite_file(file.clone());
        assert_eq!(rewritten, file);
    }
}
