//! Walking functions for rewriters.
//!
//! These functions provide the default recursion for each node type: every
//! child list goes back through [`Rewriter::replace_statements`] and every
//! child expression through [`Rewriter::replace_expression`], so overriding a
//! hook affects the whole tree.

use super::transform::Rewriter;
use crate::ast::*;

/// Rewrite a file, resetting call-scoped state before each top-level node.
pub fn walk_file<R: Rewriter + ?Sized>(rewriter: &mut R, mut file: SourceFile) -> SourceFile {
    let declarations = std::mem::take(&mut file.declarations);
    for stmt in declarations {
        rewriter.reset();
        let replaced = rewriter.replace_statements(vec![stmt]);
        file.declarations.extend(replaced);
    }
    let statements = std::mem::take(&mut file.statements);
    rewriter.reset();
    file.statements = rewriter.replace_statements(statements);
    file
}

pub fn walk_statements<R: Rewriter + ?Sized>(rewriter: &mut R, stmts: Vec<Stmt>) -> Vec<Stmt> {
    stmts
        .into_iter()
        .flat_map(|stmt| rewriter.replace_statement(stmt))
        .collect()
}

/// Dispatch a statement to its kind-specific hook.
pub fn walk_statement<R: Rewriter + ?Sized>(rewriter: &mut R, stmt: Stmt) -> Vec<Stmt> {
    match stmt {
        Stmt::Class(d) => rewriter.replace_class(d),
        Stmt::Struct(d) => rewriter.replace_struct(d),
        Stmt::Protocol(d) => rewriter.replace_protocol(d),
        Stmt::Enum(d) => rewriter.replace_enum(d),
        Stmt::Extension(d) => rewriter.replace_extension(d),
        Stmt::Companion(d) => rewriter.replace_companion(d),
        Stmt::Function(d) => rewriter.replace_function(d),
        Stmt::Variable(d) => rewriter.replace_variable(d),
        Stmt::If(s) => rewriter.replace_if(s),
        Stmt::Switch(s) => rewriter.replace_switch(s),
        Stmt::ForEach(s) => rewriter.replace_for_each(s),
        Stmt::While(s) => rewriter.replace_while(s),
        Stmt::Do(s) => rewriter.replace_do(s),
        Stmt::Catch(s) => rewriter.replace_catch(s),
        Stmt::Defer(s) => rewriter.replace_defer(s),
        Stmt::Throw(s) => rewriter.replace_throw(s),
        Stmt::Return(s) => rewriter.replace_return(s),
        Stmt::Assignment(s) => rewriter.replace_assignment(s),
        Stmt::Expression(s) => rewriter.replace_expression_statement(s),
        other @ (Stmt::Import(_)
        | Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Comment(_)
        | Stmt::Error(_)) => vec![other],
    }
}

pub fn walk_class<R: Rewriter + ?Sized>(rewriter: &mut R, mut decl: ClassDecl) -> ClassDecl {
    decl.members = rewriter.replace_statements(decl.members);
    decl
}

pub fn walk_struct<R: Rewriter + ?Sized>(rewriter: &mut R, mut decl: StructDecl) -> StructDecl {
    decl.members = rewriter.replace_statements(decl.members);
    decl
}

pub fn walk_protocol<R: Rewriter + ?Sized>(rewriter: &mut R, mut decl: ProtocolDecl) -> ProtocolDecl {
    decl.members = rewriter.replace_statements(decl.members);
    decl
}

pub fn walk_enum<R: Rewriter + ?Sized>(rewriter: &mut R, mut decl: EnumDecl) -> EnumDecl {
    for element in &mut decl.elements {
        element.raw_value = element.raw_value.take().map(|e| rewriter.replace_expression(e));
    }
    decl.members = rewriter.replace_statements(decl.members);
    decl
}

pub fn walk_extension<R: Rewriter + ?Sized>(rewriter: &mut R, mut decl: ExtensionDecl) -> ExtensionDecl {
    decl.members = rewriter.replace_statements(decl.members);
    decl
}

pub fn walk_companion<R: Rewriter + ?Sized>(rewriter: &mut R, mut decl: CompanionDecl) -> CompanionDecl {
    decl.members = rewriter.replace_statements(decl.members);
    decl
}

pub fn walk_function<R: Rewriter + ?Sized>(rewriter: &mut R, mut decl: FunctionDecl) -> FunctionDecl {
    for param in &mut decl.parameters {
        param.default = param.default.take().map(|e| rewriter.replace_expression(e));
    }
    decl.body = decl.body.map(|body| rewriter.replace_statements(body));
    decl
}

pub fn walk_variable<R: Rewriter + ?Sized>(rewriter: &mut R, mut decl: VariableDecl) -> VariableDecl {
    decl.initializer = decl.initializer.map(|e| rewriter.replace_expression(e));
    decl.getter = decl.getter.map(|s| rewriter.replace_statements(s));
    decl.setter = decl.setter.map(|s| rewriter.replace_statements(s));
    decl
}

pub fn walk_if<R: Rewriter + ?Sized>(rewriter: &mut R, mut stmt: IfStmt) -> IfStmt {
    stmt.conditions = stmt
        .conditions
        .into_iter()
        .map(|condition| match condition {
            IfCondition::Condition(e) => IfCondition::Condition(rewriter.replace_expression(e)),
            IfCondition::Declaration(v) => IfCondition::Declaration(walk_variable(rewriter, v)),
        })
        .collect();
    stmt.statements = rewriter.replace_statements(stmt.statements);
    stmt.else_statements = stmt.else_statements.map(|s| rewriter.replace_statements(s));
    stmt
}

pub fn walk_switch<R: Rewriter + ?Sized>(rewriter: &mut R, mut stmt: SwitchStmt) -> SwitchStmt {
    stmt.subject = rewriter.replace_expression(stmt.subject);
    stmt.converts_to = stmt.converts_to.map(|target| match target {
        SwitchTarget::Assign(e) => SwitchTarget::Assign(rewriter.replace_expression(e)),
        SwitchTarget::Declare(v) => SwitchTarget::Declare(walk_variable(rewriter, v)),
        SwitchTarget::Return => SwitchTarget::Return,
    });
    for case in &mut stmt.cases {
        let expressions = std::mem::take(&mut case.expressions);
        case.expressions = expressions
            .into_iter()
            .map(|e| rewriter.replace_expression(e))
            .collect();
        let statements = std::mem::take(&mut case.statements);
        case.statements = rewriter.replace_statements(statements);
    }
    stmt
}

pub fn walk_for_each<R: Rewriter + ?Sized>(rewriter: &mut R, mut stmt: ForEachStmt) -> ForEachStmt {
    stmt.variable = rewriter.replace_expression(stmt.variable);
    stmt.collection = rewriter.replace_expression(stmt.collection);
    stmt.statements = rewriter.replace_statements(stmt.statements);
    stmt
}

pub fn walk_while<R: Rewriter + ?Sized>(rewriter: &mut R, mut stmt: WhileStmt) -> WhileStmt {
    stmt.condition = rewriter.replace_expression(stmt.condition);
    stmt.statements = rewriter.replace_statements(stmt.statements);
    stmt
}

pub fn walk_do<R: Rewriter + ?Sized>(rewriter: &mut R, mut stmt: DoStmt) -> DoStmt {
    stmt.statements = rewriter.replace_statements(stmt.statements);
    stmt.finally_statements = rewriter.replace_statements(stmt.finally_statements);
    stmt
}

pub fn walk_catch<R: Rewriter + ?Sized>(rewriter: &mut R, mut stmt: CatchStmt) -> CatchStmt {
    stmt.variable = stmt.variable.map(|v| walk_variable(rewriter, v));
    stmt.statements = rewriter.replace_statements(stmt.statements);
    stmt
}

pub fn walk_defer<R: Rewriter + ?Sized>(rewriter: &mut R, mut stmt: DeferStmt) -> DeferStmt {
    stmt.statements = rewriter.replace_statements(stmt.statements);
    stmt
}

/// Dispatch an expression to its kind-specific hook, or recurse into its children.
pub fn walk_expression<R: Rewriter + ?Sized>(rewriter: &mut R, expr: Expr) -> Expr {
    match expr {
        Expr::DeclRef(e) => rewriter.replace_decl_ref(e),
        Expr::Member(e) => rewriter.replace_member(e),
        Expr::Call(e) => rewriter.replace_call(e),
        Expr::Closure(e) => rewriter.replace_closure(e),
        Expr::Binary(e) => rewriter.replace_binary(e),
        Expr::Prefix(e) => rewriter.replace_prefix(e),
        Expr::Paren(e) => rewriter.replace_paren(e),
        Expr::Tuple(e) => rewriter.replace_tuple(e),
        Expr::TupleShuffle(e) => rewriter.replace_tuple_shuffle(e),
        Expr::Array(mut e) => {
            e.elements = replace_all(rewriter, e.elements);
            Expr::Array(e)
        }
        Expr::Dictionary(mut e) => {
            e.keys = replace_all(rewriter, e.keys);
            e.values = replace_all(rewriter, e.values);
            Expr::Dictionary(e)
        }
        Expr::Subscript(mut e) => {
            e.base = replace_boxed(rewriter, e.base);
            e.index = replace_boxed(rewriter, e.index);
            Expr::Subscript(e)
        }
        Expr::Postfix(mut e) => {
            e.operand = replace_boxed(rewriter, e.operand);
            Expr::Postfix(e)
        }
        Expr::Ternary(mut e) => {
            e.condition = replace_boxed(rewriter, e.condition);
            e.then_expr = replace_boxed(rewriter, e.then_expr);
            e.else_expr = replace_boxed(rewriter, e.else_expr);
            Expr::Ternary(e)
        }
        Expr::OptionalUnwrap(mut e) => {
            e.expr = replace_boxed(rewriter, e.expr);
            Expr::OptionalUnwrap(e)
        }
        Expr::ForceUnwrap(mut e) => {
            e.expr = replace_boxed(rewriter, e.expr);
            Expr::ForceUnwrap(e)
        }
        Expr::Interpolation(mut e) => {
            e.parts = e
                .parts
                .into_iter()
                .map(|part| match part {
                    InterpolationPart::Expr(inner) => {
                        InterpolationPart::Expr(rewriter.replace_expression(inner))
                    }
                    text => text,
                })
                .collect();
            Expr::Interpolation(e)
        }
        other @ (Expr::Literal(_) | Expr::TypeRef(_) | Expr::LiteralCode(_) | Expr::Error(_)) => other,
    }
}

fn replace_all<R: Rewriter + ?Sized>(rewriter: &mut R, exprs: Vec<Expr>) -> Vec<Expr> {
    exprs.into_iter().map(|e| rewriter.replace_expression(e)).collect()
}

fn replace_boxed<R: Rewriter + ?Sized>(rewriter: &mut R, expr: Box<Expr>) -> Box<Expr> {
    Box::new(rewriter.replace_expression(*expr))
}

pub fn walk_member<R: Rewriter + ?Sized>(rewriter: &mut R, mut expr: MemberExpr) -> MemberExpr {
    expr.base = replace_boxed(rewriter, expr.base);
    expr
}

pub fn walk_call<R: Rewriter + ?Sized>(rewriter: &mut R, mut expr: CallExpr) -> CallExpr {
    expr.function = replace_boxed(rewriter, expr.function);
    expr.arguments = replace_boxed(rewriter, expr.arguments);
    expr
}

pub fn walk_closure<R: Rewriter + ?Sized>(rewriter: &mut R, mut expr: ClosureExpr) -> ClosureExpr {
    expr.statements = rewriter.replace_statements(expr.statements);
    expr
}

pub fn walk_binary<R: Rewriter + ?Sized>(rewriter: &mut R, mut expr: BinaryExpr) -> BinaryExpr {
    expr.lhs = replace_boxed(rewriter, expr.lhs);
    expr.rhs = replace_boxed(rewriter, expr.rhs);
    expr
}

pub fn walk_prefix<R: Rewriter + ?Sized>(rewriter: &mut R, mut expr: PrefixExpr) -> PrefixExpr {
    expr.operand = replace_boxed(rewriter, expr.operand);
    expr
}

pub fn walk_paren<R: Rewriter + ?Sized>(rewriter: &mut R, mut expr: ParenExpr) -> ParenExpr {
    expr.expr = replace_boxed(rewriter, expr.expr);
    expr
}

pub fn walk_tuple<R: Rewriter + ?Sized>(rewriter: &mut R, mut expr: TupleExpr) -> TupleExpr {
    for pair in &mut expr.pairs {
        pair.expr = rewriter.replace_expression(take_expr(&mut pair.expr));
    }
    expr
}

pub fn walk_tuple_shuffle<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    mut expr: TupleShuffleExpr,
) -> TupleShuffleExpr {
    for slot in expr.expressions_mut() {
        *slot = rewriter.replace_expression(take_expr(slot));
    }
    expr
}

/// Move an expression out of a slot, leaving an empty literal-code node behind.
pub fn take_expr(slot: &mut Expr) -> Expr {
    std::mem::replace(
        slot,
        Expr::LiteralCode(LiteralCodeExpr {
            code: String::new(),
            ty: None,
            range: None,
        }),
    )
}
