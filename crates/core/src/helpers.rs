//! Shared test utilities: IR builders and diagnostic assertions.
//!
//! Used by unit tests across the workspace and by the integration tests of
//! every crate, so IR fixtures read like the source they stand for.

use crate::ast::SourceFile;
use crate::error::Diagnostic;
use crate::passes::PassManager;

/// Format diagnostics as `CODE: message` strings.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .map(|d| match d.code {
            Some(code) => format!("{}: {}", code, d.message),
            None => format!("{}: {}", d.severity, d.message),
        })
        .collect()
}

/// Check if a collection of messages contains a specific code.
#[inline]
pub fn has_code(messages: &[String], code: &str) -> bool {
    messages.iter().any(|m| m.starts_with(code))
}

/// Run both phases of the default pipeline over one file and return the
/// formatted diagnostics.
fn translate_and_get_diagnostics(file: &SourceFile) -> Vec<String> {
    let manager = PassManager::new();
    let (_, _, diagnostics) = manager.run_single(file.clone());
    format_diagnostics(&diagnostics)
}

/// Fluent assertions over the diagnostics the pipeline reports for a file.
///
/// # Example
/// ```ignore
/// DiagnosticTestBuilder::new(file_with_declarations(vec![point_struct]))
///     .expect("W4001")
///     .expect_not("W4003")
///     .assert_all();
/// ```
pub struct DiagnosticTestBuilder {
    file: SourceFile,
    expected_codes: Vec<&'static str>,
    forbidden_codes: Vec<&'static str>,
}

impl DiagnosticTestBuilder {
    pub fn new(file: SourceFile) -> Self {
        Self {
            file,
            expected_codes: Vec::new(),
            forbidden_codes: Vec::new(),
        }
    }

    /// Expect a diagnostic with the given code to be present.
    pub fn expect(mut self, code: &'static str) -> Self {
        self.expected_codes.push(code);
        self
    }

    /// Expect a diagnostic with the given code to NOT be present.
    pub fn expect_not(mut self, code: &'static str) -> Self {
        self.forbidden_codes.push(code);
        self
    }

    /// Panics if any expected diagnostic is missing or any forbidden diagnostic is present.
    pub fn assert_all(self) {
        let diagnostics = translate_and_get_diagnostics(&self.file);

        for code in &self.expected_codes {
            if !has_code(&diagnostics, code) {
                panic!("Expected code {} not found in: {:?}", code, diagnostics);
            }
        }

        for code in &self.forbidden_codes {
            if has_code(&diagnostics, code) {
                panic!("Forbidden code {} found in: {:?}", code, diagnostics);
            }
        }
    }

    pub fn assert_none(self) {
        let diagnostics = translate_and_get_diagnostics(&self.file);
        assert!(
            diagnostics.is_empty(),
            "Expected no diagnostics, but got: {:?}",
            diagnostics
        );
    }
}

/// Terse constructors for IR fixtures. Ranges and types are left empty unless
/// a builder takes them explicitly.
pub mod build {
    use crate::ast::*;
    use crate::error::{Diagnostic, ErrorCode};

    pub fn literal(value: LiteralValue) -> Expr {
        Expr::Literal(LiteralExpr {
            value,
            ty: None,
            range: None,
        })
    }

    pub fn int(value: i64) -> Expr {
        literal(LiteralValue::Int(value))
    }

    pub fn double(value: f64) -> Expr {
        literal(LiteralValue::Double(value))
    }

    pub fn string(value: &str) -> Expr {
        literal(LiteralValue::String(value.to_string()))
    }

    pub fn bool_lit(value: bool) -> Expr {
        literal(LiteralValue::Bool(value))
    }

    pub fn nil() -> Expr {
        literal(LiteralValue::Nil)
    }

    pub fn decl(name: &str) -> Expr {
        Expr::DeclRef(DeclRefExpr {
            name: name.to_string(),
            is_standard_library: false,
            is_implicit: false,
            ty: None,
            range: None,
        })
    }

    pub fn typed_decl(name: &str, ty: &str) -> Expr {
        Expr::DeclRef(DeclRefExpr {
            name: name.to_string(),
            is_standard_library: false,
            is_implicit: false,
            ty: Some(ty.to_string()),
            range: None,
        })
    }

    /// A reference into the source language's standard library.
    pub fn stdlib_decl(name: &str) -> Expr {
        Expr::DeclRef(DeclRefExpr {
            name: name.to_string(),
            is_standard_library: true,
            is_implicit: false,
            ty: None,
            range: None,
        })
    }

    pub fn type_ref(name: &str) -> Expr {
        Expr::TypeRef(TypeRefExpr {
            name: name.to_string(),
            ty: None,
            range: None,
        })
    }

    pub fn member(base: Expr, name: &str) -> Expr {
        Expr::Member(MemberExpr {
            base: Box::new(base),
            member: name.to_string(),
            is_standard_library: false,
            case_style: None,
            ty: None,
            range: None,
        })
    }

    pub fn stdlib_member(base: Expr, name: &str) -> Expr {
        Expr::Member(MemberExpr {
            base: Box::new(base),
            member: name.to_string(),
            is_standard_library: true,
            case_style: None,
            ty: None,
            range: None,
        })
    }

    pub fn args(pairs: Vec<(Option<&str>, Expr)>) -> Expr {
        Expr::Tuple(TupleExpr {
            pairs: pairs
                .into_iter()
                .map(|(label, expr)| LabeledExpr {
                    label: label.map(str::to_string),
                    expr,
                })
                .collect(),
            ty: None,
            range: None,
        })
    }

    pub fn call(function: Expr, arguments: Vec<(Option<&str>, Expr)>) -> Expr {
        call_with(function, args(arguments))
    }

    /// A call whose argument node is built by the caller (tuple or shuffle).
    pub fn call_with(function: Expr, arguments: Expr) -> Expr {
        Expr::Call(CallExpr {
            function: Box::new(function),
            arguments: Box::new(arguments),
            allows_trailing_closure: false,
            is_pure: false,
            ty: None,
            range: None,
        })
    }

    pub fn binary(lhs: Expr, op: &str, rhs: Expr) -> Expr {
        Expr::Binary(BinaryExpr {
            lhs: Box::new(lhs),
            op: op.to_string(),
            rhs: Box::new(rhs),
            ty: None,
            range: None,
        })
    }

    pub fn prefix(op: &str, operand: Expr) -> Expr {
        Expr::Prefix(PrefixExpr {
            op: op.to_string(),
            operand: Box::new(operand),
            ty: None,
            range: None,
        })
    }

    pub fn paren(expr: Expr) -> Expr {
        Expr::Paren(ParenExpr {
            expr: Box::new(expr),
            ty: None,
            range: None,
        })
    }

    pub fn ternary(condition: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
        Expr::Ternary(TernaryExpr {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            ty: None,
            range: None,
        })
    }

    pub fn closure(parameters: &[&str], statements: Vec<Stmt>) -> Expr {
        Expr::Closure(ClosureExpr {
            parameters: parameters
                .iter()
                .map(|name| ClosureParameter {
                    name: name.to_string(),
                    ty: None,
                })
                .collect(),
            statements,
            ty: None,
            range: None,
        })
    }

    pub fn error_expr(message: &str) -> Expr {
        Expr::Error(ErrorExpr {
            diagnostic: Diagnostic::from_code(ErrorCode::E1001, message),
            range: None,
        })
    }

    pub fn expr_stmt(expr: Expr) -> Stmt {
        Stmt::Expression(ExpressionStmt { expr, range: None })
    }

    pub fn assign(lhs: Expr, rhs: Expr) -> Stmt {
        Stmt::Assignment(AssignmentStmt {
            lhs,
            rhs,
            range: None,
        })
    }

    pub fn ret(expr: Expr) -> Stmt {
        Stmt::Return(ReturnStmt {
            expr: Some(expr),
            range: None,
        })
    }

    pub fn ret_void() -> Stmt {
        Stmt::Return(ReturnStmt {
            expr: None,
            range: None,
        })
    }

    pub fn brk() -> Stmt {
        Stmt::Break(BreakStmt { range: None })
    }

    pub fn comment(text: &str) -> Stmt {
        Stmt::Comment(CommentStmt {
            text: text.to_string(),
            range: None,
        })
    }

    pub fn error_stmt(message: &str) -> Stmt {
        Stmt::Error(ErrorStmt {
            diagnostic: Diagnostic::from_code(ErrorCode::E1001, message),
            range: None,
        })
    }

    pub fn let_decl(name: &str, ty: Option<&str>, initializer: Option<Expr>) -> Stmt {
        Stmt::Variable(VariableDecl::simple(name, ty.map(str::to_string), initializer, true))
    }

    pub fn var_decl(name: &str, ty: Option<&str>, initializer: Option<Expr>) -> Stmt {
        Stmt::Variable(VariableDecl::simple(name, ty.map(str::to_string), initializer, false))
    }

    pub fn static_var(name: &str, ty: &str, initializer: Expr) -> Stmt {
        let mut variable = VariableDecl::simple(name, Some(ty.to_string()), Some(initializer), false);
        variable.is_static = true;
        Stmt::Variable(variable)
    }

    pub fn if_stmt(condition: Expr, statements: Vec<Stmt>) -> Stmt {
        Stmt::If(IfStmt {
            conditions: vec![IfCondition::Condition(condition)],
            statements,
            else_statements: None,
            is_guard: false,
            range: None,
        })
    }

    pub fn if_else(condition: Expr, statements: Vec<Stmt>, else_statements: Vec<Stmt>) -> Stmt {
        Stmt::If(IfStmt {
            conditions: vec![IfCondition::Condition(condition)],
            statements,
            else_statements: Some(else_statements),
            is_guard: false,
            range: None,
        })
    }

    /// `guard condition else { statements }`
    pub fn guard(condition: Expr, statements: Vec<Stmt>) -> Stmt {
        Stmt::If(IfStmt {
            conditions: vec![IfCondition::Condition(condition)],
            statements,
            else_statements: None,
            is_guard: true,
            range: None,
        })
    }

    pub fn case(expressions: Vec<Expr>, statements: Vec<Stmt>) -> SwitchCase {
        SwitchCase {
            expressions,
            statements,
            range: None,
        }
    }

    pub fn default_case(statements: Vec<Stmt>) -> SwitchCase {
        case(vec![], statements)
    }

    pub fn switch(subject: Expr, cases: Vec<SwitchCase>) -> Stmt {
        Stmt::Switch(SwitchStmt {
            subject,
            cases,
            converts_to: None,
            range: None,
        })
    }

    pub fn while_stmt(condition: Expr, statements: Vec<Stmt>) -> Stmt {
        Stmt::While(WhileStmt {
            condition,
            statements,
            range: None,
        })
    }

    pub fn defer(statements: Vec<Stmt>) -> Stmt {
        Stmt::Defer(DeferStmt {
            statements,
            range: None,
        })
    }

    pub fn param(label: Option<&str>, name: &str, ty: &str) -> Parameter {
        Parameter {
            label: label.map(str::to_string),
            name: name.to_string(),
            ty: ty.to_string(),
            default: None,
            is_variadic: false,
        }
    }

    pub fn function_decl(
        name: &str,
        parameters: Vec<Parameter>,
        return_type: Option<&str>,
        body: Vec<Stmt>,
    ) -> FunctionDecl {
        FunctionDecl {
            name: name.to_string(),
            kind: FunctionKind::Function,
            generics: Vec::new(),
            parameters,
            return_type: return_type.map(str::to_string),
            body: Some(body),
            access: None,
            is_static: false,
            is_override: false,
            is_mutating: false,
            throws: false,
            is_pure: false,
            extends_type: None,
            range: None,
        }
    }

    /// A parameterless function returning nothing.
    pub fn function(name: &str, body: Vec<Stmt>) -> Stmt {
        Stmt::Function(function_decl(name, vec![], None, body))
    }

    pub fn function_with(
        name: &str,
        parameters: Vec<Parameter>,
        return_type: Option<&str>,
        body: Vec<Stmt>,
    ) -> Stmt {
        Stmt::Function(function_decl(name, parameters, return_type, body))
    }

    pub fn initializer(parameters: Vec<Parameter>, failable: bool, body: Vec<Stmt>) -> Stmt {
        let mut decl = function_decl("init", parameters, None, body);
        decl.kind = FunctionKind::Initializer { failable };
        Stmt::Function(decl)
    }

    pub fn class_decl(name: &str, inherits: &[&str], members: Vec<Stmt>) -> Stmt {
        Stmt::Class(ClassDecl {
            name: name.to_string(),
            generics: Vec::new(),
            inherits: inherits.iter().map(|s| s.to_string()).collect(),
            members,
            access: None,
            is_final: false,
            range: None,
        })
    }

    pub fn struct_decl(name: &str, inherits: &[&str], members: Vec<Stmt>) -> Stmt {
        Stmt::Struct(StructDecl {
            name: name.to_string(),
            generics: Vec::new(),
            inherits: inherits.iter().map(|s| s.to_string()).collect(),
            members,
            access: None,
            range: None,
        })
    }

    pub fn protocol_decl(name: &str, members: Vec<Stmt>) -> Stmt {
        Stmt::Protocol(ProtocolDecl {
            name: name.to_string(),
            inherits: Vec::new(),
            members,
            access: None,
            range: None,
        })
    }

    pub fn element(name: &str, values: &[(Option<&str>, &str)]) -> EnumElement {
        EnumElement {
            name: name.to_string(),
            associated_values: values
                .iter()
                .map(|(label, ty)| LabeledType {
                    label: label.map(str::to_string),
                    ty: ty.to_string(),
                })
                .collect(),
            raw_value: None,
            range: None,
        }
    }

    pub fn enum_decl(name: &str, inherits: &[&str], elements: Vec<EnumElement>) -> Stmt {
        Stmt::Enum(EnumDecl {
            name: name.to_string(),
            inherits: inherits.iter().map(|s| s.to_string()).collect(),
            elements,
            members: Vec::new(),
            access: None,
            kind: None,
            range: None,
        })
    }

    pub fn extension_decl(type_name: &str, members: Vec<Stmt>) -> Stmt {
        Stmt::Extension(ExtensionDecl {
            type_name: type_name.to_string(),
            inherits: Vec::new(),
            members,
            range: None,
        })
    }

    pub fn file_with_declarations(declarations: Vec<Stmt>) -> SourceFile {
        SourceFile {
            declarations,
            ..SourceFile::new("test.swift")
        }
    }

    pub fn file_with_statements(statements: Vec<Stmt>) -> SourceFile {
        SourceFile {
            statements,
            ..SourceFile::new("test.swift")
        }
    }

    pub fn source_file(path: &str, declarations: Vec<Stmt>, statements: Vec<Stmt>) -> SourceFile {
        SourceFile {
            declarations,
            statements,
            ..SourceFile::new(path)
        }
    }
}
