//! Statement and declaration nodes.

use super::display::expr_to_string;
use super::expr::Expr;
use crate::error::Diagnostic;
use text_size::TextRange;

/// Statement types.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Import(ImportDecl),
    Class(ClassDecl),
    Struct(StructDecl),
    Protocol(ProtocolDecl),
    Enum(EnumDecl),
    Extension(ExtensionDecl),
    Companion(CompanionDecl),
    Function(FunctionDecl),
    Variable(VariableDecl),
    If(IfStmt),
    Switch(SwitchStmt),
    ForEach(ForEachStmt),
    While(WhileStmt),
    Do(DoStmt),
    Catch(CatchStmt),
    Defer(DeferStmt),
    Throw(ThrowStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Assignment(AssignmentStmt),
    Expression(ExpressionStmt),
    Comment(CommentStmt),
    Error(ErrorStmt),
}

impl Stmt {
    pub fn range(&self) -> Option<TextRange> {
        match self {
            Stmt::Import(s) => s.range,
            Stmt::Class(s) => s.range,
            Stmt::Struct(s) => s.range,
            Stmt::Protocol(s) => s.range,
            Stmt::Enum(s) => s.range,
            Stmt::Extension(s) => s.range,
            Stmt::Companion(s) => s.range,
            Stmt::Function(s) => s.range,
            Stmt::Variable(s) => s.range,
            Stmt::If(s) => s.range,
            Stmt::Switch(s) => s.range,
            Stmt::ForEach(s) => s.range,
            Stmt::While(s) => s.range,
            Stmt::Do(s) => s.range,
            Stmt::Catch(s) => s.range,
            Stmt::Defer(s) => s.range,
            Stmt::Throw(s) => s.range,
            Stmt::Return(s) => s.range,
            Stmt::Break(s) => s.range,
            Stmt::Continue(s) => s.range,
            Stmt::Assignment(s) => s.range,
            Stmt::Expression(s) => s.range,
            Stmt::Comment(s) => s.range,
            Stmt::Error(s) => s.range,
        }
    }

    /// Short kind name used in logs and IR dumps.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Import(_) => "import",
            Stmt::Class(_) => "class",
            Stmt::Struct(_) => "struct",
            Stmt::Protocol(_) => "protocol",
            Stmt::Enum(_) => "enum",
            Stmt::Extension(_) => "extension",
            Stmt::Companion(_) => "companion",
            Stmt::Function(_) => "function",
            Stmt::Variable(_) => "variable",
            Stmt::If(_) => "if",
            Stmt::Switch(_) => "switch",
            Stmt::ForEach(_) => "for-each",
            Stmt::While(_) => "while",
            Stmt::Do(_) => "do",
            Stmt::Catch(_) => "catch",
            Stmt::Defer(_) => "defer",
            Stmt::Throw(_) => "throw",
            Stmt::Return(_) => "return",
            Stmt::Break(_) => "break",
            Stmt::Continue(_) => "continue",
            Stmt::Assignment(_) => "assignment",
            Stmt::Expression(_) => "expression",
            Stmt::Comment(_) => "comment",
            Stmt::Error(_) => "error",
        }
    }

    /// A bare expression statement whose expression is a call.
    pub fn is_call_statement(&self) -> bool {
        matches!(self, Stmt::Expression(ExpressionStmt { expr: Expr::Call(_), .. }))
    }

    /// Whether this is a static member declaration.
    pub fn is_static(&self) -> bool {
        match self {
            Stmt::Function(f) => f.is_static,
            Stmt::Variable(v) => v.is_static,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub module: String,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub inherits: Vec<String>,
    pub members: Vec<Stmt>,
    pub access: Option<String>,
    pub is_final: bool,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub inherits: Vec<String>,
    pub members: Vec<Stmt>,
    pub access: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolDecl {
    pub name: String,
    pub inherits: Vec<String>,
    pub members: Vec<Stmt>,
    pub access: Option<String>,
    pub range: Option<TextRange>,
}

/// Whole-declaration classification of a tagged union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    /// No case carries data; emitted as an enum class.
    PayloadFree,
    /// At least one case carries data; emitted as a sealed hierarchy.
    HasPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledType {
    pub label: Option<String>,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumElement {
    pub name: String,
    pub associated_values: Vec<LabeledType>,
    pub raw_value: Option<Expr>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub inherits: Vec<String>,
    pub elements: Vec<EnumElement>,
    pub members: Vec<Stmt>,
    pub access: Option<String>,
    /// Filled in by the collection phase.
    pub kind: Option<EnumKind>,
    pub range: Option<TextRange>,
}

impl EnumDecl {
    pub fn has_payload_cases(&self) -> bool {
        self.elements.iter().any(|e| !e.associated_values.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionDecl {
    pub type_name: String,
    pub inherits: Vec<String>,
    pub members: Vec<Stmt>,
    pub range: Option<TextRange>,
}

/// Container for the static members of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionDecl {
    pub members: Vec<Stmt>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Initializer { failable: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// External argument label; `None` for `_`.
    pub label: Option<String>,
    /// Internal parameter name.
    pub name: String,
    pub ty: String,
    pub default: Option<Expr>,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub kind: FunctionKind,
    pub generics: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub body: Option<Vec<Stmt>>,
    pub access: Option<String>,
    pub is_static: bool,
    pub is_override: bool,
    pub is_mutating: bool,
    pub throws: bool,
    pub is_pure: bool,
    /// Receiver type when the function was declared in an extension.
    pub extends_type: Option<String>,
    pub range: Option<TextRange>,
}

impl FunctionDecl {
    pub fn is_initializer(&self) -> bool {
        matches!(self.kind, FunctionKind::Initializer { .. })
    }

    /// The external labels, in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = Option<&str>> {
        self.parameters.iter().map(|p| p.label.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub ty: Option<String>,
    pub initializer: Option<Expr>,
    pub is_let: bool,
    pub is_static: bool,
    pub getter: Option<Vec<Stmt>>,
    pub setter: Option<Vec<Stmt>>,
    pub access: Option<String>,
    pub extends_type: Option<String>,
    pub range: Option<TextRange>,
}

impl VariableDecl {
    /// A local or stored binding with nothing but a name, a type and an optional value.
    pub fn simple(name: impl Into<String>, ty: Option<String>, initializer: Option<Expr>, is_let: bool) -> Self {
        VariableDecl {
            name: name.into(),
            ty,
            initializer,
            is_let,
            is_static: false,
            getter: None,
            setter: None,
            access: None,
            extends_type: None,
            range: None,
        }
    }

    pub fn is_computed(&self) -> bool {
        self.getter.is_some()
    }
}

/// One clause of an `if` or `guard` condition list.
#[derive(Debug, Clone, PartialEq)]
pub enum IfCondition {
    Condition(Expr),
    /// `if let x = e`: binds `x` when `e` is not nil.
    Declaration(VariableDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub conditions: Vec<IfCondition>,
    pub statements: Vec<Stmt>,
    /// An `else if` is an else branch holding exactly one `If`.
    pub else_statements: Option<Vec<Stmt>>,
    pub is_guard: bool,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Empty for the default case.
    pub expressions: Vec<Expr>,
    pub statements: Vec<Stmt>,
    pub range: Option<TextRange>,
}

impl SwitchCase {
    pub fn is_default(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// What receives the value of a switch that was turned into an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchTarget {
    Return,
    Assign(Expr),
    Declare(VariableDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub subject: Expr,
    pub cases: Vec<SwitchCase>,
    pub converts_to: Option<SwitchTarget>,
    pub range: Option<TextRange>,
}

impl SwitchStmt {
    fn mentions_subject(&self, expr: &Expr) -> bool {
        expr_to_string(expr.unparenthesized()) == expr_to_string(self.subject.unparenthesized())
    }

    /// `subject is T`, which the target's subject form spells as `is T`.
    pub fn is_subject_check(&self, expr: &Expr) -> bool {
        matches!(expr.unparenthesized(), Expr::Binary(b) if b.op == "is" && self.mentions_subject(&b.lhs))
    }

    /// A case expression that is a boolean test of its own rather than a
    /// value compared against the subject.
    pub fn is_condition(&self, expr: &Expr) -> bool {
        match expr.unparenthesized() {
            Expr::Binary(b) if matches!(b.op.as_str(), "&&" | "||" | "<" | ">" | "<=" | ">=" | "!=") => true,
            Expr::Prefix(p) => p.op == "!",
            Expr::Binary(b) if b.op == "is" || b.op == "==" => self.mentions_subject(&b.lhs),
            _ => false,
        }
    }

    /// Whether some case needs the subjectless form, where each branch is a
    /// full condition.
    pub fn uses_conditions(&self) -> bool {
        self.cases
            .iter()
            .flat_map(|c| c.expressions.iter())
            .any(|e| self.is_condition(e) && !self.is_subject_check(e))
    }

    /// Whether `expr` reads a member of the subject (`subject.field`).
    pub fn reads_subject_member(&self, expr: &Expr) -> bool {
        matches!(expr.unparenthesized(), Expr::Member(m) if self.mentions_subject(&m.base))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStmt {
    /// A declaration reference or a tuple of them.
    pub variable: Expr,
    pub collection: Expr,
    pub statements: Vec<Stmt>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub statements: Vec<Stmt>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoStmt {
    pub statements: Vec<Stmt>,
    pub finally_statements: Vec<Stmt>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchStmt {
    pub variable: Option<VariableDecl>,
    pub statements: Vec<Stmt>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferStmt {
    pub statements: Vec<Stmt>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub expr: Expr,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub expr: Option<Expr>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub lhs: Expr,
    pub rhs: Expr,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expr: Expr,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentStmt {
    pub text: String,
    pub range: Option<TextRange>,
}

/// Placeholder for a statement or declaration that could not be translated.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorStmt {
    pub diagnostic: Diagnostic,
    pub range: Option<TextRange>,
}
