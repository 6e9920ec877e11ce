//! Expression nodes.

use super::stmt::Stmt;
use crate::error::Diagnostic;
use text_size::TextRange;
use thiserror::Error;

/// Expression types.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Array(ArrayExpr),
    Dictionary(DictionaryExpr),
    DeclRef(DeclRefExpr),
    Member(MemberExpr),
    Call(CallExpr),
    Closure(ClosureExpr),
    Subscript(SubscriptExpr),
    Prefix(PrefixExpr),
    Postfix(PostfixExpr),
    Binary(BinaryExpr),
    Ternary(TernaryExpr),
    TypeRef(TypeRefExpr),
    Tuple(TupleExpr),
    TupleShuffle(TupleShuffleExpr),
    Paren(ParenExpr),
    OptionalUnwrap(OptionalUnwrapExpr),
    ForceUnwrap(ForceUnwrapExpr),
    Interpolation(InterpolationExpr),
    LiteralCode(LiteralCodeExpr),
    Error(ErrorExpr),
}

impl Expr {
    pub fn range(&self) -> Option<TextRange> {
        match self {
            Expr::Literal(e) => e.range,
            Expr::Array(e) => e.range,
            Expr::Dictionary(e) => e.range,
            Expr::DeclRef(e) => e.range,
            Expr::Member(e) => e.range,
            Expr::Call(e) => e.range,
            Expr::Closure(e) => e.range,
            Expr::Subscript(e) => e.range,
            Expr::Prefix(e) => e.range,
            Expr::Postfix(e) => e.range,
            Expr::Binary(e) => e.range,
            Expr::Ternary(e) => e.range,
            Expr::TypeRef(e) => e.range,
            Expr::Tuple(e) => e.range,
            Expr::TupleShuffle(e) => e.range,
            Expr::Paren(e) => e.range,
            Expr::OptionalUnwrap(e) => e.range,
            Expr::ForceUnwrap(e) => e.range,
            Expr::Interpolation(e) => e.range,
            Expr::LiteralCode(e) => e.range,
            Expr::Error(e) => e.range,
        }
    }

    /// The resolved type name, when the front end could determine one.
    pub fn ty(&self) -> Option<&str> {
        let ty = match self {
            Expr::Literal(e) => &e.ty,
            Expr::Array(e) => &e.ty,
            Expr::Dictionary(e) => &e.ty,
            Expr::DeclRef(e) => &e.ty,
            Expr::Member(e) => &e.ty,
            Expr::Call(e) => &e.ty,
            Expr::Closure(e) => &e.ty,
            Expr::Subscript(e) => &e.ty,
            Expr::Prefix(e) => &e.ty,
            Expr::Postfix(e) => &e.ty,
            Expr::Binary(e) => &e.ty,
            Expr::Ternary(e) => &e.ty,
            Expr::TypeRef(e) => &e.ty,
            Expr::Tuple(e) => &e.ty,
            Expr::TupleShuffle(e) => &e.ty,
            Expr::Paren(e) => &e.ty,
            Expr::OptionalUnwrap(e) => &e.ty,
            Expr::ForceUnwrap(e) => &e.ty,
            Expr::Interpolation(e) => &e.ty,
            Expr::LiteralCode(e) => &e.ty,
            Expr::Error(_) => return None,
        };
        ty.as_deref()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Expr::Error(_))
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren(p) = expr {
            expr = &p.expr;
        }
        expr
    }

    /// Name of a plain declaration reference, if this is one.
    pub fn as_decl_name(&self) -> Option<&str> {
        match self.unparenthesized() {
            Expr::DeclRef(d) => Some(&d.name),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(
            self.unparenthesized(),
            Expr::Literal(LiteralExpr {
                value: LiteralValue::Nil,
                ..
            })
        )
    }
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    UInt(u64),
    Double(f64),
    Float(f32),
    Bool(bool),
    String(String),
    Character(String),
    Nil,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub elements: Vec<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryExpr {
    pub keys: Vec<Expr>,
    pub values: Vec<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

/// A reference to a declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclRefExpr {
    pub name: String,
    /// The referenced declaration comes from the source language's standard library.
    pub is_standard_library: bool,
    /// Synthesized by the source compiler (for example an implicit `self`).
    pub is_implicit: bool,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

/// How a reference to a tagged-union case must be spelled at emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStyle {
    /// Case of a has-payload union: a subtype, spelled in capitalized camel case.
    Payload,
    /// Case of a payload-free union: an enum constant, spelled in upper snake case.
    PayloadFree,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub base: Box<Expr>,
    pub member: String,
    pub is_standard_library: bool,
    /// Set once the member is known to name a tagged-union case.
    pub case_style: Option<CaseStyle>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub function: Box<Expr>,
    /// Either a [`TupleExpr`] or a [`TupleShuffleExpr`].
    pub arguments: Box<Expr>,
    /// The last argument was written as a trailing closure.
    pub allows_trailing_closure: bool,
    pub is_pure: bool,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

impl CallExpr {
    /// The callee's base name, looking through member accesses.
    pub fn function_name(&self) -> Option<&str> {
        match self.function.unparenthesized() {
            Expr::DeclRef(d) => Some(&d.name),
            Expr::TypeRef(t) => Some(&t.name),
            Expr::Member(m) => Some(&m.member),
            _ => None,
        }
    }

    /// Argument labels as written at the call site (one per parameter slot for shuffles).
    pub fn labels(&self) -> Vec<Option<String>> {
        match self.arguments.as_ref() {
            Expr::Tuple(t) => t.pairs.iter().map(|p| p.label.clone()).collect(),
            Expr::TupleShuffle(s) => s.labels().to_vec(),
            _ => Vec::new(),
        }
    }

    /// The lookup key used by the function registry: `name(label:_:)`.
    pub fn signature_key(&self) -> Option<String> {
        let name = self.function_name()?;
        Some(signature_key(name, self.labels().iter().map(|l| l.as_deref())))
    }
}

/// Builds a `name(label:_:)` key from a base name and a label list.
pub fn signature_key<'a>(name: &str, labels: impl IntoIterator<Item = Option<&'a str>>) -> String {
    let mut key = String::from(name);
    key.push('(');
    for label in labels {
        key.push_str(label.unwrap_or("_"));
        key.push(':');
    }
    key.push(')');
    key
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureParameter {
    pub name: String,
    pub ty: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureExpr {
    pub parameters: Vec<ClosureParameter>,
    pub statements: Vec<Stmt>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptExpr {
    pub base: Box<Expr>,
    pub index: Box<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    pub op: String,
    pub operand: Box<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostfixExpr {
    pub op: String,
    pub operand: Box<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

/// Binary operator application. Casts and type checks (`as`, `as?`, `as!`, `is`)
/// are binaries whose right operand is a [`TypeRefExpr`].
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub lhs: Box<Expr>,
    pub op: String,
    pub rhs: Box<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRefExpr {
    pub name: String,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledExpr {
    pub label: Option<String>,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpr {
    pub pairs: Vec<LabeledExpr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

/// Where one parameter slot of a shuffled call gets its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleIndex {
    /// The parameter's default value is used.
    Absent,
    /// The next supplied expression.
    Present,
    /// The next `count` supplied expressions, captured by a variadic parameter.
    Variadic { count: usize },
}

impl ShuffleIndex {
    /// How many supplied expressions this slot consumes.
    pub fn width(&self) -> usize {
        match self {
            ShuffleIndex::Absent => 0,
            ShuffleIndex::Present => 1,
            ShuffleIndex::Variadic { count } => *count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShuffleError {
    #[error("tuple shuffle has {labels} labels but {indices} indices")]
    LengthMismatch { labels: usize, indices: usize },

    #[error("tuple shuffle slots consume {expected} expressions but {actual} were supplied")]
    ExpressionCount { expected: usize, actual: usize },
}

/// Call arguments rebound to parameter order, accounting for defaults and
/// variadic capture.
///
/// The fields are private so the slot invariants always hold: there is one
/// label per index, and the indices consume exactly the supplied expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleShuffleExpr {
    labels: Vec<Option<String>>,
    indices: Vec<ShuffleIndex>,
    expressions: Vec<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

impl TupleShuffleExpr {
    pub fn new(
        labels: Vec<Option<String>>,
        indices: Vec<ShuffleIndex>,
        expressions: Vec<Expr>,
    ) -> Result<Self, ShuffleError> {
        Self::check(&labels, &indices, expressions.len())?;
        Ok(TupleShuffleExpr {
            labels,
            indices,
            expressions,
            ty: None,
            range: None,
        })
    }

    fn check(
        labels: &[Option<String>],
        indices: &[ShuffleIndex],
        supplied: usize,
    ) -> Result<(), ShuffleError> {
        if labels.len() != indices.len() {
            return Err(ShuffleError::LengthMismatch {
                labels: labels.len(),
                indices: indices.len(),
            });
        }
        let expected: usize = indices.iter().map(ShuffleIndex::width).sum();
        if expected != supplied {
            return Err(ShuffleError::ExpressionCount {
                expected,
                actual: supplied,
            });
        }
        Ok(())
    }

    pub fn with_range(mut self, range: Option<TextRange>) -> Self {
        self.range = range;
        self
    }

    pub fn labels(&self) -> &[Option<String>] {
        &self.labels
    }

    pub fn indices(&self) -> &[ShuffleIndex] {
        &self.indices
    }

    pub fn expressions(&self) -> &[Expr] {
        &self.expressions
    }

    /// Expressions may be rewritten in place; their count is fixed.
    pub fn expressions_mut(&mut self) -> &mut [Expr] {
        &mut self.expressions
    }

    /// Replace the labels, keeping one label per slot.
    pub fn relabel(&mut self, labels: Vec<Option<String>>) -> Result<(), ShuffleError> {
        Self::check(&labels, &self.indices, self.expressions.len())?;
        self.labels = labels;
        Ok(())
    }

    /// Iterate slots as `(label, index, expressions consumed by the slot)`.
    pub fn slots(&self) -> impl Iterator<Item = (Option<&str>, ShuffleIndex, &[Expr])> {
        let mut offset = 0;
        self.labels
            .iter()
            .zip(self.indices.iter())
            .map(move |(label, index)| {
                let width = index.width();
                let exprs = &self.expressions[offset..offset + width];
                offset += width;
                (label.as_deref(), *index, exprs)
            })
    }

    pub fn into_parts(self) -> (Vec<Option<String>>, Vec<ShuffleIndex>, Vec<Expr>) {
        (self.labels, self.indices, self.expressions)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub expr: Box<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

/// `x?` inside an optional chain.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalUnwrapExpr {
    pub expr: Box<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForceUnwrapExpr {
    pub expr: Box<Expr>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterpolationPart {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationExpr {
    pub parts: Vec<InterpolationPart>,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

/// Target-language text emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralCodeExpr {
    pub code: String,
    pub ty: Option<String>,
    pub range: Option<TextRange>,
}

/// Placeholder for an expression that could not be translated.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorExpr {
    pub diagnostic: Diagnostic,
    pub range: Option<TextRange>,
}
