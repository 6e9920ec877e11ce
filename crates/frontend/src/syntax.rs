//! The foreign syntax tree, as delivered by the host compiler's tooling.
//!
//! Every node carries its byte offset and length in the original source;
//! the side tables are keyed by them. `role` names the slot a child fills in
//! its parent (`condition`, `body`, `else`, ...), so the adapter never has to
//! rely on child positions.

use serde::Deserialize;
use std::fmt;
use text_size::{TextRange, TextSize};

/// Node kinds the adapter understands. Anything else deserializes as
/// [`SyntaxKind::Unknown`] and becomes an error placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum SyntaxKind {
    SourceFile,
    CodeBlock,
    Modifier,
    Comment,

    // Declarations
    ImportDecl,
    ClassDecl,
    StructDecl,
    ProtocolDecl,
    EnumDecl,
    EnumCaseDecl,
    EnumCaseElement,
    ExtensionDecl,
    FunctionDecl,
    InitializerDecl,
    Parameter,
    GenericParameter,
    InheritedType,
    PatternBindingDecl,
    PatternBinding,
    VarDecl,
    Accessor,
    Type,

    // Statements
    IfStmt,
    GuardStmt,
    Condition,
    OptionalBinding,
    CaseCondition,
    SwitchStmt,
    SwitchCase,
    CaseItem,
    ForInStmt,
    WhileStmt,
    RepeatWhileStmt,
    DoStmt,
    CatchClause,
    DeferStmt,
    ThrowStmt,
    ReturnStmt,
    BreakStmt,
    ContinueStmt,

    // Expressions
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    BooleanLiteral,
    NilLiteral,
    InterpolatedString,
    StringSegment,
    ArrayLiteral,
    DictionaryLiteral,
    DictionaryElement,
    DeclRef,
    MemberAccess,
    Call,
    Argument,
    Closure,
    ClosureParameter,
    Subscript,
    PrefixOperator,
    PostfixOperator,
    Sequence,
    BinaryOperator,
    TernaryOperator,
    Ternary,
    Cast,
    TypeExpr,
    Tuple,
    OptionalChain,
    ForceUnwrap,

    // Patterns
    EnumCasePattern,
    PatternArgument,
    ValueBindingPattern,
    IdentifierPattern,
    WildcardPattern,
    TuplePattern,
    ExpressionPattern,
    IsTypePattern,
    AsPattern,

    #[serde(other)]
    Unknown,
}

impl SyntaxKind {
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::ImportDecl
                | SyntaxKind::ClassDecl
                | SyntaxKind::StructDecl
                | SyntaxKind::ProtocolDecl
                | SyntaxKind::EnumDecl
                | SyntaxKind::ExtensionDecl
                | SyntaxKind::FunctionDecl
                | SyntaxKind::InitializerDecl
                | SyntaxKind::PatternBindingDecl
                | SyntaxKind::VarDecl
        )
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntegerLiteral
                | SyntaxKind::FloatLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::BooleanLiteral
                | SyntaxKind::NilLiteral
                | SyntaxKind::InterpolatedString
                | SyntaxKind::ArrayLiteral
                | SyntaxKind::DictionaryLiteral
                | SyntaxKind::DeclRef
                | SyntaxKind::MemberAccess
                | SyntaxKind::Call
                | SyntaxKind::Closure
                | SyntaxKind::Subscript
                | SyntaxKind::PrefixOperator
                | SyntaxKind::PostfixOperator
                | SyntaxKind::Sequence
                | SyntaxKind::BinaryOperator
                | SyntaxKind::Ternary
                | SyntaxKind::Cast
                | SyntaxKind::TypeExpr
                | SyntaxKind::Tuple
                | SyntaxKind::OptionalChain
                | SyntaxKind::ForceUnwrap
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind) -> Self {
        SyntaxNode {
            kind,
            offset: 0,
            length: 0,
            text: None,
            role: None,
            children: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn range(&self) -> TextRange {
        TextRange::at(TextSize::from(self.offset), TextSize::from(self.length))
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// The first child filling `role`.
    pub fn child(&self, role: &str) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.role.as_deref() == Some(role))
    }

    /// Children filling `role`, in order.
    pub fn children_in<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a SyntaxNode> + 'a {
        self.children.iter().filter(move |c| c.role.as_deref() == Some(role))
    }

    /// Children of `kind`, in order.
    pub fn children_of(&self, kind: SyntaxKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    pub fn first_of(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Whether a `Modifier` child spells `name` (`static`, `let`, `override`, ...).
    pub fn has_modifier(&self, name: &str) -> bool {
        self.children_of(SyntaxKind::Modifier).any(|m| m.text() == name)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &str> {
        self.children_of(SyntaxKind::Modifier).map(SyntaxNode::text)
    }

    // Builder helpers, mostly for tests and hand-written fixtures.

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn at(mut self, offset: u32, length: u32) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }

    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SyntaxNode>) -> Self {
        self.children.extend(children);
        self
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}{:?}", "  ".repeat(depth), self.kind)?;
        if let Some(role) = &self.role {
            write!(f, " [{}]", role)?;
        }
        if let Some(text) = &self.text {
            write!(f, " {:?}", text)?;
        }
        writeln!(f, " @{}+{}", self.offset, self.length)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented snapshot, attached to error placeholders.
impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_unknown_kind() {
        let json = r#"{
            "kind": "IfStmt",
            "offset": 4,
            "length": 20,
            "children": [
                {"kind": "RepeatUntilStmt", "role": "body"},
                {"kind": "DeclRef", "text": "x", "role": "condition", "offset": 7, "length": 1}
            ]
        }"#;
        let node = SyntaxNode::from_json(json).unwrap();
        assert_eq!(node.kind, SyntaxKind::IfStmt);
        assert_eq!(node.child("body").map(|c| c.kind), Some(SyntaxKind::Unknown));
        assert_eq!(node.child("condition").map(SyntaxNode::text), Some("x"));
        assert_eq!(u32::from(node.range().start()), 4);
    }

    #[test]
    fn test_snapshot_is_indented() {
        let node = SyntaxNode::new(SyntaxKind::ReturnStmt)
            .at(0, 8)
            .with_child(SyntaxNode::new(SyntaxKind::DeclRef).with_text("x").with_role("value").at(7, 1));
        assert_eq!(node.to_string(), "ReturnStmt @0+8\n  DeclRef [value] \"x\" @7+1\n");
    }
}
