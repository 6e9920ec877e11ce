//! Precedence folding for flat operator sequences.
//!
//! The foreign parser hands binary expressions over as a flat
//! operand/operator list. Folding scans the list for its loosest-binding
//! operator, splits there and recurses on both halves. Ties go right-most for
//! left-associative groups and left-most for right-associative ones.

use super::Adapter;
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::tables::TypeTable;
use phf::phf_map;
use tarn_core::ast::*;
use tarn_core::error::ErrorCode;
use text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Operator precedence groups, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrecedenceGroup {
    Assignment,
    Ternary,
    /// Custom operators with no declared group.
    Default,
    LogicalDisjunction,
    LogicalConjunction,
    Comparison,
    NilCoalescing,
    Casting,
    RangeFormation,
    Addition,
    Multiplication,
    BitwiseShift,
}

impl PrecedenceGroup {
    pub fn associativity(self) -> Associativity {
        match self {
            PrecedenceGroup::Assignment | PrecedenceGroup::Ternary | PrecedenceGroup::NilCoalescing => {
                Associativity::Right
            }
            _ => Associativity::Left,
        }
    }
}

static OPERATORS: phf::Map<&'static str, PrecedenceGroup> = phf_map! {
    "<<" => PrecedenceGroup::BitwiseShift,
    ">>" => PrecedenceGroup::BitwiseShift,
    "&<<" => PrecedenceGroup::BitwiseShift,
    "&>>" => PrecedenceGroup::BitwiseShift,
    "*" => PrecedenceGroup::Multiplication,
    "/" => PrecedenceGroup::Multiplication,
    "%" => PrecedenceGroup::Multiplication,
    "&" => PrecedenceGroup::Multiplication,
    "&*" => PrecedenceGroup::Multiplication,
    "+" => PrecedenceGroup::Addition,
    "-" => PrecedenceGroup::Addition,
    "|" => PrecedenceGroup::Addition,
    "^" => PrecedenceGroup::Addition,
    "&+" => PrecedenceGroup::Addition,
    "&-" => PrecedenceGroup::Addition,
    "..<" => PrecedenceGroup::RangeFormation,
    "..." => PrecedenceGroup::RangeFormation,
    "is" => PrecedenceGroup::Casting,
    "as" => PrecedenceGroup::Casting,
    "as?" => PrecedenceGroup::Casting,
    "as!" => PrecedenceGroup::Casting,
    "??" => PrecedenceGroup::NilCoalescing,
    "<" => PrecedenceGroup::Comparison,
    "<=" => PrecedenceGroup::Comparison,
    ">" => PrecedenceGroup::Comparison,
    ">=" => PrecedenceGroup::Comparison,
    "==" => PrecedenceGroup::Comparison,
    "!=" => PrecedenceGroup::Comparison,
    "===" => PrecedenceGroup::Comparison,
    "!==" => PrecedenceGroup::Comparison,
    "~=" => PrecedenceGroup::Comparison,
    "&&" => PrecedenceGroup::LogicalConjunction,
    "||" => PrecedenceGroup::LogicalDisjunction,
    "=" => PrecedenceGroup::Assignment,
    "*=" => PrecedenceGroup::Assignment,
    "/=" => PrecedenceGroup::Assignment,
    "%=" => PrecedenceGroup::Assignment,
    "+=" => PrecedenceGroup::Assignment,
    "-=" => PrecedenceGroup::Assignment,
    "<<=" => PrecedenceGroup::Assignment,
    ">>=" => PrecedenceGroup::Assignment,
    "&=" => PrecedenceGroup::Assignment,
    "|=" => PrecedenceGroup::Assignment,
    "^=" => PrecedenceGroup::Assignment,
};

/// The group of a known infix operator.
pub fn precedence_group(op: &str) -> Option<PrecedenceGroup> {
    OPERATORS.get(op).copied()
}

/// One element of a flattened operator sequence.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Item {
    Operand(Expr),
    Binary { op: String, group: PrecedenceGroup },
    /// `? then :`, with the middle operand already adapted.
    Ternary(Expr),
    /// The type is part of the operator; the cast only takes a left operand.
    Cast { op: String, ty: Option<String> },
}

impl Item {
    fn group(&self) -> Option<PrecedenceGroup> {
        match self {
            Item::Operand(_) => None,
            Item::Binary { group, .. } => Some(*group),
            Item::Ternary(_) => Some(PrecedenceGroup::Ternary),
            Item::Cast { .. } => Some(PrecedenceGroup::Casting),
        }
    }
}

/// Index of the operator to split at.
fn split_point(items: &[Item]) -> Option<usize> {
    let mut best: Option<(usize, PrecedenceGroup)> = None;
    for (i, item) in items.iter().enumerate() {
        let Some(group) = item.group() else {
            continue;
        };
        best = match best {
            None => Some((i, group)),
            Some((_, current)) if group < current => Some((i, group)),
            Some((_, current)) if group == current && group.associativity() == Associativity::Left => {
                Some((i, group))
            }
            keep => keep,
        };
    }
    best.map(|(i, _)| i)
}

fn cover(lhs: &Expr, rhs: &Expr) -> Option<TextRange> {
    Some(lhs.range()?.cover(rhs.range()?))
}

fn type_at(types: &TypeTable, range: Option<TextRange>) -> Option<String> {
    let range = range?;
    types
        .get(u32::from(range.start()), u32::from(range.len()))
        .map(str::to_string)
}

fn binary(lhs: Expr, op: String, rhs: Expr, types: &TypeTable) -> Expr {
    let range = cover(&lhs, &rhs);
    Expr::Binary(BinaryExpr {
        lhs: Box::new(lhs),
        op,
        rhs: Box::new(rhs),
        ty: type_at(types, range),
        range,
    })
}

/// Fold a flat sequence into one expression tree.
pub(super) fn fold(mut items: Vec<Item>, types: &TypeTable) -> Result<Expr, String> {
    let Some(split) = split_point(&items) else {
        return match (items.pop(), items.is_empty()) {
            (Some(Item::Operand(expr)), true) => Ok(expr),
            (None, _) => Err("missing operand".to_string()),
            _ => Err("operands without an operator between them".to_string()),
        };
    };

    let right = items.split_off(split + 1);
    let operator = items.pop();
    let left = items;

    match operator {
        Some(Item::Binary { op, .. }) => {
            if left.is_empty() || right.is_empty() {
                return Err(format!("operator `{}` is missing an operand", op));
            }
            let lhs = fold(left, types)?;
            let rhs = fold(right, types)?;
            Ok(binary(lhs, op, rhs, types))
        }
        Some(Item::Ternary(then_expr)) => {
            let condition = fold(left, types)?;
            let else_expr = fold(right, types)?;
            let range = cover(&condition, &else_expr);
            Ok(Expr::Ternary(TernaryExpr {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                ty: type_at(types, range),
                range,
            }))
        }
        Some(Item::Cast { op, ty }) => {
            let ty = ty.ok_or_else(|| format!("`{}` without a type", op))?;
            let lhs = fold(left, types)?;
            let target = Expr::TypeRef(TypeRefExpr {
                name: ty,
                ty: None,
                range: None,
            });
            let range = lhs.range();
            let cast = Expr::Binary(BinaryExpr {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(target),
                ty: None,
                range,
            });
            if right.is_empty() {
                return Ok(cast);
            }
            // The cast result is the first operand of whatever follows.
            let mut rest = Vec::with_capacity(right.len() + 1);
            rest.push(Item::Operand(cast));
            rest.extend(right);
            fold(rest, types)
        }
        Some(Item::Operand(_)) | None => Err("malformed operator sequence".to_string()),
    }
}

impl Adapter<'_> {
    pub(super) fn adapt_operator_sequence(&mut self, node: &SyntaxNode) -> Expr {
        let mut items = Vec::with_capacity(node.children.len());
        for child in &node.children {
            self.push_sequence_item(child, &mut items);
        }
        match fold(items, &self.tables.types) {
            Ok(expr) => expr,
            Err(message) => self.error_expr(node, ErrorCode::E1003, message),
        }
    }

    fn push_sequence_item(&mut self, child: &SyntaxNode, items: &mut Vec<Item>) {
        match child.kind {
            SyntaxKind::BinaryOperator if child.children.is_empty() => {
                let op = child.text().to_string();
                let group = match precedence_group(&op) {
                    Some(group) => group,
                    None => {
                        self.warn(
                            child,
                            ErrorCode::W4002,
                            format!("custom operator `{}` assumed left-associative with default precedence", op),
                        );
                        PrecedenceGroup::Default
                    }
                };
                items.push(Item::Binary { op, group });
            }
            SyntaxKind::TernaryOperator => {
                let then_expr = match child.child("then").or_else(|| child.children.first()) {
                    Some(then) => self.adapt_expr(then),
                    None => self.error_expr(child, ErrorCode::E1003, "ternary without a middle operand"),
                };
                items.push(Item::Ternary(then_expr));
            }
            SyntaxKind::Cast if child.child("operand").is_none() => {
                items.push(Item::Cast {
                    op: child.text().to_string(),
                    ty: Self::type_name(child, "type"),
                });
            }
            // The foreign parser may nest a ternary too tightly around its
            // neighbours; flatten it so it folds at its own precedence.
            SyntaxKind::Ternary => {
                if let Some(condition) = child.child("condition") {
                    self.push_flattened(condition, items);
                }
                let then_expr = match child.child("then") {
                    Some(then) => self.adapt_expr(then),
                    None => self.error_expr(child, ErrorCode::E1003, "ternary without a middle operand"),
                };
                items.push(Item::Ternary(then_expr));
                if let Some(else_part) = child.child("else") {
                    self.push_flattened(else_part, items);
                }
            }
            _ => items.push(Item::Operand(self.adapt_expr(child))),
        }
    }

    fn push_flattened(&mut self, part: &SyntaxNode, items: &mut Vec<Item>) {
        if part.kind == SyntaxKind::Sequence {
            for child in &part.children {
                self.push_sequence_item(child, items);
            }
        } else {
            self.push_sequence_item(part, items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarn_core::helpers::build::*;

    /// Fully parenthesized rendering, so the tests can see the nesting.
    fn nested(expr: &Expr) -> String {
        match expr {
            Expr::Binary(b) => format!("({} {} {})", nested(&b.lhs), b.op, nested(&b.rhs)),
            Expr::Ternary(t) => format!(
                "({} ? {} : {})",
                nested(&t.condition),
                nested(&t.then_expr),
                nested(&t.else_expr)
            ),
            other => expr_to_string(other),
        }
    }

    fn op(op: &str) -> Item {
        Item::Binary {
            op: op.to_string(),
            group: precedence_group(op).unwrap_or(PrecedenceGroup::Default),
        }
    }

    fn operand(name: &str) -> Item {
        Item::Operand(decl(name))
    }

    fn folded(items: Vec<Item>) -> String {
        nested(&fold(items, &TypeTable::default()).unwrap())
    }

    #[test]
    fn test_higher_precedence_binds_tighter() {
        let items = vec![Item::Operand(int(1)), op("+"), Item::Operand(int(2)), op("*"), Item::Operand(int(3))];
        assert_eq!(folded(items), "(1 + (2 * 3))");
    }

    #[test]
    fn test_left_associative_nests_left() {
        let items = vec![operand("a"), op("-"), operand("b"), op("-"), operand("c")];
        assert_eq!(folded(items), "((a - b) - c)");
    }

    #[test]
    fn test_right_associative_nests_right() {
        let items = vec![operand("a"), op("="), operand("b"), op("="), operand("c")];
        assert_eq!(folded(items), "(a = (b = c))");

        let items = vec![operand("a"), op("??"), operand("b"), op("??"), operand("c")];
        assert_eq!(folded(items), "(a ?? (b ?? c))");
    }

    #[test]
    fn test_ternary_is_looser_than_comparison() {
        let items = vec![
            operand("a"),
            op("=="),
            operand("b"),
            Item::Ternary(decl("c")),
            operand("d"),
            op("=="),
            operand("e"),
        ];
        assert_eq!(folded(items), "((a == b) ? c : (d == e))");
    }

    #[test]
    fn test_nested_ternaries_nest_right() {
        let items = vec![
            operand("a"),
            Item::Ternary(decl("b")),
            operand("c"),
            Item::Ternary(decl("d")),
            operand("e"),
        ];
        assert_eq!(folded(items), "(a ? b : (c ? d : e))");
    }

    #[test]
    fn test_cast_result_feeds_following_operators() {
        let cast = |op: &str, ty: &str| Item::Cast {
            op: op.to_string(),
            ty: Some(ty.to_string()),
        };
        let items = vec![operand("x"), cast("as", "Int"), op("+"), Item::Operand(int(1))];
        assert_eq!(folded(items), "((x as Int) + 1)");

        let items = vec![operand("a"), op("+"), operand("b"), cast("as", "Int"), op("=="), operand("c")];
        assert_eq!(folded(items), "(((a + b) as Int) == c)");
    }

    #[test]
    fn test_malformed_sequences() {
        let types = TypeTable::default();
        assert!(fold(vec![operand("a"), operand("b")], &types).is_err());
        assert!(fold(vec![operand("a"), op("+")], &types).is_err());
        assert!(fold(vec![operand("a"), Item::Cast { op: "as".into(), ty: None }], &types).is_err());
    }

    #[test]
    fn test_custom_operator_warns_and_folds_left() {
        let tables = crate::tables::SideTables::default();
        let mut adapter = Adapter::new(&tables);
        let sequence = SyntaxNode::new(SyntaxKind::Sequence).with_children([
            SyntaxNode::new(SyntaxKind::DeclRef).with_text("a"),
            SyntaxNode::new(SyntaxKind::BinaryOperator).with_text("<>"),
            SyntaxNode::new(SyntaxKind::DeclRef).with_text("b"),
            SyntaxNode::new(SyntaxKind::BinaryOperator).with_text("<>"),
            SyntaxNode::new(SyntaxKind::DeclRef).with_text("c"),
        ]);
        let expr = adapter.adapt_operator_sequence(&sequence);
        assert_eq!(nested(&expr), "((a <> b) <> c)");
        assert_eq!(adapter.diagnostics.len(), 2);
        assert_eq!(adapter.diagnostics[0].code, Some(ErrorCode::W4002));
    }
}
