use super::Adapter;
use super::arguments::argument_label;
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::tables::DirectiveKind;
use tarn_core::ast::*;
use tarn_core::error::ErrorCode;

/// Strips the optional marks the type table leaves on implicit member bases.
fn unwrapped_type(ty: &str) -> &str {
    ty.trim_end_matches(['?', '!'])
}

fn parse_integer(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let (digits, radix) = match digits.get(..2) {
        Some("0x") => (&digits[2..], 16),
        Some("0o") => (&digits[2..], 8),
        Some("0b") => (&digits[2..], 2),
        _ => (digits.as_str(), 10),
    };
    u64::from_str_radix(digits, radix).ok()
}

impl Adapter<'_> {
    pub(super) fn adapt_expr(&mut self, node: &SyntaxNode) -> Expr {
        if let Some(code) = self.tables.directives.payload(node.offset, DirectiveKind::Literal) {
            return Expr::LiteralCode(LiteralCodeExpr {
                code: code.to_string(),
                ty: self.type_of(node),
                range: Some(node.range()),
            });
        }

        let ty = self.type_of(node);
        let range = Some(node.range());
        match node.kind {
            SyntaxKind::IntegerLiteral => self.adapt_integer(node, ty),
            SyntaxKind::FloatLiteral => {
                let text: String = node.text().chars().filter(|&c| c != '_').collect();
                let value = match (text.parse::<f64>(), ty.as_deref()) {
                    (Ok(v), Some("Float")) => LiteralValue::Float(v as f32),
                    (Ok(v), _) => LiteralValue::Double(v),
                    (Err(_), _) => {
                        return self.error_expr(node, ErrorCode::E1001, format!("invalid float literal `{}`", node.text()));
                    }
                };
                Expr::Literal(LiteralExpr { value, ty, range })
            }
            SyntaxKind::StringLiteral => {
                let text = node.text().to_string();
                let value = if ty.as_deref() == Some("Character") {
                    LiteralValue::Character(text)
                } else {
                    LiteralValue::String(text)
                };
                Expr::Literal(LiteralExpr { value, ty, range })
            }
            SyntaxKind::BooleanLiteral => Expr::Literal(LiteralExpr {
                value: LiteralValue::Bool(node.text() == "true"),
                ty,
                range,
            }),
            SyntaxKind::NilLiteral => Expr::Literal(LiteralExpr {
                value: LiteralValue::Nil,
                ty,
                range,
            }),
            SyntaxKind::InterpolatedString => {
                let parts = node
                    .children
                    .iter()
                    .map(|part| match part.kind {
                        SyntaxKind::StringSegment => InterpolationPart::Text(part.text().to_string()),
                        _ => InterpolationPart::Expr(self.adapt_expr(part)),
                    })
                    .collect();
                Expr::Interpolation(InterpolationExpr { parts, ty, range })
            }
            SyntaxKind::ArrayLiteral => Expr::Array(ArrayExpr {
                elements: node.children.iter().map(|e| self.adapt_expr(e)).collect(),
                ty,
                range,
            }),
            SyntaxKind::DictionaryLiteral => {
                let mut keys = Vec::new();
                let mut values = Vec::new();
                for element in node.children_of(SyntaxKind::DictionaryElement) {
                    match (element.child("key"), element.child("value")) {
                        (Some(key), Some(value)) => {
                            keys.push(self.adapt_expr(key));
                            values.push(self.adapt_expr(value));
                        }
                        _ => {
                            keys.push(self.error_expr(element, ErrorCode::E1001, "dictionary element without key or value"));
                            values.push(Expr::Literal(LiteralExpr {
                                value: LiteralValue::Nil,
                                ty: None,
                                range: None,
                            }));
                        }
                    }
                }
                Expr::Dictionary(DictionaryExpr { keys, values, ty, range })
            }
            SyntaxKind::DeclRef => {
                let name = node.text().to_string();
                Expr::DeclRef(DeclRefExpr {
                    is_standard_library: self.is_standard_library(node.offset, &name),
                    // Nodes the compiler synthesized have no extent in the source.
                    is_implicit: node.length == 0,
                    name,
                    ty,
                    range,
                })
            }
            SyntaxKind::MemberAccess => self.adapt_member(node, ty),
            SyntaxKind::Call => self.adapt_call(node, ty),
            SyntaxKind::Closure => {
                let parameters = node
                    .children_of(SyntaxKind::ClosureParameter)
                    .map(|p| ClosureParameter {
                        name: p.text().to_string(),
                        ty: Self::type_name(p, "type"),
                    })
                    .collect();
                let statements = self.adapt_block(node.child("body"));
                Expr::Closure(ClosureExpr {
                    parameters,
                    statements,
                    ty,
                    range,
                })
            }
            SyntaxKind::Subscript => {
                let Some(base) = node.child("base") else {
                    return self.error_expr(node, ErrorCode::E1001, "subscript without a base");
                };
                let base = self.adapt_expr(base);
                let mut indices: Vec<LabeledExpr> = node
                    .children_of(SyntaxKind::Argument)
                    .map(|a| LabeledExpr {
                        label: argument_label(a),
                        expr: self.argument_value(a),
                    })
                    .collect();
                let index = match indices.len() {
                    0 => return self.error_expr(node, ErrorCode::E1001, "subscript without an index"),
                    1 if indices[0].label.is_none() => indices.remove(0).expr,
                    _ => Expr::Tuple(TupleExpr {
                        pairs: indices,
                        ty: None,
                        range: None,
                    }),
                };
                Expr::Subscript(SubscriptExpr {
                    base: Box::new(base),
                    index: Box::new(index),
                    ty,
                    range,
                })
            }
            SyntaxKind::PrefixOperator | SyntaxKind::PostfixOperator => {
                let Some(operand) = node.child("operand") else {
                    return self.error_expr(node, ErrorCode::E1003, format!("operator `{}` without an operand", node.text()));
                };
                let op = node.text().to_string();
                let operand = Box::new(self.adapt_expr(operand));
                if node.kind == SyntaxKind::PrefixOperator {
                    Expr::Prefix(PrefixExpr { op, operand, ty, range })
                } else {
                    Expr::Postfix(PostfixExpr { op, operand, ty, range })
                }
            }
            SyntaxKind::Sequence => self.adapt_operator_sequence(node),
            SyntaxKind::BinaryOperator => match (node.child("lhs"), node.child("rhs")) {
                (Some(lhs), Some(rhs)) => Expr::Binary(BinaryExpr {
                    lhs: Box::new(self.adapt_expr(lhs)),
                    op: node.text().to_string(),
                    rhs: Box::new(self.adapt_expr(rhs)),
                    ty,
                    range,
                }),
                _ => self.error_expr(node, ErrorCode::E1003, format!("operator `{}` outside a sequence", node.text())),
            },
            SyntaxKind::Ternary => match (node.child("condition"), node.child("then"), node.child("else")) {
                (Some(condition), Some(then_expr), Some(else_expr)) => Expr::Ternary(TernaryExpr {
                    condition: Box::new(self.adapt_expr(condition)),
                    then_expr: Box::new(self.adapt_expr(then_expr)),
                    else_expr: Box::new(self.adapt_expr(else_expr)),
                    ty,
                    range,
                }),
                _ => self.error_expr(node, ErrorCode::E1003, "incomplete ternary"),
            },
            SyntaxKind::Cast => match (node.child("operand"), Self::type_name(node, "type")) {
                (Some(operand), Some(target)) => Expr::Binary(BinaryExpr {
                    lhs: Box::new(self.adapt_expr(operand)),
                    op: node.text().to_string(),
                    rhs: Box::new(Expr::TypeRef(TypeRefExpr {
                        name: target,
                        ty: None,
                        range: None,
                    })),
                    ty,
                    range,
                }),
                _ => self.error_expr(node, ErrorCode::E1003, format!("`{}` without an operand or a type", node.text())),
            },
            SyntaxKind::TypeExpr => Expr::TypeRef(TypeRefExpr {
                name: node.text().to_string(),
                ty,
                range,
            }),
            SyntaxKind::Tuple => {
                let mut pairs: Vec<LabeledExpr> = node
                    .children_of(SyntaxKind::Argument)
                    .map(|a| LabeledExpr {
                        label: argument_label(a),
                        expr: self.argument_value(a),
                    })
                    .collect();
                if pairs.len() == 1 && pairs[0].label.is_none() {
                    return Expr::Paren(ParenExpr {
                        expr: Box::new(pairs.remove(0).expr),
                        ty,
                        range,
                    });
                }
                Expr::Tuple(TupleExpr { pairs, ty, range })
            }
            SyntaxKind::OptionalChain | SyntaxKind::ForceUnwrap => {
                let Some(operand) = node.child("operand") else {
                    return self.error_expr(node, ErrorCode::E1001, "unwrap without an operand");
                };
                let expr = Box::new(self.adapt_expr(operand));
                if node.kind == SyntaxKind::OptionalChain {
                    Expr::OptionalUnwrap(OptionalUnwrapExpr { expr, ty, range })
                } else {
                    Expr::ForceUnwrap(ForceUnwrapExpr { expr, ty, range })
                }
            }
            kind => self.error_expr(node, ErrorCode::E1001, format!("unsupported expression `{:?}`", kind)),
        }
    }

    fn adapt_integer(&mut self, node: &SyntaxNode, ty: Option<String>) -> Expr {
        let Some(value) = parse_integer(node.text()) else {
            return self.error_expr(node, ErrorCode::E1001, format!("invalid integer literal `{}`", node.text()));
        };
        let value = match ty.as_deref() {
            Some("Double") => LiteralValue::Double(value as f64),
            Some("Float") => LiteralValue::Float(value as f32),
            Some(t) if t.starts_with("UInt") => LiteralValue::UInt(value),
            _ => match i64::try_from(value) {
                Ok(v) => LiteralValue::Int(v),
                Err(_) => LiteralValue::UInt(value),
            },
        };
        Expr::Literal(LiteralExpr {
            value,
            ty,
            range: Some(node.range()),
        })
    }

    /// `base.member`, or `.member` with the base type taken from the type table.
    fn adapt_member(&mut self, node: &SyntaxNode, ty: Option<String>) -> Expr {
        let member = node.text().to_string();
        let base = match node.child("base") {
            Some(base) => self.adapt_expr(base),
            None => match ty.as_deref().map(unwrapped_type) {
                Some(owner) if !owner.is_empty() => Expr::TypeRef(TypeRefExpr {
                    name: owner.to_string(),
                    ty: None,
                    range: None,
                }),
                _ => {
                    return self.error_expr(
                        node,
                        ErrorCode::E1004,
                        format!("cannot resolve the type of implicit member `.{}`", member),
                    );
                }
            },
        };
        // The member name ends the node; its symbol entry sits at its own offset.
        let name_offset = node.offset + node.length.saturating_sub(member.len() as u32);
        Expr::Member(MemberExpr {
            base: Box::new(base),
            is_standard_library: self.is_standard_library(name_offset, &member),
            member,
            case_style: None,
            ty,
            range: Some(node.range()),
        })
    }

    fn adapt_call(&mut self, node: &SyntaxNode, ty: Option<String>) -> Expr {
        let callee = node.child("function");
        let function = match callee {
            Some(function) => self.adapt_expr(function),
            None => return self.error_expr(node, ErrorCode::E1001, "call without a callee"),
        };
        match self.adapt_arguments(node, callee) {
            Ok(arguments) => Expr::Call(CallExpr {
                function: Box::new(function),
                arguments: Box::new(arguments),
                allows_trailing_closure: node.child("trailing_closure").is_some(),
                is_pure: false,
                ty,
                range: Some(node.range()),
            }),
            Err(diagnostic) => Expr::Error(ErrorExpr {
                diagnostic,
                range: Some(node.range()),
            }),
        }
    }
}
