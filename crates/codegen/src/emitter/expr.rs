//! Expression emission

use super::Emitter;
use super::operators::{Precedence, binary_precedence, is_right_associative, is_tight, translate_operator};
use crate::names::{case_name, escape_identifier};
use crate::types::translate_type;
use tarn_core::ast::*;

/// The text left where a node could not be translated.
pub(crate) fn error_marker(message: &str) -> String {
    format!("<<Error: {}>>", message)
}

fn escape_string(text: &str) -> String {
    text.replace('$', "\\$")
}

fn literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Int(v) => v.to_string(),
        LiteralValue::UInt(v) => format!("{}u", v),
        LiteralValue::Double(v) => format!("{:?}", v),
        LiteralValue::Float(v) => format!("{:?}f", v),
        LiteralValue::Bool(v) => v.to_string(),
        LiteralValue::String(s) => format!("\"{}\"", escape_string(s)),
        LiteralValue::Character(c) if c == "'" => "'\\''".to_string(),
        LiteralValue::Character(c) => format!("'{}'", c),
        LiteralValue::Nil => "null".to_string(),
    }
}

fn precedence(expr: &Expr) -> Precedence {
    match expr {
        Expr::Binary(b) => binary_precedence(translate_operator(&b.op)),
        Expr::Ternary(_) => Precedence::Lowest,
        Expr::Prefix(_) => Precedence::Prefix,
        Expr::Literal(l) => match l.value {
            LiteralValue::Int(v) if v < 0 => Precedence::Prefix,
            LiteralValue::Double(v) if v < 0.0 => Precedence::Prefix,
            LiteralValue::Float(v) if v < 0.0 => Precedence::Prefix,
            _ => Precedence::Atom,
        },
        Expr::OptionalUnwrap(e) => precedence(&e.expr),
        Expr::Member(_) | Expr::Call(_) | Expr::Subscript(_) | Expr::Postfix(_) | Expr::ForceUnwrap(_) => {
            Precedence::Postfix
        }
        _ => Precedence::Atom,
    }
}

/// A closure's value-producing last statement.
fn closure_value(statement: &Stmt) -> Option<&Expr> {
    match statement {
        Stmt::Expression(s) => Some(&s.expr),
        Stmt::Return(ReturnStmt { expr: Some(e), .. }) => Some(e),
        _ => None,
    }
}

/// One argument as the call site will spell it.
struct Argument<'e> {
    label: Option<&'e str>,
    expr: &'e Expr,
}

/// Flatten call arguments; defaulted slots are left out and variadic slots
/// spread into positional arguments.
fn arguments(arguments: &Expr) -> Vec<Argument<'_>> {
    match arguments {
        Expr::Tuple(tuple) => tuple
            .pairs
            .iter()
            .map(|pair| Argument {
                label: pair.label.as_deref(),
                expr: &pair.expr,
            })
            .collect(),
        Expr::TupleShuffle(shuffle) => {
            let mut out = Vec::new();
            for (label, index, exprs) in shuffle.slots() {
                match index {
                    ShuffleIndex::Absent => {}
                    ShuffleIndex::Present => out.extend(exprs.iter().map(|expr| Argument { label, expr })),
                    ShuffleIndex::Variadic { .. } => {
                        out.extend(exprs.iter().map(|expr| Argument { label: None, expr }))
                    }
                }
            }
            out
        }
        Expr::Paren(paren) => vec![Argument {
            label: None,
            expr: &paren.expr,
        }],
        other => vec![Argument {
            label: None,
            expr: other,
        }],
    }
}

impl Emitter<'_> {
    pub(crate) fn expr(&self, expr: &Expr, level: usize) -> String {
        match expr {
            Expr::Literal(e) => literal(&e.value),
            Expr::Array(e) => self.array(e, level),
            Expr::Dictionary(e) => self.dictionary(e, level),
            Expr::DeclRef(e) => decl_ref(e),
            Expr::Member(e) => self.member(e, level),
            Expr::Call(e) => self.call(e, level),
            Expr::Closure(e) => self.closure(e, level),
            Expr::Subscript(e) => format!(
                "{}[{}]",
                self.operand(&e.base, level, Precedence::Postfix, false),
                self.subscript_index(&e.index, level)
            ),
            Expr::Prefix(e) => self.prefix(e, level),
            Expr::Postfix(e) => format!(
                "{}{}",
                self.operand(&e.operand, level, Precedence::Postfix, false),
                e.op
            ),
            Expr::Binary(e) => self.binary(e, level),
            Expr::Ternary(e) => self.ternary(e, level),
            Expr::TypeRef(e) => translate_type(&e.name),
            Expr::Tuple(e) => self.tuple(e.pairs.iter().map(|p| &p.expr).collect(), level),
            Expr::TupleShuffle(e) => self.tuple(e.expressions().iter().collect(), level),
            Expr::Paren(e) => format!("({})", self.expr(&e.expr, level)),
            Expr::OptionalUnwrap(e) => self.expr(&e.expr, level),
            Expr::ForceUnwrap(e) => format!("{}!!", self.operand(&e.expr, level, Precedence::Postfix, false)),
            Expr::Interpolation(e) => self.interpolation(e, level),
            Expr::LiteralCode(e) => e.code.clone(),
            Expr::Error(e) => error_marker(&e.diagnostic.message),
        }
    }

    /// Render `expr` as an operand of an operator at `parent` precedence,
    /// adding parentheses where the target would otherwise regroup it.
    /// `tie_wraps` says whether an operand at the same precedence must be
    /// wrapped, which depends on which side of the operator it sits.
    pub(crate) fn operand(&self, expr: &Expr, level: usize, parent: Precedence, tie_wraps: bool) -> String {
        let text = self.expr(expr, level);
        let own = precedence(expr);
        if own < parent || (own == parent && tie_wraps && own < Precedence::Postfix) {
            format!("({})", text)
        } else {
            text
        }
    }

    fn array(&self, array: &ArrayExpr, level: usize) -> String {
        if array.elements.is_empty() {
            let element = array
                .ty
                .as_deref()
                .map(translate_type)
                .and_then(|ty| {
                    ty.strip_prefix("MutableList<")
                        .and_then(|t| t.strip_suffix('>'))
                        .map(str::to_string)
                });
            return match element {
                Some(element) => format!("mutableListOf<{}>()", element),
                None => "mutableListOf()".to_string(),
            };
        }
        self.list(level, "mutableListOf", &array.elements, "", |e, l| self.expr(e, l))
    }

    fn dictionary(&self, dictionary: &DictionaryExpr, level: usize) -> String {
        if dictionary.keys.is_empty() {
            let entry = dictionary
                .ty
                .as_deref()
                .map(translate_type)
                .and_then(|ty| {
                    ty.strip_prefix("MutableMap<")
                        .and_then(|t| t.strip_suffix('>'))
                        .map(str::to_string)
                });
            return match entry {
                Some(entry) => format!("mutableMapOf<{}>()", entry),
                None => "mutableMapOf()".to_string(),
            };
        }
        let pairs: Vec<(&Expr, &Expr)> = dictionary.keys.iter().zip(dictionary.values.iter()).collect();
        self.list(level, "mutableMapOf", &pairs, "", |(key, value), l| {
            format!(
                "{} to {}",
                self.operand(key, l, Precedence::Infix, false),
                self.operand(value, l, Precedence::Infix, true)
            )
        })
    }

    fn member(&self, member: &MemberExpr, level: usize) -> String {
        let name = match member.case_style {
            Some(style) => case_name(&member.member, style),
            None => escape_identifier(&member.member),
        };
        match member.base.as_ref() {
            Expr::DeclRef(base) if base.is_implicit && base.name == "self" => name,
            Expr::OptionalUnwrap(base) => format!(
                "{}?.{}",
                self.operand(&base.expr, level, Precedence::Postfix, false),
                name
            ),
            base => format!("{}.{}", self.operand(base, level, Precedence::Postfix, false), name),
        }
    }

    fn callee(&self, function: &Expr, level: usize) -> String {
        match function {
            // `Point.init(x: 1)` is a constructor call.
            Expr::Member(m) if m.member == "init" => self.operand(&m.base, level, Precedence::Postfix, false),
            _ => self.operand(function, level, Precedence::Postfix, false),
        }
    }

    fn call(&self, call: &CallExpr, level: usize) -> String {
        let function = self.callee(&call.function, level);
        let mut arguments = arguments(&call.arguments);

        let trailing = match arguments.last() {
            Some(last) if call.allows_trailing_closure && matches!(last.expr, Expr::Closure(_)) => {
                arguments.pop().map(|a| self.expr(a.expr, level))
            }
            _ => None,
        };
        match trailing {
            Some(closure) if arguments.is_empty() => format!("{} {}", function, closure),
            Some(closure) => self.list(level, &function, &arguments, &format!(" {}", closure), |a, l| {
                self.argument(a, l)
            }),
            None => self.list(level, &function, &arguments, "", |a, l| self.argument(a, l)),
        }
    }

    fn argument(&self, argument: &Argument<'_>, level: usize) -> String {
        let value = self.expr(argument.expr, level);
        match argument.label {
            Some(label) => format!("{} = {}", escape_identifier(label), value),
            None => value,
        }
    }

    fn closure(&self, closure: &ClosureExpr, level: usize) -> String {
        let parameters: Vec<String> = closure
            .parameters
            .iter()
            .map(|p| match &p.ty {
                Some(ty) => format!("{}: {}", escape_identifier(&p.name), translate_type(ty)),
                None => escape_identifier(&p.name),
            })
            .collect();
        let head = match parameters.as_slice() {
            [] => "{".to_string(),
            [it] if it == "it" => "{".to_string(),
            _ => format!("{{ {} ->", parameters.join(", ")),
        };

        if let [single] = closure.statements.as_slice()
            && let Some(value) = closure_value(single)
        {
            let text = format!("{} {} }}", head, self.expr(value, level));
            if !text.contains('\n') && self.fits(level, &text) {
                return text;
            }
        }

        // A `return` inside a lambda would leave the enclosing function, so
        // the returned value becomes the lambda's last expression.
        let mut statements = closure.statements.clone();
        if let Some(Stmt::Return(ReturnStmt { expr: Some(_), .. })) = statements.last()
            && let Some(Stmt::Return(ReturnStmt { expr: Some(expr), range })) = statements.pop()
        {
            statements.push(Stmt::Expression(ExpressionStmt { expr, range }));
        }
        let mut out = format!("{}\n", head);
        self.statements(&statements, level + 1, &mut out);
        out.push_str(&self.indent(level));
        out.push('}');
        out
    }

    fn subscript_index(&self, index: &Expr, level: usize) -> String {
        match index {
            Expr::Tuple(tuple) => tuple
                .pairs
                .iter()
                .map(|p| self.expr(&p.expr, level))
                .collect::<Vec<_>>()
                .join(", "),
            other => self.expr(other, level),
        }
    }

    fn prefix(&self, prefix: &PrefixExpr, level: usize) -> String {
        if prefix.op == "~" {
            return format!(
                "{}.inv()",
                self.operand(&prefix.operand, level, Precedence::Postfix, false)
            );
        }
        format!(
            "{}{}",
            prefix.op,
            self.operand(&prefix.operand, level, Precedence::Prefix, false)
        )
    }

    fn binary(&self, binary: &BinaryExpr, level: usize) -> String {
        let op = translate_operator(&binary.op);
        let precedence = binary_precedence(op);
        let right_associative = is_right_associative(op);
        let lhs = self.operand(&binary.lhs, level, precedence, right_associative);
        let rhs = self.operand(&binary.rhs, level, precedence, !right_associative);
        if is_tight(op) {
            format!("{}{}{}", lhs, op, rhs)
        } else {
            format!("{} {} {}", lhs, op, rhs)
        }
    }

    fn ternary(&self, ternary: &TernaryExpr, level: usize) -> String {
        format!(
            "if ({}) {} else {}",
            self.expr(&ternary.condition, level),
            self.operand(&ternary.then_expr, level, Precedence::Assignment, false),
            self.expr(&ternary.else_expr, level)
        )
    }

    fn tuple(&self, elements: Vec<&Expr>, level: usize) -> String {
        let head = match elements.len() {
            0 => return "Unit".to_string(),
            1 => return self.expr(elements[0], level),
            2 => "Pair",
            3 => "Triple",
            _ => "listOf",
        };
        self.list(level, head, &elements, "", |e, l| self.expr(e, l))
    }

    fn interpolation(&self, interpolation: &InterpolationExpr, level: usize) -> String {
        let mut out = String::from("\"");
        let mut parts = interpolation.parts.iter().peekable();
        while let Some(part) = parts.next() {
            match part {
                InterpolationPart::Text(text) => out.push_str(&escape_string(text)),
                InterpolationPart::Expr(Expr::DeclRef(d))
                    if !matches!(parts.peek(), Some(InterpolationPart::Text(t))
                        if t.starts_with(|c: char| c.is_alphanumeric() || c == '_')) =>
                {
                    out.push('$');
                    out.push_str(&decl_ref(d));
                }
                InterpolationPart::Expr(e) => {
                    out.push_str("${");
                    out.push_str(&self.expr(e, level));
                    out.push('}');
                }
            }
        }
        out.push('"');
        out
    }
}

fn decl_ref(decl: &DeclRefExpr) -> String {
    match decl.name.as_str() {
        "self" => "this".to_string(),
        name => escape_identifier(name),
    }
}

#[cfg(test)]
mod tests {
    use super::super::EmitConfig;
    use super::*;
    use tarn_core::helpers::build::*;
    use tarn_core::registry::Registry;

    fn render(expr: &Expr) -> String {
        let registry = Registry::default();
        let config = EmitConfig::default();
        Emitter::new(&registry, &config).expr(expr, 0)
    }

    #[test]
    fn test_literals() {
        assert_eq!(render(&int(3)), "3");
        assert_eq!(render(&double(2.0)), "2.0");
        assert_eq!(render(&literal_expr(LiteralValue::Float(1.5))), "1.5f");
        assert_eq!(render(&literal_expr(LiteralValue::UInt(7))), "7u");
        assert_eq!(render(&string("cost: $5")), "\"cost: \\$5\"");
        assert_eq!(render(&literal_expr(LiteralValue::Character("a".into()))), "'a'");
        assert_eq!(render(&nil()), "null");
    }

    fn literal_expr(value: LiteralValue) -> Expr {
        tarn_core::helpers::build::literal(value)
    }

    #[test]
    fn test_operators_are_translated() {
        assert_eq!(render(&binary(decl("a"), "??", int(0))), "a ?: 0");
        assert_eq!(render(&binary(int(0), "..<", decl("n"))), "0 until n");
        assert_eq!(render(&binary(int(1), "...", decl("n"))), "1..n");
        assert_eq!(render(&binary(decl("a"), "<<", int(2))), "a shl 2");
        assert_eq!(render(&binary(decl("x"), "as!", type_ref("Int"))), "x as Int");
        assert_eq!(render(&binary(decl("x"), "===", decl("y"))), "x === y");
    }

    #[test]
    fn test_parentheses_follow_target_precedence() {
        // (a & b) + c: `and` binds looser than `+` in the target.
        let expr = binary(binary(decl("a"), "&", decl("b")), "+", decl("c"));
        assert_eq!(render(&expr), "(a and b) + c");

        // a + b * c needs nothing.
        let expr = binary(decl("a"), "+", binary(decl("b"), "*", decl("c")));
        assert_eq!(render(&expr), "a + b * c");

        // a - (b - c) keeps the grouping on the right.
        let expr = binary(decl("a"), "-", binary(decl("b"), "-", decl("c")));
        assert_eq!(render(&expr), "a - (b - c)");

        // (a ?? b) ?? c regroups to the right in the target.
        let expr = binary(binary(decl("a"), "??", decl("b")), "??", decl("c"));
        assert_eq!(render(&expr), "(a ?: b) ?: c");

        let expr = prefix("!", binary(decl("x"), "is", type_ref("Bool")));
        assert_eq!(render(&expr), "!(x is Boolean)");
    }

    #[test]
    fn test_ternary_inside_comparison() {
        // (c ? a : b) == d
        let expr = binary(ternary(decl("c"), decl("a"), decl("b")), "==", decl("d"));
        assert_eq!(render(&expr), "(if (c) a else b) == d");

        let expr = ternary(binary(decl("a"), "==", decl("b")), int(1), int(2));
        assert_eq!(render(&expr), "if (a == b) 1 else 2");
    }

    #[test]
    fn test_case_members_are_cased() {
        let mut circle = member(type_ref("Shape"), "circle");
        if let Expr::Member(m) = &mut circle {
            m.case_style = Some(CaseStyle::Payload);
        }
        assert_eq!(render(&circle), "Shape.Circle");

        let mut north = member(type_ref("Direction"), "northEast");
        if let Expr::Member(m) = &mut north {
            m.case_style = Some(CaseStyle::PayloadFree);
        }
        assert_eq!(render(&north), "Direction.NORTH_EAST");
    }

    #[test]
    fn test_calls_use_named_arguments() {
        let expr = call(decl("move"), vec![(Some("start"), int(1)), (None, int(2))]);
        assert_eq!(render(&expr), "move(start = 1, 2)");
    }

    #[test]
    fn test_shuffle_skips_defaults_and_spreads_variadics() {
        let shuffle = TupleShuffleExpr::new(
            vec![None, Some("color".into()), Some("rest".into())],
            vec![
                ShuffleIndex::Present,
                ShuffleIndex::Absent,
                ShuffleIndex::Variadic { count: 2 },
            ],
            vec![decl("s"), int(1), int(2)],
        )
        .unwrap();
        assert_eq!(render(&call_with(decl("draw"), Expr::TupleShuffle(shuffle))), "draw(s, 1, 2)");
    }

    #[test]
    fn test_trailing_closure() {
        let mut expr = call(
            member(decl("xs"), "map"),
            vec![(None, closure(&["it"], vec![expr_stmt(binary(decl("it"), "*", int(2)))]))],
        );
        if let Expr::Call(c) = &mut expr {
            c.allows_trailing_closure = true;
        }
        assert_eq!(render(&expr), "xs.map { it * 2 }");
    }

    #[test]
    fn test_long_calls_break_one_argument_per_line() {
        let long = "a".repeat(40);
        let expr = call(
            decl("configure"),
            vec![(Some("first"), string(&long)), (Some("second"), string(&long))],
        );
        assert_eq!(
            render(&expr),
            format!(
                "configure(\n    first = \"{long}\",\n    second = \"{long}\"\n)"
            )
        );
    }

    #[test]
    fn test_optional_chain_and_unwraps() {
        let chained = member(
            Expr::OptionalUnwrap(OptionalUnwrapExpr {
                expr: Box::new(decl("user")),
                ty: None,
                range: None,
            }),
            "name",
        );
        assert_eq!(render(&chained), "user?.name");

        let forced = Expr::ForceUnwrap(ForceUnwrapExpr {
            expr: Box::new(decl("user")),
            ty: None,
            range: None,
        });
        assert_eq!(render(&forced), "user!!");
    }

    #[test]
    fn test_collections_and_tuples() {
        let array = Expr::Array(ArrayExpr {
            elements: vec![],
            ty: Some("[Int]".into()),
            range: None,
        });
        assert_eq!(render(&array), "mutableListOf<Int>()");

        let dictionary = Expr::Dictionary(DictionaryExpr {
            keys: vec![string("a")],
            values: vec![int(1)],
            ty: None,
            range: None,
        });
        assert_eq!(render(&dictionary), "mutableMapOf(\"a\" to 1)");

        let pair = args(vec![(None, int(1)), (None, int(2))]);
        assert_eq!(render(&pair), "Pair(1, 2)");
    }

    #[test]
    fn test_interpolation() {
        let expr = Expr::Interpolation(InterpolationExpr {
            parts: vec![
                InterpolationPart::Text("Hi ".into()),
                InterpolationPart::Expr(decl("name")),
                InterpolationPart::Text(", you owe $".into()),
                InterpolationPart::Expr(binary(decl("a"), "+", decl("b"))),
            ],
            ty: None,
            range: None,
        });
        assert_eq!(render(&expr), "\"Hi $name, you owe \\$${a + b}\"");
    }

    #[test]
    fn test_error_marker() {
        assert_eq!(render(&error_expr("unsupported pattern")), "<<Error: unsupported pattern>>");
    }
}
