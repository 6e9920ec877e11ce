//! Call-argument to parameter binding.
//!
//! A bounded subset of the source language's argument matching, without
//! type checking: positional, labeled, defaulted and variadic parameters plus
//! one trailing closure, tried forward and then backward. The callee's
//! parameters come from its declaration text in the symbol table.

use super::Adapter;
use crate::syntax::{SyntaxKind, SyntaxNode};
use smallvec::SmallVec;
use tarn_core::ast::*;
use tarn_core::error::{Diagnostic, ErrorCode};

/// What binding needs to know about one declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// External label; `None` for `_`.
    pub label: Option<String>,
    pub name: String,
    pub ty: String,
    pub has_default: bool,
    pub is_variadic: bool,
}

impl ParameterInfo {
    pub fn is_closure(&self) -> bool {
        self.ty.contains("->")
    }
}

/// For each parameter, the indices of the arguments bound to it.
pub type Binding = Vec<SmallVec<[usize; 1]>>;

/// Split at `separator` wherever it is not nested in brackets.
pub(super) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut previous = ' ';
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '<' => depth += 1,
            ')' | ']' => depth -= 1,
            // `->` is not a closing bracket.
            '>' if previous != '-' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
        previous = c;
    }
    parts.push(&text[start..]);
    parts
}

/// Byte index of the `=` introducing a default value, if any.
fn default_separator(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'<' => depth += 1,
            b')' | b']' => depth -= 1,
            b'>' if i == 0 || bytes[i - 1] != b'-' => depth -= 1,
            b'=' if depth == 0 => {
                let before = if i > 0 { bytes[i - 1] } else { b' ' };
                let after = bytes.get(i + 1).copied().unwrap_or(b' ');
                if !matches!(before, b'=' | b'!' | b'<' | b'>') && after != b'=' {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse one parameter as written in a declaration: `label name: Type = default`.
pub fn parse_parameter(text: &str) -> Option<ParameterInfo> {
    let raw_head = split_top_level(text, ':').into_iter().next()?;
    let head = raw_head.trim();
    let tail = text.get(raw_head.len()..)?.strip_prefix(':')?.trim();

    let mut words = head.split_whitespace();
    let first = words.next()?;
    let (label, name) = match words.next() {
        Some(second) => (first, second),
        None => (first, first),
    };
    let label = (label != "_").then(|| label.to_string());

    let (ty, has_default) = match default_separator(tail) {
        Some(i) => (tail[..i].trim(), true),
        None => (tail, false),
    };
    let ty = ty
        .split_whitespace()
        .filter(|w| !w.starts_with('@') && *w != "inout")
        .collect::<Vec<_>>()
        .join(" ");
    let (ty, is_variadic) = match ty.strip_suffix("...") {
        Some(element) => (element.trim().to_string(), true),
        None => (ty, false),
    };
    if ty.is_empty() {
        return None;
    }

    Some(ParameterInfo {
        label,
        name: name.to_string(),
        ty,
        has_default,
        is_variadic,
    })
}

/// Parse the parameter clause of a declaration such as
/// `func f<T>(_ x: T, label: Int = 0) -> T`.
pub fn parse_parameter_clause(declaration: &str) -> Option<Vec<ParameterInfo>> {
    let mut angle = 0i32;
    let mut open = None;
    for (i, c) in declaration.char_indices() {
        match c {
            '<' => angle += 1,
            '>' => angle -= 1,
            '(' if angle == 0 => {
                open = Some(i);
                break;
            }
            _ => {}
        }
    }
    let open = open?;

    let mut depth = 0i32;
    let mut close = None;
    for (i, c) in declaration[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let inner = declaration[open + 1..close?].trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    split_top_level(inner, ',').into_iter().map(parse_parameter).collect()
}

/// One attempt, in parameter order. `trailing` is the index of a trailing
/// closure argument; `forward` picks where it may bind.
fn match_in_order(
    parameters: &[ParameterInfo],
    labels: &[Option<&str>],
    trailing: Option<usize>,
    forward: bool,
) -> Option<Binding> {
    let mut bound: Binding = vec![SmallVec::new(); parameters.len()];
    let mut trailing = trailing;
    let mut next = 0;
    let last = parameters.len().checked_sub(1);

    for (i, parameter) in parameters.iter().enumerate() {
        if !forward && Some(i) == last {
            if let Some(closure) = trailing.take() {
                bound[i].push(closure);
                continue;
            }
        }

        let label_matches = |index: usize| labels.get(index).is_some_and(|l| *l == parameter.label.as_deref());

        if parameter.is_variadic {
            if label_matches(next) {
                bound[i].push(next);
                next += 1;
                while labels.get(next).is_some_and(Option::is_none) {
                    bound[i].push(next);
                    next += 1;
                }
            }
            continue;
        }
        if label_matches(next) {
            bound[i].push(next);
            next += 1;
            continue;
        }
        if forward && next == labels.len() && parameter.is_closure() {
            if let Some(closure) = trailing.take() {
                bound[i].push(closure);
                continue;
            }
        }
        if parameter.has_default {
            continue;
        }
        return None;
    }

    (next == labels.len() && trailing.is_none()).then_some(bound)
}

/// Bind call arguments to parameters.
///
/// `labels` are the labels of the parenthesized arguments; a trailing
/// closure, if any, is argument `labels.len()`. Returns `None` when the
/// arguments cannot be matched one to one.
pub fn bind_arguments(parameters: &[ParameterInfo], labels: &[Option<&str>], trailing_closure: bool) -> Option<Binding> {
    let trailing = trailing_closure.then_some(labels.len());
    match_in_order(parameters, labels, trailing, true).or_else(|| match_in_order(parameters, labels, trailing, false))
}

fn is_identity(parameters: &[ParameterInfo], binding: &Binding, supplied: usize) -> bool {
    binding.len() == supplied
        && parameters.iter().all(|p| !p.is_variadic)
        && binding.iter().enumerate().all(|(i, b)| b.as_slice() == [i])
}

/// The label written before an argument; empty and `_` mean none.
pub(super) fn argument_label(argument: &SyntaxNode) -> Option<String> {
    argument.text.clone().filter(|l| !l.is_empty() && l != "_")
}

impl Adapter<'_> {
    /// Declaration text of the function a callee expression refers to.
    fn callee_declaration(&self, callee: &SyntaxNode) -> Option<&str> {
        let offset = match callee.kind {
            SyntaxKind::MemberAccess => callee.offset + callee.length.saturating_sub(callee.text().len() as u32),
            _ => callee.offset,
        };
        self.tables.symbols.get(offset)?.declaration.as_deref()
    }

    /// The argument node of a call: a tuple when arguments map one to one
    /// onto parameters, a shuffle otherwise.
    pub(super) fn adapt_arguments(&mut self, call: &SyntaxNode, callee: Option<&SyntaxNode>) -> Result<Expr, Diagnostic> {
        let mut supplied: Vec<(Option<String>, Option<Expr>)> = call
            .children_of(SyntaxKind::Argument)
            .map(|argument| {
                (argument_label(argument), Some(self.argument_value(argument)))
            })
            .collect();
        let regular = supplied.len();
        let trailing = call.child("trailing_closure");
        if let Some(closure) = trailing {
            supplied.push((None, Some(self.adapt_expr(closure))));
        }

        let parameters = callee
            .and_then(|c| self.callee_declaration(c))
            .map(|declaration| (declaration, parse_parameter_clause(declaration)));

        let written = |supplied: Vec<(Option<String>, Option<Expr>)>| {
            Expr::Tuple(TupleExpr {
                pairs: supplied
                    .into_iter()
                    .filter_map(|(label, expr)| Some(LabeledExpr { label, expr: expr? }))
                    .collect(),
                ty: None,
                range: None,
            })
        };

        let (declaration, parameters) = match parameters {
            Some((declaration, Some(parameters))) => (declaration, parameters),
            Some((declaration, None)) => {
                log::debug!("unparsable declaration `{}`; keeping labels as written", declaration);
                return Ok(written(supplied));
            }
            None => return Ok(written(supplied)),
        };

        let labels: Vec<Option<&str>> = supplied[..regular].iter().map(|(l, _)| l.as_deref()).collect();
        let Some(binding) = bind_arguments(&parameters, &labels, trailing.is_some()) else {
            let written_key = signature_key("", labels.iter().copied());
            return Err(self.diagnostic(
                call,
                ErrorCode::E2001,
                format!("arguments {} do not match `{}`", written_key, declaration.trim()),
            ));
        };

        if is_identity(&parameters, &binding, supplied.len()) {
            return Ok(written(supplied));
        }

        let mut slot_labels = Vec::with_capacity(parameters.len());
        let mut indices = Vec::with_capacity(parameters.len());
        let mut expressions = Vec::with_capacity(supplied.len());
        for (parameter, bound) in parameters.iter().zip(binding.iter()) {
            slot_labels.push(parameter.label.clone());
            indices.push(match (parameter.is_variadic, bound.len()) {
                (true, count) => ShuffleIndex::Variadic { count },
                (false, 0) => ShuffleIndex::Absent,
                (false, _) => ShuffleIndex::Present,
            });
            for &index in bound {
                if let Some(expr) = supplied.get_mut(index).and_then(|(_, e)| e.take()) {
                    expressions.push(expr);
                }
            }
        }

        TupleShuffleExpr::new(slot_labels, indices, expressions)
            .map(|shuffle| Expr::TupleShuffle(shuffle.with_range(Some(call.range()))))
            .map_err(|err| self.diagnostic(call, ErrorCode::E2003, err.to_string()))
    }

    pub(super) fn argument_value(&mut self, argument: &SyntaxNode) -> Expr {
        match argument.children.first() {
            Some(value) => self.adapt_expr(value),
            None => self.error_expr(argument, ErrorCode::E1001, "argument without a value"),
        }
    }
}
