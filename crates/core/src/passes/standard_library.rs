//! Standard-library translation.
//!
//! Members and free functions of the source standard library that have a
//! direct target counterpart are renamed; references with no known
//! counterpart are kept as written and reported once each.

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode};
use crate::visitor::{Rewriter, mut_walk};
use phf::{phf_map, phf_set};

#[derive(Debug, Clone, Copy)]
enum Translation {
    /// Same shape, different name.
    Rename(&'static str),
    /// A source property that the target spells as a no-argument method.
    Method(&'static str),
}

static MEMBERS: phf::Map<&'static str, Translation> = phf_map! {
    "count" => Translation::Rename("size"),
    "append" => Translation::Rename("add"),
    "isEmpty" => Translation::Method("isEmpty"),
    "first" => Translation::Method("firstOrNull"),
    "last" => Translation::Method("lastOrNull"),
    "uppercased" => Translation::Rename("uppercase"),
    "lowercased" => Translation::Rename("lowercase"),
    "removeAll" => Translation::Rename("clear"),
    "description" => Translation::Method("toString"),
    "joined" => Translation::Rename("joinToString"),
    "hasPrefix" => Translation::Rename("startsWith"),
    "hasSuffix" => Translation::Rename("endsWith"),
    "insert" => Translation::Rename("add"),
    "remove" => Translation::Rename("removeAt"),
};

static FUNCTIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "print" => "println",
    "max" => "maxOf",
    "min" => "minOf",
    "abs" => "Math.abs",
    "fatalError" => "error",
    "precondition" => "require",
};

/// Standard-library names spelled the same in the target.
static IDENTICAL: phf::Set<&'static str> = phf_set! {
    "contains",
    "map",
    "filter",
    "sorted",
    "reversed",
    "removeLast",
    "removeFirst",
    "forEach",
    "keys",
    "values",
    "zip",
    "assert",
    "Int",
    "Double",
    "String",
    "Bool",
};

#[derive(Default)]
pub struct StandardLibrary {
    diagnostics: Vec<Diagnostic>,
}

impl StandardLibrary {
    fn untranslated(&mut self, name: &str, range: Option<text_size::TextRange>) {
        self.diagnostics.push(
            Diagnostic::from_code(
                ErrorCode::W4003,
                format!("no translation for standard library reference `{}`", name),
            )
            .with_range(range),
        );
    }

    /// `called` is set when the member is the callee of a call, where a
    /// property-to-method translation must not add a second argument list.
    fn translate_member(&mut self, member: MemberExpr, called: bool) -> Expr {
        let mut member = mut_walk::walk_member(self, member);
        if !member.is_standard_library {
            return Expr::Member(member);
        }
        member.is_standard_library = false;

        match MEMBERS.get(member.member.as_str()).copied() {
            Some(Translation::Rename(name)) => {
                member.member = name.to_string();
                Expr::Member(member)
            }
            Some(Translation::Method(name)) if called => {
                member.member = name.to_string();
                Expr::Member(member)
            }
            Some(Translation::Method(name)) => {
                member.member = name.to_string();
                let range = member.range;
                Expr::Call(CallExpr {
                    function: Box::new(Expr::Member(member)),
                    arguments: Box::new(Expr::Tuple(TupleExpr {
                        pairs: Vec::new(),
                        ty: None,
                        range: None,
                    })),
                    allows_trailing_closure: false,
                    is_pure: false,
                    ty: None,
                    range,
                })
            }
            None => {
                if !IDENTICAL.contains(member.member.as_str()) {
                    self.untranslated(&member.member, member.range);
                }
                Expr::Member(member)
            }
        }
    }
}

impl Rewriter for StandardLibrary {
    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn replace_call(&mut self, mut call: CallExpr) -> Expr {
        call.arguments = Box::new(self.replace_expression(*call.arguments));
        let function = match *call.function {
            Expr::Member(member) => self.translate_member(member, true),
            other => self.replace_expression(other),
        };
        call.function = Box::new(function);
        Expr::Call(call)
    }

    fn replace_member(&mut self, member: MemberExpr) -> Expr {
        self.translate_member(member, false)
    }

    fn replace_decl_ref(&mut self, mut decl_ref: DeclRefExpr) -> Expr {
        if !decl_ref.is_standard_library {
            return Expr::DeclRef(decl_ref);
        }
        decl_ref.is_standard_library = false;
        match FUNCTIONS.get(decl_ref.name.as_str()) {
            Some(name) => decl_ref.name = name.to_string(),
            None if IDENTICAL.contains(decl_ref.name.as_str()) => {}
            None => self.untranslated(&decl_ref.name, decl_ref.range),
        }
        Expr::DeclRef(decl_ref)
    }
}
