//! Collection-phase passes.
//!
//! These run once per file before any transformation and fill the shared
//! [`RegistryBuilder`]. Only `clean_inheritances` and `record_enums` touch the
//! tree itself.

use crate::ast::*;
use crate::error::Diagnostic;
use crate::registry::{EnumInfo, RegistryBuilder};
use crate::visitor::{Rewriter, Visitor, walk};
use phf::phf_set;

/// Conformances with no counterpart in the target language.
static SOURCE_ONLY_CONFORMANCES: phf::Set<&'static str> = phf_set! {
    "Equatable",
    "Hashable",
    "Codable",
    "Encodable",
    "Decodable",
    "CustomStringConvertible",
    "CustomDebugStringConvertible",
    "CaseIterable",
    "RawRepresentable",
    "Identifiable",
    "Sendable",
};

/// Types an enum may inherit from to declare its raw values.
static RAW_VALUE_TYPES: phf::Set<&'static str> = phf_set! {
    "Int", "Int8", "Int16", "Int32", "Int64",
    "UInt", "UInt8", "UInt16", "UInt32", "UInt64",
    "Float", "Double", "String", "Character", "Bool",
};

fn clean(inherits: &mut Vec<String>) {
    inherits.retain(|name| !SOURCE_ONLY_CONFORMANCES.contains(name.as_str()));
}

/// Strips conformances that only exist in the source language.
pub struct CleanInheritances;

impl Rewriter for CleanInheritances {
    fn replace_class(&mut self, mut decl: ClassDecl) -> Vec<Stmt> {
        clean(&mut decl.inherits);
        decl.members = self.replace_statements(decl.members);
        vec![Stmt::Class(decl)]
    }

    fn replace_struct(&mut self, mut decl: StructDecl) -> Vec<Stmt> {
        clean(&mut decl.inherits);
        decl.members = self.replace_statements(decl.members);
        vec![Stmt::Struct(decl)]
    }

    fn replace_protocol(&mut self, mut decl: ProtocolDecl) -> Vec<Stmt> {
        clean(&mut decl.inherits);
        vec![Stmt::Protocol(decl)]
    }

    fn replace_enum(&mut self, mut decl: EnumDecl) -> Vec<Stmt> {
        clean(&mut decl.inherits);
        decl.members = self.replace_statements(decl.members);
        vec![Stmt::Enum(decl)]
    }

    fn replace_extension(&mut self, mut decl: ExtensionDecl) -> Vec<Stmt> {
        clean(&mut decl.inherits);
        decl.members = self.replace_statements(decl.members);
        vec![Stmt::Extension(decl)]
    }

    // Declarations only nest inside other declarations.
    fn replace_expression(&mut self, expr: Expr) -> Expr {
        expr
    }
}

/// Classifies every enum, on the declaration and in the registry.
///
/// An enum is payload-free when no case carries data and nothing but a raw
/// value type is left in its inheritance list after cleaning.
pub struct RecordEnums<'a> {
    registry: &'a RegistryBuilder,
}

impl<'a> RecordEnums<'a> {
    pub fn new(registry: &'a RegistryBuilder) -> Self {
        RecordEnums { registry }
    }
}

pub fn classify(decl: &EnumDecl) -> EnumKind {
    let only_raw_values = decl
        .inherits
        .iter()
        .all(|name| RAW_VALUE_TYPES.contains(name.as_str()));
    if decl.has_payload_cases() || !only_raw_values {
        EnumKind::HasPayload
    } else {
        EnumKind::PayloadFree
    }
}

impl Rewriter for RecordEnums<'_> {
    fn replace_enum(&mut self, mut decl: EnumDecl) -> Vec<Stmt> {
        let kind = classify(&decl);
        decl.kind = Some(kind);
        self.registry.record_enum(
            decl.name.clone(),
            EnumInfo {
                kind,
                cases: decl.elements.iter().map(|e| e.name.clone()).collect(),
            },
        );
        decl.members = self.replace_statements(decl.members);
        vec![Stmt::Enum(decl)]
    }

    fn replace_expression(&mut self, expr: Expr) -> Expr {
        expr
    }
}

struct ProtocolRecorder<'a> {
    registry: &'a RegistryBuilder,
}

impl Visitor for ProtocolRecorder<'_> {
    fn visit_stmt(&self, stmt: &Stmt) {
        if let Stmt::Protocol(p) = stmt {
            self.registry.record_protocol(p.name.clone());
        }
        walk::walk_stmt(self, stmt);
    }

    fn visit_expr(&self, _expr: &Expr) {}
}

pub fn record_protocols(file: &SourceFile, registry: &RegistryBuilder) -> Vec<Diagnostic> {
    ProtocolRecorder { registry }.visit_file(file);
    Vec::new()
}

struct TypeRecorder<'a> {
    registry: &'a RegistryBuilder,
}

impl Visitor for TypeRecorder<'_> {
    fn visit_stmt(&self, stmt: &Stmt) {
        match stmt {
            Stmt::Struct(s) => self.registry.record_struct(s.name.clone()),
            Stmt::Class(c) => self.registry.record_class(c.name.clone()),
            _ => {}
        }
        walk::walk_stmt(self, stmt);
    }

    fn visit_expr(&self, _expr: &Expr) {}
}

pub fn record_types(file: &SourceFile, registry: &RegistryBuilder) -> Vec<Diagnostic> {
    TypeRecorder { registry }.visit_file(file);
    Vec::new()
}

/// Records `name(label:_:)` → internal parameter names for every function,
/// method and initializer, plus purity flags.
///
/// Initializers are keyed by the owning type name, which is how call sites
/// spell them.
pub fn record_functions(file: &SourceFile, registry: &RegistryBuilder) -> Vec<Diagnostic> {
    record_functions_in(&file.declarations, None, registry);
    record_functions_in(&file.statements, None, registry);
    Vec::new()
}

fn record_functions_in(stmts: &[Stmt], owner: Option<&str>, registry: &RegistryBuilder) {
    for stmt in stmts {
        match stmt {
            Stmt::Function(f) => record_function(f, owner, registry),
            Stmt::Class(c) => record_functions_in(&c.members, Some(&c.name), registry),
            Stmt::Struct(s) => record_functions_in(&s.members, Some(&s.name), registry),
            Stmt::Enum(e) => record_functions_in(&e.members, Some(&e.name), registry),
            Stmt::Extension(e) => record_functions_in(&e.members, Some(&e.type_name), registry),
            Stmt::Protocol(p) => record_functions_in(&p.members, Some(&p.name), registry),
            Stmt::Companion(c) => record_functions_in(&c.members, owner, registry),
            _ => {}
        }
    }
}

fn record_function(f: &FunctionDecl, owner: Option<&str>, registry: &RegistryBuilder) {
    let name = match (f.is_initializer(), owner) {
        (true, Some(owner)) => owner,
        _ => f.name.as_str(),
    };
    let key = signature_key(name, f.labels());
    if f.is_pure {
        registry.record_pure(key.clone());
    }
    registry.record_function(key, f.parameters.iter().map(|p| p.name.clone()).collect());

    // Nested functions are callable by their own name.
    if let Some(body) = &f.body {
        record_functions_in(body, owner, registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::build::*;

    fn collect(file: &mut SourceFile) -> crate::registry::Registry {
        let builder = RegistryBuilder::new();
        apply_all(file, &builder);
        builder.freeze()
    }

    fn apply_all(file: &mut SourceFile, builder: &RegistryBuilder) {
        let taken = std::mem::take(file);
        let taken = CleanInheritances.rewrite_file(taken);
        *file = RecordEnums::new(builder).rewrite_file(taken);
        record_protocols(file, builder);
        record_functions(file, builder);
        record_types(file, builder);
    }

    #[test]
    fn test_clean_inheritances_strips_source_only_conformances() {
        let mut file = file_with_declarations(vec![struct_decl(
            "Point",
            &["Equatable", "Drawable", "Hashable"],
            vec![],
        )]);
        collect(&mut file);

        let Stmt::Struct(s) = &file.declarations[0] else {
            panic!("expected struct");
        };
        assert_eq!(s.inherits, vec!["Drawable".to_string()]);
    }

    #[test]
    fn test_enum_classification() {
        let mut file = file_with_declarations(vec![
            enum_decl("Direction", &["String", "Equatable"], vec![element("north", &[]), element("south", &[])]),
            enum_decl("Shape", &[], vec![element("empty", &[]), element("circle", &[(Some("radius"), "Double")])]),
            enum_decl("Token", &["Printable"], vec![element("eof", &[])]),
        ]);
        let registry = collect(&mut file);

        assert_eq!(registry.enum_kind("Direction"), Some(EnumKind::PayloadFree));
        assert_eq!(registry.enum_kind("Shape"), Some(EnumKind::HasPayload));
        // A remaining protocol conformance needs the sealed-class form.
        assert_eq!(registry.enum_kind("Token"), Some(EnumKind::HasPayload));

        let Stmt::Enum(direction) = &file.declarations[0] else {
            panic!("expected enum");
        };
        assert_eq!(direction.kind, Some(EnumKind::PayloadFree));
    }

    #[test]
    fn test_cleaning_runs_before_classification() {
        // Equatable alone must not force a sealed hierarchy.
        let mut file = file_with_declarations(vec![enum_decl(
            "Light",
            &["Equatable"],
            vec![element("on", &[]), element("off", &[])],
        )]);
        let registry = collect(&mut file);
        assert_eq!(registry.enum_kind("Light"), Some(EnumKind::PayloadFree));
    }

    #[test]
    fn test_record_functions_and_initializers() {
        let mut pure = function_decl(
            "area",
            vec![param(Some("of"), "shape", "Shape")],
            Some("Double"),
            vec![],
        );
        pure.is_pure = true;

        let mut file = file_with_declarations(vec![
            function_with(
                "move",
                vec![param(Some("from"), "start", "Int"), param(None, "end", "Int")],
                None,
                vec![],
            ),
            Stmt::Function(pure),
            struct_decl(
                "Point",
                &[],
                vec![initializer(vec![param(Some("x"), "x", "Int")], false, vec![])],
            ),
        ]);
        let registry = collect(&mut file);

        assert_eq!(
            registry.parameter_names("move(from:_:)"),
            Some(&["start".to_string(), "end".to_string()][..])
        );
        assert!(registry.parameter_names("Point(x:)").is_some());
        assert!(registry.is_pure("area(of:)"));
        assert!(!registry.is_pure("move(from:_:)"));
        assert!(registry.is_struct("Point"));
    }

    #[test]
    fn test_record_protocols_nested() {
        let mut file = file_with_declarations(vec![
            protocol_decl("Drawable", vec![]),
            class_decl("Canvas", &["Drawable"], vec![protocol_decl("Delegate", vec![])]),
        ]);
        let registry = collect(&mut file);
        assert!(registry.is_protocol("Drawable"));
        assert!(registry.is_protocol("Delegate"));
        assert!(registry.is_class("Canvas"));
    }
}
