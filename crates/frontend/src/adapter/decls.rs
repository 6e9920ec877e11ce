//! Declarations.
//!
//! `let a, b: Int` arrives as one `PatternBindingDecl` holding both bindings,
//! followed by one `VarDecl` per name. The bindings wait in the adapter's
//! pending buffer until their `VarDecl` shows up; a binding that never gets
//! one becomes an error placeholder when its block ends.

use super::Adapter;
use super::arguments::{parse_parameter, split_top_level};
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::tables::DirectiveKind;
use tarn_core::ast::*;
use tarn_core::error::ErrorCode;
use text_size::TextRange;

/// One binding of a pattern binding declaration, waiting for its `VarDecl`.
#[derive(Debug, Clone)]
pub(super) struct PendingBinding {
    pub(super) name: String,
    pub(super) range: Option<TextRange>,
    ty: Option<String>,
    initializer: Option<Expr>,
    getter: Option<Vec<Stmt>>,
    setter: Option<Vec<Stmt>>,
    is_let: bool,
    is_static: bool,
    access: Option<String>,
}

impl PendingBinding {
    fn into_variable(self) -> VariableDecl {
        VariableDecl {
            name: self.name,
            ty: self.ty,
            initializer: self.initializer,
            is_let: self.is_let,
            is_static: self.is_static,
            getter: self.getter,
            setter: self.setter,
            access: self.access,
            extends_type: None,
            range: self.range,
        }
    }
}

fn texts_of(node: &SyntaxNode, kind: SyntaxKind) -> Vec<String> {
    node.children_of(kind).map(|c| c.text().trim().to_string()).collect()
}

fn is_static(node: &SyntaxNode) -> bool {
    node.has_modifier("static") || node.has_modifier("class")
}

/// Children that make up a type body.
fn is_member(node: &SyntaxNode) -> bool {
    !matches!(
        node.kind,
        SyntaxKind::Modifier | SyntaxKind::GenericParameter | SyntaxKind::InheritedType | SyntaxKind::EnumCaseDecl
    )
}

impl Adapter<'_> {
    pub(super) fn adapt_declaration(&mut self, node: &SyntaxNode) -> Vec<Stmt> {
        let range = Some(node.range());
        let stmt = match node.kind {
            SyntaxKind::ImportDecl => Stmt::Import(ImportDecl {
                module: node.text().to_string(),
                range,
            }),
            SyntaxKind::ClassDecl => Stmt::Class(ClassDecl {
                name: node.text().to_string(),
                generics: texts_of(node, SyntaxKind::GenericParameter),
                inherits: texts_of(node, SyntaxKind::InheritedType),
                members: self.adapt_members(node),
                access: Self::access(node),
                is_final: node.has_modifier("final"),
                range,
            }),
            SyntaxKind::StructDecl => Stmt::Struct(StructDecl {
                name: node.text().to_string(),
                generics: texts_of(node, SyntaxKind::GenericParameter),
                inherits: texts_of(node, SyntaxKind::InheritedType),
                members: self.adapt_members(node),
                access: Self::access(node),
                range,
            }),
            SyntaxKind::ProtocolDecl => Stmt::Protocol(ProtocolDecl {
                name: node.text().to_string(),
                inherits: texts_of(node, SyntaxKind::InheritedType),
                members: self.adapt_members(node),
                access: Self::access(node),
                range,
            }),
            SyntaxKind::EnumDecl => {
                let mut elements = Vec::new();
                for case in node.children_of(SyntaxKind::EnumCaseDecl) {
                    for element in case.children_of(SyntaxKind::EnumCaseElement) {
                        elements.push(self.adapt_enum_element(element));
                    }
                }
                Stmt::Enum(EnumDecl {
                    name: node.text().to_string(),
                    inherits: texts_of(node, SyntaxKind::InheritedType),
                    elements,
                    members: self.adapt_members(node),
                    access: Self::access(node),
                    kind: None,
                    range,
                })
            }
            SyntaxKind::ExtensionDecl => Stmt::Extension(ExtensionDecl {
                type_name: node.text().to_string(),
                inherits: texts_of(node, SyntaxKind::InheritedType),
                members: self.adapt_members(node),
                range,
            }),
            SyntaxKind::FunctionDecl | SyntaxKind::InitializerDecl => self.adapt_function(node),
            SyntaxKind::PatternBindingDecl => {
                self.buffer_bindings(node);
                return Vec::new();
            }
            SyntaxKind::VarDecl => self.adapt_var_decl(node),
            kind => self.error_stmt(node, ErrorCode::E1001, format!("unsupported declaration `{:?}`", kind)),
        };
        vec![stmt]
    }

    fn adapt_members(&mut self, node: &SyntaxNode) -> Vec<Stmt> {
        self.adapt_sequence(node.children.iter().filter(|c| is_member(c)))
    }

    fn adapt_enum_element(&mut self, element: &SyntaxNode) -> EnumElement {
        let associated_values = element
            .children_of(SyntaxKind::Parameter)
            .map(|value| {
                let text = value.text();
                let parts = split_top_level(text, ':');
                match parts.as_slice() {
                    [label, ty] => LabeledType {
                        label: Some(label.trim().to_string()).filter(|l| !l.is_empty() && l != "_"),
                        ty: ty.trim().to_string(),
                    },
                    _ => LabeledType {
                        label: None,
                        ty: text.trim().to_string(),
                    },
                }
            })
            .collect();
        EnumElement {
            name: element.text().to_string(),
            associated_values,
            raw_value: element.child("raw_value").map(|raw| self.adapt_expr(raw)),
            range: Some(element.range()),
        }
    }

    fn adapt_function(&mut self, node: &SyntaxNode) -> Stmt {
        let (name, kind) = if node.kind == SyntaxKind::InitializerDecl {
            let failable = node.text().ends_with('?') || node.text().ends_with('!');
            ("init".to_string(), FunctionKind::Initializer { failable })
        } else {
            (node.text().to_string(), FunctionKind::Function)
        };

        let mut parameters = Vec::new();
        for parameter in node.children_of(SyntaxKind::Parameter) {
            let Some(info) = parse_parameter(parameter.text()) else {
                return self.error_stmt(
                    parameter,
                    ErrorCode::E1001,
                    format!("cannot read parameter `{}` of `{}`", parameter.text(), name),
                );
            };
            parameters.push(Parameter {
                label: info.label,
                name: info.name,
                ty: info.ty,
                default: parameter.child("default").map(|d| self.adapt_expr(d)),
                is_variadic: info.is_variadic,
            });
        }

        let body = node.child("body").map(|body| self.adapt_block(Some(body)));
        Stmt::Function(FunctionDecl {
            name,
            kind,
            generics: texts_of(node, SyntaxKind::GenericParameter),
            parameters,
            return_type: Self::type_name(node, "return_type"),
            body,
            access: Self::access(node),
            is_static: is_static(node),
            is_override: node.has_modifier("override"),
            is_mutating: node.has_modifier("mutating"),
            throws: node.has_modifier("throws") || node.has_modifier("rethrows"),
            is_pure: self.tables.directives.has(node.offset, DirectiveKind::Pure),
            extends_type: None,
            range: Some(node.range()),
        })
    }

    /// An accessor body, given either as a block in `role` or as an
    /// `Accessor` child spelled `keyword`.
    fn adapt_accessor(&mut self, node: &SyntaxNode, role: &str, keyword: &str) -> Option<Vec<Stmt>> {
        if let Some(block) = node.child(role) {
            return Some(self.adapt_block(Some(block)));
        }
        let accessor = node
            .children_of(SyntaxKind::Accessor)
            .find(|a| a.text() == keyword)?;
        Some(self.adapt_block(accessor.child("body")))
    }

    fn buffer_bindings(&mut self, node: &SyntaxNode) {
        let is_let = !node.has_modifier("var");
        let is_static = is_static(node);
        let access = Self::access(node);

        let mut bindings = Vec::new();
        for binding in node.children_of(SyntaxKind::PatternBinding) {
            let initializer = binding.child("initializer").map(|i| self.adapt_expr(i));
            let getter = self.adapt_accessor(binding, "getter", "get");
            let setter = self.adapt_accessor(binding, "setter", "set");
            bindings.push(PendingBinding {
                name: binding.text().to_string(),
                range: Some(binding.range()),
                ty: Self::type_name(binding, "type"),
                initializer,
                getter,
                setter,
                is_let,
                is_static,
                access: access.clone(),
            });
        }

        // In `let a, b: Int` the type is written once, after the last name.
        let mut carried: Option<String> = None;
        for binding in bindings.iter_mut().rev() {
            match (&binding.ty, &binding.initializer) {
                (Some(ty), _) => carried = Some(ty.clone()),
                (None, Some(_)) => carried = None,
                (None, None) => binding.ty = carried.clone(),
            }
        }

        log::trace!("buffering {} bindings at {}", bindings.len(), node.offset);
        self.pending.extend(bindings);
    }

    fn adapt_var_decl(&mut self, node: &SyntaxNode) -> Stmt {
        let name = node.text();
        if self.pending.is_empty() {
            return self.standalone_variable(node);
        }
        // Declarations follow their bindings in order; a host that reorders
        // them is still paired by name.
        let in_order = self.pending.front().is_some_and(|b| b.name == name);
        let found = if in_order {
            Some(0)
        } else {
            self.pending.iter().position(|b| b.name == name)
        };
        let Some(position) = found else {
            let expected = self.pending.front().map(|b| b.name.clone()).unwrap_or_default();
            return self.error_stmt(
                node,
                ErrorCode::E2004,
                format!("declaration `{}` does not match pending binding `{}`", name, expected),
            );
        };
        let Some(binding) = self.pending.remove(position) else {
            return self.standalone_variable(node);
        };

        let mut variable = binding.into_variable();
        // Modifiers may sit on either node.
        variable.is_static |= is_static(node);
        if node.has_modifier("var") {
            variable.is_let = false;
        }
        if variable.access.is_none() {
            variable.access = Self::access(node);
        }
        Stmt::Variable(variable)
    }

    fn standalone_variable(&mut self, node: &SyntaxNode) -> Stmt {
        let initializer = node.child("initializer").map(|i| self.adapt_expr(i));
        let getter = self.adapt_accessor(node, "getter", "get");
        let setter = self.adapt_accessor(node, "setter", "set");
        Stmt::Variable(VariableDecl {
            name: node.text().to_string(),
            ty: Self::type_name(node, "type"),
            initializer,
            is_let: !node.has_modifier("var"),
            is_static: is_static(node),
            getter,
            setter,
            access: Self::access(node),
            extends_type: None,
            range: Some(node.range()),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::adapter::adapt;
    use crate::syntax::{SyntaxKind, SyntaxNode};
    use crate::tables::{Directive, DirectiveKind, DirectiveTable, SideTables};
    use tarn_core::ast::*;
    use tarn_core::error::ErrorCode;

    fn n(kind: SyntaxKind) -> SyntaxNode {
        SyntaxNode::new(kind)
    }

    fn modifier(text: &str) -> SyntaxNode {
        n(SyntaxKind::Modifier).with_text(text)
    }

    fn declarations(root: SyntaxNode) -> Vec<Stmt> {
        adapt("decls.swift", &n(SyntaxKind::SourceFile).with_child(root), &SideTables::default())
            .file
            .declarations
    }

    #[test]
    fn test_class_with_members() {
        let class = n(SyntaxKind::ClassDecl).with_text("Counter").with_children([
            modifier("final"),
            modifier("public"),
            n(SyntaxKind::InheritedType).with_text("Base"),
            n(SyntaxKind::FunctionDecl)
                .with_text("reset")
                .with_child(n(SyntaxKind::CodeBlock).with_role("body")),
        ]);
        let Stmt::Class(class) = &declarations(class)[0] else {
            panic!("expected class");
        };
        assert!(class.is_final);
        assert_eq!(class.access.as_deref(), Some("public"));
        assert_eq!(class.inherits, vec!["Base"]);
        assert_eq!(dump_stmts(&class.members), "func reset() -> ()\n");
    }

    #[test]
    fn test_enum_elements() {
        let decl = n(SyntaxKind::EnumDecl).with_text("Shape").with_children([
            n(SyntaxKind::EnumCaseDecl).with_children([
                n(SyntaxKind::EnumCaseElement)
                    .with_text("circle")
                    .with_child(n(SyntaxKind::Parameter).with_text("radius: Double")),
                n(SyntaxKind::EnumCaseElement)
                    .with_text("pair")
                    .with_children([
                        n(SyntaxKind::Parameter).with_text("Int"),
                        n(SyntaxKind::Parameter).with_text("(Int) -> Bool"),
                    ]),
            ]),
            n(SyntaxKind::EnumCaseDecl).with_child(n(SyntaxKind::EnumCaseElement).with_text("empty")),
        ]);
        let decls = declarations(decl);
        let Stmt::Enum(shape) = &decls[0] else {
            panic!("expected enum");
        };
        assert!(shape.members.is_empty());
        assert!(shape.has_payload_cases());
        assert_eq!(
            dump_stmts(&decls),
            "enum Shape None\n  case circle(radius: Double)\n  case pair(Int, (Int) -> Bool)\n  case empty()\n"
        );
    }

    #[test]
    fn test_function_signature() {
        let func = n(SyntaxKind::FunctionDecl).with_text("scale").with_children([
            modifier("static"),
            modifier("throws"),
            n(SyntaxKind::Parameter).with_text("_ value: Int"),
            n(SyntaxKind::Parameter)
                .with_text("by factor: Int = 2")
                .with_child(n(SyntaxKind::IntegerLiteral).with_text("2").with_role("default")),
            n(SyntaxKind::Type).with_text("Int").with_role("return_type"),
        ]);
        let Stmt::Function(func) = &declarations(func)[0] else {
            panic!("expected function");
        };
        assert!(func.is_static && func.throws);
        assert!(func.body.is_none());
        assert_eq!(func.labels().collect::<Vec<_>>(), vec![None, Some("by")]);
        assert_eq!(func.parameters[1].default.as_ref().map(expr_to_string).as_deref(), Some("2"));
        assert_eq!(func.return_type.as_deref(), Some("Int"));
    }

    #[test]
    fn test_failable_initializer_and_pure_directive() {
        let tables = SideTables {
            directives: DirectiveTable::new(vec![Directive {
                offset: 40,
                kind: DirectiveKind::Pure,
                payload: None,
            }]),
            ..Default::default()
        };
        let root = n(SyntaxKind::SourceFile).with_children([
            n(SyntaxKind::InitializerDecl)
                .with_text("init?")
                .with_child(n(SyntaxKind::Parameter).with_text("raw: String")),
            n(SyntaxKind::FunctionDecl).with_text("area").at(40, 20),
        ]);
        let file = adapt("decls.swift", &root, &tables).file;
        let [Stmt::Function(init), Stmt::Function(area)] = file.declarations.as_slice() else {
            panic!("expected two functions");
        };
        assert_eq!(init.kind, FunctionKind::Initializer { failable: true });
        assert!(!init.is_pure);
        assert!(area.is_pure);
    }

    #[test]
    fn test_dangling_bindings_share_trailing_type() {
        // let a, b: Int
        let root = n(SyntaxKind::SourceFile).with_children([
            n(SyntaxKind::PatternBindingDecl).with_children([
                modifier("let"),
                n(SyntaxKind::PatternBinding).with_text("a"),
                n(SyntaxKind::PatternBinding)
                    .with_text("b")
                    .with_child(n(SyntaxKind::Type).with_text("Int").with_role("type")),
            ]),
            n(SyntaxKind::VarDecl).with_text("a"),
            n(SyntaxKind::VarDecl).with_text("b"),
        ]);
        let file = adapt("decls.swift", &root, &SideTables::default()).file;
        assert_eq!(dump_stmts(&file.declarations), "let a: Int\nlet b: Int\n");
    }

    #[test]
    fn test_reordered_declarations_pair_by_name() {
        // let a = 1, b: Int, with the declarations reported b, a
        let root = n(SyntaxKind::SourceFile).with_children([
            n(SyntaxKind::PatternBindingDecl).with_children([
                modifier("let"),
                n(SyntaxKind::PatternBinding)
                    .with_text("a")
                    .with_child(n(SyntaxKind::IntegerLiteral).with_text("1").with_role("initializer")),
                n(SyntaxKind::PatternBinding)
                    .with_text("b")
                    .with_child(n(SyntaxKind::Type).with_text("Int").with_role("type")),
            ]),
            n(SyntaxKind::VarDecl).with_text("b"),
            n(SyntaxKind::VarDecl).with_text("a"),
        ]);
        let adaptation = adapt("decls.swift", &root, &SideTables::default());
        assert!(adaptation.diagnostics.is_empty());
        assert_eq!(dump_stmts(&adaptation.file.declarations), "let b: Int\nlet a = 1\n");
    }

    #[test]
    fn test_initializer_stops_type_carry() {
        // var a, b = 1, c: Int
        let root = n(SyntaxKind::SourceFile).with_children([
            n(SyntaxKind::PatternBindingDecl).with_children([
                modifier("var"),
                n(SyntaxKind::PatternBinding).with_text("a"),
                n(SyntaxKind::PatternBinding)
                    .with_text("b")
                    .with_child(n(SyntaxKind::IntegerLiteral).with_text("1").with_role("initializer")),
                n(SyntaxKind::PatternBinding)
                    .with_text("c")
                    .with_child(n(SyntaxKind::Type).with_text("Int").with_role("type")),
            ]),
            n(SyntaxKind::VarDecl).with_text("a"),
            n(SyntaxKind::VarDecl).with_text("b"),
            n(SyntaxKind::VarDecl).with_text("c"),
        ]);
        let file = adapt("decls.swift", &root, &SideTables::default()).file;
        assert_eq!(dump_stmts(&file.declarations), "var a\nvar b = 1\nvar c: Int\n");
    }

    #[test]
    fn test_mismatched_binding_is_reported() {
        let root = n(SyntaxKind::SourceFile).with_children([
            n(SyntaxKind::PatternBindingDecl).with_child(n(SyntaxKind::PatternBinding).with_text("x").at(4, 1)),
            n(SyntaxKind::VarDecl).with_text("y").at(10, 1),
        ]);
        let file = adapt("decls.swift", &root, &SideTables::default()).file;
        let codes: Vec<_> = file
            .declarations
            .iter()
            .map(|s| match s {
                Stmt::Error(e) => e.diagnostic.code,
                _ => None,
            })
            .collect();
        // The unmatched `y` and the never-declared `x`.
        assert_eq!(codes, vec![Some(ErrorCode::E2004), Some(ErrorCode::E2004)]);
    }

    #[test]
    fn test_standalone_computed_variable() {
        let var = n(SyntaxKind::VarDecl).with_text("area").with_children([
            modifier("var"),
            n(SyntaxKind::Type).with_text("Double").with_role("type"),
            n(SyntaxKind::Accessor).with_text("get").with_child(
                n(SyntaxKind::CodeBlock).with_role("body").with_child(
                    n(SyntaxKind::ReturnStmt).with_child(n(SyntaxKind::FloatLiteral).with_text("1.5").with_role("value")),
                ),
            ),
        ]);
        let Stmt::Variable(var) = &declarations(var)[0] else {
            panic!("expected variable");
        };
        assert!(!var.is_let);
        assert!(var.is_computed());
        assert_eq!(dump_stmts(var.getter.as_deref().unwrap_or_default()), "return 1.5\n");
    }
}
