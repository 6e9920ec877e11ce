//! Declaration emission: types, functions and properties.

use super::Emitter;
use super::expr::error_marker;
use crate::names::{capitalized_camel, escape_identifier, upper_snake};
use crate::types::translate_type;
use phf::phf_set;
use tarn_core::ast::*;

/// Source modules with no target counterpart; importing them emits nothing.
static PLATFORM_MODULES: phf::Set<&'static str> = phf_set! {
    "Foundation", "Swift", "Dispatch", "Darwin", "Glibc", "UIKit", "AppKit", "Cocoa",
};

/// Raw-value types a payload-free union may inherit from.
static RAW_VALUE_TYPES: phf::Set<&'static str> = phf_set! {
    "Int", "UInt", "Int8", "Int16", "Int32", "Int64", "String", "Character", "Double", "Float",
};

fn access_modifier(access: Option<&str>) -> &'static str {
    match access {
        Some("private") | Some("fileprivate") => "private ",
        Some("internal") => "internal ",
        _ => "",
    }
}

/// `<T, U : Comparable>`, or nothing.
fn generics(parameters: &[String]) -> String {
    if parameters.is_empty() {
        return String::new();
    }
    let parameters: Vec<String> = parameters
        .iter()
        .map(|p| match p.split_once(':') {
            Some((name, bound)) => format!("{} : {}", name.trim(), translate_type(bound)),
            None => p.trim().to_string(),
        })
        .collect();
    format!("<{}>", parameters.join(", "))
}

fn is_unit(ty: &str) -> bool {
    translate_type(ty) == "Unit"
}

/// Stored properties become primary-constructor parameters of a data class.
fn is_stored(member: &Stmt) -> bool {
    matches!(member, Stmt::Variable(v) if !v.is_static && !v.is_computed() && v.ty.is_some() && v.extends_type.is_none())
}

impl Emitter<'_> {
    pub(super) fn import(&self, import: &ImportDecl, level: usize, out: &mut String) {
        if PLATFORM_MODULES.contains(import.module.as_str()) {
            return;
        }
        self.line(out, level, &format!("import {}.*", import.module));
    }

    /// ` : Base(), Protocol`; superclasses are called, protocols are not.
    fn supertypes(&self, inherits: &[String]) -> String {
        if inherits.is_empty() {
            return String::new();
        }
        let supertypes: Vec<String> = inherits
            .iter()
            .map(|name| {
                let translated = translate_type(name);
                if self.registry.is_class(name) {
                    format!("{}()", translated)
                } else {
                    translated
                }
            })
            .collect();
        format!(" : {}", supertypes.join(", "))
    }

    /// ` { members }`, or nothing for a type without members.
    fn member_block(&self, level: usize, members: &[Stmt]) -> String {
        if members.is_empty() {
            String::new()
        } else {
            format!(" {}", self.block(level, members))
        }
    }

    pub(super) fn class(&self, class: &ClassDecl, level: usize, out: &mut String) {
        let text = format!(
            "{}{}class {}{}{}{}",
            access_modifier(class.access.as_deref()),
            if class.is_final { "" } else { "open " },
            class.name,
            generics(&class.generics),
            self.supertypes(&class.inherits),
            self.member_block(level, &class.members)
        );
        self.line(out, level, &text);
    }

    pub(super) fn structure(&self, structure: &StructDecl, level: usize, out: &mut String) {
        let (stored, members): (Vec<&Stmt>, Vec<&Stmt>) = structure.members.iter().partition(|m| is_stored(m));
        let members: Vec<Stmt> = members.into_iter().cloned().collect();
        let tail = format!(
            "{}{}",
            self.supertypes(&structure.inherits),
            self.member_block(level, &members)
        );
        let access = access_modifier(structure.access.as_deref());
        let name = format!("{}{}", structure.name, generics(&structure.generics));

        let text = if stored.is_empty() {
            format!("{}class {}{}", access, name, tail)
        } else {
            let head = format!("{}data class {}", access, name);
            self.list(level, &head, &stored, &tail, |member, l| match member {
                Stmt::Variable(v) => self.property_parameter(v, l),
                _ => String::new(),
            })
        };
        self.line(out, level, &text);
    }

    fn property_parameter(&self, variable: &VariableDecl, level: usize) -> String {
        let mut text = self.variable_head(variable);
        if let Some(initializer) = &variable.initializer {
            text.push_str(" = ");
            text.push_str(&self.expr(initializer, level));
        }
        text
    }

    pub(super) fn protocol(&self, protocol: &ProtocolDecl, level: usize, out: &mut String) {
        let mut text = format!(
            "{}interface {}{}",
            access_modifier(protocol.access.as_deref()),
            protocol.name,
            self.supertypes(&protocol.inherits)
        );
        if !protocol.members.is_empty() {
            let mut body = String::from(" {\n");
            let mut first = true;
            for member in &protocol.members {
                if !first {
                    body.push('\n');
                }
                first = false;
                match member {
                    Stmt::Variable(v) => self.line(&mut body, level + 1, &self.requirement_property(v)),
                    Stmt::Function(f) => self.function(f, level + 1, &mut body),
                    other => self.statement(other, level + 1, &mut body),
                }
            }
            body.push_str(&self.indent(level));
            body.push('}');
            text.push_str(&body);
        }
        self.line(out, level, &text);
    }

    /// A property requirement: `val` unless a setter is required.
    fn requirement_property(&self, variable: &VariableDecl) -> String {
        let keyword = if variable.setter.is_some() { "var" } else { "val" };
        let ty = variable.ty.as_deref().map(translate_type).unwrap_or_else(|| "Any".to_string());
        format!("{} {}: {}", keyword, escape_identifier(&variable.name), ty)
    }

    /// Whether the union is emitted as a sealed class rather than an enum class.
    fn has_payload(&self, enumeration: &EnumDecl) -> bool {
        let kind = enumeration
            .kind
            .or_else(|| self.registry.enum_kind(&enumeration.name));
        match kind {
            Some(kind) => kind == EnumKind::HasPayload,
            None => enumeration.has_payload_cases(),
        }
    }

    pub(super) fn enumeration(&self, enumeration: &EnumDecl, level: usize, out: &mut String) {
        if self.has_payload(enumeration) {
            self.sealed_class(enumeration, level, out);
        } else {
            self.enum_class(enumeration, level, out);
        }
    }

    fn sealed_class(&self, enumeration: &EnumDecl, level: usize, out: &mut String) {
        let head = format!(
            "{}sealed class {}{}",
            access_modifier(enumeration.access.as_deref()),
            enumeration.name,
            self.supertypes(&enumeration.inherits)
        );
        let parent = format!(" : {}()", enumeration.name);
        let mut body = String::new();
        for element in &enumeration.elements {
            let name = capitalized_camel(&element.name);
            let case = if element.associated_values.is_empty() {
                format!("object {}{}", name, parent)
            } else {
                let values: Vec<(usize, &LabeledType)> = element.associated_values.iter().enumerate().collect();
                let single = values.len() == 1;
                self.list(level + 1, &format!("class {}", name), &values, &parent, |(index, value), _| {
                    let label = match (&value.label, single) {
                        (Some(label), _) => escape_identifier(label),
                        (None, true) => "value".to_string(),
                        (None, false) => format!("value{}", index + 1),
                    };
                    format!("val {}: {}", label, translate_type(&value.ty))
                })
            };
            self.line(&mut body, level + 1, &case);
        }
        if !enumeration.members.is_empty() {
            body.push('\n');
            self.statements(&enumeration.members, level + 1, &mut body);
        }
        self.line(out, level, &format!("{} {{\n{}{}}}", head, body, self.indent(level)));
    }

    fn enum_class(&self, enumeration: &EnumDecl, level: usize, out: &mut String) {
        let raw_type = enumeration
            .inherits
            .first()
            .filter(|ty| RAW_VALUE_TYPES.contains(ty.as_str()));
        let interfaces: Vec<String> = enumeration
            .inherits
            .iter()
            .filter(|ty| Some(*ty) != raw_type)
            .cloned()
            .collect();

        let constructor = match raw_type {
            Some(ty) => format!("(val rawValue: {})", translate_type(ty)),
            None => String::new(),
        };
        let head = format!(
            "{}enum class {}{}{}",
            access_modifier(enumeration.access.as_deref()),
            enumeration.name,
            constructor,
            self.supertypes(&interfaces)
        );

        // `None` once an explicit value leaves no successor.
        let mut next_int = Some(0i64);
        let entries: Vec<String> = enumeration
            .elements
            .iter()
            .map(|element| {
                let name = upper_snake(&element.name);
                let Some(ty) = raw_type else {
                    return name;
                };
                let raw = match &element.raw_value {
                    Some(value) => {
                        if let Expr::Literal(LiteralExpr { value: LiteralValue::Int(v), .. }) = value {
                            next_int = v.checked_add(1);
                        }
                        self.expr(value, level + 1)
                    }
                    None if ty == "String" => format!("\"{}\"", element.name),
                    None => match next_int {
                        Some(value) => {
                            next_int = value.checked_add(1);
                            value.to_string()
                        }
                        None => error_marker(&format!("no raw value follows {}", i64::MAX)),
                    },
                };
                format!("{}({})", name, raw)
            })
            .collect();

        let mut body = String::new();
        let count = entries.len();
        for (index, entry) in entries.iter().enumerate() {
            let separator = if index + 1 < count {
                ","
            } else if enumeration.members.is_empty() {
                ""
            } else {
                ";"
            };
            self.line(&mut body, level + 1, &format!("{}{}", entry, separator));
        }
        if !enumeration.members.is_empty() {
            body.push('\n');
            self.statements(&enumeration.members, level + 1, &mut body);
        }
        self.line(out, level, &format!("{} {{\n{}{}}}", head, body, self.indent(level)));
    }

    /// Leftover extensions: each member is emitted as an extension member.
    pub(super) fn extension(&self, extension: &ExtensionDecl, level: usize, out: &mut String) {
        let members: Vec<Stmt> = extension
            .members
            .iter()
            .cloned()
            .map(|member| match member {
                Stmt::Function(mut f) => {
                    f.extends_type.get_or_insert_with(|| extension.type_name.clone());
                    Stmt::Function(f)
                }
                Stmt::Variable(mut v) => {
                    v.extends_type.get_or_insert_with(|| extension.type_name.clone());
                    Stmt::Variable(v)
                }
                other => other,
            })
            .collect();
        self.statements(&members, level, out);
    }

    pub(super) fn companion(&self, companion: &CompanionDecl, level: usize, out: &mut String) {
        let text = format!("companion object {}", self.block(level, &companion.members));
        self.line(out, level, &text);
    }

    fn parameter(&self, parameter: &Parameter, level: usize) -> String {
        let ty = parameter.ty.strip_suffix("...").unwrap_or(&parameter.ty);
        let mut text = format!(
            "{}{}: {}",
            if parameter.is_variadic { "vararg " } else { "" },
            escape_identifier(&parameter.name),
            translate_type(ty)
        );
        if let Some(default) = &parameter.default {
            text.push_str(" = ");
            text.push_str(&self.expr(default, level));
        }
        text
    }

    pub(super) fn function(&self, function: &FunctionDecl, level: usize, out: &mut String) {
        let mut head = access_modifier(function.access.as_deref()).to_string();
        let is_constructor = matches!(function.kind, FunctionKind::Initializer { .. }) && !function.is_static;
        if is_constructor {
            head.push_str("constructor");
        } else {
            if function.is_override {
                head.push_str("override ");
            }
            if function.is_static && function.name == "invoke" {
                head.push_str("operator ");
            }
            head.push_str("fun ");
            if !function.generics.is_empty() {
                head.push_str(&generics(&function.generics));
                head.push(' ');
            }
            if let Some(receiver) = &function.extends_type {
                head.push_str(&translate_type(receiver));
                head.push('.');
            }
            head.push_str(&escape_identifier(&function.name));
        }

        let mut tail = match &function.return_type {
            Some(ty) if !is_constructor && !is_unit(ty) => format!(": {}", translate_type(ty)),
            _ => String::new(),
        };
        if let Some(body) = &function.body {
            tail.push(' ');
            tail.push_str(&self.block(level, body));
        }

        let text = self.list(level, &head, &function.parameters, &tail, |p, l| self.parameter(p, l));
        self.line(out, level, &text);
    }

    /// `val name: Type`, with modifiers and receiver, without initializer.
    pub(super) fn variable_head(&self, variable: &VariableDecl) -> String {
        let keyword = if variable.is_let || (variable.is_computed() && variable.setter.is_none()) {
            "val"
        } else {
            "var"
        };
        let mut text = format!("{}{} ", access_modifier(variable.access.as_deref()), keyword);
        if let Some(receiver) = &variable.extends_type {
            text.push_str(&translate_type(receiver));
            text.push('.');
        }
        text.push_str(&escape_identifier(&variable.name));
        if let Some(ty) = &variable.ty {
            text.push_str(": ");
            text.push_str(&translate_type(ty));
        }
        text
    }

    pub(super) fn variable(&self, variable: &VariableDecl, level: usize, out: &mut String) {
        let mut text = self.variable_head(variable);
        if let Some(initializer) = &variable.initializer {
            text.push_str(" = ");
            text.push_str(&self.expr(initializer, level));
        }
        self.line(out, level, &text);
        if let Some(getter) = &variable.getter {
            self.line(out, level + 1, &format!("get() {}", self.block(level + 1, getter)));
        }
        if let Some(setter) = &variable.setter {
            self.line(out, level + 1, &format!("set(newValue) {}", self.block(level + 1, setter)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::EmitConfig;
    use super::*;
    use tarn_core::helpers::build::*;
    use tarn_core::registry::{EnumInfo, Registry, RegistryBuilder};

    fn render_with(registry: &Registry, statements: Vec<Stmt>) -> String {
        let config = EmitConfig::default();
        let mut out = String::new();
        Emitter::new(registry, &config).statements(&statements, 0, &mut out);
        out
    }

    fn render(statements: Vec<Stmt>) -> String {
        render_with(&Registry::default(), statements)
    }

    #[test]
    fn test_class_with_superclass_and_protocol() {
        let builder = RegistryBuilder::new();
        builder.record_class("Animal");
        let registry = builder.freeze();
        let class = class_decl(
            "Dog",
            &["Animal", "Named"],
            vec![var_decl("name", Some("String"), Some(string("Rex")))],
        );
        assert_eq!(
            render_with(&registry, vec![class]),
            "open class Dog : Animal(), Named {\n    var name: String = \"Rex\"\n}\n"
        );
    }

    #[test]
    fn test_struct_becomes_data_class() {
        let point = struct_decl(
            "Point",
            &["Equatable"],
            vec![
                let_decl("x", Some("Double"), None),
                var_decl("y", Some("Double"), Some(double(0.0))),
                function("reset", vec![assign(decl("y"), double(0.0))]),
            ],
        );
        assert_eq!(
            render(vec![point]),
            "data class Point(val x: Double, var y: Double = 0.0) : Equatable {\n    fun reset() {\n        y = 0.0\n    }\n}\n"
        );
    }

    #[test]
    fn test_payload_free_enum_with_raw_values() {
        let direction = Stmt::Enum(EnumDecl {
            name: "Direction".into(),
            inherits: vec!["Int".into()],
            elements: vec![element("north", &[]), element("southEast", &[])],
            members: vec![],
            access: None,
            kind: Some(EnumKind::PayloadFree),
            range: None,
        });
        assert_eq!(
            render(vec![direction]),
            "enum class Direction(val rawValue: Int) {\n    NORTH(0),\n    SOUTH_EAST(1)\n}\n"
        );
    }

    #[test]
    fn test_raw_values_at_int_limit() {
        let limits = Stmt::Enum(EnumDecl {
            name: "Limit".into(),
            inherits: vec!["Int".into()],
            elements: vec![
                EnumElement {
                    raw_value: Some(int(i64::MAX)),
                    ..element("top", &[])
                },
                element("past", &[]),
            ],
            members: vec![],
            access: None,
            kind: Some(EnumKind::PayloadFree),
            range: None,
        });
        let text = render(vec![limits]);
        assert!(text.contains(&format!("TOP({})", i64::MAX)), "{}", text);
        assert!(text.contains("PAST(<<Error:"), "{}", text);
    }

    #[test]
    fn test_payload_enum_becomes_sealed_class() {
        let builder = RegistryBuilder::new();
        builder.record_enum(
            "Shape",
            EnumInfo {
                kind: EnumKind::HasPayload,
                cases: vec!["circle".into(), "empty".into()],
            },
        );
        let registry = builder.freeze();
        let shape = enum_decl(
            "Shape",
            &[],
            vec![element("circle", &[(Some("radius"), "Double")]), element("empty", &[])],
        );
        assert_eq!(
            render_with(&registry, vec![shape]),
            "sealed class Shape {\n    class Circle(val radius: Double) : Shape()\n    object Empty : Shape()\n}\n"
        );
    }

    #[test]
    fn test_protocol_becomes_interface() {
        let protocol = protocol_decl(
            "Drawable",
            vec![
                Stmt::Variable(VariableDecl {
                    getter: Some(vec![]),
                    ..VariableDecl::simple("size", Some("Int".into()), None, false)
                }),
                Stmt::Function(FunctionDecl {
                    body: None,
                    ..function_decl("draw", vec![], Some("Bool"), vec![])
                }),
            ],
        );
        assert_eq!(
            render(vec![protocol]),
            "interface Drawable {\n    val size: Int\n\n    fun draw(): Boolean\n}\n"
        );
    }

    #[test]
    fn test_companion_factory_is_an_operator() {
        let factory = FunctionDecl {
            is_static: true,
            ..function_decl(
                "invoke",
                vec![param(Some("text"), "text", "String")],
                Some("Token?"),
                vec![ret(nil())],
            )
        };
        let companion = Stmt::Companion(CompanionDecl {
            members: vec![Stmt::Function(factory)],
            range: None,
        });
        assert_eq!(
            render(vec![companion]),
            "companion object {\n    operator fun invoke(text: String): Token? {\n        return null\n    }\n}\n"
        );
    }

    #[test]
    fn test_extension_members_take_a_receiver() {
        let extension = extension_decl(
            "Int",
            vec![Stmt::Variable(VariableDecl {
                getter: Some(vec![ret(binary(decl("this"), "*", int(2)))]),
                ..VariableDecl::simple("doubled", Some("Int".into()), None, false)
            })],
        );
        assert_eq!(
            render(vec![extension]),
            "val Int.doubled: Int\n    get() {\n        return this * 2\n    }\n"
        );
    }

    #[test]
    fn test_long_signatures_break_per_parameter() {
        let long = function_with(
            "configureEverything",
            vec![
                param(None, "firstArgumentName", "String"),
                param(None, "secondArgumentName", "[String: Int]"),
                param(None, "third", "Bool"),
            ],
            None,
            vec![],
        );
        assert_eq!(
            render(vec![long]),
            "fun configureEverything(\n    firstArgumentName: String,\n    secondArgumentName: MutableMap<String, Int>,\n    third: Boolean\n) {\n}\n"
        );
    }

    #[test]
    fn test_platform_imports_vanish() {
        let imports = vec![
            Stmt::Import(ImportDecl {
                module: "Foundation".into(),
                range: None,
            }),
            Stmt::Import(ImportDecl {
                module: "Geometry".into(),
                range: None,
            }),
        ];
        assert_eq!(render(imports), "import Geometry.*\n");
    }
}
