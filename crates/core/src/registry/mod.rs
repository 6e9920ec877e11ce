//! Whole-program registries shared between files.
//!
//! The collection phase records into a [`RegistryBuilder`] from many worker
//! threads at once. Each map sits behind its own mutex and is only ever
//! appended to. Once every file has been collected the builder is consumed by
//! [`RegistryBuilder::freeze`], and the transformation phase and the emitter
//! only ever see the resulting read-only [`Registry`].

use crate::ast::EnumKind;
use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;

/// What the collection phase learned about one enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    pub kind: EnumKind,
    pub cases: Vec<String>,
}

/// Append-only registries filled during the collection phase.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    enums: Mutex<IndexMap<String, EnumInfo>>,
    protocols: Mutex<IndexSet<String>>,
    functions: Mutex<IndexMap<String, Vec<String>>>,
    pure_functions: Mutex<IndexSet<String>>,
    structs: Mutex<IndexSet<String>>,
    classes: Mutex<IndexSet<String>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enum(&self, name: impl Into<String>, info: EnumInfo) {
        self.enums.lock().insert(name.into(), info);
    }

    pub fn record_protocol(&self, name: impl Into<String>) {
        self.protocols.lock().insert(name.into());
    }

    /// Map a `name(label:_:)` signature key to the callee's internal parameter names.
    pub fn record_function(&self, key: impl Into<String>, parameter_names: Vec<String>) {
        self.functions.lock().insert(key.into(), parameter_names);
    }

    pub fn record_pure(&self, key: impl Into<String>) {
        self.pure_functions.lock().insert(key.into());
    }

    pub fn record_struct(&self, name: impl Into<String>) {
        self.structs.lock().insert(name.into());
    }

    pub fn record_class(&self, name: impl Into<String>) {
        self.classes.lock().insert(name.into());
    }

    /// End the collection phase.
    pub fn freeze(self) -> Registry {
        let registry = Registry {
            enums: self.enums.into_inner(),
            protocols: self.protocols.into_inner(),
            functions: self.functions.into_inner(),
            pure_functions: self.pure_functions.into_inner(),
            structs: self.structs.into_inner(),
            classes: self.classes.into_inner(),
        };
        log::debug!(
            "registry frozen: {} enums, {} protocols, {} functions, {} pure, {} structs, {} classes",
            registry.enums.len(),
            registry.protocols.len(),
            registry.functions.len(),
            registry.pure_functions.len(),
            registry.structs.len(),
            registry.classes.len()
        );
        registry
    }
}

/// Read-only registries, available once collection has finished on every file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    enums: IndexMap<String, EnumInfo>,
    protocols: IndexSet<String>,
    functions: IndexMap<String, Vec<String>>,
    pure_functions: IndexSet<String>,
    structs: IndexSet<String>,
    classes: IndexSet<String>,
}

impl Registry {
    pub fn enum_kind(&self, name: &str) -> Option<EnumKind> {
        self.enums.get(name).map(|info| info.kind)
    }

    pub fn enum_info(&self, name: &str) -> Option<&EnumInfo> {
        self.enums.get(name)
    }

    /// Whether `case` names one of the cases of enum `enum_name`.
    pub fn is_enum_case(&self, enum_name: &str, case: &str) -> bool {
        self.enums
            .get(enum_name)
            .is_some_and(|info| info.cases.iter().any(|c| c == case))
    }

    pub fn is_protocol(&self, name: &str) -> bool {
        self.protocols.contains(name)
    }

    /// Internal parameter names for a `name(label:_:)` signature key.
    pub fn parameter_names(&self, key: &str) -> Option<&[String]> {
        self.functions.get(key).map(Vec::as_slice)
    }

    pub fn is_pure(&self, key: &str) -> bool {
        self.pure_functions.contains(key)
    }

    pub fn is_struct(&self, name: &str) -> bool {
        self.structs.contains(name)
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_freeze_keeps_records() {
        let builder = RegistryBuilder::new();
        builder.record_enum(
            "Shape",
            EnumInfo {
                kind: EnumKind::HasPayload,
                cases: vec!["circle".into(), "empty".into()],
            },
        );
        builder.record_protocol("Drawable");
        builder.record_function("move(from:to:)", vec!["start".into(), "end".into()]);
        builder.record_pure("area()");
        builder.record_struct("Point");
        builder.record_class("Canvas");

        let registry = builder.freeze();
        assert_eq!(registry.enum_kind("Shape"), Some(EnumKind::HasPayload));
        assert!(registry.is_enum_case("Shape", "circle"));
        assert!(!registry.is_enum_case("Shape", "square"));
        assert!(registry.is_protocol("Drawable"));
        assert_eq!(
            registry.parameter_names("move(from:to:)"),
            Some(&["start".to_string(), "end".to_string()][..])
        );
        assert!(registry.is_pure("area()"));
        assert!(registry.is_struct("Point"));
        assert!(registry.is_class("Canvas"));
        assert!(!registry.is_class("Point"));
    }

    #[test]
    fn test_concurrent_recording() {
        let builder = Arc::new(RegistryBuilder::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let builder = Arc::clone(&builder);
                thread::spawn(move || {
                    for j in 0..50 {
                        builder.record_function(format!("f{}_{}()", i, j), vec![]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let builder = Arc::try_unwrap(builder).unwrap();
        assert_eq!(builder.freeze().function_count(), 400);
    }
}
