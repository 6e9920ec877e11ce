//! Per-file side information keyed by source position.

use indexmap::IndexMap;
use serde::Deserialize;

/// Namespace prefix of symbols that come from the source language's standard library.
pub const STANDARD_LIBRARY_PREFIX: &str = "Swift.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeEntry {
    pub offset: u32,
    pub length: u32,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Resolved expression types.
///
/// Entries are kept sorted by offset, then by length with the shorter range
/// first, so that the innermost expression at an offset wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeTable {
    entries: Vec<TypeEntry>,
}

impl TypeTable {
    pub fn new(mut entries: Vec<TypeEntry>) -> Self {
        entries.sort_by_key(|e| (e.offset, e.length));
        TypeTable { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// The type recorded for exactly this range.
    pub fn get(&self, offset: u32, length: u32) -> Option<&str> {
        self.entries
            .binary_search_by_key(&(offset, length), |e| (e.offset, e.length))
            .ok()
            .map(|i| self.entries[i].ty.as_str())
    }

    /// The shortest entry starting at `offset`.
    pub fn first_at(&self, offset: u32) -> Option<&str> {
        let start = self.entries.partition_point(|e| e.offset < offset);
        self.entries
            .get(start)
            .filter(|e| e.offset == offset)
            .map(|e| e.ty.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolEntry {
    pub offset: u32,
    /// Fully qualified origin, such as `Swift.Array.append(_:)`.
    pub origin: String,
    /// Source text of the referenced declaration, when the indexer had it.
    #[serde(default)]
    pub declaration: Option<String>,
}

impl SymbolEntry {
    pub fn is_standard_library(&self) -> bool {
        self.origin.starts_with(STANDARD_LIBRARY_PREFIX)
    }
}

/// Best-effort map from reference sites to what they refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: IndexMap<u32, SymbolEntry>,
}

impl SymbolTable {
    pub fn new(entries: Vec<SymbolEntry>) -> Self {
        SymbolTable {
            entries: entries.into_iter().map(|e| (e.offset, e)).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn get(&self, offset: u32) -> Option<&SymbolEntry> {
        self.entries.get(&offset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The closed set of inline directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    /// Drop the following declaration.
    Ignore,
    /// Replace the following node with the payload text.
    Literal,
    /// The following function has no side effects.
    Pure,
    /// Write the translation to the payload path.
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Directive {
    pub offset: u32,
    pub kind: DirectiveKind,
    #[serde(default)]
    pub payload: Option<String>,
}

/// Directives attached to the node starting at each offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveTable {
    entries: IndexMap<u32, Vec<Directive>>,
}

impl DirectiveTable {
    pub fn new(directives: Vec<Directive>) -> Self {
        let mut entries: IndexMap<u32, Vec<Directive>> = IndexMap::new();
        for directive in directives {
            entries.entry(directive.offset).or_default().push(directive);
        }
        DirectiveTable { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn at(&self, offset: u32) -> &[Directive] {
        self.entries.get(&offset).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, offset: u32, kind: DirectiveKind) -> bool {
        self.at(offset).iter().any(|d| d.kind == kind)
    }

    pub fn payload(&self, offset: u32, kind: DirectiveKind) -> Option<&str> {
        self.at(offset)
            .iter()
            .find(|d| d.kind == kind)
            .and_then(|d| d.payload.as_deref())
    }

    /// Every directive of `kind`, in file order.
    pub fn all(&self, kind: DirectiveKind) -> impl Iterator<Item = &Directive> {
        self.entries.values().flatten().filter(move |d| d.kind == kind)
    }
}

/// Everything the adapter knows about one file besides its syntax tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideTables {
    pub types: TypeTable,
    pub symbols: SymbolTable,
    pub directives: DirectiveTable,
}
