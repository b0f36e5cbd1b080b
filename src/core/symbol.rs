//! Symbol type for imported and exported names of a module.
//!
//! A [`SymbolSet`] is the immutable result of one enumeration. It is shared
//! as `Arc<SymbolSet>` between the store and any filtered projections, and
//! replaced wholesale on re-enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the symbol is imported into or exported from its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Imported symbol
    Import,
    /// Exported symbol
    Export,
}

impl SymbolKind {
    /// Label shown in the "Type" column
    pub fn label(self) -> &'static str {
        match self {
            SymbolKind::Import => "Import",
            SymbolKind::Export => "Export",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named address within a module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// Virtual address of the symbol
    pub address: u64,
    /// Import or export
    pub kind: SymbolKind,
    /// Decorated (mangled) name
    pub decorated: Option<String>,
    /// Undecorated (demangled) name
    pub undecorated: Option<String>,
}

impl Symbol {
    pub fn export(address: u64, decorated: impl Into<String>) -> Self {
        Self {
            address,
            kind: SymbolKind::Export,
            decorated: Some(decorated.into()),
            undecorated: None,
        }
    }

    pub fn import(address: u64, decorated: impl Into<String>) -> Self {
        Self {
            address,
            kind: SymbolKind::Import,
            decorated: Some(decorated.into()),
            undecorated: None,
        }
    }

    pub fn with_undecorated(mut self, undecorated: impl Into<String>) -> Self {
        self.undecorated = Some(undecorated.into());
        self
    }

    /// At least one of the names is present
    pub fn is_displayable(&self) -> bool {
        self.decorated.is_some() || self.undecorated.is_some()
    }

    /// Best name for logs and messages
    pub fn display_name(&self) -> &str {
        self.undecorated
            .as_deref()
            .or(self.decorated.as_deref())
            .unwrap_or("")
    }
}

/// Ordered symbols of one module, as enumerated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
    /// Set when the enumeration hit the configured symbol cap
    truncated: bool,
}

impl SymbolSet {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            truncated: false,
        }
    }

    pub(crate) fn truncated(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            truncated: true,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}
