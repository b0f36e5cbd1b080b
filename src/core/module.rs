//! Loaded module identity and the per-session module list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A loaded executable or library image in the debugged process.
///
/// The base address determines the module's symbol table; the name is the
/// key the panel shows and selects by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub base: u64,
}

impl Module {
    pub fn new(name: impl Into<String>, base: u64) -> Self {
        Self {
            name: name.into(),
            base,
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.name, self.base)
    }
}

/// Ordered module list as last reported by the engine, with a name lookup.
#[derive(Debug, Clone, Default)]
pub struct ModuleList {
    modules: Vec<Module>,
    by_name: HashMap<String, usize>,
}

impl ModuleList {
    /// Build from the engine's report. A repeated name keeps its first entry
    /// for lookup but stays in the ordered list.
    pub fn new(modules: Vec<Module>) -> Self {
        let mut by_name = HashMap::with_capacity(modules.len());
        for (i, m) in modules.iter().enumerate() {
            by_name.entry(m.name.clone()).or_insert(i);
        }
        Self { modules, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.by_name.get(name).map(|&i| &self.modules[i])
    }

    pub fn contains(&self, module: &Module) -> bool {
        self.get(&module.name).is_some_and(|m| m == module)
    }

    pub fn as_slice(&self) -> &[Module] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
