//! Configuration for the symbol panel.
//!
//! Provides centralized configuration for display, search and enumeration
//! with sensible defaults. Configurations round-trip through JSON so a host
//! can persist them next to its own settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::PointerWidth;
use crate::error::{Result, SymbolViewError};
use crate::view::{MODULE_COLUMNS, SYMBOL_COLUMNS};

/// Master configuration for the symbol panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolViewConfig {
    /// Cell formatting.
    pub display: DisplayConfig,
    /// Live search behaviour.
    pub search: SearchConfig,
    /// Engine enumeration limits.
    pub enumeration: EnumerationConfig,
}

/// Cell formatting configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Pointer width used to pad address cells and command operands
    pub pointer_width: PointerWidth,
}

/// Live search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// First searchable column of the module table (0 = Base, 1 = Module)
    pub module_search_start_column: usize,
    /// First searchable column of the symbol table (0 = Address, 1 = Type, ...)
    pub symbol_search_start_column: usize,
    /// Re-scan only previous hits when a query extends the previous one
    pub incremental: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            module_search_start_column: 1,
            symbol_search_start_column: 1,
            incremental: true,
        }
    }
}

/// Enumeration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    /// Maximum symbols kept per module; extra symbols are dropped
    pub max_symbols: usize,
    /// Wall-clock guard checked while draining; 0 means unbounded
    pub time_guard_seconds: u64,
    /// Symbols drained between clock checks
    pub check_interval: usize,
    /// Timeout for awaiting a background enumeration; 0 means unbounded
    pub async_timeout_seconds: u64,
    /// Derive missing undecorated names with the demangler instead of
    /// leaving the cell empty
    pub demangle_missing: bool,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            max_symbols: 1_000_000,
            time_guard_seconds: 0,
            check_interval: 1024,
            async_timeout_seconds: 300,
            demangle_missing: false,
        }
    }
}

impl SymbolViewConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.enumeration.max_symbols == 0 {
            return Err(SymbolViewError::InvalidConfig(
                "enumeration.max_symbols must be greater than zero".into(),
            ));
        }
        if self.enumeration.check_interval == 0 {
            return Err(SymbolViewError::InvalidConfig(
                "enumeration.check_interval must be greater than zero".into(),
            ));
        }
        let guard = self.enumeration.time_guard_seconds;
        let wait = self.enumeration.async_timeout_seconds;
        if guard > 0 && wait > 0 && guard >= wait {
            return Err(SymbolViewError::InvalidConfig(format!(
                "enumeration.time_guard_seconds ({guard}) must be below \
                 enumeration.async_timeout_seconds ({wait})"
            )));
        }
        if self.search.module_search_start_column >= MODULE_COLUMNS.len() {
            return Err(SymbolViewError::InvalidConfig(format!(
                "search.module_search_start_column {} out of range (0..{})",
                self.search.module_search_start_column,
                MODULE_COLUMNS.len()
            )));
        }
        if self.search.symbol_search_start_column >= SYMBOL_COLUMNS.len() {
            return Err(SymbolViewError::InvalidConfig(format!(
                "search.symbol_search_start_column {} out of range (0..{})",
                self.search.symbol_search_start_column,
                SYMBOL_COLUMNS.len()
            )));
        }
        Ok(())
    }
}
