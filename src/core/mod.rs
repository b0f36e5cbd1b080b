//! Core data types for the symbol panel.
//!
//! Modules, symbols and the address text used in table cells and engine
//! commands.

pub mod address;
pub mod module;
pub mod symbol;

pub use address::{format_address, parse_address, PointerWidth};
pub use module::{Module, ModuleList};
pub use symbol::{Symbol, SymbolKind, SymbolSet};
