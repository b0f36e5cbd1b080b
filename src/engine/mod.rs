//! Debug engine collaborator interfaces.
//!
//! The panel never talks to a debugger directly. Symbol enumeration goes
//! through [`SymbolEnumerator`]; navigation, breakpoints and bookmarks go
//! through [`DebugEngine`]. Implementations use interior mutability, since
//! the engine is shared as `Arc<E>` between the store and background
//! enumeration tasks.

use std::path::PathBuf;

use crate::core::{Module, Symbol};
use crate::error::Result;

/// Lazy, finite stream of a module's symbols.
///
/// Items are `Err` when the engine fails part-way; the consumer stops at the
/// first error.
pub type SymbolStream<'a> = Box<dyn Iterator<Item = Result<Symbol>> + 'a>;

/// Produces the symbols of a loaded module.
pub trait SymbolEnumerator {
    /// Start enumerating `module`.
    ///
    /// Returns `Err(EngineUnavailable)` when no debug session is active.
    /// Calling it again restarts the enumeration from the first symbol.
    fn enumerate_symbols(&self, module: &Module) -> Result<SymbolStream<'_>>;
}

/// Engine services used by the panel's context actions.
pub trait DebugEngine: SymbolEnumerator {
    /// Whether a debug session is active
    fn is_debugging(&self) -> bool;

    /// Fire-and-forget textual command
    fn execute(&self, command: &str);

    fn is_valid_read_ptr(&self, address: u64) -> bool;

    /// Whether a normal (software) breakpoint is set at `address`
    fn has_normal_breakpoint(&self, address: u64) -> bool;

    fn bookmark_at(&self, address: u64) -> bool;

    /// Returns false when the engine refused the change
    fn set_bookmark(&self, address: u64, enabled: bool) -> bool;

    /// On-disk path of the module loaded at `base`
    fn module_path(&self, base: u64) -> Option<PathBuf>;
}
