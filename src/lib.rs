//! Module and symbol browser core for debugger front-ends.
//!
//! The crate caches each module's symbols as the debug engine enumerates
//! them, filters them live as the user types, and publishes table contents
//! to whatever UI hosts the panel. The engine and the UI are reached only
//! through the [`engine::DebugEngine`] and [`view::Presenter`] traits.

/// Engine command text and context action sets
pub mod commands;
pub mod config;
/// Panel state machine
pub mod controller;
/// Core data types module
pub mod core;
pub mod demangle;
pub mod engine;
pub mod error;
pub mod filter;
pub mod logging;
pub mod store;
pub mod timeout;
pub mod view;

pub use config::SymbolViewConfig;
pub use controller::{ControllerState, ModuleSymbolController};
pub use crate::core::{Module, PointerWidth, Symbol, SymbolKind, SymbolSet};
pub use engine::{DebugEngine, SymbolEnumerator, SymbolStream};
pub use error::{Result, SymbolViewError};
pub use filter::{FilterIndex, FilterQuery, FilteredView};
pub use store::SymbolStore;
pub use view::{Presenter, TableKind, TableUpdate};
