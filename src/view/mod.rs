//! Presentation boundary: fixed table schemas, row rendering and the
//! [`Presenter`] callback.
//!
//! Rows are rendered once per module list or symbol set and then projected
//! through a [`FilteredView`](crate::filter::FilteredView); the presenter
//! only ever sees finished cell strings.

use std::fmt;

use crate::core::{format_address, Module, PointerWidth, Symbol};

/// Column headers of the module table
pub const MODULE_COLUMNS: [&str; 2] = ["Base", "Module"];

/// Column headers of the symbol table
pub const SYMBOL_COLUMNS: [&str; 4] = ["Address", "Type", "Symbol", "Symbol (undecorated)"];

/// One rendered table row, one string per column
pub type Row = Vec<String>;

/// Which of the panel's two tables an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Modules,
    Symbols,
}

impl TableKind {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Modules => &MODULE_COLUMNS,
            TableKind::Symbols => &SYMBOL_COLUMNS,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Modules => write!(f, "modules"),
            TableKind::Symbols => write!(f, "symbols"),
        }
    }
}

/// Full replacement contents for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableUpdate {
    pub kind: TableKind,
    pub columns: &'static [&'static str],
    pub rows: Vec<Row>,
}

impl TableUpdate {
    pub fn new(kind: TableKind, rows: Vec<Row>) -> Self {
        Self {
            kind,
            columns: kind.columns(),
            rows,
        }
    }

    pub fn empty(kind: TableKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Receiver of table contents.
///
/// Each call carries the complete contents of one table. Publishing the same
/// update twice must leave the view unchanged.
pub trait Presenter {
    fn publish(&mut self, update: &TableUpdate);
}

impl<F> Presenter for F
where
    F: FnMut(&TableUpdate),
{
    fn publish(&mut self, update: &TableUpdate) {
        self(update)
    }
}

/// Presenter that discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn publish(&mut self, _update: &TableUpdate) {}
}

/// `{Base, Module}`
pub fn module_row(module: &Module, width: PointerWidth) -> Row {
    vec![format_address(module.base, width), module.name.clone()]
}

/// `{Address, Type, Symbol, Symbol (undecorated)}`; absent names become empty cells
pub fn symbol_row(symbol: &Symbol, width: PointerWidth) -> Row {
    vec![
        format_address(symbol.address, width),
        symbol.kind.label().to_string(),
        symbol.decorated.clone().unwrap_or_default(),
        symbol.undecorated.clone().unwrap_or_default(),
    ]
}
