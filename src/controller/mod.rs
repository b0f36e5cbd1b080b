//! # Module/Symbol Controller
//!
//! Drives the panel: keeps the module table in sync with the engine's module
//! list, loads the selected module's symbols through the [`SymbolStore`],
//! applies live search and publishes both tables to a [`Presenter`].
//!
//! ```text
//!            select_module              store ok
//!   Idle ─────────────────────▶ Loading ─────────▶ Loaded ──┐ set_query
//!    ▲                             │                  ▲  └───┘
//!    │         store error         │                  │ select_module
//!    └─────────────────────────────┘                  │
//!    └──── module_list_replaced([]) / selected module unloaded
//! ```
//!
//! Engine failures never escape as faults: the symbol table is published
//! empty, the controller returns to `Idle`, and the error is handed back
//! for the caller to log or ignore.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::config::SymbolViewConfig;
use crate::core::{Module, ModuleList, SymbolSet};
use crate::engine::SymbolEnumerator;
use crate::error::{Result, SymbolViewError};
use crate::filter::{FilterIndex, FilterQuery, FilteredView};
use crate::store::{CompletedEnumeration, PendingEnumeration, SymbolStore};
use crate::timeout::CancellationToken;
use crate::view::{module_row, symbol_row, Presenter, Row, TableKind, TableUpdate};

mod actions;

/// Controller state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// No module selected
    Idle,
    /// Enumeration for the module is in flight
    Loading(Module),
    /// The module's symbols are loaded and the filtered view is current
    Loaded(Module),
}

impl ControllerState {
    pub fn module(&self) -> Option<&Module> {
        match self {
            ControllerState::Idle => None,
            ControllerState::Loading(m) | ControllerState::Loaded(m) => Some(m),
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::Idle => write!(f, "idle"),
            ControllerState::Loading(m) => write!(f, "loading {}", m.name),
            ControllerState::Loaded(m) => write!(f, "loaded {}", m.name),
        }
    }
}

/// Symbol table of the selected module
struct LoadedSymbols {
    set: Arc<SymbolSet>,
    rows: Vec<Row>,
    index: FilterIndex,
    view: FilteredView,
    query: String,
}

/// Module table: rendered rows plus live search
struct ModuleTable {
    list: ModuleList,
    rows: Vec<Row>,
    index: FilterIndex,
    view: FilteredView,
    query: String,
}

impl ModuleTable {
    fn empty() -> Self {
        Self {
            list: ModuleList::default(),
            rows: Vec::new(),
            index: FilterIndex::default(),
            view: FilteredView::empty(),
            query: String::new(),
        }
    }
}

/// Orchestrates the store, live search and the presenter.
pub struct ModuleSymbolController<E: ?Sized, P> {
    store: SymbolStore<E>,
    presenter: P,
    config: SymbolViewConfig,
    modules: ModuleTable,
    state: ControllerState,
    symbols: Option<LoadedSymbols>,
    /// Bumped on every selection change; background results from older
    /// epochs are discarded
    epoch: u64,
    pending: Option<CancellationToken>,
    module_cursor: usize,
    symbol_cursor: usize,
}

impl<E, P> ModuleSymbolController<E, P>
where
    E: SymbolEnumerator + ?Sized,
    P: Presenter,
{
    pub fn new(engine: Arc<E>, presenter: P, config: SymbolViewConfig) -> Self {
        let store = SymbolStore::new(engine, config.enumeration.clone());
        Self {
            store,
            presenter,
            config,
            modules: ModuleTable::empty(),
            state: ControllerState::Idle,
            symbols: None,
            epoch: 0,
            pending: None,
            module_cursor: 0,
            symbol_cursor: 0,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Module whose symbols are loaded or loading
    pub fn selected_module(&self) -> Option<&Module> {
        self.state.module()
    }

    pub fn modules(&self) -> &ModuleList {
        &self.modules.list
    }

    pub fn store(&self) -> &SymbolStore<E> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SymbolStore<E> {
        &mut self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn config(&self) -> &SymbolViewConfig {
        &self.config
    }

    /// Symbols of the selected module, when loaded
    pub fn symbol_set(&self) -> Option<&Arc<SymbolSet>> {
        self.symbols.as_ref().map(|s| &s.set)
    }

    pub fn symbol_query(&self) -> &str {
        self.symbols.as_ref().map_or("", |s| s.query.as_str())
    }

    pub fn module_query(&self) -> &str {
        &self.modules.query
    }

    /// Rows the symbol table currently shows
    pub fn published_symbol_rows(&self) -> Vec<Row> {
        match &self.symbols {
            Some(loaded) if self.symbols_visible() => loaded.view.project(&loaded.rows),
            _ => Vec::new(),
        }
    }

    /// Rows the module table currently shows
    pub fn published_module_rows(&self) -> Vec<Row> {
        self.modules.view.project(&self.modules.rows)
    }

    pub fn symbol_cursor(&self) -> usize {
        self.symbol_cursor
    }

    pub fn module_cursor(&self) -> usize {
        self.module_cursor
    }

    pub fn set_symbol_cursor(&mut self, position: usize) {
        self.symbol_cursor = position;
    }

    pub fn set_module_cursor(&mut self, position: usize) {
        self.module_cursor = position;
    }

    /// The engine reported a new module list for the process.
    ///
    /// An empty list (process exit) resets everything. Otherwise cache
    /// entries of unloaded modules are dropped and the selection survives
    /// only if its module is still loaded.
    pub fn module_list_replaced(&mut self, modules: Vec<Module>) {
        info!(modules = modules.len(), "module list replaced");
        let width = self.config.display.pointer_width;
        let list = ModuleList::new(modules);
        let rows: Vec<Row> = list.as_slice().iter().map(|m| module_row(m, width)).collect();
        let mut index = FilterIndex::from_rows(&rows, self.config.search.incremental);
        let query = std::mem::take(&mut self.modules.query);
        let view = index.apply(&FilterQuery::from_column(
            query.as_str(),
            self.config.search.module_search_start_column,
        ));
        self.modules = ModuleTable {
            list,
            rows,
            index,
            view,
            query,
        };

        if self.modules.list.is_empty() {
            self.store.clear();
            self.module_cursor = 0;
            self.reset_selection();
        } else {
            self.store.retain_modules(self.modules.list.as_slice());
            let vanished = self
                .state
                .module()
                .is_some_and(|m| !self.modules.list.contains(m));
            if vanished {
                debug!(state = %self.state, "selected module unloaded");
                self.reset_selection();
            }
        }

        self.publish_modules();
        self.publish_symbols();
    }

    /// Live search over the module table.
    ///
    /// When nothing matches, the symbol table is hidden (published empty)
    /// until the module search matches again; the selection is kept.
    pub fn set_module_query(&mut self, text: &str) -> usize {
        self.modules.query = text.to_string();
        self.modules.view = self.modules.index.apply(&FilterQuery::from_column(
            text,
            self.config.search.module_search_start_column,
        ));
        self.module_cursor = 0;
        trace!(query = %text, matches = self.modules.view.len(), "module search");
        self.publish_modules();
        self.publish_symbols();
        self.modules.view.len()
    }

    /// Select the module shown at `position` of the (filtered) module table
    pub fn select_module_row(&mut self, position: usize) -> Result<usize> {
        let name = self
            .modules
            .view
            .get(position)
            .and_then(|i| self.modules.list.as_slice().get(i))
            .map(|m| m.name.clone())
            .ok_or(SymbolViewError::NoSelection)?;
        self.module_cursor = position;
        self.select_module(&name)
    }

    /// Load `name`'s symbols synchronously and show them unfiltered.
    ///
    /// Returns the number of symbol rows published.
    pub fn select_module(&mut self, name: &str) -> Result<usize> {
        let module = self.begin_selection(name)?;
        self.enter_loading(module.clone());
        match self.store.get_symbols(&module) {
            Ok(set) => Ok(self.finish_loading(module, set)),
            Err(e) => Err(self.fail_selection(e)),
        }
    }

    /// Re-filter the loaded symbols. Only valid in `Loaded`.
    pub fn set_query(&mut self, text: &str) -> Result<usize> {
        if !matches!(self.state, ControllerState::Loaded(_)) {
            return Err(SymbolViewError::NotLoaded);
        }
        let start = self.config.search.symbol_search_start_column;
        let loaded = self.symbols.as_mut().ok_or(SymbolViewError::NotLoaded)?;
        loaded.query = text.to_string();
        loaded.view = loaded.index.apply(&FilterQuery::from_column(text, start));
        let matches = loaded.view.len();
        self.symbol_cursor = 0;
        trace!(query = %text, matches, "symbol search");
        self.publish_symbols();
        Ok(matches)
    }

    /// Explicit refresh signal: drop the selected module's cache entry and
    /// load it again.
    pub fn refresh_current(&mut self) -> Result<usize> {
        let module = self
            .state
            .module()
            .cloned()
            .ok_or(SymbolViewError::NoSelection)?;
        self.store.invalidate(&module);
        self.select_module(&module.name)
    }

    fn begin_selection(&mut self, name: &str) -> Result<Module> {
        self.epoch += 1;
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
        match self.modules.list.get(name).cloned() {
            Some(module) => Ok(module),
            None => {
                debug!(module = %name, "selection of unknown module");
                self.reset_selection();
                self.publish_symbols();
                Err(SymbolViewError::ModuleNotFound(name.to_string()))
            }
        }
    }

    fn enter_loading(&mut self, module: Module) {
        self.symbols = None;
        self.symbol_cursor = 0;
        self.state = ControllerState::Loading(module);
        self.publish_symbols();
    }

    fn finish_loading(&mut self, module: Module, set: Arc<SymbolSet>) -> usize {
        let width = self.config.display.pointer_width;
        let rows: Vec<Row> = set.iter().map(|s| symbol_row(s, width)).collect();
        let index = FilterIndex::from_rows(&rows, self.config.search.incremental);
        let view = FilteredView::identity(rows.len());
        let count = view.len();
        self.symbols = Some(LoadedSymbols {
            set,
            rows,
            index,
            view,
            query: String::new(),
        });
        self.symbol_cursor = 0;
        debug!(module = %module.name, rows = count, "module loaded");
        self.state = ControllerState::Loaded(module);
        self.publish_symbols();
        count
    }

    fn fail_selection(&mut self, err: SymbolViewError) -> SymbolViewError {
        warn!(state = %self.state, error = %err, "symbol enumeration unavailable");
        self.reset_selection();
        self.publish_symbols();
        err
    }

    fn reset_selection(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
        self.epoch += 1;
        self.state = ControllerState::Idle;
        self.symbols = None;
        self.symbol_cursor = 0;
    }

    fn symbols_visible(&self) -> bool {
        !(self.modules.view.is_empty() && !self.modules.query.is_empty())
    }

    fn publish_modules(&mut self) {
        let update = TableUpdate::new(TableKind::Modules, self.published_module_rows());
        self.presenter.publish(&update);
    }

    fn publish_symbols(&mut self) {
        let update = TableUpdate::new(TableKind::Symbols, self.published_symbol_rows());
        self.presenter.publish(&update);
    }
}

impl<E, P> ModuleSymbolController<E, P>
where
    E: SymbolEnumerator + Send + Sync + 'static,
    P: Presenter,
{
    /// Select `name` without blocking on enumeration.
    ///
    /// A cache hit loads immediately and returns `None`. A miss moves to
    /// `Loading` and returns the background enumeration; await
    /// [`PendingEnumeration::finish`] and pass the outcome to
    /// [`Self::complete_enumeration`]. Any earlier pending enumeration is
    /// cancelled.
    pub fn begin_select_module(&mut self, name: &str) -> Result<Option<PendingEnumeration>> {
        let module = self.begin_selection(name)?;
        if let Some(set) = self.store.cached(&module) {
            self.finish_loading(module, set);
            return Ok(None);
        }

        self.enter_loading(module.clone());
        match self.store.spawn_enumeration(module, self.epoch) {
            Ok(pending) => {
                self.pending = Some(pending.token().clone());
                Ok(Some(pending))
            }
            Err(e) => Err(self.fail_selection(e)),
        }
    }

    /// Apply a background enumeration result.
    ///
    /// Returns `Ok(false)` when a newer selection superseded it; nothing is
    /// cached or published in that case. Successful results are cached and
    /// shown; failures return the controller to `Idle`.
    pub fn complete_enumeration(&mut self, done: CompletedEnumeration) -> Result<bool> {
        let current = matches!(&self.state, ControllerState::Loading(m) if *m == done.module);
        if done.epoch != self.epoch || !current {
            debug!(
                module = %done.module.name,
                epoch = done.epoch,
                current_epoch = self.epoch,
                "discarding stale enumeration"
            );
            return Ok(false);
        }

        self.pending = None;
        match done.result {
            Ok(set) => {
                let set = self.store.insert(done.module.clone(), set);
                self.finish_loading(done.module, set);
                Ok(true)
            }
            Err(e) => Err(self.fail_selection(e)),
        }
    }
}
