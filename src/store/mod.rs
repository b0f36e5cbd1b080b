//! # Symbol Store
//!
//! Owns the module → [`SymbolSet`] cache. A cache miss drains the engine's
//! symbol stream synchronously on the calling thread; a hit returns the
//! same `Arc` without touching the engine.
//!
//! Only complete, successful enumerations are cached. Engine unavailability,
//! mid-stream failures, cancellation and timeouts leave the cache untouched
//! so the next request retries. A module that legitimately has no symbols
//! is cached like any other.
//!
//! Entries are dropped only on explicit request ([`SymbolStore::invalidate`],
//! [`SymbolStore::clear`], [`SymbolStore::retain_modules`]); the store does
//! not try to detect a module reloaded at the same base.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EnumerationConfig;
use crate::core::{Module, SymbolSet};
use crate::demangle;
use crate::engine::SymbolEnumerator;
use crate::error::Result;
use crate::timeout::{CancellationToken, EnumerationGuard};

pub mod background;

pub use background::{CompletedEnumeration, PendingEnumeration};

/// Per-module symbol cache backed by an engine handle
pub struct SymbolStore<E: ?Sized> {
    engine: Arc<E>,
    cache: HashMap<Module, Arc<SymbolSet>>,
    config: EnumerationConfig,
}

impl<E: SymbolEnumerator + ?Sized> SymbolStore<E> {
    pub fn new(engine: Arc<E>, config: EnumerationConfig) -> Self {
        Self {
            engine,
            cache: HashMap::new(),
            config,
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn config(&self) -> &EnumerationConfig {
        &self.config
    }

    /// Symbols of `module`, enumerating through the engine on a cache miss.
    pub fn get_symbols(&mut self, module: &Module) -> Result<Arc<SymbolSet>> {
        if let Some(set) = self.cache.get(module) {
            debug!(module = %module.name, symbols = set.len(), "symbol cache hit");
            return Ok(Arc::clone(set));
        }

        debug!(module = %module.name, "symbol cache miss");
        let set = drain_symbols(self.engine.as_ref(), module, &self.config, None)?;
        Ok(self.insert(module.clone(), set))
    }

    /// Cached symbols of `module`, without enumerating
    pub fn cached(&self, module: &Module) -> Option<Arc<SymbolSet>> {
        self.cache.get(module).cloned()
    }

    pub fn is_cached(&self, module: &Module) -> bool {
        self.cache.contains_key(module)
    }

    /// Store a completed enumeration, replacing any previous entry wholesale
    pub fn insert(&mut self, module: Module, set: SymbolSet) -> Arc<SymbolSet> {
        let set = Arc::new(set);
        self.cache.insert(module, Arc::clone(&set));
        set
    }

    /// Drop one module's entry; the next request re-enumerates
    pub fn invalidate(&mut self, module: &Module) -> bool {
        let removed = self.cache.remove(module).is_some();
        if removed {
            debug!(module = %module.name, "symbol cache entry invalidated");
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.cache.is_empty() {
            info!(entries = self.cache.len(), "symbol cache cleared");
        }
        self.cache.clear();
    }

    /// Drop entries for modules absent from `modules`
    pub fn retain_modules(&mut self, modules: &[Module]) {
        let before = self.cache.len();
        self.cache.retain(|m, _| modules.contains(m));
        let dropped = before - self.cache.len();
        if dropped > 0 {
            debug!(dropped, "dropped symbol cache entries for unloaded modules");
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Drain one enumeration into a new set.
///
/// Stops at the first stream error, on cancellation, or when the time guard
/// trips. Symbols past `max_symbols` are dropped and the set is marked
/// truncated.
pub(crate) fn drain_symbols<E: SymbolEnumerator + ?Sized>(
    engine: &E,
    module: &Module,
    config: &EnumerationConfig,
    token: Option<CancellationToken>,
) -> Result<SymbolSet> {
    let span = crate::span_trace!("enumerate_symbols", module = %module.name, base = module.base);
    let _guard = span.enter();

    let mut guard = EnumerationGuard::new(config.time_guard_seconds, module.name.as_str())
        .with_check_interval(config.check_interval);
    if let Some(token) = token {
        guard = guard.with_token(token);
    }

    let stream = engine
        .enumerate_symbols(module)
        .map_err(|e| crate::log_error!(e, "enumeration could not start"))?;

    let mut symbols = Vec::new();
    let mut truncated = false;
    for item in stream {
        guard.check()?;
        let mut symbol = item.map_err(|e| crate::log_error!(e, "enumeration failed"))?;
        if symbols.len() >= config.max_symbols {
            truncated = true;
            break;
        }
        if config.demangle_missing && symbol.undecorated.is_none() {
            symbol.undecorated = symbol.decorated.as_deref().and_then(demangle::undecorate);
        }
        symbols.push(symbol);
    }

    if truncated {
        warn!(
            module = %module.name,
            limit = config.max_symbols,
            "symbol enumeration truncated at limit"
        );
        return Ok(SymbolSet::truncated(symbols));
    }

    info!(module = %module.name, symbols = symbols.len(), elapsed = ?guard.elapsed(), "symbols enumerated");
    Ok(SymbolSet::new(symbols))
}
