//! Context actions on the selected symbol or module row.
//!
//! Each action resolves the row under the cursor, formats a
//! [`DebuggerCommand`] and hands its text to the engine.

use std::path::PathBuf;
use tracing::{debug, info};

use super::ModuleSymbolController;
use crate::commands::{DebuggerCommand, ModuleActions, SymbolActions};
use crate::core::{parse_address, Module, Symbol};
use crate::engine::DebugEngine;
use crate::error::{Result, SymbolViewError};
use crate::view::Presenter;

impl<E, P> ModuleSymbolController<E, P>
where
    E: DebugEngine + ?Sized,
    P: Presenter,
{
    /// Symbol under the cursor of the (filtered) symbol table
    pub fn selected_symbol(&self) -> Option<&Symbol> {
        if !self.symbols_visible() {
            return None;
        }
        let loaded = self.symbols.as_ref()?;
        let index = loaded.view.get(self.symbol_cursor)?;
        loaded.set.get(index)
    }

    /// Module under the cursor of the (filtered) module table
    pub fn module_at_cursor(&self) -> Option<&Module> {
        let index = self.modules.view.get(self.module_cursor)?;
        self.modules.list.as_slice().get(index)
    }

    /// Actions offered on the symbol table; none when it shows no rows
    pub fn symbol_actions(&self) -> SymbolActions {
        let has_rows = self.symbols_visible()
            && self.symbols.as_ref().is_some_and(|loaded| !loaded.view.is_empty());
        if has_rows {
            SymbolActions::all()
        } else {
            SymbolActions::empty()
        }
    }

    /// Actions offered on the module table; none outside a debug session or
    /// when it shows no rows
    pub fn module_actions(&self) -> ModuleActions {
        let engine = self.store.engine();
        let Some(module) = self.module_at_cursor() else {
            return ModuleActions::empty();
        };
        if !engine.is_debugging() {
            return ModuleActions::empty();
        }
        let mut actions = ModuleActions::all();
        if engine.module_path(module.base).is_none() {
            actions.remove(ModuleActions::COPY_PATH);
        }
        actions
    }

    /// File path of the module under the cursor, for copy or entropy views
    pub fn module_path_at_cursor(&self) -> Option<PathBuf> {
        let module = self.module_at_cursor()?;
        self.store.engine().module_path(module.base)
    }

    pub fn follow_symbol(&self) -> Result<DebuggerCommand> {
        let symbol = self.selected_symbol().ok_or(SymbolViewError::NoSelection)?;
        Ok(self.issue(DebuggerCommand::Disasm(symbol.address)))
    }

    pub fn follow_symbol_dump(&self) -> Result<DebuggerCommand> {
        let symbol = self.selected_symbol().ok_or(SymbolViewError::NoSelection)?;
        Ok(self.issue(DebuggerCommand::Dump(symbol.address)))
    }

    pub fn follow_module(&self) -> Result<DebuggerCommand> {
        let module = self.module_at_cursor().ok_or(SymbolViewError::NoSelection)?;
        Ok(self.issue(DebuggerCommand::DisasmModule(module.base)))
    }

    pub fn follow_module_entry(&self) -> Result<DebuggerCommand> {
        let module = self.module_at_cursor().ok_or(SymbolViewError::NoSelection)?;
        Ok(self.issue(DebuggerCommand::DisasmEntry(module.name.clone())))
    }

    pub fn download_symbols(&self) -> Result<DebuggerCommand> {
        let module = self.module_at_cursor().ok_or(SymbolViewError::NoSelection)?;
        Ok(self.issue(DebuggerCommand::SymDownload(Some(module.name.clone()))))
    }

    pub fn download_all_symbols(&self) -> DebuggerCommand {
        self.issue(DebuggerCommand::SymDownload(None))
    }

    /// Scan the module under the cursor with `rules`; `scan_file` scans the
    /// on-disk image instead of mapped memory
    pub fn yara_module(&self, rules: &str, scan_file: bool) -> Result<DebuggerCommand> {
        let module = self.module_at_cursor().ok_or(SymbolViewError::NoSelection)?;
        let (rules, module) = (rules.to_string(), module.name.clone());
        let command = if scan_file {
            DebuggerCommand::YaraFile { rules, module }
        } else {
            DebuggerCommand::YaraMemory { rules, module }
        };
        Ok(self.issue(command))
    }

    /// Set a breakpoint at the selected symbol, or clear the one already there
    pub fn toggle_breakpoint(&self) -> Result<DebuggerCommand> {
        let address = self.actionable_symbol_address()?;
        let command = if self.store.engine().has_normal_breakpoint(address) {
            DebuggerCommand::ClearBreakpoint(address)
        } else {
            DebuggerCommand::SetBreakpoint(address)
        };
        Ok(self.issue(command))
    }

    /// Flip the bookmark at the selected symbol. Returns the new state.
    pub fn toggle_bookmark(&self) -> Result<bool> {
        let address = self.actionable_symbol_address()?;
        let engine = self.store.engine();
        let enable = !engine.bookmark_at(address);
        if !engine.set_bookmark(address, enable) {
            return Err(SymbolViewError::Internal(format!(
                "engine refused bookmark change at {address:#x}"
            )));
        }
        debug!(address = format_args!("{address:#x}"), enable, "bookmark toggled");
        Ok(enable)
    }

    // Breakpoints and bookmarks need a live session and a readable address.
    // The address is taken back from the rendered cell, as shown to the user.
    fn actionable_symbol_address(&self) -> Result<u64> {
        if !self.store.engine().is_debugging() {
            return Err(SymbolViewError::EngineUnavailable);
        }
        let loaded = self.symbols.as_ref().ok_or(SymbolViewError::NotLoaded)?;
        if !self.symbols_visible() {
            return Err(SymbolViewError::NoSelection);
        }
        let row = loaded
            .view
            .get(self.symbol_cursor)
            .and_then(|i| loaded.rows.get(i))
            .ok_or(SymbolViewError::NoSelection)?;
        let address = parse_address(&row[0])?;
        if !self.store.engine().is_valid_read_ptr(address) {
            return Err(SymbolViewError::InvalidAddress(row[0].clone()));
        }
        Ok(address)
    }

    fn issue(&self, command: DebuggerCommand) -> DebuggerCommand {
        let text = command.render(self.config.display.pointer_width);
        info!(command = %text, "issuing engine command");
        self.store.engine().execute(&text);
        command
    }
}
