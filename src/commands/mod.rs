//! Textual engine commands issued from the panel's context actions, and the
//! action sets each table offers.

use bitflags::bitflags;
use std::fmt;

use crate::core::{format_address, PointerWidth};

/// Command sent to the engine's command interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebuggerCommand {
    /// Show an address in the disassembler
    Disasm(u64),
    /// Show an address in the dump view
    Dump(u64),
    /// Show a module's code, one page past its base
    DisasmModule(u64),
    /// Show a module's entry point
    DisasmEntry(String),
    /// Download symbols for one module, or all modules when `None`
    SymDownload(Option<String>),
    /// Scan a module's mapped memory with a rules file
    YaraMemory { rules: String, module: String },
    /// Scan a module's on-disk file with a rules file
    YaraFile { rules: String, module: String },
    SetBreakpoint(u64),
    ClearBreakpoint(u64),
}

impl DebuggerCommand {
    /// Command text with addresses padded to `width`
    pub fn render(&self, width: PointerWidth) -> String {
        match self {
            DebuggerCommand::Disasm(addr) => format!("disasm {}", format_address(*addr, width)),
            DebuggerCommand::Dump(addr) => format!("dump {}", format_address(*addr, width)),
            DebuggerCommand::DisasmModule(base) => {
                format!("disasm {}+1000", format_address(*base, width))
            }
            DebuggerCommand::DisasmEntry(name) => format!("disasm {name}:entry"),
            DebuggerCommand::SymDownload(Some(name)) => format!("symdownload {name}"),
            DebuggerCommand::SymDownload(None) => "symdownload".to_string(),
            DebuggerCommand::YaraMemory { rules, module } => {
                format!("yaramod \"{rules}\",\"{module}\"")
            }
            DebuggerCommand::YaraFile { rules, module } => {
                format!("yaramod \"{rules}\",\"{module}\",1")
            }
            DebuggerCommand::SetBreakpoint(addr) => format!("bp {}", format_address(*addr, width)),
            DebuggerCommand::ClearBreakpoint(addr) => {
                format!("bc {}", format_address(*addr, width))
            }
        }
    }
}

impl fmt::Display for DebuggerCommand {
    /// Renders at 64-bit width; use [`DebuggerCommand::render`] for 32-bit targets
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(PointerWidth::Bits64))
    }
}

bitflags! {
    /// Context actions offered on the symbol table
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SymbolActions: u8 {
        const FOLLOW = 1 << 0;
        const FOLLOW_DUMP = 1 << 1;
        const TOGGLE_BREAKPOINT = 1 << 2;
        const TOGGLE_BOOKMARK = 1 << 3;
    }
}

bitflags! {
    /// Context actions offered on the module table
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModuleActions: u8 {
        const FOLLOW = 1 << 0;
        const FOLLOW_ENTRY = 1 << 1;
        const DOWNLOAD_SYMBOLS = 1 << 2;
        const DOWNLOAD_ALL_SYMBOLS = 1 << 3;
        /// Only when the engine knows the module's file path
        const COPY_PATH = 1 << 4;
        const YARA_MEMORY = 1 << 5;
        const YARA_FILE = 1 << 6;
    }
}
