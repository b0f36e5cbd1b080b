//! Address formatting and parsing for table cells and engine commands.
//!
//! Cells render addresses as uppercase hex, zero-padded to the target's
//! pointer width, without a `0x` prefix. The same text is fed back into
//! engine commands, so parsing accepts exactly what formatting produces
//! (plus an optional prefix typed by a user).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SymbolViewError};

/// Pointer width of the debugged process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointerWidth {
    /// 32-bit target (8 hex digits)
    Bits32,
    /// 64-bit target (16 hex digits)
    #[default]
    Bits64,
}

impl PointerWidth {
    /// Number of hex digits in a formatted address
    pub fn hex_digits(self) -> usize {
        match self {
            PointerWidth::Bits32 => 8,
            PointerWidth::Bits64 => 16,
        }
    }
}

impl fmt::Display for PointerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerWidth::Bits32 => write!(f, "32-bit"),
            PointerWidth::Bits64 => write!(f, "64-bit"),
        }
    }
}

/// Format an address as zero-padded uppercase hex.
///
/// Values wider than the pointer width are printed in full rather than
/// truncated.
pub fn format_address(address: u64, width: PointerWidth) -> String {
    format!("{:0width$X}", address, width = width.hex_digits())
}

/// Parse hex address text as produced by [`format_address`].
pub fn parse_address(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(SymbolViewError::InvalidAddress(text.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| SymbolViewError::InvalidAddress(text.to_string()))
}
