//! Demangler helpers for Rust, C++ (Itanium) and MSVC symbols.
//!
//! Engines do not always report an undecorated name. When they do not, the
//! store can derive one from the decorated name with these helpers.

use once_cell::sync::Lazy;
use regex::Regex;

// Itanium (GCC/Clang) ABI: _Z...
static RE_ITA_MANGLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^_{1,2}Z[a-zA-Z0-9_]+"#).expect("valid itanium mangled regex"));

// MSVC: ?name@@... or ??0...
static RE_MSVC_MANGLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\?\??[A-Za-z0-9_@\$\?]+@@[A-Za-z0-9_@\$\?]+"#).expect("valid msvc mangled regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolFlavor {
    Rust,
    Itanium,
    Msvc,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemangleResult {
    pub original: String,
    pub demangled: String,
    pub flavor: SymbolFlavor,
}

pub fn detect_flavor(s: &str) -> SymbolFlavor {
    if rustc_demangle::try_demangle(s).is_ok() {
        return SymbolFlavor::Rust;
    }
    if RE_ITA_MANGLED.is_match(s) {
        return SymbolFlavor::Itanium;
    }
    if RE_MSVC_MANGLED.is_match(s) {
        return SymbolFlavor::Msvc;
    }
    SymbolFlavor::Unknown
}

/// Attempt to demangle a single symbol. Returns None when not recognized.
pub fn demangle_one(s: &str) -> Option<DemangleResult> {
    // Rust (v0 + legacy) demangler
    if let Ok(dm) = rustc_demangle::try_demangle(s) {
        return Some(DemangleResult {
            original: s.to_string(),
            // {:#} drops the trailing hash
            demangled: format!("{:#}", dm),
            flavor: SymbolFlavor::Rust,
        });
    }
    if RE_ITA_MANGLED.is_match(s) {
        // Some names parse but fail to print; Display would panic on those.
        let demangled = cpp_demangle::Symbol::new(s)
            .ok()
            .and_then(|sym| sym.demangle(&cpp_demangle::DemangleOptions::default()).ok());
        if let Some(demangled) = demangled {
            return Some(DemangleResult {
                original: s.to_string(),
                demangled,
                flavor: SymbolFlavor::Itanium,
            });
        }
    }
    if RE_MSVC_MANGLED.is_match(s) {
        if let Ok(out) = msvc_demangler::demangle(s, msvc_demangler::DemangleFlags::COMPLETE) {
            return Some(DemangleResult {
                original: s.to_string(),
                demangled: out,
                flavor: SymbolFlavor::Msvc,
            });
        }
    }
    None
}

/// Undecorated form of `decorated`, or None if it is not a mangled name or
/// demangles to itself.
pub fn undecorate(decorated: &str) -> Option<String> {
    demangle_one(decorated)
        .map(|r| r.demangled)
        .filter(|d| d != decorated)
}
