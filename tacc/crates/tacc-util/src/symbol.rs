//! Global string interner.
//!
//! Identifiers (variable names, function names, dict keys resolved at parse
//! time) are interned once and compared by index thereafter. Grounded on the
//! teacher's `DashMap`-backed `StringTable`, trimmed of the keyword
//! pre-reservation and hit/miss telemetry the teacher carries for a much
//! larger keyword set — this pipeline's handful of keywords need no stable
//! reserved indices.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::OnceLock;

/// An interned identifier. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

struct Interner {
    // string -> index, for interning
    map: DashMap<&'static str, u32>,
    // index -> string, for resolution
    strings: RwLock<Vec<&'static str>>,
}

fn interner() -> &'static Interner {
    static INSTANCE: OnceLock<Interner> = OnceLock::new();
    INSTANCE.get_or_init(|| Interner {
        map: DashMap::with_capacity(256),
        strings: RwLock::new(Vec::with_capacity(256)),
    })
}

impl Symbol {
    /// Intern `text`, returning the symbol for it. Repeated calls with the
    /// same text return the same symbol.
    pub fn intern(text: &str) -> Self {
        let interner = interner();
        if let Some(existing) = interner.map.get(text) {
            return Symbol(*existing);
        }
        // Leaked intentionally: the interner lives for the process lifetime
        // and strings are never removed.
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let mut strings = interner.strings.write();
        let idx = strings.len() as u32;
        strings.push(leaked);
        interner.map.insert(leaked, idx);
        Symbol(idx)
    }

    /// Resolve this symbol back to its text.
    pub fn as_str(self) -> &'static str {
        interner().strings.read()[self.0 as usize]
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Symbol::intern(text)
    }
}

impl From<String> for Symbol {
    fn from(text: String) -> Self {
        Symbol::intern(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_yields_same_symbol() {
        let a = Symbol::intern("factorial");
        let b = Symbol::intern("factorial");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_distinct_text_yields_distinct_symbols() {
        let a = Symbol::intern("x");
        let b = Symbol::intern("y");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_as_str() {
        let sym = Symbol::intern("n");
        assert_eq!(sym.as_str(), "n");
    }

    #[test]
    fn display_matches_as_str() {
        let sym = Symbol::intern("lista");
        assert_eq!(format!("{sym}"), "lista");
    }
}
