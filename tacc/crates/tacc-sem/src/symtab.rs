//! Symbol table, per spec.md §3/§4.3.
//!
//! A flat `IndexMap<Symbol, SymbolInfo>` rather than the teacher's
//! `ScopeTree`/`Rib` parent-chain resolver: this pipeline's semantic
//! analysis is explicitly flow-insensitive and non-nested (spec.md §4.3,
//! §9), so there is no enclosing-scope walk to ground a `Rib` chain
//! against. `indexmap` is kept from the teacher's dependency stack purely
//! for its insertion-order iteration, used when dumping the table as a
//! textual artifact.

use indexmap::IndexMap;
use tacc_util::Symbol;

/// Inferred lattice element for a symbol's value. Advisory only — spec.md
/// §3 says only initialization and existence are semantically load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Integer,
    Float,
    String,
    List,
    Dict,
    Function,
    Unknown,
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::List => "list",
            TypeTag::Dict => "dict",
            TypeTag::Function => "function",
            TypeTag::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub type_tag: TypeTag,
    pub initialized: bool,
    pub first_line: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: IndexMap<Symbol, SymbolInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn get(&self, name: Symbol) -> Option<&SymbolInfo> {
        self.entries.get(&name)
    }

    /// Insert or update `name`. `first_line` is sticky — a later
    /// reassignment never moves it backward or forward; the type tag is
    /// only overwritten when `type_tag` carries new information (spec.md
    /// §4.3: only literal/list/dict right-hand sides refine the tag).
    pub fn define(&mut self, name: Symbol, type_tag: Option<TypeTag>, line: u32) {
        match self.entries.get_mut(&name) {
            Some(info) => {
                info.initialized = true;
                if let Some(tag) = type_tag {
                    info.type_tag = tag;
                }
            }
            None => {
                self.entries.insert(
                    name,
                    SymbolInfo {
                        type_tag: type_tag.unwrap_or(TypeTag::Unknown),
                        initialized: true,
                        first_line: line,
                    },
                );
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &SymbolInfo)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_sticky_across_reassignment() {
        let mut table = SymbolTable::new();
        let x = Symbol::intern("x");
        table.define(x, Some(TypeTag::Integer), 1);
        table.define(x, Some(TypeTag::Integer), 5);
        assert_eq!(table.get(x).unwrap().first_line, 1);
    }

    #[test]
    fn type_tag_refines_on_literal_reassignment_but_not_on_unknown() {
        let mut table = SymbolTable::new();
        let x = Symbol::intern("x");
        table.define(x, Some(TypeTag::Integer), 1);
        table.define(x, None, 2);
        assert_eq!(table.get(x).unwrap().type_tag, TypeTag::Integer);
    }
}
