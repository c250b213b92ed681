//! Variable naming
//!
//! Derives short, idiomatic local names from type shapes and hands out
//! unique names within one generated function.

use std::collections::{HashMap, HashSet};

use crate::types::{Primitive, TypeShape};

const GO_KEYWORDS: [&str; 25] = [
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for",
    "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

/// Idiomatic variable name for a value of the given shape
pub fn variable_name(shape: &TypeShape) -> String {
    escape_keyword(base_name(shape))
}

fn base_name(shape: &TypeShape) -> String {
    match shape {
        TypeShape::Pointer(inner) => base_name(inner),
        TypeShape::Named { name, .. } => lower_first(name),
        TypeShape::Primitive(prim) => primitive_name(*prim).to_string(),
        TypeShape::Slice(elem) => pluralize(base_name(elem)),
        TypeShape::Map { value, .. } => pluralize(base_name(value)),
        TypeShape::Context => "ctx".to_string(),
        TypeShape::Function(_) => "fn".to_string(),
        TypeShape::Chan { .. } => "ch".to_string(),
        TypeShape::EmptyStruct => "signal".to_string(),
        TypeShape::Any => "thing".to_string(),
    }
}

fn primitive_name(prim: Primitive) -> &'static str {
    match prim {
        Primitive::String => "str",
        Primitive::Bool => "b",
        Primitive::Error => "err",
        p if p.is_signed() => "i",
        p if p.is_unsigned() => "u",
        p if p.is_float() => "f",
        _ => "c",
    }
}

/// `User` -> `user`, `HTTPClient` -> `hTTPClient`
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pluralize(name: String) -> String {
    if name.ends_with('s') {
        name
    } else {
        name + "s"
    }
}

fn escape_keyword(name: String) -> String {
    if GO_KEYWORDS.contains(&name.as_str()) {
        name + "Val"
    } else {
        name
    }
}

/// Hands out names unique within one scope
///
/// The first request for a base name gets it verbatim; later requests get
/// `base2`, `base3`, and so on, skipping anything already taken.
#[derive(Debug, Default, Clone)]
pub struct NameAllocator {
    taken: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator with names that must never be handed out
    pub fn with_reserved(names: &[&str]) -> Self {
        let mut alloc = Self::new();
        for name in names {
            alloc.reserve(name);
        }
        alloc
    }

    /// Mark `name` as taken; returns false if it already was
    pub fn reserve(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    #[cfg(test)]
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Allocate a fresh name derived from `base`
    pub fn allocate(&mut self, base: &str) -> String {
        if self.reserve(base) {
            return base.to_string();
        }

        let counter = self.counters.entry(base.to_string()).or_insert(1);
        loop {
            *counter += 1;
            let candidate = format!("{}{}", base, counter);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Allocate a name for a value of `shape`
    pub fn allocate_for(&mut self, shape: &TypeShape) -> String {
        self.allocate(&variable_name(shape))
    }
}
