//! C1 — String Interner.
//!
//! The corpus repeats the same country names, admin1 names, and city-name
//! fragments across hundreds of thousands of records. Interning collapses
//! each distinct string to a single owned allocation and hands call sites a
//! small `u32` id instead.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Append-only string table.
///
/// Built once during corpus construction (I4: the corpus is immutable
/// afterward) and never mutated again. `get` is total over any `u32`,
/// in-range or not.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StringInterner {
    strings: Vec<Box<str>>,
    ids: HashMap<Box<str>, u32>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `s`, interning it if this is the first time it's
    /// been seen.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }
        let id = self.strings.len() as u32;
        let boxed: Box<str> = s.into();
        self.ids.insert(boxed.clone(), id);
        self.strings.push(boxed);
        id
    }

    /// Looks up the string for `id`, or the empty string if `id` is out of
    /// range. A corrupted cache can briefly deserialize with a bad id
    /// before the corpus-validation check catches it; this must not panic
    /// on the way there.
    pub fn get(&self, id: u32) -> &str {
        self.strings.get(id as usize).map(|s| s.as_ref()).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_identical_strings() {
        let mut interner = StringInterner::new();
        let a = interner.intern("Berlin");
        let b = interner.intern("Berlin");
        let c = interner.intern("Munich");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn out_of_range_id_returns_empty_string_instead_of_panicking() {
        let interner = StringInterner::new();
        assert_eq!(interner.get(0), "");
        assert_eq!(interner.get(u32::MAX), "");
    }

    #[test]
    fn round_trips_every_returned_id() {
        let mut interner = StringInterner::new();
        let names = ["Paris", "London", "Tokyo", "Paris"];
        let ids: Vec<u32> = names.iter().map(|n| interner.intern(n)).collect();
        for (name, id) in names.iter().zip(ids.iter()) {
            assert_eq!(interner.get(*id), *name);
        }
    }
}
