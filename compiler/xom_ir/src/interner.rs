//! String interner for declaration names and paths.
//!
//! The interner is filled while lowering declaration files and is read-only
//! afterwards, so it needs no locking: every analysis stage receives the
//! table by shared reference, which is `Sync`.

use std::fmt;

use rustc_hash::FxHashMap;

use super::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    Overflow { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// Maps strings to [`Name`] handles and back.
#[derive(Clone, Debug)]
pub struct StringInterner {
    map: FxHashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned as [`Name::EMPTY`].
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        map.insert(Box::<str>::from(""), Name::EMPTY);
        StringInterner {
            map,
            strings: vec![Box::from("")],
        }
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&mut self, s: &str) -> Result<Name, InternError> {
        if let Some(&name) = self.map.get(s) {
            return Ok(name);
        }
        let raw = u32::try_from(self.strings.len()).map_err(|_| InternError::Overflow {
            count: self.strings.len(),
        })?;
        let name = Name::from_raw(raw);
        self.strings.push(Box::from(s));
        self.map.insert(Box::from(s), name);
        Ok(name)
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity (over 4 billion strings).
    /// Use `try_intern` for fallible interning.
    pub fn intern(&mut self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up an already-interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Look up the string for a Name.
    ///
    /// Names from a different interner resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s)
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut interner = StringInterner::new();
        let a = interner.intern("Microsoft.UI.Xaml.Controls");
        let b = interner.intern("Microsoft.UI.Xaml.Controls");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "Microsoft.UI.Xaml.Controls");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_empty_string_is_pre_interned() {
        let mut interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert!(interner.is_empty());
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn test_get_does_not_insert() {
        let mut interner = StringInterner::new();
        assert_eq!(interner.get("Frame"), None);
        let frame = interner.intern("Frame");
        assert_eq!(interner.get("Frame"), Some(frame));
    }

    #[test]
    fn test_foreign_name_resolves_empty() {
        let interner = StringInterner::new();
        assert_eq!(interner.lookup(Name::from_raw(42)), "");
    }
}
