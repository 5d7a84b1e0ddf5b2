//! String interner for identifiers.
//!
//! Identifiers are interned once, when the front end builds the tree, and the
//! evaluator compares and hashes the resulting [`Name`]s. Strings are leaked so
//! that lookups can hand out `&'static str` without holding the lock.

// Arc is needed for SharedInterner: the interner outlives any one evaluator.
#![expect(
    clippy::disallowed_types,
    reason = "Arc required for SharedInterner"
)]

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => {
                write!(f, "interner exceeded capacity: {count} strings, max is {}", u32::MAX)
            }
        }
    }
}

impl std::error::Error for InternError {}

/// Backing storage guarded by the interner's lock.
struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_empty() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        Self {
            map,
            strings: vec![empty],
        }
    }
}

/// Interner mapping identifier text to [`Name`]s.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create an interner with the builtin names pre-interned.
    pub fn new() -> Self {
        let interner = Self {
            table: RwLock::new(InternTable::with_empty()),
        };
        for name in ["len", "print", "return", "nil"] {
            interner.intern(name);
        }
        interner
    }

    /// Intern `s`, or report that the table is full.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&index) = self.table.read().map.get(s) {
            return Ok(Name::from_index(index));
        }

        let mut table = self.table.write();
        // Another writer may have inserted it between the two locks.
        if let Some(&index) = table.map.get(s) {
            return Ok(Name::from_index(index));
        }

        let index = u32::try_from(table.strings.len()).map_err(|_| InternError::Overflow {
            count: table.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        table.strings.push(leaked);
        table.map.insert(leaked, index);
        Ok(Name::from_index(index))
    }

    /// Intern `s`.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` distinct strings are interned.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Look up the text of `name`.
    ///
    /// Names from a different interner resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// True if only the empty string is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference-counted interner handle shared between a front end and evaluators.
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
