//! Insertion-ordered entry collections.
//!
//! Both manifest sources expose their platforms and plugins through
//! [`EntrySet`], which preserves insertion order so serialized lists stay
//! deterministic: after a merge, entries from the package manifest keep
//! their positions and config-only entries are appended.

use crate::entry::{PlatformEntry, PluginEntry};

/// Anything keyed by a canonical name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for PlatformEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for PluginEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An ordered set of entries, unique by name.
///
/// `upsert` replaces in place so an updated entry keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySet<T> {
    entries: Vec<T>,
}

pub type PlatformSet = EntrySet<PlatformEntry>;
pub type PluginSet = EntrySet<PluginEntry>;

impl<T: Named> EntrySet<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries in insertion order.
    pub fn list(&self) -> &[T] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace the entry with the same name, preserving position.
    pub fn upsert(&mut self, entry: T) {
        match self.entries.iter().position(|e| e.name() == entry.name()) {
            Some(pos) => self.entries[pos] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove the entry with the given name, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        let pos = self.entries.iter().position(|e| e.name() == name)?;
        Some(self.entries.remove(pos))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Named> Default for EntrySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Named> FromIterator<T> for EntrySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.upsert(entry);
        }
        set
    }
}

impl<T: Named> IntoIterator for EntrySet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
