//! Per-extension priority registry.

use std::collections::HashMap;

/// A registered value and its priority.
#[derive(Debug, Clone)]
pub struct Entry<T> {
    pub priority: i32,
    pub value: T,
}

/// Ordered entries keyed by file extension.
///
/// Every list is kept sorted highest priority first. Entries with the same
/// priority keep their registration order. Sorting happens on insert so
/// lookups never sort.
#[derive(Debug, Clone)]
pub struct PriorityRegistry<T> {
    entries: HashMap<String, Vec<Entry<T>>>,
}

impl<T: Clone> PriorityRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register `value` for every extension in a comma-separated list.
    ///
    /// Keys are normalized: surrounding whitespace and a leading `.` are
    /// removed, and empty keys are skipped. Each key receives its own copy.
    pub fn add(&mut self, extensions: &str, value: T, priority: i32) {
        for key in split_extensions(extensions) {
            let list = self.entries.entry(key.to_string()).or_default();
            list.push(Entry {
                priority,
                value: value.clone(),
            });
            // `sort_by` is stable, so equal priorities keep insertion order
            list.sort_by(|a, b| b.priority.cmp(&a.priority));
        }
    }
}

impl<T> PriorityRegistry<T> {
    /// Check if anything is registered for an extension.
    pub fn contains(&self, extension: &str) -> bool {
        self.entries
            .get(extension)
            .is_some_and(|list| !list.is_empty())
    }

    /// Entries for an extension, highest priority first.
    pub fn get(&self, extension: &str) -> &[Entry<T>] {
        self.entries
            .get(extension)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Registered values for an extension, highest priority first.
    pub fn entries_for(&self, extension: &str) -> impl Iterator<Item = &T> {
        self.get(extension).iter().map(|entry| &entry.value)
    }
}

impl<T: Clone> Default for PriorityRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a comma-separated extension list into normalized keys.
pub fn split_extensions(extensions: &str) -> impl Iterator<Item = &str> {
    extensions
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
}
