//! Shared string table

/// Index-to-text lookup for strings referenced by cells.
///
/// Loaded once per file, before any row is read, and immutable afterwards.
/// Lookups never fail: a missing table or an index past the end resolves to
/// empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Text at `index`, or `""` when out of range
    pub fn resolve(&self, index: usize) -> &str {
        self.strings.get(index).map(String::as_str).unwrap_or("")
    }

    /// Number of strings in the table
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table holds no strings
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl From<Vec<String>> for SharedStrings {
    fn from(strings: Vec<String>) -> Self {
        Self { strings }
    }
}

impl FromIterator<String> for SharedStrings {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            strings: iter.into_iter().collect(),
        }
    }
}
