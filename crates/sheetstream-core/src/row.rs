//! Row types

/// A row of text cells, indexed by 0-based column.
///
/// The row is dense: setting column 3 on an empty row yields four cells,
/// the first three holding `None`. Placeholders are never compacted away, so
/// `row.cells()[i]` always corresponds to column `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Option<String>>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` at `col`, padding any gap with empty placeholders.
    pub fn set(&mut self, col: u32, text: impl Into<String>) {
        let idx = col as usize;
        if self.cells.len() <= idx {
            self.cells.resize(idx + 1, None);
        }
        self.cells[idx] = Some(text.into());
    }

    /// Get the text at `col`, if the column holds a value
    pub fn get(&self, col: u32) -> Option<&str> {
        self.cells.get(col as usize).and_then(|c| c.as_deref())
    }

    /// All cells, in column order
    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    /// Number of cells (highest column index observed + 1)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row holds no cells at all
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remove all cells
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Cells with placeholders rendered as empty strings
    pub fn to_strings(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|c| c.clone().unwrap_or_default())
            .collect()
    }

    /// Consume the row, returning its cells
    pub fn into_cells(self) -> Vec<Option<String>> {
        self.cells
    }
}

impl From<Vec<Option<String>>> for Row {
    fn from(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }
}
