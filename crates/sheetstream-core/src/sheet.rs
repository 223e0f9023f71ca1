//! Sheet metadata

use std::fmt;

/// Sheet visibility as declared by the workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Hidden, but the user can unhide it from the UI
    Hidden,
    /// Only reachable programmatically
    VeryHidden,
}

impl Visibility {
    /// Hidden and very-hidden sheets are never read
    pub fn is_hidden(self) -> bool {
        !matches!(self, Visibility::Visible)
    }

    /// Parse the `state` attribute of a SpreadsheetML `<sheet>` element.
    ///
    /// Unknown values are treated as visible.
    pub fn from_xlsx(state: &str) -> Self {
        match state {
            "hidden" => Visibility::Hidden,
            "veryHidden" => Visibility::VeryHidden,
            _ => Visibility::Visible,
        }
    }

    /// Decode the `hsState` byte of a BIFF8 BOUNDSHEET record.
    pub fn from_biff(state: u8) -> Self {
        match state & 0x03 {
            1 => Visibility::Hidden,
            2 => Visibility::VeryHidden,
            _ => Visibility::Visible,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
            Visibility::VeryHidden => "very-hidden",
        };
        f.write_str(s)
    }
}

/// A sheet as announced by the workbook, before any of its rows are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDescriptor {
    /// Sheet name
    pub name: String,
    /// 0-based position in the workbook's declaration order
    pub index: usize,
    /// Declared visibility
    pub visibility: Visibility,
}

impl SheetDescriptor {
    pub fn new(name: impl Into<String>, index: usize, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            index,
            visibility,
        }
    }
}
