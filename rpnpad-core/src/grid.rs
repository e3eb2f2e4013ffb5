//! Soft-key grid model
//!
//! The soft-key bank is a fixed 4x11 grid. Positions are 1-based
//! `(column, row)` pairs, written as `column.row` (e.g. `2.10`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeypadError;

/// Number of soft-key columns
pub const COLUMNS: u8 = 4;
/// Number of soft-key rows
pub const ROWS: u8 = 11;
/// Total number of soft keys
pub const SLOTS: usize = COLUMNS as usize * ROWS as usize;

/// A validated position in the soft-key grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridPosition {
    column: u8,
    row: u8,
}

impl GridPosition {
    /// Create a position, rejecting anything outside the 4x11 grid
    pub fn new(column: u32, row: u32) -> Result<Self, KeypadError> {
        if (1..=COLUMNS as u32).contains(&column) && (1..=ROWS as u32).contains(&row) {
            Ok(Self {
                column: column as u8,
                row: row as u8,
            })
        } else {
            Err(KeypadError::InvalidPosition { column, row })
        }
    }

    /// Position for a slot index (column-major, as the grid is laid out)
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= SLOTS {
            return None;
        }
        Some(Self {
            column: (index / ROWS as usize) as u8 + 1,
            row: (index % ROWS as usize) as u8 + 1,
        })
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    /// Slot index into a page: `(column - 1) * 11 + (row - 1)`
    pub fn index(&self) -> usize {
        (self.column as usize - 1) * ROWS as usize + (self.row as usize - 1)
    }

    /// Every position, column by column
    pub fn all() -> impl Iterator<Item = GridPosition> {
        (0..SLOTS).filter_map(GridPosition::from_index)
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.column, self.row)
    }
}

impl FromStr for GridPosition {
    type Err = KeypadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || KeypadError::InvalidPositionSyntax {
            input: s.to_string(),
        };
        let (col, row) = s.trim().split_once('.').ok_or_else(syntax)?;
        let col: u32 = col.parse().map_err(|_| syntax())?;
        let row: u32 = row.parse().map_err(|_| syntax())?;
        GridPosition::new(col, row)
    }
}

impl TryFrom<String> for GridPosition {
    type Error = KeypadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GridPosition> for String {
    fn from(pos: GridPosition) -> Self {
        pos.to_string()
    }
}

/// The label and command currently assigned to one soft key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub position: GridPosition,
    /// Text shown on the key
    pub label: String,
    /// Word forwarded verbatim to the evaluator; empty means the key does nothing
    pub command: String,
}

impl KeyBinding {
    /// An unassigned key
    pub fn blank(position: GridPosition) -> Self {
        Self {
            position,
            label: String::new(),
            command: String::new(),
        }
    }

    pub fn new(position: GridPosition, label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
            command: command.into(),
        }
    }

    /// Whether pressing this key submits anything
    pub fn is_assigned(&self) -> bool {
        !self.command.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.label.is_empty() && self.command.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for index in 0..SLOTS {
            let pos = GridPosition::from_index(index).unwrap();
            assert_eq!(pos.index(), index);
        }
        assert_eq!(GridPosition::from_index(SLOTS), None);
        assert_eq!(GridPosition::all().count(), 44);
    }

    #[test]
    fn test_column_major_layout() {
        let pos = GridPosition::from_index(11).unwrap();
        assert_eq!((pos.column(), pos.row()), (2, 1));
        let last = GridPosition::from_index(43).unwrap();
        assert_eq!((last.column(), last.row()), (4, 11));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            GridPosition::new(0, 1),
            Err(KeypadError::InvalidPosition { column: 0, row: 1 })
        );
        assert!(GridPosition::new(5, 1).is_err());
        assert!(GridPosition::new(1, 12).is_err());
        assert!(GridPosition::new(4, 11).is_ok());
    }

    #[test]
    fn test_parse_and_display() {
        let pos: GridPosition = "2.10".parse().unwrap();
        assert_eq!((pos.column(), pos.row()), (2, 10));
        assert_eq!(pos.to_string(), "2.10");

        assert!(matches!(
            "2-10".parse::<GridPosition>(),
            Err(KeypadError::InvalidPositionSyntax { .. })
        ));
        assert!(matches!(
            "9.1".parse::<GridPosition>(),
            Err(KeypadError::InvalidPosition { column: 9, row: 1 })
        ));
    }

    #[test]
    fn test_binding_assignment() {
        let pos = GridPosition::new(1, 1).unwrap();
        let blank = KeyBinding::blank(pos);
        assert!(blank.is_blank());
        assert!(!blank.is_assigned());

        let label_only = KeyBinding::new(pos, "sin", "");
        assert!(!label_only.is_blank());
        assert!(!label_only.is_assigned());
    }
}
