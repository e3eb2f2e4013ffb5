use std::fmt;

/// Errors raised by the keypad core itself.
///
/// Anything the evaluator rejects is reported through its status text, never here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeypadError {
    /// Grid coordinates outside the 4x11 soft-key bank
    InvalidPosition { column: u32, row: u32 },
    /// Text that is not of the form `column.row`
    InvalidPositionSyntax { input: String },
    /// Action script line that could not be parsed
    Script { line: usize, message: String },
    /// Page data that does not hold exactly one binding per grid slot
    MalformedPage { name: String, message: String },
}

impl fmt::Display for KeypadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeypadError::InvalidPosition { column, row } => {
                write!(f, "invalid soft-key position {}.{} (grid is 4x11)", column, row)
            }
            KeypadError::InvalidPositionSyntax { input } => {
                write!(f, "expected position as column.row, got '{}'", input)
            }
            KeypadError::Script { line, message } => write!(f, "line {}: {}", line, message),
            KeypadError::MalformedPage { name, message } => {
                write!(f, "page '{}' is malformed: {}", name, message)
            }
        }
    }
}

impl std::error::Error for KeypadError {}
