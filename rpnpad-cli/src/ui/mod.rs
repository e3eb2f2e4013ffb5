pub mod keypad;
pub mod theme;
