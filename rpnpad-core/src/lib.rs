pub mod buffer;
pub mod config;
pub mod display;
pub mod error;
pub mod grid;
pub mod keymap;
pub mod reducer;

// Evaluator boundary
pub mod evaluator;

// Keypad layout: hard keys and stock soft-key pages
pub mod hardkeys;
pub mod pages;

// Action dispatch
pub mod dispatch;
pub mod script;
