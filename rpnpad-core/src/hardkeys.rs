//! The fixed keypad next to the soft-key bank
//!
//! Hard keys never change meaning at runtime. Digits and the decimal point
//! type into the command field; operator keys carry an explicit command that
//! is submitted right away (after any pending entry).

use crate::dispatch::Action;
use crate::pages::PageSwitch;

/// What pressing a hard key does
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HardKeyKind {
    /// Types the key's label into the command field
    Literal,
    /// Submits a fixed command
    Command(String),
    Enter,
    Backspace,
    Page(PageSwitch),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardKey {
    pub label: String,
    pub kind: HardKeyKind,
    /// Width in keypad cells
    pub span: u16,
}

impl HardKey {
    pub fn literal(label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: HardKeyKind::Literal,
            span: 1,
        }
    }

    pub fn command(label: &str, command: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: HardKeyKind::Command(command.to_string()),
            span: 1,
        }
    }

    pub fn with_kind(label: &str, kind: HardKeyKind) -> Self {
        Self {
            label: label.to_string(),
            kind,
            span: 1,
        }
    }

    pub fn wide(mut self, span: u16) -> Self {
        self.span = span.max(1);
        self
    }

    /// The dispatch action this key stands for
    pub fn action(&self) -> Action {
        match &self.kind {
            HardKeyKind::Literal => Action::Append(self.label.clone()),
            HardKeyKind::Command(command) => Action::Submit(command.clone()),
            HardKeyKind::Enter => Action::Enter,
            HardKeyKind::Backspace => Action::Backspace,
            HardKeyKind::Page(page) => Action::Page(*page),
        }
    }
}

/// Rows of hard keys, top to bottom
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardKeypad {
    pub rows: Vec<Vec<HardKey>>,
}

impl Default for HardKeypad {
    fn default() -> Self {
        use HardKeyKind::*;
        let rows = vec![
            vec![
                HardKey::with_kind("⌫", Backspace).wide(2),
                HardKey::literal("7"),
                HardKey::literal("8"),
                HardKey::literal("9"),
                HardKey::command("/", "/"),
                HardKey::command("Clear", "CLEAR").wide(2),
                HardKey::with_kind(PageSwitch::Math.label(), Page(PageSwitch::Math)).wide(2),
            ],
            vec![
                HardKey::literal("4"),
                HardKey::literal("5"),
                HardKey::literal("6"),
                HardKey::command("*", "*"),
                HardKey::command("OVER", "OVER").wide(2),
                HardKey::with_kind(PageSwitch::Stack.label(), Page(PageSwitch::Stack)).wide(2),
            ],
            vec![
                HardKey::literal("1"),
                HardKey::literal("2"),
                HardKey::literal("3"),
                HardKey::command("-", "-"),
                HardKey::command("SWAP", "SWAP").wide(2),
                HardKey::with_kind(PageSwitch::Type.label(), Page(PageSwitch::Type)).wide(2),
            ],
            vec![
                HardKey::literal("."),
                HardKey::literal("0"),
                HardKey::command("±", "NEG"),
                HardKey::command("+", "+"),
                HardKey::with_kind("ENTER", Enter).wide(4),
            ],
        ];
        Self { rows }
    }
}

impl HardKeypad {
    pub fn new(rows: Vec<Vec<HardKey>>) -> Self {
        Self { rows }
    }

    /// Key by caption, case-insensitive
    pub fn find(&self, label: &str) -> Option<&HardKey> {
        self.keys().find(|k| k.label.eq_ignore_ascii_case(label))
    }

    pub fn keys(&self) -> impl Iterator<Item = &HardKey> {
        self.rows.iter().flatten()
    }
}
