//! Action scripts: keypad sessions written down one action per line
//!
//! ```text
//! # push two numbers and add them
//! type 3
//! enter
//! key 4
//! key +
//! page math
//! soft 1.8
//! ```

use crate::dispatch::Action;
use crate::error::KeypadError;
use crate::grid::GridPosition;
use crate::hardkeys::HardKeypad;
use crate::pages::PageSwitch;

/// One parsed line, with its 1-based line number
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptStep {
    pub line: usize,
    pub action: Action,
}

/// Parse a single line; `Ok(None)` for blank lines and comments
pub fn parse_action(input: &str, keypad: &HardKeypad) -> Result<Option<Action>, String> {
    let input = input.trim();
    if input.is_empty() || input.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match input.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (input, ""),
    };
    let verb = verb.to_lowercase();

    let action = match verb.as_str() {
        "key" | "k" => {
            let label = need_arg(rest, "key <label>")?;
            match keypad.find(label) {
                Some(key) => key.action(),
                None => return Err(format!("No hard key labelled '{label}'")),
            }
        }
        "soft" | "s" => {
            let at = need_arg(rest, "soft <column.row>")?;
            let pos: GridPosition = at.parse().map_err(|e: KeypadError| e.to_string())?;
            Action::SoftKey(pos)
        }
        "type" | "t" => Action::Append(need_arg(rest, "type <text>")?.to_string()),
        "submit" => Action::Submit(need_arg(rest, "submit <command>")?.to_string()),
        "enter" => Action::Enter,
        "back" | "backspace" | "delete" => Action::Backspace,
        "page" | "p" => {
            let name = need_arg(rest, "page <math|stack|logic|type|word>")?;
            match PageSwitch::from_name(name) {
                Some(page) => Action::Page(page),
                None => Action::PageWord(name.to_string()),
            }
        }
        "tab" => Action::Tab,
        "clear" => Action::Clear,
        "up" => Action::HistoryPrevious,
        "down" => Action::HistoryNext,
        _ => {
            return Err(format!(
                "Unknown action: {verb}\nTry: key/soft/type/submit/enter/back/page/tab/clear/up/down"
            ));
        }
    };
    Ok(Some(action))
}

fn need_arg<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("Usage: {usage}"))
    } else {
        Ok(rest)
    }
}

/// Parse a whole script, stopping at the first bad line
pub fn parse_script(text: &str, keypad: &HardKeypad) -> Result<Vec<ScriptStep>, KeypadError> {
    let mut steps = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        match parse_action(raw, keypad) {
            Ok(Some(action)) => steps.push(ScriptStep { line, action }),
            Ok(None) => {}
            Err(message) => return Err(KeypadError::Script { line, message }),
        }
    }
    Ok(steps)
}
