//! Page-switch words and the stock soft-key pages
//!
//! The evaluator owns which words exist, so these tables are what a stock
//! evaluator answers with when asked for a page. The keypad itself only ever
//! sees them through `assign_button` callbacks.

use serde::{Deserialize, Serialize};

use crate::grid::GridPosition;
use crate::keymap::KeymapPage;

/// Hard keys that ask the evaluator for a soft-key page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSwitch {
    Math,
    Stack,
    Logic,
    Type,
}

impl PageSwitch {
    pub const ALL: [PageSwitch; 4] = [
        PageSwitch::Math,
        PageSwitch::Stack,
        PageSwitch::Logic,
        PageSwitch::Type,
    ];

    /// Word submitted to the evaluator
    pub fn command(&self) -> &'static str {
        match self {
            PageSwitch::Math => "math-keys",
            PageSwitch::Stack => "stack-keys",
            PageSwitch::Logic => "logic-keys",
            PageSwitch::Type => "type-keys",
        }
    }

    /// Hard key caption
    pub fn label(&self) -> &'static str {
        match self {
            PageSwitch::Math => "MATH",
            PageSwitch::Stack => "STACK",
            PageSwitch::Logic => "LOGIC",
            PageSwitch::Type => "TYPE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "math" | "math-keys" => Some(PageSwitch::Math),
            "stack" | "stack-keys" => Some(PageSwitch::Stack),
            "logic" | "logic-keys" => Some(PageSwitch::Logic),
            "type" | "types" | "type-keys" => Some(PageSwitch::Type),
            _ => None,
        }
    }
}

/// Page name for a page word: `math-keys` -> `math`
pub fn page_name_for(word: &str) -> &str {
    word.strip_suffix("-keys").unwrap_or(word)
}

type KeyRow = (u32, u32, &'static str, &'static str);

const MATH_KEYS: &[KeyRow] = &[
    (1, 2, "HYPOT", ""),
    (1, 3, "ATAN2", ""),
    (1, 4, "MIN", ""),
    (1, 5, "MAX", ""),
    (1, 6, "INV", ""),
    (1, 7, "SQ", ""),
    (1, 8, "SQRT", ""),
    (1, 9, "^", "Y^X"),
    (2, 2, "COS", ""),
    (2, 3, "SIN", ""),
    (2, 4, "TAN", ""),
    (3, 2, "ACOS", ""),
    (3, 3, "ASIN", ""),
    (3, 4, "ATAN", ""),
    (2, 5, "EXP", ""),
    (2, 6, "LN", ""),
    (2, 7, "LN2", ""),
    (2, 8, "LOG", ""),
    (2, 9, "CHS", ""),
    (3, 5, "ROUND", ""),
    (3, 6, "CEIL", ""),
    (3, 7, "FLOOR", ""),
    (3, 8, "k_PI", ""),
    (3, 9, "k_E", ""),
    (3, 10, "RAND", ""),
    (3, 11, "RAND48", ""),
];

const STACK_KEYS: &[KeyRow] = &[
    (1, 2, "DROP", ""),
    (1, 3, "DEPTH", ""),
    (1, 4, "SWAP", ""),
    (1, 5, "ROLLU", ""),
    (1, 6, "ROLLD", ""),
    (1, 7, "OVER", ""),
    (1, 8, "DUP", ""),
    (1, 9, "ROTU", ""),
    (1, 10, "ROTD", ""),
    (2, 2, "DROPn", ""),
    (2, 3, "DUPn", ""),
    (2, 4, "NIPn", ""),
    (2, 5, "PICK", ""),
    (2, 6, "ROLLDn", ""),
    (2, 7, "ROLLUn", ""),
    (2, 8, "TUCKn", ""),
    (2, 9, "REVERSE", "REV"),
    (2, 10, "REVERSEn", "REVn"),
];

const LOGIC_KEYS: &[KeyRow] = &[
    (1, 2, "IFTE", ""),
    (1, 3, "==", ""),
    (1, 4, ">", ""),
    (1, 5, ">=", ""),
    (1, 6, "<", ""),
    (1, 7, "<=", ""),
    (1, 8, "!=", ""),
    (2, 2, "NOT", ""),
    (2, 3, "AND", ""),
    (2, 4, "OR", ""),
    (2, 5, "XOR", ""),
];

const TYPE_KEYS: &[KeyRow] = &[
    (1, 2, "->INT", ""),
    (1, 3, "->FLOAT", "->FLT"),
    (1, 4, "->STRING", "->STR"),
    (1, 5, "->OBJECT", "->{}"),
    (1, 6, "OBJECT->", "{}->"),
    (1, 7, "->ARRAY", "->[]"),
    (1, 8, "ARRAY->", "[]->"),
    (2, 2, "->VEC3", "->V3"),
    (2, 3, "VEC3->", "V3->"),
    (2, 4, "->VEC3x", "->V3x"),
    (2, 5, "->VEC3y", "->V3y"),
    (2, 6, "->VEC3z", "->V3z"),
];

fn build(name: &str, rows: &[KeyRow]) -> KeymapPage {
    rows.iter()
        .filter_map(|(c, r, word, label)| GridPosition::new(*c, *r).ok().map(|p| (p, *word, *label)))
        .fold(KeymapPage::blank(name), |page, (p, word, label)| page.assign(p, word, label))
}

/// Stock page for a page switch
pub fn builtin_page(switch: PageSwitch) -> KeymapPage {
    let name = page_name_for(switch.command());
    match switch {
        PageSwitch::Math => build(name, MATH_KEYS),
        PageSwitch::Stack => build(name, STACK_KEYS),
        PageSwitch::Logic => build(name, LOGIC_KEYS),
        PageSwitch::Type => build(name, TYPE_KEYS),
    }
}

/// Every stock page keyed by its page word
pub fn builtin_pages() -> Vec<(String, KeymapPage)> {
    PageSwitch::ALL
        .iter()
        .map(|s| (s.command().to_string(), builtin_page(*s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_words() {
        assert_eq!(PageSwitch::Math.command(), "math-keys");
        assert_eq!(PageSwitch::from_name("TYPES"), Some(PageSwitch::Type));
        assert_eq!(PageSwitch::from_name("stack-keys"), Some(PageSwitch::Stack));
        assert_eq!(PageSwitch::from_name("fin"), None);
        assert_eq!(page_name_for("logic-keys"), "logic");
        assert_eq!(page_name_for("assign-key"), "assign-key");
    }

    #[test]
    fn test_builtin_math_page() {
        let page = builtin_page(PageSwitch::Math);
        assert_eq!(page.name, "math");
        assert_eq!(page.assigned().count(), MATH_KEYS.len());

        let pow = page.get(GridPosition::new(1, 9).unwrap());
        assert_eq!((pow.label.as_str(), pow.command.as_str()), ("Y^X", "^"));
        // Column 1 row 1 is left free on every stock page
        assert!(page.get(GridPosition::new(1, 1).unwrap()).is_blank());
    }

    #[test]
    fn test_builtin_pages_have_no_collisions() {
        for (word, page) in builtin_pages() {
            let rows = match PageSwitch::from_name(&word).unwrap() {
                PageSwitch::Math => MATH_KEYS,
                PageSwitch::Stack => STACK_KEYS,
                PageSwitch::Logic => LOGIC_KEYS,
                PageSwitch::Type => TYPE_KEYS,
            };
            assert_eq!(page.assigned().count(), rows.len(), "{word}");
        }
    }
}
