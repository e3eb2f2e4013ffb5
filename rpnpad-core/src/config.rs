use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::grid::GridPosition;
use crate::hardkeys::{HardKey, HardKeyKind, HardKeypad};
use crate::keymap::KeymapPage;
use crate::pages::{PageSwitch, builtin_pages, page_name_for};

/// A soft-key assignment inside a configured page
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KeyConfig {
    /// Position as `column.row`
    pub at: String,
    /// Word submitted when pressed
    pub command: String,
    /// Caption (defaults to the command)
    #[serde(default)]
    pub label: String,
}

/// A page answered by the transcript evaluator for its page word
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PageConfig {
    /// Display name (defaults to the page word without `-keys`)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub keys: Vec<KeyConfig>,
}

/// Keys-menu entry: a caption and the page word it submits
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MenuEntry {
    pub label: String,
    pub command: String,
}

/// Special roles a configured hard key can take instead of a command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardKeyRole {
    Enter,
    Backspace,
    Math,
    Stack,
    Logic,
    Type,
}

/// Hard key definition in the config file
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HardKeyConfig {
    pub label: String,
    /// Submitted immediately; without it (and without a role) the label is typed
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub role: Option<HardKeyRole>,
    #[serde(default = "default_span")]
    pub span: u16,
}

fn default_span() -> u16 {
    1
}

/// Settings for the built-in transcript evaluator
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EvaluatorConfig {
    /// Artificial delay before every command completes
    #[serde(default)]
    pub latency_ms: u64,
    /// Maximum number of tape lines kept
    #[serde(default = "default_tape_limit")]
    pub tape_limit: usize,
    /// Words that take extra time to complete, in milliseconds
    #[serde(default)]
    pub slow_words: BTreeMap<String, u64>,
}

fn default_tape_limit() -> usize {
    200
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            tape_limit: default_tape_limit(),
            slow_words: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Dark,
    HighContrast,
}

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KeypadConfig {
    #[serde(default = "default_version")]
    pub version: String,

    /// Extra or replacement pages keyed by page word
    #[serde(default)]
    pub pages: BTreeMap<String, PageConfig>,

    /// Keys menu entries
    #[serde(default = "default_menu")]
    pub menu: Vec<MenuEntry>,

    /// Replacement hard keypad rows
    #[serde(default)]
    pub hard_keys: Option<Vec<Vec<HardKeyConfig>>>,

    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    #[serde(default)]
    pub theme: ThemeName,
}

fn default_version() -> String {
    "1".into()
}

fn default_menu() -> Vec<MenuEntry> {
    [
        ("Stack", PageSwitch::Stack),
        ("Math", PageSwitch::Math),
        ("Logic", PageSwitch::Logic),
        ("Types", PageSwitch::Type),
    ]
    .into_iter()
    .map(|(label, page)| MenuEntry {
        label: label.to_string(),
        command: page.command().to_string(),
    })
    .collect()
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            pages: BTreeMap::new(),
            menu: default_menu(),
            hard_keys: None,
            evaluator: EvaluatorConfig::default(),
            theme: ThemeName::default(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    InvalidPosition { page: String, at: String },
    DuplicateSlot { page: String, at: String },
    EmptyMenuEntry { index: usize },
    NotFound { searched: Vec<PathBuf> },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML parse error: {}", e),
            Self::InvalidPosition { page, at } => {
                write!(f, "page '{}' has an invalid key position '{}'", page, at)
            }
            Self::DuplicateSlot { page, at } => {
                write!(f, "page '{}' assigns key {} more than once", page, at)
            }
            Self::EmptyMenuEntry { index } => {
                write!(f, "menu entry {} needs both a label and a command", index + 1)
            }
            Self::NotFound { searched } => {
                write!(f, "no config file found, searched: {:?}", searched)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl KeypadConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: KeypadConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for config file in standard locations
    pub fn discover(start_dir: &Path) -> Result<(PathBuf, Self), ConfigError> {
        let names = ["rpnpad.yml", "rpnpad.yaml", ".rpnpad.yml", ".rpnpad.yaml"];
        let mut searched = Vec::new();

        if let Ok(env_path) = std::env::var("RPNPAD_CONFIG") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in &names {
                let path = current.join(name);
                if path.exists() {
                    return Ok((path.clone(), Self::load(&path)?));
                }
                searched.push(path);
            }
            dir = current.parent();
        }

        Err(ConfigError::NotFound { searched })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (word, page) in &self.pages {
            let mut seen = Vec::new();
            for key in &page.keys {
                let pos: GridPosition = key.at.parse().map_err(|_| ConfigError::InvalidPosition {
                    page: word.clone(),
                    at: key.at.clone(),
                })?;
                if seen.contains(&pos) {
                    return Err(ConfigError::DuplicateSlot {
                        page: word.clone(),
                        at: pos.to_string(),
                    });
                }
                seen.push(pos);
            }
        }

        for (index, entry) in self.menu.iter().enumerate() {
            if entry.label.trim().is_empty() || entry.command.trim().is_empty() {
                return Err(ConfigError::EmptyMenuEntry { index });
            }
        }

        Ok(())
    }

    /// Stock pages overlaid with configured ones, keyed by page word
    pub fn pages(&self) -> BTreeMap<String, KeymapPage> {
        let mut pages: BTreeMap<String, KeymapPage> = builtin_pages().into_iter().collect();
        for (word, cfg) in &self.pages {
            let name = cfg.name.clone().unwrap_or_else(|| page_name_for(word).to_string());
            let page = cfg
                .keys
                .iter()
                .filter_map(|k| k.at.parse::<GridPosition>().ok().map(|p| (p, k)))
                .fold(KeymapPage::blank(name), |page, (p, k)| page.assign(p, &k.command, &k.label));
            pages.insert(word.clone(), page);
        }
        pages
    }

    /// The hard keypad, configured or stock
    pub fn hard_keypad(&self) -> HardKeypad {
        let Some(rows) = &self.hard_keys else {
            return HardKeypad::default();
        };
        HardKeypad::new(
            rows.iter()
                .map(|row| row.iter().map(HardKeyConfig::to_key).collect())
                .collect(),
        )
    }
}

impl HardKeyConfig {
    fn to_key(&self) -> HardKey {
        let kind = match (self.role, &self.command) {
            (Some(HardKeyRole::Enter), _) => HardKeyKind::Enter,
            (Some(HardKeyRole::Backspace), _) => HardKeyKind::Backspace,
            (Some(HardKeyRole::Math), _) => HardKeyKind::Page(PageSwitch::Math),
            (Some(HardKeyRole::Stack), _) => HardKeyKind::Page(PageSwitch::Stack),
            (Some(HardKeyRole::Logic), _) => HardKeyKind::Page(PageSwitch::Logic),
            (Some(HardKeyRole::Type), _) => HardKeyKind::Page(PageSwitch::Type),
            (None, Some(command)) => HardKeyKind::Command(command.clone()),
            (None, None) => HardKeyKind::Literal,
        };
        HardKey::with_kind(&self.label, kind).wide(self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_words_from_file() {
        let yaml = "evaluator:\n  latency_ms: 10\n  slow_words:\n    long-word: 3000\n";
        let config = KeypadConfig::from_str(yaml).unwrap();
        assert_eq!(config.evaluator.latency_ms, 10);
        assert_eq!(config.evaluator.slow_words.get("long-word"), Some(&3000));
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let config = KeypadConfig::from_str("version: \"1\"\n").unwrap();
        assert_eq!(config.menu.len(), 4);
        assert_eq!(config.menu[2].command, "logic-keys");
        assert_eq!(config.evaluator.tape_limit, 200);
        assert!(config.evaluator.slow_words.is_empty());
        assert_eq!(config.theme, ThemeName::Dark);
        assert_eq!(config.hard_keypad(), HardKeypad::default());
        assert_eq!(config.pages().len(), 4);
    }

    #[test]
    fn test_parse_pages_and_menu() {
        let yaml = r#"
version: "1"
theme: high-contrast
pages:
  fin-keys:
    keys:
      - { at: "1.1", command: "PV" }
      - { at: "1.2", command: "FV", label: "Fut" }
  math-keys:
    name: trig
    keys:
      - { at: "2.3", command: "SIN" }
menu:
  - { label: "Finance", command: "fin-keys" }
evaluator:
  latency_ms: 25
"#;
        let config = KeypadConfig::from_str(yaml).unwrap();
        assert_eq!(config.theme, ThemeName::HighContrast);
        assert_eq!(config.evaluator.latency_ms, 25);
        assert_eq!(config.menu.len(), 1);

        let pages = config.pages();
        let fin = &pages["fin-keys"];
        assert_eq!(fin.name, "fin");
        assert_eq!(fin.get(GridPosition::new(1, 1).unwrap()).label, "PV");
        assert_eq!(fin.get(GridPosition::new(1, 2).unwrap()).label, "Fut");

        let math = &pages["math-keys"];
        assert_eq!(math.name, "trig");
        assert_eq!(math.assigned().count(), 1);
        assert!(pages.contains_key("stack-keys"));
    }

    #[test]
    fn test_invalid_position() {
        let yaml = r#"
pages:
  bad-keys:
    keys:
      - { at: "5.1", command: "X" }
"#;
        let result = KeypadConfig::from_str(yaml);
        assert!(matches!(result, Err(ConfigError::InvalidPosition { .. })));
    }

    #[test]
    fn test_duplicate_slot() {
        let yaml = r#"
pages:
  dup-keys:
    keys:
      - { at: "1.1", command: "A" }
      - { at: "1.1", command: "B" }
"#;
        let result = KeypadConfig::from_str(yaml);
        assert!(matches!(result, Err(ConfigError::DuplicateSlot { .. })));
    }

    #[test]
    fn test_empty_menu_entry() {
        let yaml = r#"
menu:
  - { label: "", command: "math-keys" }
"#;
        let result = KeypadConfig::from_str(yaml);
        assert!(matches!(result, Err(ConfigError::EmptyMenuEntry { index: 0 })));
    }

    #[test]
    fn test_hard_key_override() {
        let yaml = r#"
hard_keys:
  - - { label: "7" }
    - { label: "+", command: "-" }
    - { label: "GO", role: enter, span: 3 }
"#;
        let config = KeypadConfig::from_str(yaml).unwrap();
        let pad = config.hard_keypad();
        assert_eq!(pad.rows.len(), 1);
        assert_eq!(pad.find("7").unwrap().kind, HardKeyKind::Literal);
        assert_eq!(pad.find("+").unwrap().kind, HardKeyKind::Command("-".into()));
        let go = pad.find("go").unwrap();
        assert_eq!(go.kind, HardKeyKind::Enter);
        assert_eq!(go.span, 3);
    }
}
