//! Soft-key keymap: pages and the registry that holds the active one
//!
//! A page always carries all 44 bindings. The registry swaps whole pages under
//! a write lock, so any reader (including a `KeymapView` on another thread)
//! sees either the old page or the new one, never a mix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::KeypadError;
use crate::grid::{GridPosition, KeyBinding, SLOTS};

/// Name given to a page produced by `clear_all`
pub const BLANK_PAGE: &str = "blank";

/// Name of the page the registry starts with
pub const NUMERIC_PAGE: &str = "numeric";

/// A named, complete set of soft-key bindings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPage")]
pub struct KeymapPage {
    pub name: String,
    bindings: Vec<KeyBinding>,
}

/// Page as it appears in serialized form, before slot checks
#[derive(Deserialize)]
struct RawPage {
    name: String,
    bindings: Vec<KeyBinding>,
}

impl TryFrom<RawPage> for KeymapPage {
    type Error = KeypadError;

    fn try_from(raw: RawPage) -> Result<Self, Self::Error> {
        if raw.bindings.len() != SLOTS {
            return Err(KeypadError::MalformedPage {
                message: format!("expected {} bindings, found {}", SLOTS, raw.bindings.len()),
                name: raw.name,
            });
        }
        if let Some((slot, b)) = raw
            .bindings
            .iter()
            .enumerate()
            .find(|(slot, b)| b.position.index() != *slot)
        {
            return Err(KeypadError::MalformedPage {
                message: format!("binding {} is for key {}", slot + 1, b.position),
                name: raw.name,
            });
        }
        Ok(Self {
            name: raw.name,
            bindings: raw.bindings,
        })
    }
}

impl KeymapPage {
    /// A page with every key unassigned
    pub fn blank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: GridPosition::all().map(KeyBinding::blank).collect(),
        }
    }

    /// The start-up page: each key shows its position and emits its slot index
    pub fn numeric() -> Self {
        Self {
            name: NUMERIC_PAGE.to_string(),
            bindings: GridPosition::all()
                .map(|pos| KeyBinding::new(pos, pos.to_string(), pos.index().to_string()))
                .collect(),
        }
    }

    pub fn get(&self, position: GridPosition) -> &KeyBinding {
        &self.bindings[position.index()]
    }

    /// Overwrite one slot
    pub fn set(&mut self, position: GridPosition, label: impl Into<String>, command: impl Into<String>) {
        self.bindings[position.index()] = KeyBinding::new(position, label, command);
    }

    /// Builder-style assignment; an empty label falls back to the command word
    pub fn assign(mut self, position: GridPosition, command: &str, label: &str) -> Self {
        self.assign_in_place(position, command, label);
        self
    }

    /// Assignment as the evaluator requests it; an empty label shows the command word
    pub fn assign_in_place(&mut self, position: GridPosition, command: &str, label: &str) {
        let label = if label.is_empty() { command } else { label };
        self.set(position, label, command);
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Bindings that are not blank, in grid order
    pub fn assigned(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter().filter(|b| !b.is_blank())
    }
}

/// Owner of the active soft-key page
#[derive(Debug)]
pub struct KeymapRegistry {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    page: RwLock<KeymapPage>,
    generation: AtomicU64,
}

impl KeymapRegistry {
    /// A registry holding the numeric start-up page
    pub fn new() -> Self {
        Self::with_page(KeymapPage::numeric())
    }

    pub fn with_page(page: KeymapPage) -> Self {
        debug_assert_eq!(page.bindings.len(), SLOTS);
        Self {
            shared: Arc::new(Shared {
                page: RwLock::new(page),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Read-only handle for renderers
    pub fn view(&self) -> KeymapView {
        KeymapView {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn get_binding(&self, position: GridPosition) -> KeyBinding {
        self.shared.get_binding(position)
    }

    /// Binding at raw coordinates, for callers that have not validated them
    pub fn binding_at(&self, column: u32, row: u32) -> Result<KeyBinding, KeypadError> {
        Ok(self.get_binding(GridPosition::new(column, row)?))
    }

    /// Overwrite a single slot; the command is not inspected
    pub fn set_binding(&self, position: GridPosition, label: &str, command: &str) {
        let mut page = self.shared.page.write().unwrap_or_else(PoisonError::into_inner);
        page.set(position, label, command);
        self.shared.bump();
    }

    /// Replace all 44 bindings at once
    pub fn load_page(&self, page: KeymapPage) {
        debug_assert_eq!(page.bindings.len(), SLOTS);
        let mut current = self.shared.page.write().unwrap_or_else(PoisonError::into_inner);
        *current = page;
        self.shared.bump();
    }

    pub fn clear_all(&self) {
        self.load_page(KeymapPage::blank(BLANK_PAGE));
    }

    pub fn page_name(&self) -> String {
        self.shared.page_name()
    }

    pub fn snapshot(&self) -> KeymapPage {
        self.shared.snapshot()
    }

    /// Incremented on every mutation
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }
}

impl Default for KeymapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Shared {
    fn get_binding(&self, position: GridPosition) -> KeyBinding {
        let page = self.page.read().unwrap_or_else(PoisonError::into_inner);
        page.get(position).clone()
    }

    fn page_name(&self) -> String {
        let page = self.page.read().unwrap_or_else(PoisonError::into_inner);
        page.name.clone()
    }

    fn snapshot(&self) -> KeymapPage {
        self.page.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Cloneable read-only handle onto a registry's active page
#[derive(Clone, Debug)]
pub struct KeymapView {
    shared: Arc<Shared>,
}

impl KeymapView {
    pub fn get_binding(&self, position: GridPosition) -> KeyBinding {
        self.shared.get_binding(position)
    }

    pub fn page_name(&self) -> String {
        self.shared.page_name()
    }

    /// Copy of the whole active page, taken under one read lock
    pub fn snapshot(&self) -> KeymapPage {
        self.shared.snapshot()
    }

    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    fn pos(column: u32, row: u32) -> GridPosition {
        GridPosition::new(column, row).unwrap()
    }

    fn filled(name: &str, word: &str) -> KeymapPage {
        GridPosition::all().fold(KeymapPage::blank(name), |page, p| {
            page.assign(p, &format!("{word}{}", p.index()), "")
        })
    }

    #[test]
    fn test_starts_with_numeric_page() {
        let registry = KeymapRegistry::new();
        assert_eq!(registry.page_name(), NUMERIC_PAGE);
        let b = registry.get_binding(pos(2, 1));
        assert_eq!(b.label, "2.1");
        assert_eq!(b.command, "11");
    }

    #[test]
    fn test_binding_at_rejects_out_of_range() {
        let registry = KeymapRegistry::new();
        assert_eq!(
            registry.binding_at(5, 1),
            Err(KeypadError::InvalidPosition { column: 5, row: 1 })
        );
        assert!(registry.binding_at(4, 11).is_ok());
    }

    #[test]
    fn test_load_page_replaces_every_slot() {
        let registry = KeymapRegistry::new();
        let page = filled("math", "W");
        registry.load_page(page.clone());

        for p in GridPosition::all() {
            assert_eq!(registry.get_binding(p), *page.get(p));
        }
        assert_eq!(registry.page_name(), "math");
    }

    #[test]
    fn test_set_binding_is_immediate_and_independent() {
        let registry = KeymapRegistry::new();
        let before = registry.generation();
        registry.set_binding(pos(3, 4), "sin", "SIN");

        let b = registry.get_binding(pos(3, 4));
        assert_eq!((b.label.as_str(), b.command.as_str()), ("sin", "SIN"));
        assert!(registry.generation() > before);

        registry.set_binding(pos(3, 4), "", "COS");
        let b = registry.get_binding(pos(3, 4));
        assert_eq!(b.label, "");
        assert_eq!(b.command, "COS");
    }

    #[test]
    fn test_clear_all() {
        let registry = KeymapRegistry::new();
        registry.clear_all();
        assert!(GridPosition::all().all(|p| registry.get_binding(p).is_blank()));
        assert_eq!(registry.page_name(), BLANK_PAGE);
    }

    #[test]
    fn test_assign_label_defaults_to_command() {
        let page = KeymapPage::blank("t").assign(pos(1, 2), "HYPOT", "").assign(pos(1, 9), "^", "Y^X");
        assert_eq!(page.get(pos(1, 2)).label, "HYPOT");
        assert_eq!(page.get(pos(1, 9)).label, "Y^X");
        assert_eq!(page.assigned().count(), 2);
    }

    #[test]
    fn test_view_never_sees_mixed_page() {
        let registry = KeymapRegistry::new();
        let a = filled("a", "A");
        let b = filled("b", "B");
        registry.load_page(a.clone());

        let view = registry.view();
        let done = Arc::new(AtomicBool::new(false));
        let reader_done = Arc::clone(&done);
        let reader = thread::spawn(move || {
            let mut checks = 0;
            while !reader_done.load(Ordering::Relaxed) || checks == 0 {
                let snap = view.snapshot();
                let prefix = if snap.name == "a" { "A" } else { "B" };
                assert!(
                    snap.bindings().iter().all(|k| k.command.starts_with(prefix)),
                    "mixed page observed"
                );
                checks += 1;
            }
            checks
        });

        for i in 0..500 {
            registry.load_page(if i % 2 == 0 { b.clone() } else { a.clone() });
        }
        done.store(true, Ordering::Relaxed);
        assert!(reader.join().unwrap() > 0);
    }

    #[test]
    fn test_deserialize_checks_every_slot() {
        let yaml = serde_yaml::to_string(&KeymapPage::numeric()).unwrap();
        let page: KeymapPage = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(page, KeymapPage::numeric());

        let empty = serde_yaml::from_str::<KeymapPage>("name: x\nbindings: []\n").unwrap_err();
        assert!(empty.to_string().contains("expected 44 bindings, found 0"));

        let same_slot: String = std::iter::repeat("  - { position: \"4.11\", label: a, command: A }\n")
            .take(SLOTS)
            .collect();
        let err = serde_yaml::from_str::<KeymapPage>(&format!("name: x\nbindings:\n{same_slot}"))
            .unwrap_err();
        assert!(err.to_string().contains("binding 1 is for key 4.11"));
    }
}
