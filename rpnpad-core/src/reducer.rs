use std::collections::VecDeque;

use tracing::{info, trace, warn};

use crate::evaluator::{EventEnvelope, KeypadEvent};
use crate::grid::GridPosition;
use crate::keymap::{BLANK_PAGE, KeymapPage, KeymapRegistry};
use crate::pages::page_name_for;

/// What a drained batch of evaluator callbacks amounted to
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reduction {
    /// Result codes of every `CommandFinished`, in arrival order
    pub finished: Vec<i32>,
    /// Name of the page committed by a clear + assign sequence
    pub committed: Option<String>,
    /// Assignments written straight to the registry
    pub direct_assignments: usize,
    /// Assignments dropped for out-of-range coordinates
    pub dropped: usize,
}

/// Apply one batch of callbacks to the keymap.
///
/// A `ClearAssignedButtons` opens a staged blank page that absorbs every later
/// assignment in the batch; it is loaded in one swap at the end. Assignments
/// with no preceding clear go straight to the registry.
///
/// `in_flight` lists the submitted commands not yet finished, oldest first.
/// The evaluator answers in order, so a clear belongs to the first command
/// not finished earlier in the batch, and that word names the page.
pub fn reduce_batch(
    keymap: &KeymapRegistry,
    in_flight: &VecDeque<String>,
    batch: &[EventEnvelope],
) -> Reduction {
    let mut out = Reduction::default();
    let mut staged: Option<KeymapPage> = None;

    for env in batch {
        trace!(id = env.id, event = ?env.event, "keypad event");
        match &env.event {
            KeypadEvent::CommandFinished { result } => out.finished.push(*result),
            KeypadEvent::ClearAssignedButtons => {
                let name = in_flight
                    .get(out.finished.len())
                    .map(|word| page_name_for(word))
                    .unwrap_or(BLANK_PAGE);
                staged = Some(KeymapPage::blank(name));
            }
            KeypadEvent::AssignButton {
                column,
                row,
                command,
                label,
            } => {
                let Ok(position) = GridPosition::new(*column, *row) else {
                    warn!(column, row, command = %command, "assignment outside the soft-key grid dropped");
                    out.dropped += 1;
                    continue;
                };
                match staged.as_mut() {
                    Some(page) => page.assign_in_place(position, command, label),
                    None => {
                        let label = if label.is_empty() { command } else { label };
                        keymap.set_binding(position, label, command);
                        out.direct_assignments += 1;
                    }
                }
            }
        }
    }

    if let Some(page) = staged {
        info!(page = %page.name, keys = page.assigned().count(), "soft-key page loaded");
        out.committed = Some(page.name.clone());
        keymap.load_page(page);
    }

    out
}
