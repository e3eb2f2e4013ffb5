//! Input dispatch: the one place user actions turn into evaluator commands
//!
//! Every action either edits the pending entry, or submits one or more
//! commands in a fixed order (pending entry first, then the action's own
//! command). After each submission the controller drains whatever the
//! evaluator has sent back, so synchronous evaluators are fully settled by the
//! time an action returns. Asynchronous evaluators are picked up by `pump` or
//! `wait_idle`.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::buffer::InputBuffer;
use crate::display::{DisplayListener, DisplayState};
use crate::evaluator::{EvaluatorPort, EventEnvelope, KeypadEvents};
use crate::grid::GridPosition;
use crate::hardkeys::HardKey;
use crate::keymap::{KeymapRegistry, KeymapView};
use crate::pages::PageSwitch;
use crate::reducer::{Reduction, reduce_batch};

/// Submitted when ENTER is pressed with nothing typed
pub const ENTER_EMPTY: &str = "DUP";
/// Submitted when BACKSPACE is pressed with nothing typed
pub const BACKSPACE_EMPTY: &str = "DROP";
pub const TAB_COMMAND: &str = "SWAP";
pub const CLEAR_COMMAND: &str = "CLEAR";

/// A logical user action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Type text into the command field
    Append(String),
    /// Submit a fixed command after any pending entry
    Submit(String),
    SoftKey(GridPosition),
    Enter,
    Backspace,
    Page(PageSwitch),
    /// Page word from the keys menu
    PageWord(String),
    Tab,
    Clear,
    HistoryPrevious,
    HistoryNext,
}

pub struct DispatchController<E: EvaluatorPort> {
    evaluator: E,
    events: KeypadEvents,
    keymap: KeymapRegistry,
    buffer: InputBuffer,
    display: DisplayState,
    listeners: Vec<Box<dyn DisplayListener>>,
    in_flight: VecDeque<String>,
    submitted: u64,
    finished: u64,
}

impl<E: EvaluatorPort> DispatchController<E> {
    /// `events` must be the receiving end of the link the evaluator was given
    pub fn new(evaluator: E, events: KeypadEvents) -> Self {
        Self::with_keymap(evaluator, events, KeymapRegistry::new())
    }

    pub fn with_keymap(evaluator: E, events: KeypadEvents, keymap: KeymapRegistry) -> Self {
        Self {
            evaluator,
            events,
            keymap,
            buffer: InputBuffer::new(),
            display: DisplayState::default(),
            listeners: Vec::new(),
            in_flight: VecDeque::new(),
            submitted: 0,
            finished: 0,
        }
    }

    pub fn subscribe(&mut self, listener: impl DisplayListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Handle one action; returns how many commands were submitted
    pub fn dispatch(&mut self, action: Action) -> usize {
        trace!(?action, "dispatch");
        match action {
            Action::Append(text) => {
                self.buffer.append(&text);
                0
            }
            Action::Submit(command) => self.submit_after_entry(&command),
            Action::SoftKey(position) => {
                let binding = self.keymap.get_binding(position);
                self.submit_after_entry(&binding.command)
            }
            Action::Enter => {
                if self.buffer.is_empty() {
                    self.submit(ENTER_EMPTY) as usize
                } else {
                    self.flush_entry() as usize
                }
            }
            Action::Backspace => {
                if self.buffer.is_empty() {
                    self.submit(BACKSPACE_EMPTY) as usize
                } else {
                    self.buffer.delete_last();
                    0
                }
            }
            Action::Page(page) => self.submit(page.command()) as usize,
            Action::PageWord(word) => self.submit(&word) as usize,
            Action::Tab => self.submit(TAB_COMMAND) as usize,
            Action::Clear => self.submit_after_entry(CLEAR_COMMAND),
            Action::HistoryPrevious | Action::HistoryNext => {
                trace!("command history not available");
                0
            }
        }
    }

    pub fn press_hard_key(&mut self, key: &HardKey) -> usize {
        self.dispatch(key.action())
    }

    pub fn press_soft_key(&mut self, position: GridPosition) -> usize {
        self.dispatch(Action::SoftKey(position))
    }

    pub fn type_text(&mut self, text: &str) {
        self.dispatch(Action::Append(text.to_string()));
    }

    pub fn enter(&mut self) -> usize {
        self.dispatch(Action::Enter)
    }

    pub fn backspace(&mut self) -> usize {
        self.dispatch(Action::Backspace)
    }

    pub fn switch_page(&mut self, page: PageSwitch) -> usize {
        self.dispatch(Action::Page(page))
    }

    pub fn tab(&mut self) -> usize {
        self.dispatch(Action::Tab)
    }

    pub fn clear(&mut self) -> usize {
        self.dispatch(Action::Clear)
    }

    pub fn history_previous(&mut self) {
        self.dispatch(Action::HistoryPrevious);
    }

    pub fn history_next(&mut self) {
        self.dispatch(Action::HistoryNext);
    }

    /// Apply everything the evaluator has sent so far
    pub fn pump(&mut self) -> Reduction {
        let batch = self.events.drain();
        self.process(&batch)
    }

    /// Wait until every submitted command has been reported finished.
    ///
    /// Returns early if the evaluator drops its link.
    pub async fn wait_idle(&mut self) {
        self.pump();
        while self.outstanding() > 0 {
            let Some(first) = self.events.recv().await else {
                break;
            };
            let mut batch = vec![first];
            batch.extend(self.events.drain());
            self.process(&batch);
        }
    }

    /// Commands submitted but not yet reported finished
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.finished)
    }

    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn keymap(&self) -> &KeymapRegistry {
        &self.keymap
    }

    pub fn keymap_view(&self) -> KeymapView {
        self.keymap.view()
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Pending entry first, then `command`
    fn submit_after_entry(&mut self, command: &str) -> usize {
        let flushed = self.flush_entry() as usize;
        flushed + self.submit(command) as usize
    }

    fn flush_entry(&mut self) -> bool {
        if self.buffer.is_empty() {
            return false;
        }
        let entry = self.buffer.flush();
        self.submit(&entry)
    }

    /// One `eval` call; an empty command is a no-op
    fn submit(&mut self, command: &str) -> bool {
        if command.is_empty() {
            trace!("empty command ignored");
            return false;
        }
        debug!(evaluator = self.evaluator.name(), command, "submit");
        self.submitted += 1;
        self.in_flight.push_back(command.to_string());
        self.evaluator.eval(command);
        self.pump();
        true
    }

    fn process(&mut self, batch: &[EventEnvelope]) -> Reduction {
        if batch.is_empty() {
            return Reduction::default();
        }
        let out = reduce_batch(&self.keymap, &self.in_flight, batch);
        for result in &out.finished {
            self.finished += 1;
            self.in_flight.pop_front();
            self.command_finished(*result);
        }
        out
    }

    fn command_finished(&mut self, result: i32) {
        let stack = self.evaluator.stack_as_string();
        let status = self.evaluator.status();
        let changed = self.display.refresh(stack, status);
        trace!(result, changed, "command finished");
        for listener in &mut self.listeners {
            listener.on_display_changed(self.display.stack(), self.display.status());
        }
    }
}
