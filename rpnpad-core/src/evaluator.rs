//! Boundary to the external RPN evaluator
//!
//! The keypad only ever talks to the evaluator through `EvaluatorPort`. The
//! evaluator talks back through a `KeypadLink`, which turns each callback into
//! a message on a channel instead of holding a reference to the UI:
//!
//! - `command_finished` after every `eval`
//! - `clear_assigned_buttons` / `assign_button` while answering a page word
//!
//! The dispatch controller owns the receiving end and drains it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tokio::sync::mpsc;

/// The evaluator as the keypad sees it
pub trait EvaluatorPort {
    /// Hand a command to the evaluator; completion is signalled through the link
    fn eval(&mut self, command: &str);

    /// Stack rendering as of the most recent completed command
    fn stack_as_string(&self) -> String;

    /// Status line as of the most recent completed command
    fn status(&self) -> String;

    /// Short name for logs
    fn name(&self) -> &'static str {
        "evaluator"
    }
}

impl<E: EvaluatorPort + ?Sized> EvaluatorPort for Box<E> {
    fn eval(&mut self, command: &str) {
        (**self).eval(command)
    }

    fn stack_as_string(&self) -> String {
        (**self).stack_as_string()
    }

    fn status(&self) -> String {
        (**self).status()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Callbacks from the evaluator to the keypad
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeypadEvent {
    /// An `eval` completed; `result` is the evaluator's own result code
    CommandFinished { result: i32 },
    /// Blank every soft key before a page is (re)assigned
    ClearAssignedButtons,
    /// Bind one soft key; coordinates are unchecked until reduced
    AssignButton {
        column: u32,
        row: u32,
        command: String,
        label: String,
    },
}

#[derive(Clone, Debug)]
pub struct EventEnvelope {
    pub id: u64,
    pub at: SystemTime,
    pub event: KeypadEvent,
}

/// Sending half handed to the evaluator
#[derive(Clone, Debug)]
pub struct KeypadLink {
    tx: mpsc::UnboundedSender<EventEnvelope>,
    next_id: Arc<AtomicU64>,
}

/// Receiving half owned by the dispatch controller
#[derive(Debug)]
pub struct KeypadEvents {
    rx: mpsc::UnboundedReceiver<EventEnvelope>,
}

/// Create a connected link/receiver pair
pub fn keypad_channel() -> (KeypadLink, KeypadEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        KeypadLink {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        },
        KeypadEvents { rx },
    )
}

impl KeypadLink {
    pub fn command_finished(&self, result: i32) {
        self.emit(KeypadEvent::CommandFinished { result });
    }

    pub fn clear_assigned_buttons(&self) {
        self.emit(KeypadEvent::ClearAssignedButtons);
    }

    /// An empty label makes the key show its command word
    pub fn assign_button(&self, column: u32, row: u32, command: &str, label: &str) {
        self.emit(KeypadEvent::AssignButton {
            column,
            row,
            command: command.to_string(),
            label: label.to_string(),
        });
    }

    pub fn emit(&self, event: KeypadEvent) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // The keypad may already be gone during shutdown
        let _ = self.tx.send(EventEnvelope {
            id,
            at: SystemTime::now(),
            event,
        });
    }

    /// Whether the keypad side has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl KeypadEvents {
    /// Everything queued right now, without waiting
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        let mut batch = Vec::new();
        while let Ok(env) = self.rx.try_recv() {
            batch.push(env);
        }
        batch
    }

    /// Wait for the next event; `None` once every link is dropped
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        self.rx.recv().await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_messages_arrive_in_order() {
        let (link, mut events) = keypad_channel();
        link.clear_assigned_buttons();
        link.assign_button(1, 2, "HYPOT", "");
        link.command_finished(0);

        let batch = events.drain();
        let kinds: Vec<_> = batch.iter().map(|e| e.event.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                KeypadEvent::ClearAssignedButtons,
                KeypadEvent::AssignButton {
                    column: 1,
                    row: 2,
                    command: "HYPOT".into(),
                    label: "".into(),
                },
                KeypadEvent::CommandFinished { result: 0 },
            ]
        );
        assert!(batch.windows(2).all(|w| w[0].id < w[1].id));
        assert!(events.drain().is_empty());
    }

    #[test]
    fn test_link_after_receiver_dropped() {
        let (link, events) = keypad_channel();
        drop(events);
        assert!(link.is_closed());
        link.command_finished(0);
    }

    #[tokio::test]
    async fn test_recv_from_another_task() {
        let (link, mut events) = keypad_channel();
        tokio::spawn(async move {
            link.command_finished(7);
        });
        let env = events.recv().await.unwrap();
        assert_eq!(env.event, KeypadEvent::CommandFinished { result: 7 });
    }
}
