use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use rpnpad_core::config::EvaluatorConfig;
use rpnpad_core::evaluator::{EvaluatorPort, KeypadLink};
use rpnpad_core::keymap::KeymapPage;

/// Word that programs a single soft key: `assign-key <c.r> <word> [label]`
pub const ASSIGN_KEY: &str = "assign-key";

/// Stand-in evaluator for demos and replays.
///
/// It does no arithmetic: every command is written to a tape, `CLEAR` wipes
/// the tape, and page words are answered with `clear_assigned_buttons` plus
/// one `assign_button` per key of the matching page. `assign-key` rebinds one
/// key of the current page. Commands are worked off in order on a background
/// task so latency can be simulated.
pub struct TranscriptEvaluator {
    tape: Arc<Mutex<Tape>>,
    command_tx: mpsc::UnboundedSender<String>,
}

impl TranscriptEvaluator {
    /// Start the worker task; must be called inside a tokio runtime
    pub fn spawn(
        config: &EvaluatorConfig,
        pages: BTreeMap<String, KeymapPage>,
        link: KeypadLink,
    ) -> Self {
        let tape = Arc::new(Mutex::new(Tape::new(config.tape_limit, pages)));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            tape: Arc::clone(&tape),
            link,
            latency: Duration::from_millis(config.latency_ms),
            slow_words: config.slow_words.clone(),
        };
        tokio::spawn(worker.run(command_rx));

        Self { tape, command_tx }
    }

    fn tape(&self) -> std::sync::MutexGuard<'_, Tape> {
        self.tape.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EvaluatorPort for TranscriptEvaluator {
    fn eval(&mut self, command: &str) {
        // A closed channel means the worker is gone; nothing left to report to
        let _ = self.command_tx.send(command.to_string());
    }

    fn stack_as_string(&self) -> String {
        self.tape().render()
    }

    fn status(&self) -> String {
        self.tape().status.clone()
    }

    fn name(&self) -> &'static str {
        "transcript"
    }
}

struct Worker {
    tape: Arc<Mutex<Tape>>,
    link: KeypadLink,
    latency: Duration,
    slow_words: BTreeMap<String, u64>,
}

impl Worker {
    async fn run(self, mut command_rx: mpsc::UnboundedReceiver<String>) {
        while let Some(command) = command_rx.recv().await {
            let extra = self.slow_words.get(&command).copied().unwrap_or(0);
            let delay = self.latency + Duration::from_millis(extra);
            if !delay.is_zero() {
                debug!(command = %command, ?delay, "evaluating slowly");
                tokio::time::sleep(delay).await;
            }

            let result = {
                let mut tape = self.tape.lock().unwrap_or_else(PoisonError::into_inner);
                tape.apply(&command, &self.link)
            };
            self.link.command_finished(result);

            if self.link.is_closed() {
                break;
            }
        }
        info!("transcript evaluator stopped");
    }
}

/// What the transcript evaluator remembers
#[derive(Debug)]
pub struct Tape {
    lines: VecDeque<String>,
    limit: usize,
    pub status: String,
    pages: BTreeMap<String, KeymapPage>,
}

impl Tape {
    pub fn new(limit: usize, pages: BTreeMap<String, KeymapPage>) -> Self {
        Self {
            lines: VecDeque::new(),
            limit: limit.max(1),
            status: String::new(),
            pages,
        }
    }

    /// Process one command, sending keymap callbacks through `link`
    pub fn apply(&mut self, command: &str, link: &KeypadLink) -> i32 {
        if let Some(page) = self.pages.get(command) {
            link.clear_assigned_buttons();
            for key in page.assigned() {
                link.assign_button(
                    key.position.column() as u32,
                    key.position.row() as u32,
                    &key.command,
                    &key.label,
                );
            }
            self.status = format!("keys: {}", page.name);
            return 0;
        }

        if let Some(args) = command.strip_prefix(ASSIGN_KEY) {
            if args.is_empty() || args.starts_with(char::is_whitespace) {
                return self.assign_key(args, link);
            }
        }

        if command.eq_ignore_ascii_case("CLEAR") {
            self.lines.clear();
            self.status = "cleared".to_string();
            return 0;
        }

        if command.ends_with("-keys") {
            self.status = format!("unknown page: {command}");
            return 1;
        }

        self.lines.push_back(command.to_string());
        while self.lines.len() > self.limit {
            self.lines.pop_front();
        }
        self.status = format!("ok: {command}");
        0
    }

    /// One key rebound in place; no clear, so the rest of the page stays
    fn assign_key(&mut self, args: &str, link: &KeypadLink) -> i32 {
        let mut parts = args.split_whitespace();
        let (Some(at), Some(word)) = (parts.next(), parts.next()) else {
            self.status = format!("error: usage: {ASSIGN_KEY} <column.row> <word> [label]");
            return 1;
        };
        let label = parts.collect::<Vec<_>>().join(" ");

        let coords = at
            .split_once('.')
            .and_then(|(c, r)| Some((c.parse::<u32>().ok()?, r.parse::<u32>().ok()?)));
        let Some((column, row)) = coords else {
            self.status = format!("error: bad key position '{at}'");
            return 1;
        };

        // Range is checked on the keypad side
        link.assign_button(column, row, word, &label);
        self.status = format!("key {at}: {word}");
        0
    }

    /// Tape entries with their level, deepest first: `entry : 02`
    pub fn render(&self) -> String {
        let depth = self.lines.len();
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{} : {:02}", line, depth - i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpnpad_core::dispatch::DispatchController;
    use rpnpad_core::evaluator::{KeypadEvent, keypad_channel};
    use rpnpad_core::pages::{PageSwitch, builtin_pages};

    fn pages() -> BTreeMap<String, KeymapPage> {
        builtin_pages().into_iter().collect()
    }

    #[test]
    fn test_tape_records_and_renders() {
        let (link, _events) = keypad_channel();
        let mut tape = Tape::new(10, pages());
        tape.apply("3", &link);
        tape.apply("4", &link);
        tape.apply("+", &link);
        assert_eq!(tape.render(), "3 : 03\n4 : 02\n+ : 01");
        assert_eq!(tape.status, "ok: +");

        tape.apply("CLEAR", &link);
        assert_eq!(tape.render(), "");
        assert_eq!(tape.status, "cleared");
    }

    #[test]
    fn test_tape_limit() {
        let (link, _events) = keypad_channel();
        let mut tape = Tape::new(2, BTreeMap::new());
        for n in ["1", "2", "3"] {
            tape.apply(n, &link);
        }
        assert_eq!(tape.render(), "2 : 02\n3 : 01");
    }

    #[test]
    fn test_page_word_sends_assignments() {
        let (link, mut events) = keypad_channel();
        let mut tape = Tape::new(10, pages());
        assert_eq!(tape.apply("logic-keys", &link), 0);

        let batch = events.drain();
        assert_eq!(batch[0].event, KeypadEvent::ClearAssignedButtons);
        assert_eq!(batch.len(), 1 + 11);
        assert_eq!(tape.status, "keys: logic");
        assert_eq!(tape.render(), "");

        assert_eq!(tape.apply("fin-keys", &link), 1);
        assert!(tape.status.starts_with("unknown page"));
    }

    #[test]
    fn test_assign_key_sends_one_assignment() {
        let (link, mut events) = keypad_channel();
        let mut tape = Tape::new(10, pages());
        assert_eq!(tape.apply("assign-key 2.3 SQRT square root", &link), 0);

        let batch = events.drain();
        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch[0].event,
            KeypadEvent::AssignButton {
                column: 2,
                row: 3,
                command: "SQRT".into(),
                label: "square root".into(),
            }
        );
        assert_eq!(tape.status, "key 2.3: SQRT");
        assert_eq!(tape.render(), "");

        assert_eq!(tape.apply("assign-key 2.3", &link), 1);
        assert!(tape.status.starts_with("error: usage"));
        assert_eq!(tape.apply("assign-key x.y W", &link), 1);
        assert!(events.drain().is_empty());

        // Words that merely start with it are ordinary commands
        assert_eq!(tape.apply("assign-keys", &link), 0);
        assert_eq!(tape.render(), "assign-keys : 01");
    }

    #[tokio::test]
    async fn test_controller_round_trip() {
        let (link, events) = keypad_channel();
        let eval = TranscriptEvaluator::spawn(&EvaluatorConfig::default(), pages(), link);
        let mut ctl = DispatchController::new(eval, events);

        ctl.switch_page(PageSwitch::Stack);
        ctl.type_text("12");
        ctl.enter();
        ctl.wait_idle().await;

        assert_eq!(ctl.keymap().page_name(), "stack");
        assert_eq!(ctl.display().stack(), "12 : 01");
        assert_eq!(ctl.display().status(), "ok: 12");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_display() {
        let (link, events) = keypad_channel();
        let config = EvaluatorConfig {
            latency_ms: 200,
            ..EvaluatorConfig::default()
        };
        let eval = TranscriptEvaluator::spawn(&config, pages(), link);
        let mut ctl = DispatchController::new(eval, events);

        ctl.type_text("5");
        ctl.enter();
        assert_eq!(ctl.display().stack(), "");
        assert_eq!(ctl.outstanding(), 1);

        ctl.wait_idle().await;
        assert_eq!(ctl.display().stack(), "5 : 01");
    }
}
