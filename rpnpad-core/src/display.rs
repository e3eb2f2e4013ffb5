//! Observable display strings
//!
//! `DisplayState` mirrors what the evaluator last reported. It has no public
//! setters: the dispatch controller refreshes it when a command finishes and
//! nothing else writes it.

/// Stack text and status line as last reported by the evaluator
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    stack: String,
    status: String,
}

impl DisplayState {
    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Stack text split into display lines, top of the tape last
    pub fn stack_lines(&self) -> impl Iterator<Item = &str> {
        self.stack.lines()
    }

    /// Returns whether anything changed
    pub(crate) fn refresh(&mut self, stack: String, status: String) -> bool {
        let changed = self.stack != stack || self.status != status;
        self.stack = stack;
        self.status = status;
        changed
    }
}

/// Receives the display strings every time a command finishes
pub trait DisplayListener {
    fn on_display_changed(&mut self, stack: &str, status: &str);
}

impl<F> DisplayListener for F
where
    F: FnMut(&str, &str),
{
    fn on_display_changed(&mut self, stack: &str, status: &str) {
        self(stack, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_reports_change() {
        let mut display = DisplayState::default();
        assert!(display.refresh("1 : 01".into(), "ok".into()));
        assert!(!display.refresh("1 : 01".into(), "ok".into()));
        assert_eq!(display.stack(), "1 : 01");
        assert_eq!(display.status(), "ok");
    }

    #[test]
    fn test_closure_listener() {
        let mut seen = Vec::new();
        {
            let mut listener = |stack: &str, status: &str| seen.push(format!("{stack}|{status}"));
            listener.on_display_changed("a", "b");
        }
        assert_eq!(seen, vec!["a|b"]);
    }
}
