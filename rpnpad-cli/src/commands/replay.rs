use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use rpnpad_core::config::KeypadConfig;
use rpnpad_core::dispatch::{Action, DispatchController};
use rpnpad_core::evaluator::EvaluatorPort;
use rpnpad_core::script::{ScriptStep, parse_script};

use super::session;

/// Extra time allowed per step on top of the configured latency
const STEP_GRACE: Duration = Duration::from_secs(5);

pub async fn run_replay(path: &Path, config: &KeypadConfig) -> Result<(), String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let steps = parse_script(&text, &config.hard_keypad())
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    let budget = step_budget(config);
    let mut ctl = session(config);

    println!("Replaying {} ({} steps)\n", path.display(), steps.len());
    for step in &steps {
        let count = play_step(&mut ctl, step, budget).await?;
        println!("{:>4}  {:<24} {}", step.line, describe(&step.action), submitted_note(count));
    }

    println!();
    print_summary(&ctl);
    Ok(())
}

/// Dispatch one step and wait for every command it submitted
async fn play_step<E: EvaluatorPort>(
    ctl: &mut DispatchController<E>,
    step: &ScriptStep,
    budget: Duration,
) -> Result<usize, String> {
    let count = ctl.dispatch(step.action.clone());
    debug!(line = step.line, count, "step dispatched");

    if tokio::time::timeout(budget, ctl.wait_idle()).await.is_err() {
        warn!(line = step.line, outstanding = ctl.outstanding(), "step timed out");
        return Err(format!(
            "line {}: evaluator did not finish within {:?} ({} command(s) outstanding)",
            step.line,
            budget,
            ctl.outstanding()
        ));
    }
    Ok(count)
}

fn step_budget(config: &KeypadConfig) -> Duration {
    let slowest = config.evaluator.slow_words.values().copied().max().unwrap_or(0);
    Duration::from_millis(config.evaluator.latency_ms + slowest) + STEP_GRACE
}

fn print_summary<E: EvaluatorPort>(ctl: &DispatchController<E>) {
    println!("Stack:");
    let mut empty = true;
    for line in ctl.display().stack_lines() {
        println!("  {line}");
        empty = false;
    }
    if empty {
        println!("  (empty)");
    }
    println!("Status:  {}", ctl.display().status());
    println!("Page:    {}", ctl.keymap().page_name());
    if !ctl.buffer().is_empty() {
        println!("Pending: {}", ctl.buffer().as_str());
    }
    println!("Submitted {} command(s)", ctl.submitted());
}

fn submitted_note(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => "-> 1 command".to_string(),
        n => format!("-> {n} commands"),
    }
}

/// Script-style text for an action
fn describe(action: &Action) -> String {
    match action {
        Action::Append(text) => format!("type {text}"),
        Action::Submit(command) => format!("submit {command}"),
        Action::SoftKey(pos) => format!("soft {pos}"),
        Action::Enter => "enter".to_string(),
        Action::Backspace => "back".to_string(),
        Action::Page(page) => format!("page {}", page.command()),
        Action::PageWord(word) => format!("page {word}"),
        Action::Tab => "tab".to_string(),
        Action::Clear => "clear".to_string(),
        Action::HistoryPrevious => "up".to_string(),
        Action::HistoryNext => "down".to_string(),
    }
}
