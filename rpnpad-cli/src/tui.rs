use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use rpnpad_core::config::{KeypadConfig, MenuEntry};
use rpnpad_core::dispatch::{Action, DispatchController};
use rpnpad_core::evaluator::EvaluatorPort;
use rpnpad_core::hardkeys::HardKeypad;
use rpnpad_core::pages::PageSwitch;

use crate::commands;
use crate::ui::keypad::{KeypadLayout, Screen, Target, draw};

/// What a terminal event amounts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Act(Action),
    Quit,
}

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

pub async fn run_tui(config: &KeypadConfig) -> io::Result<()> {
    let keypad = config.hard_keypad();
    let mut ctl = commands::session(config);
    info!(evaluator = ctl.evaluator().name(), "keypad started");

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut ctl, &keypad, &config.menu);
    restore_terminal(terminal)?;

    info!(submitted = ctl.submitted(), "keypad closed");
    result
}

fn event_loop<E: EvaluatorPort>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ctl: &mut DispatchController<E>,
    keypad: &HardKeypad,
    menu: &[MenuEntry],
) -> io::Result<()> {
    let mut layout = KeypadLayout::default();

    loop {
        ctl.pump();

        {
            let page = ctl.keymap().snapshot();
            let screen = Screen {
                stack_lines: ctl.display().stack_lines().collect(),
                entry: ctl.buffer().as_str(),
                status: ctl.display().status(),
                page: &page,
                keypad,
                menu,
                busy: ctl.outstanding() > 0,
            };
            terminal.draw(|f| {
                layout = KeypadLayout::compute(f.area(), keypad, menu);
                draw(f, &layout, &screen);
            })?;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        let input = match event::read()? {
            CEvent::Key(key) => map_key(key, keypad),
            CEvent::Mouse(mouse) => map_mouse(mouse, &layout, keypad, menu),
            _ => None,
        };

        match input {
            Some(Input::Quit) => return Ok(()),
            Some(Input::Act(action)) => {
                let count = ctl.dispatch(action);
                debug!(count, outstanding = ctl.outstanding(), "input handled");
            }
            None => {}
        }
    }
}

/// Keyboard to keypad action
pub fn map_key(key: KeyEvent, keypad: &HardKeypad) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Input::Quit),
            KeyCode::Char('l') => Some(Input::Act(Action::Clear)),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Esc => return Some(Input::Quit),
        KeyCode::Enter => Action::Enter,
        KeyCode::Backspace | KeyCode::Delete => Action::Backspace,
        KeyCode::Tab => Action::Tab,
        KeyCode::Up => Action::HistoryPrevious,
        KeyCode::Down => Action::HistoryNext,
        KeyCode::F(n @ 1..=4) => Action::Page(PageSwitch::ALL[n as usize - 1]),
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            let text: &str = c.encode_utf8(&mut buf);
            // Operator keys act like their hard key; everything else is typed
            match keypad.find(text) {
                Some(hard) => hard.action(),
                None => Action::Append(text.to_string()),
            }
        }
        _ => return None,
    };
    Some(Input::Act(action))
}

/// Left clicks on soft keys, hard keys and keys-menu entries press them
pub fn map_mouse(
    mouse: MouseEvent,
    layout: &KeypadLayout,
    keypad: &HardKeypad,
    menu: &[MenuEntry],
) -> Option<Input> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    let action = match layout.hit(mouse.column, mouse.row)? {
        Target::Soft(pos) => Action::SoftKey(pos),
        Target::Hard { row, index } => keypad.rows.get(row)?.get(index)?.action(),
        Target::Menu(i) => Action::PageWord(menu.get(i)?.command.clone()),
    };
    Some(Input::Act(action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use rpnpad_core::grid::GridPosition;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn act(action: Action) -> Option<Input> {
        Some(Input::Act(action))
    }

    #[test]
    fn test_map_keys() {
        let pad = HardKeypad::default();
        assert_eq!(map_key(key(KeyCode::Char('7')), &pad), act(Action::Append("7".into())));
        assert_eq!(map_key(key(KeyCode::Char('.')), &pad), act(Action::Append(".".into())));
        assert_eq!(map_key(key(KeyCode::Char('e')), &pad), act(Action::Append("e".into())));
        assert_eq!(map_key(key(KeyCode::Char('+')), &pad), act(Action::Submit("+".into())));
        assert_eq!(map_key(key(KeyCode::Char('/')), &pad), act(Action::Submit("/".into())));
        assert_eq!(map_key(key(KeyCode::Enter), &pad), act(Action::Enter));
        assert_eq!(map_key(key(KeyCode::Delete), &pad), act(Action::Backspace));
        assert_eq!(map_key(key(KeyCode::Tab), &pad), act(Action::Tab));
        assert_eq!(map_key(key(KeyCode::Up), &pad), act(Action::HistoryPrevious));
        assert_eq!(map_key(key(KeyCode::F(3)), &pad), act(Action::Page(PageSwitch::Logic)));
        assert_eq!(map_key(key(KeyCode::F(5)), &pad), None);
        assert_eq!(map_key(key(KeyCode::Esc), &pad), Some(Input::Quit));
    }

    #[test]
    fn test_map_control_keys() {
        let pad = HardKeypad::default();
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl('c'), &pad), Some(Input::Quit));
        assert_eq!(map_key(ctrl('l'), &pad), act(Action::Clear));
        assert_eq!(map_key(ctrl('x'), &pad), None);
    }

    #[test]
    fn test_release_ignored() {
        let pad = HardKeypad::default();
        let mut ev = key(KeyCode::Char('1'));
        ev.kind = KeyEventKind::Release;
        assert_eq!(map_key(ev, &pad), None);
    }

    #[test]
    fn test_map_mouse() {
        let config = KeypadConfig::default();
        let pad = config.hard_keypad();
        let layout = KeypadLayout::compute(Rect::new(0, 0, 60, 34), &pad, &config.menu);
        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        let pos = GridPosition::new(1, 2).unwrap();
        let rect = layout.soft.iter().find(|(p, _)| *p == pos).unwrap().1;
        assert_eq!(
            map_mouse(click(rect.x, rect.y), &layout, &pad, &config.menu),
            act(Action::SoftKey(pos))
        );

        let (_, rect) = layout.menu[0];
        assert_eq!(
            map_mouse(click(rect.x, rect.y), &layout, &pad, &config.menu),
            act(Action::PageWord("stack-keys".into()))
        );

        let (_, _, rect) = layout.hard[0];
        assert_eq!(
            map_mouse(click(rect.x, rect.y), &layout, &pad, &config.menu),
            act(Action::Backspace)
        );

        let mut right = click(rect.x, rect.y);
        right.kind = MouseEventKind::Down(MouseButton::Right);
        assert_eq!(map_mouse(right, &layout, &pad, &config.menu), None);
    }
}
