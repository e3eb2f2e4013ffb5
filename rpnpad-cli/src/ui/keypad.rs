//! Keypad screen: layout, hit testing and drawing
//!
//! `KeypadLayout` is computed from the frame size alone so the same rects
//! serve both rendering and mouse clicks.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use rpnpad_core::config::MenuEntry;
use rpnpad_core::grid::{COLUMNS, GridPosition, ROWS};
use rpnpad_core::hardkeys::{HardKey, HardKeyKind, HardKeypad};
use rpnpad_core::keymap::KeymapPage;

use super::theme::{HardKeyTone, styles};

const ENTRY_HEIGHT: u16 = 3;
const SOFT_HEIGHT: u16 = ROWS as u16 + 2;

/// Something on screen a click can land on
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Soft(GridPosition),
    /// Row and index within the row of the hard keypad
    Hard { row: usize, index: usize },
    Menu(usize),
}

#[derive(Clone, Debug, Default)]
pub struct KeypadLayout {
    pub stack: Rect,
    pub entry: Rect,
    pub soft_block: Rect,
    pub soft: Vec<(GridPosition, Rect)>,
    pub hard_block: Rect,
    pub hard: Vec<(usize, usize, Rect)>,
    pub menu: Vec<(usize, Rect)>,
    pub status: Rect,
    pub hints: Rect,
}

impl KeypadLayout {
    pub fn compute(area: Rect, keypad: &HardKeypad, menu: &[MenuEntry]) -> Self {
        let hard_height = keypad.rows.len() as u16 + 2;
        let [stack, entry, soft_block, hard_block, menu_row, status, hints] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(ENTRY_HEIGHT),
            Constraint::Length(SOFT_HEIGHT),
            Constraint::Length(hard_height),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        Self {
            stack,
            entry,
            soft_block,
            soft: soft_cells(Block::bordered().inner(soft_block)),
            hard_block,
            hard: hard_cells(Block::bordered().inner(hard_block), keypad),
            menu: menu_cells(menu_row, menu),
            status,
            hints,
        }
    }

    /// What sits under the given cell, if anything
    pub fn hit(&self, column: u16, row: u16) -> Option<Target> {
        let at = Position::new(column, row);
        if let Some((pos, _)) = self.soft.iter().find(|(_, r)| r.contains(at)) {
            return Some(Target::Soft(*pos));
        }
        if let Some((row, index, _)) = self.hard.iter().find(|(_, _, r)| r.contains(at)) {
            return Some(Target::Hard {
                row: *row,
                index: *index,
            });
        }
        self.menu
            .iter()
            .find(|(_, r)| r.contains(at))
            .map(|(i, _)| Target::Menu(*i))
    }
}

fn soft_cells(inner: Rect) -> Vec<(GridPosition, Rect)> {
    let rows = Layout::vertical((0..ROWS).map(|_| Constraint::Ratio(1, ROWS as u32))).split(inner);
    let mut cells = Vec::new();
    for (r, row_rect) in rows.iter().enumerate() {
        let columns = Layout::horizontal((0..COLUMNS).map(|_| Constraint::Ratio(1, COLUMNS as u32)))
            .split(*row_rect);
        for (c, cell) in columns.iter().enumerate() {
            if let Ok(pos) = GridPosition::new(c as u32 + 1, r as u32 + 1) {
                cells.push((pos, *cell));
            }
        }
    }
    cells
}

fn hard_cells(inner: Rect, keypad: &HardKeypad) -> Vec<(usize, usize, Rect)> {
    if keypad.rows.is_empty() {
        return Vec::new();
    }
    let rows = Layout::vertical(keypad.rows.iter().map(|_| Constraint::Length(1))).split(inner);
    let mut cells = Vec::new();
    for (r, (keys, row_rect)) in keypad.rows.iter().zip(rows.iter()).enumerate() {
        let total: u32 = keys.iter().map(|k| k.span.max(1) as u32).sum();
        let widths = Layout::horizontal(
            keys.iter()
                .map(|k| Constraint::Ratio(k.span.max(1) as u32, total.max(1))),
        )
        .split(*row_rect);
        for (i, cell) in widths.iter().enumerate() {
            cells.push((r, i, *cell));
        }
    }
    cells
}

fn menu_cells(row: Rect, menu: &[MenuEntry]) -> Vec<(usize, Rect)> {
    let mut cells = Vec::new();
    let mut x = row.x;
    for (i, entry) in menu.iter().enumerate() {
        let width = entry.label.chars().count() as u16 + 2;
        if x + width > row.right() {
            break;
        }
        cells.push((i, Rect::new(x, row.y, width, row.height)));
        x += width + 1;
    }
    cells
}

fn tone(key: &HardKey) -> HardKeyTone {
    match key.kind {
        HardKeyKind::Literal => HardKeyTone::Digit,
        HardKeyKind::Page(_) => HardKeyTone::Page,
        HardKeyKind::Command(_) | HardKeyKind::Enter | HardKeyKind::Backspace => {
            HardKeyTone::Operator
        }
    }
}

/// Everything the screen shows, copied out of the controller for one frame
pub struct Screen<'a> {
    pub stack_lines: Vec<&'a str>,
    pub entry: &'a str,
    pub status: &'a str,
    pub page: &'a KeymapPage,
    pub keypad: &'a HardKeypad,
    pub menu: &'a [MenuEntry],
    pub busy: bool,
}

pub fn draw(f: &mut Frame, layout: &KeypadLayout, screen: &Screen) {
    f.render_widget(Block::default().style(styles::screen()), f.area());

    // Stack: keep the top of the tape (last line) in view
    let stack_block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border())
        .title(" Stack ");
    let visible = stack_block.inner(layout.stack).height as usize;
    let skip = screen.stack_lines.len().saturating_sub(visible);
    let lines: Vec<Line> = screen.stack_lines[skip..]
        .iter()
        .map(|l| Line::styled(l.to_string(), styles::stack()))
        .collect();
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Right)
            .block(stack_block),
        layout.stack,
    );

    let entry_title = if screen.busy { " Entry (busy) " } else { " Entry " };
    f.render_widget(
        Paragraph::new(Line::styled(format!("{}▏", screen.entry), styles::entry())).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border())
                .title(entry_title),
        ),
        layout.entry,
    );

    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border())
            .title(Line::from(vec![
                Span::raw(" Keys: "),
                Span::styled(screen.page.name.clone(), styles::page()),
                Span::raw(" "),
            ])),
        layout.soft_block,
    );
    for (pos, rect) in &layout.soft {
        let binding = screen.page.get(*pos);
        let text = if binding.is_blank() { "·" } else { binding.label.as_str() };
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(styles::soft_key(binding.is_assigned())),
            *rect,
        );
    }

    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border()),
        layout.hard_block,
    );
    for (row, index, rect) in &layout.hard {
        if let Some(key) = screen.keypad.rows.get(*row).and_then(|r| r.get(*index)) {
            f.render_widget(
                Paragraph::new(format!("[{}]", key.label))
                    .alignment(Alignment::Center)
                    .style(styles::hard_key(tone(key))),
                *rect,
            );
        }
    }

    for (i, rect) in &layout.menu {
        if let Some(entry) = screen.menu.get(*i) {
            f.render_widget(
                Paragraph::new(format!(" {} ", entry.label)).style(styles::key_hint()),
                *rect,
            );
        }
    }

    f.render_widget(
        Paragraph::new(screen.status).style(styles::status(screen.status)),
        layout.status,
    );
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("F1-F4", styles::key_hint()),
            Span::styled(" pages  ", styles::text_dim()),
            Span::styled("Tab", styles::key_hint()),
            Span::styled(" swap  ", styles::text_dim()),
            Span::styled("^L", styles::key_hint()),
            Span::styled(" clear  ", styles::text_dim()),
            Span::styled("Esc", styles::key_hint()),
            Span::styled(" quit", styles::text_dim()),
        ])),
        layout.hints,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpnpad_core::config::KeypadConfig;

    fn layout() -> KeypadLayout {
        let config = KeypadConfig::default();
        KeypadLayout::compute(Rect::new(0, 0, 60, 34), &config.hard_keypad(), &config.menu)
    }

    #[test]
    fn test_every_soft_key_has_a_cell() {
        let layout = layout();
        assert_eq!(layout.soft.len(), 44);
        for (pos, rect) in &layout.soft {
            assert!(rect.width > 0 && rect.height > 0, "{pos}");
            assert!(layout.soft_block.contains(Position::new(rect.x, rect.y)));
        }
    }

    #[test]
    fn test_hit_soft_key() {
        let layout = layout();
        let target = GridPosition::new(3, 7).unwrap();
        let rect = layout.soft.iter().find(|(p, _)| *p == target).unwrap().1;
        assert_eq!(layout.hit(rect.x + rect.width / 2, rect.y), Some(Target::Soft(target)));
    }

    #[test]
    fn test_hit_hard_key_and_menu() {
        let layout = layout();
        let pad = HardKeypad::default();
        let (row, index, rect) = layout.hard[0];
        assert_eq!(pad.rows[row][index].label, "⌫");
        assert_eq!(layout.hit(rect.x, rect.y), Some(Target::Hard { row: 0, index: 0 }));

        let (i, rect) = layout.menu[1];
        assert_eq!(layout.hit(rect.x + 1, rect.y), Some(Target::Menu(i)));
        assert_eq!(layout.hit(layout.status.x, layout.status.y), None);
    }

    #[test]
    fn test_spans_widen_hard_keys() {
        let layout = layout();
        let last_row: Vec<Rect> = layout
            .hard
            .iter()
            .filter(|(row, _, _)| *row == 3)
            .map(|(_, _, r)| *r)
            .collect();
        // ". 0 ± + ENTER" with ENTER four units wide
        assert_eq!(last_row.len(), 5);
        assert!(last_row[4].width >= 3 * last_row[0].width);
    }
}
