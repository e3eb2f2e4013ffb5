use std::collections::BTreeMap;

use rpnpad_core::config::KeypadConfig;
use rpnpad_core::grid::{COLUMNS, GridPosition, ROWS};
use rpnpad_core::keymap::KeymapPage;
use rpnpad_core::pages::PageSwitch;

const CELL_WIDTH: usize = 10;

pub fn run_pages(config: &KeypadConfig, word: Option<&str>, json: bool) -> Result<(), String> {
    let pages = select(config.pages(), word)?;

    if json {
        let listing: Vec<serde_json::Value> = pages
            .iter()
            .map(|(word, page)| {
                serde_json::json!({
                    "word": word,
                    "name": page.name,
                    "keys": page.assigned().collect::<Vec<_>>(),
                })
            })
            .collect();
        let out = serde_json::to_string_pretty(&listing).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    for (i, (word, page)) in pages.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} ({}, {} keys)", page.name, word, page.assigned().count());
        print!("{}", render_grid(page));
    }
    Ok(())
}

/// One page, or all of them when `word` is `None`
fn select(
    mut pages: BTreeMap<String, KeymapPage>,
    word: Option<&str>,
) -> Result<BTreeMap<String, KeymapPage>, String> {
    let Some(word) = word else {
        return Ok(pages);
    };

    // Accept "math" as well as "math-keys"
    let key = match PageSwitch::from_name(word) {
        Some(page) if !pages.contains_key(word) => page.command().to_string(),
        _ => word.to_string(),
    };

    match pages.remove_entry(&key) {
        Some((key, page)) => Ok(BTreeMap::from([(key, page)])),
        None => Err(format!(
            "Unknown page: {word}\nKnown pages: {}",
            pages.keys().cloned().collect::<Vec<_>>().join(", ")
        )),
    }
}

/// Rows top to bottom, columns left to right; blank keys show as dots
pub fn render_grid(page: &KeymapPage) -> String {
    let mut out = String::new();
    for row in 1..=ROWS as u32 {
        let cells: Vec<String> = (1..=COLUMNS as u32)
            .filter_map(|column| GridPosition::new(column, row).ok())
            .map(|pos| {
                let binding = page.get(pos);
                let label = if binding.is_blank() { "·" } else { binding.label.as_str() };
                format!("{:<width$}", clip(label), width = CELL_WIDTH)
            })
            .collect();
        out.push_str(&format!("{:>3} {}\n", row, cells.join(" ").trim_end()));
    }
    out
}

fn clip(label: &str) -> String {
    if label.chars().count() <= CELL_WIDTH {
        label.to_string()
    } else {
        let mut clipped: String = label.chars().take(CELL_WIDTH - 1).collect();
        clipped.push('~');
        clipped
    }
}
