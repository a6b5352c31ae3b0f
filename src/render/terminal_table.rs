use std::fmt;

use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};

use super::{RenderTarget, Row};

/// Row buffer printed as a comfy-table in the terminal.
#[derive(Debug, Clone)]
pub struct TerminalTable {
    rows: Vec<Row>,
}

impl TerminalTable {
    pub fn new() -> Self {
        Self {
            rows: vec![Row::header()],
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if let Some((Width(w), _)) = terminal_size() {
            table.set_width(w.saturating_sub(4));
        }
        if let Some((header, body)) = self.rows.split_first() {
            table.set_header(sanitize_cells(header));
            for row in body {
                table.add_row(sanitize_cells(row));
            }
        }
        table
    }
}

impl Default for TerminalTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for TerminalTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn delete_row(&mut self, index: usize) {
        if index > 0 && index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    fn append_row(&mut self, row: Row) {
        self.rows.push(row);
    }
}

impl fmt::Display for TerminalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

fn sanitize_cells(row: &Row) -> Vec<String> {
    row.cells.iter().map(|c| sanitize_terminal_text(c)).collect()
}

/// Drop control characters so untrusted text cannot move the cursor or
/// inject escape sequences.
fn sanitize_terminal_text(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_escape_sequences() {
        assert_eq!(sanitize_terminal_text("a\u{1b}[31mb\n"), "a[31mb");
    }

    #[test]
    fn prints_body_rows() {
        let mut table = TerminalTable::new();
        table.append_row(Row::new(["a@x.com", "p1"]));
        let out = table.to_string();
        assert!(out.contains("Email"));
        assert!(out.contains("a@x.com"));
    }
}
