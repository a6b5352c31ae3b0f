use askama::Template;

use crate::config::TABLE_ELEMENT_ID;
use crate::templates::UserTableTemplate;
use super::{RenderTarget, Row};

/// In-memory HTML table; cells are escaped when rendered.
#[derive(Debug, Clone)]
pub struct HtmlTable {
    element_id: String,
    rows: Vec<Row>,
}

impl HtmlTable {
    /// A `user-list` table holding only the header row.
    pub fn new() -> Self {
        Self::with_header(TABLE_ELEMENT_ID, Row::header())
    }

    pub fn with_header(element_id: impl Into<String>, header: Row) -> Self {
        Self {
            element_id: element_id.into(),
            rows: vec![header],
        }
    }

    /// A table with no rows at all, not even a header.
    pub fn empty(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn to_html(&self) -> Result<String, askama::Error> {
        let (header, body) = match self.rows.split_first() {
            Some((h, b)) => (Some(h), b),
            None => (None, &[][..]),
        };
        UserTableTemplate {
            element_id: &self.element_id,
            header,
            body,
        }
        .render()
    }
}

impl Default for HtmlTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for HtmlTable {
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
