//! Live table rendering.
//!
//! A [`LiveTable`] owns a handle to a [`RenderTarget`] and mirrors the most
//! recently applied [`Snapshot`] onto it: every row except the header at
//! index 0 is removed, then one row per record is appended in snapshot order.
//!
//! Two surfaces are provided: [`HtmlTable`] (escaped HTML, used for the page
//! served at `/`) and [`TerminalTable`] (comfy-table, used by `userfeed watch`).

mod html_table;
mod terminal_table;

pub use html_table::HtmlTable;
pub use terminal_table::TerminalTable;

use crate::error::FeedError;
use crate::models::{Snapshot, UserRecord};

/// Text shown instead of a password when masking is enabled.
pub const PASSWORD_MASK: &str = "********";

/// Column titles of the header row.
pub const HEADER_CELLS: [&str; 2] = ["Email", "Password"];

/// A single table row; cell text is stored raw and escaped by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    pub fn header() -> Self {
        Self::new(HEADER_CELLS)
    }

    pub fn from_record(record: &UserRecord, options: &RenderOptions) -> Self {
        let password = if options.mask_passwords {
            PASSWORD_MASK.to_string()
        } else {
            record.password.clone()
        };
        Self::new([record.email.clone(), password])
    }

    pub fn contains(&self, text: &str) -> bool {
        self.cells.iter().any(|c| c.contains(text))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub mask_passwords: bool,
}

/// A mutable display surface made of rows, with a header at index 0.
pub trait RenderTarget {
    /// Number of rows, header included.
    fn row_count(&self) -> usize;

    /// Remove the row at `index`. Callers never pass 0.
    fn delete_row(&mut self, index: usize);

    /// Append a row after the last one.
    fn append_row(&mut self, row: Row);
}

/// Keeps a render target in sync with the latest snapshot.
pub struct LiveTable<T> {
    target: T,
    options: RenderOptions,
    applied: u64,
}

impl<T: RenderTarget> LiveTable<T> {
    /// Wrap a target that already holds its header row.
    pub fn new(target: T, options: RenderOptions) -> Result<Self, FeedError> {
        if target.row_count() == 0 {
            return Err(FeedError::MissingHeader);
        }
        Ok(Self {
            target,
            options,
            applied: 0,
        })
    }

    /// Decode a wire payload and render it. A malformed payload leaves the
    /// target untouched.
    pub fn apply_payload(&mut self, payload: &str) -> Result<usize, FeedError> {
        let snapshot = Snapshot::parse(payload)?;
        self.render(&snapshot)
    }

    /// Replace every body row with one row per record. Returns the number of
    /// body rows now on the target.
    pub fn render(&mut self, snapshot: &Snapshot) -> Result<usize, FeedError> {
        if self.target.row_count() == 0 {
            return Err(FeedError::MissingHeader);
        }
        while self.target.row_count() > 1 {
            self.target.delete_row(1);
        }
        for record in snapshot.iter() {
            self.target.append_row(Row::from_record(record, &self.options));
        }
        self.applied += 1;
        tracing::debug!(rows = snapshot.len(), applied = self.applied, "rendered snapshot");
        Ok(snapshot.len())
    }

    /// Number of snapshots rendered so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }
}
