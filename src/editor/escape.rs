//! Cursor-control escape sequences
//!
//! The editor never moves the cursor relatively. Every patch names an
//! absolute cell computed from where the input line starts (the origin)
//! and the logical offset into the line, so a patch is correct no matter
//! where the terminal left the cursor.

use crate::platform::{CursorReport, TermSize};

/// Erase from the cursor to the end of the screen
pub const ERASE_BELOW: &str = "\x1b[0J";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const CRLF: &str = "\r\n";

/// Absolute cell (scrollback included) where the input line begins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorOrigin {
    pub row: usize,
    pub col: usize,
}

impl CursorOrigin {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Derive the origin from the live cursor.
    ///
    /// A cursor parked past the last column (pending wrap) belongs to the
    /// start of the next row: that is where the next character will land.
    pub fn from_report(report: CursorReport, cols: usize) -> Self {
        let mut row = report.y + report.viewport_y;
        let mut col = report.x;
        if col >= cols.max(1) {
            row += 1;
            col = 0;
        }
        Self { row, col }
    }
}

/// Terminal geometry at the moment a patch is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub cols: usize,
    pub rows: usize,
    /// Absolute row shown at the top of the viewport
    pub scroll: usize,
}

impl Viewport {
    pub fn new(size: TermSize, scroll: usize) -> Self {
        Self {
            cols: size.cols.max(1),
            rows: size.rows.max(1),
            scroll,
        }
    }

    /// The viewport once the cursor has reached `offset` characters into
    /// the line at `origin`, by writing text or by [`cursor_escape`].
    /// Reaching a row below the screen scrolls it up to that row.
    pub fn follow(self, origin: CursorOrigin, offset: usize) -> Self {
        let row = origin.row + (origin.col + offset) / self.cols;
        let bottom = self.scroll + self.rows - 1;
        if row > bottom {
            Self {
                scroll: row + 1 - self.rows,
                ..self
            }
        } else {
            self
        }
    }
}

/// `ESC[{row};{col}H`, 1-based
pub fn position(row: usize, col: usize) -> String {
    format!("\x1b[{};{}H", row, col)
}

/// Escape that puts the cursor on `offset` characters into the input line.
///
/// The offset wraps across as many physical rows as it needs. A target one
/// row below the viewport cannot be addressed directly, so the cursor is
/// parked on the last row and a newline scrolls the screen; targets further
/// down get one newline per row. Targets above the viewport clamp to row 1.
pub fn cursor_escape(origin: CursorOrigin, offset: usize, view: Viewport) -> String {
    let cols = view.cols.max(1);
    let col = origin.col + offset;
    let row = origin.row + col / cols;
    let col = col % cols;

    let Some(row) = row.checked_sub(view.scroll) else {
        return position(1, col + 1);
    };

    if row >= view.rows {
        let overflow = row - view.rows + 1;
        format!("{}{}", position(view.rows, col + 1), "\n".repeat(overflow))
    } else {
        position(row + 1, col + 1)
    }
}
