//! Headless terminal
//!
//! An in-memory terminal grid for running the shell without a browser.
//! It understands the subset of VT100 the editor and the programs emit:
//! - printable characters with autowrap (xterm-style pending wrap: the
//!   cursor parks at `x == cols` until the next character)
//! - CR, LF (scrolling into scrollback at the bottom row), BS
//! - CSI `H` (absolute position), `J`/`K` (erase), `A`/`B`/`C`/`D`
//!   (relative moves), `?25h`/`?25l` (cursor visibility); SGR and anything
//!   else is swallowed
//!
//! Time does not pass on its own: `sleep` schedules on a [`TimerQueue`] and
//! [`HeadlessTerminal::advance`] moves the clock.

use super::{CursorReport, TermSize, TerminalHost, TimerId, TimerQueue};
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Escape sequence parser state
#[derive(Debug, Clone)]
enum Parse {
    Ground,
    Escape,
    Csi(String),
}

/// The character grid: scrollback followed by the screen
#[derive(Debug)]
struct Grid {
    cols: usize,
    rows: usize,
    /// Every line ever scrolled into view; the screen is the last `rows`
    lines: Vec<Vec<char>>,
    /// Index in `lines` of the top screen row
    ybase: usize,
    /// Index in `lines` of the top visible row
    viewport_y: usize,
    x: usize,
    y: usize,
    cursor_visible: bool,
    parse: Parse,
}

impl Grid {
    fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            lines: vec![vec![' '; cols]; rows],
            ybase: 0,
            viewport_y: 0,
            x: 0,
            y: 0,
            cursor_visible: true,
            parse: Parse::Ground,
        }
    }

    fn blank(&self) -> Vec<char> {
        vec![' '; self.cols]
    }

    fn feed(&mut self, c: char) {
        match std::mem::replace(&mut self.parse, Parse::Ground) {
            Parse::Ground => match c {
                '\x1b' => self.parse = Parse::Escape,
                '\r' => self.x = 0,
                '\n' => self.line_feed(),
                '\x08' => self.x = self.x.min(self.cols - 1).saturating_sub(1),
                c if c.is_control() => {}
                c => self.print(c),
            },
            Parse::Escape => {
                if c == '[' {
                    self.parse = Parse::Csi(String::new());
                }
            }
            Parse::Csi(mut params) => {
                if ('\x40'..='\x7e').contains(&c) {
                    self.dispatch_csi(&params, c);
                } else {
                    params.push(c);
                    self.parse = Parse::Csi(params);
                }
            }
        }
    }

    fn print(&mut self, c: char) {
        if self.x >= self.cols {
            self.x = 0;
            self.line_feed();
        }
        let row = self.ybase + self.y;
        self.lines[row][self.x] = c;
        self.x += 1;
    }

    fn line_feed(&mut self) {
        if self.x >= self.cols {
            self.x = self.cols - 1;
        }
        if self.y + 1 >= self.rows {
            let blank = self.blank();
            self.lines.push(blank);
            self.ybase += 1;
            self.viewport_y = self.ybase;
        } else {
            self.y += 1;
        }
    }

    fn dispatch_csi(&mut self, params: &str, action: char) {
        if let Some(private) = params.strip_prefix('?') {
            if private == "25" {
                match action {
                    'h' => self.cursor_visible = true,
                    'l' => self.cursor_visible = false,
                    _ => {}
                }
            }
            return;
        }

        let args: Vec<usize> = params
            .split(';')
            .map(|p| p.parse().unwrap_or(0))
            .collect();
        let arg = |i: usize, default: usize| match args.get(i) {
            Some(0) | None => default,
            Some(&n) => n,
        };
        let mode = args.first().copied().unwrap_or(0);

        match action {
            'H' | 'f' => {
                self.y = arg(0, 1).min(self.rows) - 1;
                self.x = arg(1, 1).min(self.cols) - 1;
            }
            'A' => self.y = self.y.saturating_sub(arg(0, 1)),
            'B' => self.y = (self.y + arg(0, 1)).min(self.rows - 1),
            'C' => self.x = (self.x + arg(0, 1)).min(self.cols - 1),
            'D' => self.x = self.x.min(self.cols - 1).saturating_sub(arg(0, 1)),
            'J' => self.erase_display(mode),
            'K' => self.erase_line(mode),
            _ => {}
        }
    }

    fn erase_display(&mut self, mode: usize) {
        let cursor_row = self.ybase + self.y;
        let screen = self.ybase..self.ybase + self.rows;
        match mode {
            0 => {
                self.erase_line(0);
                for row in cursor_row + 1..screen.end {
                    self.lines[row] = self.blank();
                }
            }
            1 => {
                for row in screen.start..cursor_row {
                    self.lines[row] = self.blank();
                }
                self.erase_line(1);
            }
            _ => {
                for row in screen {
                    self.lines[row] = self.blank();
                }
            }
        }
    }

    fn erase_line(&mut self, mode: usize) {
        let x = self.x.min(self.cols - 1);
        let line = &mut self.lines[self.ybase + self.y];
        let range = match mode {
            0 => x..line.len(),
            1 => 0..x + 1,
            _ => 0..line.len(),
        };
        for cell in &mut line[range] {
            *cell = ' ';
        }
    }

    fn clear(&mut self) {
        let current = self.lines[self.ybase + self.y].clone();
        self.lines = vec![self.blank(); self.rows];
        self.lines[0] = current;
        self.ybase = 0;
        self.viewport_y = 0;
        self.y = 0;
    }

    fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        for line in &mut self.lines {
            line.resize(cols, ' ');
        }
        self.cols = cols;
        self.x = self.x.min(cols);

        if rows < self.rows {
            // Keep the cursor row on screen by pushing the top into scrollback
            let shift = (self.y + 1).saturating_sub(rows);
            self.ybase += shift;
            self.y -= shift;
            self.lines.truncate(self.ybase + rows);
        } else {
            let blank = self.blank();
            self.lines.resize(self.ybase + rows, blank);
        }
        self.rows = rows;
        self.viewport_y = self.ybase;
    }

    fn render_line(line: &[char]) -> String {
        line.iter().collect::<String>().trim_end().to_string()
    }
}

/// Cancels its timer when a sleep is dropped before the clock reaches it
#[derive(Debug)]
struct SleepGuard {
    timers: Weak<RefCell<TimerQueue>>,
    id: TimerId,
}

impl Drop for SleepGuard {
    fn drop(&mut self) {
        if let Some(timers) = self.timers.upgrade() {
            timers.borrow_mut().cancel(self.id);
        }
    }
}

/// Terminal host that keeps everything in memory
#[derive(Debug)]
pub struct HeadlessTerminal {
    grid: RefCell<Grid>,
    timers: Rc<RefCell<TimerQueue>>,
    now: Cell<u64>,
    /// Every byte written, in order
    transcript: RefCell<String>,
    focused: Cell<bool>,
}

impl HeadlessTerminal {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            grid: RefCell::new(Grid::new(cols, rows)),
            timers: Rc::new(RefCell::new(TimerQueue::new())),
            now: Cell::new(0),
            transcript: RefCell::new(String::new()),
            focused: Cell::new(true),
        }
    }

    /// Visible rows, right-trimmed
    pub fn screen(&self) -> Vec<String> {
        let grid = self.grid.borrow();
        grid.lines[grid.viewport_y..grid.viewport_y + grid.rows]
            .iter()
            .map(|line| Grid::render_line(line))
            .collect()
    }

    /// A row by absolute index (scrollback included), right-trimmed
    pub fn line(&self, row: usize) -> Option<String> {
        let grid = self.grid.borrow();
        grid.lines.get(row).map(|line| Grid::render_line(line))
    }

    /// Total rows held, scrollback plus screen
    pub fn line_count(&self) -> usize {
        self.grid.borrow().lines.len()
    }

    pub fn cursor_visible(&self) -> bool {
        self.grid.borrow().cursor_visible
    }

    /// Everything written so far
    pub fn transcript(&self) -> String {
        self.transcript.borrow().clone()
    }

    /// Drain the transcript
    pub fn take_transcript(&self) -> String {
        std::mem::take(&mut *self.transcript.borrow_mut())
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    pub fn focus(&self) {
        self.focused.set(true);
    }

    /// Change dimensions. Lines are padded or truncated, not reflowed.
    pub fn resize(&self, cols: usize, rows: usize) {
        self.grid.borrow_mut().resize(cols, rows);
    }

    /// Current clock, in milliseconds
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Move the clock forward, firing due sleeps. Returns how many fired.
    pub fn advance(&self, ms: u64) -> usize {
        let now = self.now.get() + ms;
        self.now.set(now);
        self.timers.borrow_mut().tick(now)
    }

    /// Number of sleeps waiting on the clock
    pub fn pending_sleeps(&self) -> usize {
        self.timers.borrow().pending_count()
    }
}

impl TerminalHost for HeadlessTerminal {
    fn write(&self, data: &str) -> LocalBoxFuture<'static, ()> {
        self.transcript.borrow_mut().push_str(data);
        let mut grid = self.grid.borrow_mut();
        for c in data.chars() {
            grid.feed(c);
        }
        future::ready(()).boxed_local()
    }

    fn clear(&self) {
        self.grid.borrow_mut().clear();
    }

    fn cursor(&self) -> CursorReport {
        let grid = self.grid.borrow();
        CursorReport {
            x: grid.x,
            y: grid.y,
            viewport_y: grid.viewport_y,
        }
    }

    fn size(&self) -> TermSize {
        let grid = self.grid.borrow();
        TermSize {
            cols: grid.cols,
            rows: grid.rows,
        }
    }

    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        let (id, rx) = self.timers.borrow_mut().schedule(ms.into(), self.now.get());
        let guard = SleepGuard {
            timers: Rc::downgrade(&self.timers),
            id,
        };
        async move {
            let _guard = guard;
            let _ = rx.await;
        }
        .boxed_local()
    }

    fn blur(&self) {
        self.focused.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(term: &HeadlessTerminal, data: &str) {
        // Headless writes complete synchronously
        drop(term.write(data));
    }

    #[test]
    fn test_plain_text_and_crlf() {
        let term = HeadlessTerminal::new(20, 5);
        write(&term, "hello\r\nworld");
        assert_eq!(term.screen()[0], "hello");
        assert_eq!(term.screen()[1], "world");
        assert_eq!(term.cursor(), CursorReport { x: 5, y: 1, viewport_y: 0 });
    }

    #[test]
    fn test_pending_wrap_at_last_column() {
        let term = HeadlessTerminal::new(4, 3);
        write(&term, "abcd");
        // Parked past the last column until the next character
        assert_eq!(term.cursor().x, 4);
        assert_eq!(term.cursor().y, 0);

        write(&term, "e");
        assert_eq!(term.screen()[0], "abcd");
        assert_eq!(term.screen()[1], "e");
        assert_eq!(term.cursor(), CursorReport { x: 1, y: 1, viewport_y: 0 });
    }

    #[test]
    fn test_line_feed_scrolls_at_bottom() {
        let term = HeadlessTerminal::new(10, 2);
        write(&term, "one\r\ntwo\r\nthree");
        assert_eq!(term.screen(), vec!["two", "three"]);
        assert_eq!(term.cursor().viewport_y, 1);
        assert_eq!(term.line(0).as_deref(), Some("one"));
        assert_eq!(term.line_count(), 3);
    }

    #[test]
    fn test_line_feed_keeps_column() {
        let term = HeadlessTerminal::new(10, 3);
        write(&term, "abc\n");
        assert_eq!(term.cursor(), CursorReport { x: 3, y: 1, viewport_y: 0 });
    }

    #[test]
    fn test_cursor_position_and_erase_below() {
        let term = HeadlessTerminal::new(10, 3);
        write(&term, "aaaaa\r\nbbbbb\r\nccccc");
        write(&term, "\x1b[2;3H\x1b[0J");
        assert_eq!(term.screen(), vec!["aaaaa", "bb", ""]);
        assert_eq!(term.cursor(), CursorReport { x: 2, y: 1, viewport_y: 0 });
    }

    #[test]
    fn test_erase_line_and_relative_moves() {
        let term = HeadlessTerminal::new(10, 3);
        write(&term, "abcdef\x1b[3D");
        assert_eq!(term.cursor().x, 3);
        write(&term, "\x1b[2K");
        assert_eq!(term.screen()[0], "");
    }

    #[test]
    fn test_cursor_visibility_and_sgr() {
        let term = HeadlessTerminal::new(10, 3);
        write(&term, "\x1b[?25l\x1b[92mhi\x1b[0m");
        assert!(!term.cursor_visible());
        assert_eq!(term.screen()[0], "hi");
        write(&term, "\x1b[?25h");
        assert!(term.cursor_visible());
    }

    #[test]
    fn test_clear_keeps_cursor_line() {
        let term = HeadlessTerminal::new(10, 2);
        write(&term, "one\r\ntwo\r\n$ ");
        term.clear();
        assert_eq!(term.screen(), vec!["$", ""]);
        assert_eq!(term.cursor(), CursorReport { x: 2, y: 0, viewport_y: 0 });
        assert_eq!(term.line_count(), 2);
    }

    #[test]
    fn test_resize_keeps_cursor_on_screen() {
        let term = HeadlessTerminal::new(10, 4);
        write(&term, "a\r\nb\r\nc\r\nd");
        term.resize(10, 2);
        assert_eq!(term.screen(), vec!["c", "d"]);
        assert_eq!(term.cursor().y, 1);
        assert_eq!(term.size(), TermSize { cols: 10, rows: 2 });
    }

    #[test]
    fn test_sleep_waits_for_clock() {
        let term = HeadlessTerminal::new(10, 2);
        let mut sleep = term.sleep(100);
        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);

        assert!(sleep.poll_unpin(&mut cx).is_pending());
        assert_eq!(term.pending_sleeps(), 1);
        assert_eq!(term.advance(99), 0);
        assert!(sleep.poll_unpin(&mut cx).is_pending());
        assert_eq!(term.advance(1), 1);
        assert!(sleep.poll_unpin(&mut cx).is_ready());
    }

    #[test]
    fn test_dropped_sleep_cancels_timer() {
        let term = HeadlessTerminal::new(10, 2);
        let sleep = term.sleep(100);
        assert_eq!(term.pending_sleeps(), 1);
        drop(sleep);
        assert_eq!(term.pending_sleeps(), 0);
        assert_eq!(term.advance(100), 0);
    }

    #[test]
    fn test_blur_releases_focus() {
        let term = HeadlessTerminal::new(10, 2);
        assert!(term.is_focused());
        term.blur();
        assert!(!term.is_focused());
        term.focus();
        assert!(term.is_focused());
    }
}
