//! Editor state machine
//!
//! Everything the line editor knows lives in one [`EditorState`]: the edit
//! buffer, the history, where the input line starts on the grid, and the
//! single outstanding request. Key handling is synchronous and pure apart
//! from completing that request; it returns an [`Effect`] describing what
//! the caller must do to the terminal.

use super::escape::{self, CursorOrigin, Viewport, CRLF, ERASE_BELOW, HIDE_CURSOR};
use super::history::History;
use super::input::{sanitize, Key};
use super::{IoError, IoResult, ReadOptions};
use crate::console_log;
use crate::platform::{CursorReport, TermSize};
use futures::channel::oneshot;

/// Shown in place of each character of hidden input
pub const MASK_CHAR: char = '*';

/// The line being edited
///
/// Only sanitized single characters are ever inserted, so the text is
/// printable ASCII and character offsets are byte offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
    masked: bool,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    /// What the terminal shows for this buffer
    pub fn display(&self) -> String {
        if self.masked {
            std::iter::repeat_n(MASK_CHAR, self.text.len()).collect()
        } else {
            self.text.clone()
        }
    }

    /// Insert at the cursor and step past it
    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Delete left of the cursor. False at position 0.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.text.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Replace the whole line, cursor at the end
    pub fn replace(&mut self, text: String) {
        self.text = text;
        self.cursor = self.text.len();
    }

    /// Take the text out, leaving an empty buffer
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// A finished line plus the patch that ends it on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub line: String,
    pub echo: String,
}

/// The one outstanding suspension
#[derive(Debug)]
pub(crate) enum PendingRequest {
    ReadLine(oneshot::Sender<IoResult<Submission>>),
    Sleep(oneshot::Sender<IoError>),
}

impl PendingRequest {
    fn cancel(self, err: IoError) {
        // The waiter may already be gone; nothing to cancel then
        match self {
            PendingRequest::ReadLine(tx) => {
                let _ = tx.send(Err(err));
            }
            PendingRequest::Sleep(tx) => {
                let _ = tx.send(err);
            }
        }
    }

    /// The waiting future was dropped without finishing
    fn is_stale(&self) -> bool {
        match self {
            PendingRequest::ReadLine(tx) => tx.is_canceled(),
            PendingRequest::Sleep(tx) => tx.is_canceled(),
        }
    }
}

/// What the terminal must do after a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed
    None,
    /// Write this patch
    Render(String),
    /// The pending read received its line
    Submitted,
    /// The pending read or sleep was cancelled
    Killed,
    /// Nothing was pending; the next request will be rejected
    KillDeferred,
    /// Give up keyboard focus
    Release,
}

/// Buffer, history, origin and the pending request
#[derive(Debug, Default)]
pub struct EditorState {
    buffer: EditBuffer,
    history: History,
    origin: CursorOrigin,
    save_history: bool,
    pending: Option<PendingRequest>,
    kill_pending: bool,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: History) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn origin(&self) -> CursorOrigin {
        self.origin
    }

    /// A line read is waiting for Enter
    pub fn is_editing(&self) -> bool {
        matches!(self.pending, Some(PendingRequest::ReadLine(_)))
    }

    pub fn is_sleeping(&self) -> bool {
        matches!(self.pending, Some(PendingRequest::Sleep(_)))
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// An interrupt is waiting for the next request
    pub fn kill_pending(&self) -> bool {
        self.kill_pending
    }

    /// Re-anchor after output: the next input line starts at the cursor.
    pub fn sync_origin(&mut self, report: CursorReport, size: TermSize) {
        self.origin = CursorOrigin::from_report(report, size.cols);
        self.buffer.clear();
    }

    /// Escape to `offset` characters into the input line
    pub fn cursor_escape(&self, offset: usize, view: Viewport) -> String {
        escape::cursor_escape(self.origin, offset, view)
    }

    /// Repaint the whole line and put the cursor back
    pub fn redraw(&self, view: Viewport) -> String {
        let display = self.buffer.display();
        let mut out = self.cursor_escape(0, view);
        out.push_str(ERASE_BELOW);
        out.push_str(&display);
        // The repaint itself may have scrolled the screen
        let view = view.follow(self.origin, display.len().saturating_sub(1));
        out.push_str(&self.cursor_escape(self.buffer.cursor(), view));
        out
    }

    /// Consume a deferred interrupt
    pub(crate) fn take_kill(&mut self) -> bool {
        std::mem::take(&mut self.kill_pending)
    }

    /// Gate for starting a new request.
    pub(crate) fn check_ready(&mut self) -> IoResult<()> {
        if self.take_kill() {
            return Err(IoError::Killed);
        }
        match &self.pending {
            None => Ok(()),
            Some(request) if request.is_stale() => {
                console_log!("[editor] dropping abandoned request");
                self.pending = None;
                Ok(())
            }
            Some(_) => {
                console_log!("[editor] request rejected: one is already pending");
                Err(IoError::Busy)
            }
        }
    }

    pub(crate) fn begin_edit(
        &mut self,
        options: ReadOptions,
        done: oneshot::Sender<IoResult<Submission>>,
    ) {
        self.save_history = options.save_history;
        self.buffer.set_masked(options.hide_input);
        self.pending = Some(PendingRequest::ReadLine(done));
    }

    pub(crate) fn begin_sleep(&mut self, cancel: oneshot::Sender<IoError>) {
        self.pending = Some(PendingRequest::Sleep(cancel));
    }

    /// Forget a sleep whose future has completed
    pub(crate) fn finish_sleep(&mut self) {
        if matches!(&self.pending, Some(request @ PendingRequest::Sleep(_)) if request.is_stale()) {
            self.pending = None;
        }
    }

    /// Ctrl+C: cancel what is pending, or remember it for later
    pub fn interrupt(&mut self) -> Effect {
        match self.pending.take() {
            Some(request) => {
                request.cancel(IoError::Killed);
                Effect::Killed
            }
            None => {
                self.kill_pending = true;
                Effect::KillDeferred
            }
        }
    }

    /// Apply one key. Only interrupts do anything unless a line is being read.
    pub fn handle_key(&mut self, key: Key, view: Viewport) -> Effect {
        if key == Key::Interrupt {
            return self.interrupt();
        }
        if !self.is_editing() {
            return Effect::None;
        }

        match key {
            Key::Left => {
                if self.buffer.move_left() {
                    Effect::Render(self.cursor_escape(self.buffer.cursor(), view))
                } else {
                    Effect::None
                }
            }
            Key::Right => {
                if self.buffer.move_right() {
                    Effect::Render(self.cursor_escape(self.buffer.cursor(), view))
                } else {
                    Effect::None
                }
            }
            Key::Up => {
                if !self.save_history {
                    return Effect::None;
                }
                match self.history.previous(self.buffer.text()).map(str::to_owned) {
                    Some(entry) => {
                        self.buffer.replace(entry);
                        Effect::Render(self.redraw(view))
                    }
                    None => Effect::None,
                }
            }
            Key::Down => {
                if !self.save_history {
                    return Effect::None;
                }
                match self.history.next().map(str::to_owned) {
                    Some(entry) => {
                        self.buffer.replace(entry);
                        Effect::Render(self.redraw(view))
                    }
                    None => Effect::None,
                }
            }
            Key::Backspace => {
                if self.buffer.backspace() {
                    Effect::Render(self.redraw(view))
                } else {
                    Effect::None
                }
            }
            Key::Enter => self.submit(view),
            Key::Escape => Effect::Release,
            Key::Text(data) => {
                let clean = sanitize(&data);
                let mut chars = clean.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => {
                        self.buffer.insert(c);
                        Effect::Render(self.redraw(view))
                    }
                    // Pastes and bare control bytes are dropped
                    _ => Effect::None,
                }
            }
            Key::Interrupt => self.interrupt(),
        }
    }

    fn submit(&mut self, view: Viewport) -> Effect {
        let Some(PendingRequest::ReadLine(done)) = self.pending.take() else {
            return Effect::None;
        };

        if self.save_history {
            self.history.commit(self.buffer.text());
        }

        // Park on the last character, not past it, so a line that exactly
        // fills its row does not leave a blank row behind
        let end = self.buffer.len().saturating_sub(1);
        let echo = format!("{}{}{}", self.cursor_escape(end, view), CRLF, HIDE_CURSOR);
        let line = self.buffer.take();
        self.buffer.set_masked(false);

        match done.send(Ok(Submission { line, echo })) {
            Ok(()) => Effect::Submitted,
            // Reader is gone; still finish the line on screen
            Err(Ok(submission)) => Effect::Render(submission.echo),
            Err(Err(_)) => Effect::None,
        }
    }
}
