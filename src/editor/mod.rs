//! Line editor
//!
//! The editor is the shell's only way to touch the terminal. It offers three
//! suspension points to programs:
//! - [`LineEditor::write`]: print output, then re-anchor the input origin
//! - [`LineEditor::read_line`]: edit a line until Enter
//! - [`LineEditor::sleep`]: wait on the host clock
//!
//! and one entry point to the host, [`LineEditor::handle_input`], which
//! feeds raw `onData` chunks into the state machine and writes the
//! resulting patch.
//!
//! At most one read or sleep is outstanding. Ctrl+C rejects it with
//! [`IoError::Killed`]; with nothing outstanding, the next suspension point
//! is rejected instead so an interrupt is never lost between two awaits.

mod cancel;
mod error;
pub mod escape;
pub mod history;
pub mod input;
pub mod state;

pub use cancel::Cancellable;
pub use error::{IoError, IoResult};
pub use escape::{CursorOrigin, Viewport};
pub use history::History;
pub use input::Key;
pub use state::{EditBuffer, EditorState, Effect, Submission};

use crate::console_log;
use crate::platform::TerminalHost;
use escape::SHOW_CURSOR;
use futures::channel::oneshot;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// Options for one [`LineEditor::read_line`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Record the line and allow Up/Down navigation
    pub save_history: bool,
    /// Echo `*` instead of the typed characters
    pub hide_input: bool,
}

impl ReadOptions {
    /// A command prompt: history on, input visible
    pub fn history() -> Self {
        Self {
            save_history: true,
            hide_input: false,
        }
    }

    /// A password prompt: history off, input masked
    pub fn hidden() -> Self {
        Self {
            save_history: false,
            hide_input: true,
        }
    }
}

/// Handle to the editor. Clones share the same state and host.
#[derive(Clone)]
pub struct LineEditor {
    host: Rc<dyn TerminalHost>,
    state: Rc<RefCell<EditorState>>,
}

impl LineEditor {
    pub fn new(host: Rc<dyn TerminalHost>) -> Self {
        Self::with_state(host, EditorState::new())
    }

    pub fn with_state(host: Rc<dyn TerminalHost>, state: EditorState) -> Self {
        let editor = Self {
            host,
            state: Rc::new(RefCell::new(state)),
        };
        editor.sync_origin();
        editor
    }

    pub fn host(&self) -> &Rc<dyn TerminalHost> {
        &self.host
    }

    /// Borrow the state for inspection. Do not hold across an `.await`.
    pub fn state(&self) -> Ref<'_, EditorState> {
        self.state.borrow()
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.host.size(), self.host.cursor().viewport_y)
    }

    fn sync_origin(&self) {
        let report = self.host.cursor();
        let size = self.host.size();
        self.state.borrow_mut().sync_origin(report, size);
    }

    /// Print `text`. The input line restarts wherever the output ends.
    pub async fn write(&self, text: &str) -> IoResult<()> {
        if self.state.borrow_mut().take_kill() {
            return Err(IoError::Killed);
        }
        self.host.write(text).await;
        self.sync_origin();
        Ok(())
    }

    /// Edit a line at the current origin until Enter.
    pub async fn read_line(&self, options: ReadOptions) -> IoResult<String> {
        let prologue = {
            let mut state = self.state.borrow_mut();
            state.check_ready()?;
            format!("{}{}", state.cursor_escape(0, self.viewport()), SHOW_CURSOR)
        };
        self.host.write(&prologue).await;

        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.borrow_mut();
            // An interrupt may have landed while the prologue was in flight
            state.check_ready()?;
            state.begin_edit(options, tx);
        }

        let submission = rx.await.map_err(|_| IoError::Closed)??;
        self.host.write(&submission.echo).await;
        self.sync_origin();
        Ok(submission.line)
    }

    /// Wait `ms` milliseconds unless interrupted.
    pub async fn sleep(&self, ms: u32) -> IoResult<()> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.borrow_mut();
            state.check_ready()?;
            state.begin_sleep(tx);
        }

        let result = Cancellable::new(self.host.sleep(ms), rx).await;
        self.state.borrow_mut().finish_sleep();
        result
    }

    /// Clear the terminal and re-anchor at the top.
    pub fn clear(&self) {
        self.host.clear();
        self.sync_origin();
    }

    /// Feed one raw input chunk from the terminal.
    pub fn handle_input(&self, data: &str) -> Effect {
        let key = Key::parse(data);
        let view = self.viewport();
        let effect = self.state.borrow_mut().handle_key(key, view);

        match &effect {
            // Issued immediately; completion is not needed for patches
            Effect::Render(patch) => drop(self.host.write(patch)),
            Effect::Release => self.host.blur(),
            Effect::KillDeferred => console_log!("[editor] interrupt with nothing pending, deferring"),
            _ => {}
        }
        effect
    }
}
