//! Integration tests for the shush shell
//!
//! Runs the real shell loop against the headless terminal. Input goes in
//! through `LineEditor::handle_input` exactly as xterm's `onData` would
//! deliver it, and the pool is drained after every chunk.

use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::{LocalPool, block_on};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use shush::editor::Effect;
use shush::platform::HeadlessTerminal;
use shush::{
    CursorReport, IoError, IoResult, LineEditor, ReadOptions, Shell, ShellConfig, TermSize,
    TerminalHost,
};
use std::cell::RefCell;
use std::rc::Rc;

const UP: &str = "\x1b[A";
const DOWN: &str = "\x1b[B";
const LEFT: &str = "\x1b[D";
const BACKSPACE: &str = "\x7f";
const CTRL_C: &str = "\x03";

struct Harness {
    term: Rc<HeadlessTerminal>,
    editor: LineEditor,
    pool: LocalPool,
}

impl Harness {
    /// A running shell with a `$ ` prompt and no banner
    fn new(cols: usize, rows: usize) -> Self {
        Self::with_config(
            cols,
            rows,
            ShellConfig {
                prompt: "$ ".into(),
                banner: Vec::new(),
                ..ShellConfig::default()
            },
        )
    }

    fn with_config(cols: usize, rows: usize, config: ShellConfig) -> Self {
        let term = Rc::new(HeadlessTerminal::new(cols, rows));
        let editor = LineEditor::new(term.clone());
        let shell = Shell::new(editor.clone(), config);

        let mut pool = LocalPool::new();
        pool.spawner()
            .spawn_local(async move { shell.run().await })
            .unwrap();
        pool.run_until_stalled();

        Self { term, editor, pool }
    }

    fn send(&mut self, data: &str) -> Effect {
        let effect = self.editor.handle_input(data);
        self.pool.run_until_stalled();
        effect
    }

    fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.send(&c.to_string());
        }
    }

    fn type_line(&mut self, line: &str) {
        self.type_str(line);
        self.send("\r");
    }

    fn advance(&mut self, ms: u64) {
        self.term.advance(ms);
        self.pool.run_until_stalled();
    }

    fn screen(&self) -> Vec<String> {
        self.term.screen()
    }

    fn buffer(&self) -> String {
        self.editor.state().buffer().text().to_string()
    }
}

// ============================================================================
// Line Editing
// ============================================================================

#[test]
fn test_prompt_is_shown() {
    let h = Harness::new(40, 10);
    assert_eq!(h.screen()[0], "$");
    assert_eq!(h.term.cursor().x, 2);
    assert!(h.term.cursor_visible());
    assert!(h.editor.state().is_editing());
}

#[test]
fn test_type_then_backspace_to_empty() {
    let mut h = Harness::new(40, 10);
    h.type_str("hi");
    assert_eq!(h.screen()[0], "$ hi");

    h.send(BACKSPACE);
    h.send(BACKSPACE);
    assert_eq!(h.screen()[0], "$");
    assert_eq!(h.buffer(), "");
    assert_eq!(h.term.cursor().x, 2);

    // Nothing left to delete
    assert_eq!(h.send(BACKSPACE), Effect::None);
}

#[test]
fn test_insert_in_the_middle() {
    let mut h = Harness::new(40, 10);
    h.type_str("ehxo");
    h.send(LEFT);
    h.send(BACKSPACE);
    h.send(LEFT);
    h.type_str("c");
    assert_eq!(h.buffer(), "echo");
    assert_eq!(h.screen()[0], "$ echo");
    assert_eq!(h.editor.state().buffer().cursor(), 2);
    assert_eq!(h.term.cursor().x, 4);
}

#[test]
fn test_empty_enter_gives_new_prompt() {
    let mut h = Harness::new(40, 10);
    h.send("\r");
    assert_eq!(h.screen()[0], "$");
    assert_eq!(h.screen()[1], "$");
    assert!(h.editor.state().history().is_empty());
}

#[test]
fn test_newline_variants_submit() {
    let mut h = Harness::new(40, 10);
    h.type_str("no");
    h.send("\r\n");
    h.type_str("no");
    h.send("\n");
    assert_eq!(h.screen()[1], "no u");
    assert_eq!(h.screen()[3], "no u");
}

#[test]
fn test_paste_is_ignored() {
    let mut h = Harness::new(40, 10);
    assert_eq!(h.send("echo pasted"), Effect::None);
    assert_eq!(h.buffer(), "");
    assert_eq!(h.screen()[0], "$");
}

#[test]
fn test_escape_releases_focus() {
    let mut h = Harness::new(40, 10);
    assert!(h.term.is_focused());
    assert_eq!(h.send("\x1b"), Effect::Release);
    assert!(!h.term.is_focused());
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_history_up_down_restores_draft() {
    let mut h = Harness::new(40, 10);
    h.type_line("echo one");
    h.type_line("echo two");
    h.type_str("ec");

    h.send(UP);
    assert_eq!(h.buffer(), "echo two");
    assert_eq!(h.screen()[4], "$ echo two");

    h.send(UP);
    assert_eq!(h.buffer(), "echo one");
    assert_eq!(h.screen()[4], "$ echo one");

    // Already at the oldest entry
    assert_eq!(h.send(UP), Effect::None);

    h.send(DOWN);
    assert_eq!(h.buffer(), "echo two");
    h.send(DOWN);
    assert_eq!(h.buffer(), "ec");
    assert_eq!(h.screen()[4], "$ ec");
    assert_eq!(h.send(DOWN), Effect::None);
}

#[test]
fn test_recalled_line_runs() {
    let mut h = Harness::new(40, 10);
    h.type_line("echo again");
    h.send(UP);
    h.send("\r");
    assert_eq!(h.screen()[3], "again");
    assert_eq!(h.editor.state().history().len(), 3);
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_unknown_command() {
    let mut h = Harness::new(40, 10);
    h.type_line("unknowncmd arg1");
    assert_eq!(h.screen()[0], "$ unknowncmd arg1");
    assert_eq!(h.screen()[1], "unknowncmd: command not found");
    assert_eq!(h.screen()[2], "$");
    assert_eq!(h.term.transcript().matches("command not found").count(), 1);
}

#[test]
fn test_echo() {
    let mut h = Harness::new(40, 10);
    h.type_line("echo   hello    world");
    assert_eq!(h.screen()[1], "hello world");
}

#[test]
fn test_help_lists_visible_commands() {
    let mut h = Harness::new(80, 24);
    h.type_line("help");
    let screen = h.screen();
    assert_eq!(screen[1], "Available commands:");
    let listed: Vec<&str> = screen[2..11].iter().map(String::as_str).collect();
    assert_eq!(
        listed,
        vec![
            "- clear",
            "- echo",
            "- exit",
            "- hello",
            "- help",
            "- neofetch",
            "- no",
            "- sudo",
            "- yes",
        ]
    );
    assert_eq!(
        screen[11],
        "Type 'help [command]' for more information on a specific command."
    );
    assert_eq!(screen[12], "$");
}

#[test]
fn test_help_for_a_command() {
    let mut h = Harness::new(80, 24);
    h.type_line("help echo");
    assert_eq!(h.screen()[1], "Usage: echo [...arguments]");
    assert_eq!(h.screen()[2], "Echoes the provided arguments back to the terminal.");

    h.type_line("help vim");
    assert_eq!(h.screen()[4], "help is not available for this command.");

    h.type_line("help no");
    assert_eq!(h.screen()[6], "idk what this command does...");
    assert_eq!(h.screen()[7], "just type 'no' and see what happens i guess");
}

#[test]
fn test_hidden_command_still_runs() {
    let mut h = Harness::new(80, 24);
    h.type_line("emacs");
    assert_eq!(h.screen()[1], "emacs: command not found. Did you mean 'vim'?");
}

#[test]
fn test_clear_keeps_only_the_prompt() {
    let mut h = Harness::new(40, 10);
    h.type_line("echo a");
    h.type_line("clear");
    let screen = h.screen();
    assert_eq!(screen[0], "$");
    assert!(screen[1..].iter().all(String::is_empty));
    assert_eq!(h.term.cursor().y, 0);
}

// ============================================================================
// Interactive Programs
// ============================================================================

#[test]
fn test_hello_asks_for_a_name() {
    let mut h = Harness::new(40, 10);
    h.type_line("hello");
    assert_eq!(h.screen()[1], "Hi! What is your name?");
    assert_eq!(h.screen()[2], "Response:");

    h.type_line("Ada");
    assert_eq!(h.screen()[2], "Response: Ada");
    assert_eq!(h.screen()[3], "Hello, Ada!");
    // Answers are not history
    assert_eq!(h.editor.state().history().entries(), &["hello".to_string(), String::new()]);
}

#[test]
fn test_hello_with_arguments() {
    let mut h = Harness::new(40, 10);
    h.type_line("hello there");
    assert_eq!(h.screen()[1], "Hello there to you too!");
}

#[test]
fn test_sudo_masks_password() {
    let mut h = Harness::new(120, 10);
    h.type_line("sudo");
    assert_eq!(h.screen()[1], "[sudo] password for user:");

    h.type_str("password");
    assert_eq!(h.screen()[1], "[sudo] password for user: ********");
    h.send(UP);
    assert_eq!(h.buffer(), "password");

    h.send("\r");
    assert_eq!(
        h.screen()[2],
        "You really thought I would set my password to 'password'? Try harder next time."
    );
    assert!(!h.term.transcript().contains("user: p"));
    assert_eq!(h.editor.state().history().entries(), &["sudo".to_string(), String::new()]);
    // The next prompt echoes normally again
    h.type_str("x");
    assert_eq!(h.screen()[3], "$ x");
}

#[test]
fn test_sudo_wrong_password() {
    let mut h = Harness::new(120, 10);
    h.type_line("sudo");
    h.type_line("hunter2");
    assert_eq!(
        h.screen()[2],
        "Password incorrect, permission denied. This incident will be reported to your mom."
    );
}

#[test]
fn test_exit_asks_forever() {
    let mut h = Harness::new(80, 24);
    h.type_line("exit");
    assert_eq!(h.screen()[1], "Are you sure you want to exit? (y/N)");

    h.type_line("y");
    assert_eq!(h.screen()[2], "Are you REALLY sure you want to exit? (y/N)");

    h.type_line("Y");
    assert_eq!(h.screen()[3], "Are you REALLY REALLY sure you want to exit? (y/N)");

    h.type_line("n");
    assert_eq!(h.screen()[4], "Exit cancelled.");
    assert_eq!(h.screen()[5], "$");
}

#[test]
fn test_neofetch_prints_logo() {
    let mut h = Harness::new(120, 24);
    h.type_line("neofetch");
    let screen = h.screen();
    assert!(screen[1].ends_with("Charlie Yang"));
    assert!(screen[3].ends_with("OS: 0x0c5cbae8 OS"));
    assert_eq!(screen[15], "$");
}

// ============================================================================
// Interrupts
// ============================================================================

#[test]
fn test_ctrl_c_at_prompt() {
    let mut h = Harness::new(40, 10);
    h.type_str("ab");
    assert_eq!(h.send(CTRL_C), Effect::Killed);
    assert_eq!(h.screen()[0], "$ ab^C");
    assert_eq!(h.screen()[1], "$");
    assert_eq!(h.buffer(), "");
    // The aborted line is not history
    assert!(h.editor.state().history().is_empty());
}

#[test]
fn test_ctrl_c_stops_yes() {
    let mut h = Harness::new(40, 10);
    h.type_line("yes");
    assert_eq!(h.screen()[1], "yes");
    assert!(h.editor.state().is_sleeping());

    h.advance(100);
    assert_eq!(h.screen()[2], "yes");
    h.advance(50);
    assert_eq!(h.screen()[3], "");

    assert_eq!(h.send(CTRL_C), Effect::Killed);
    assert_eq!(h.screen()[3], "^C");
    assert_eq!(h.screen()[4], "$");

    // The interrupted sleep took its timer with it
    assert_eq!(h.term.pending_sleeps(), 0);
    h.advance(100);
    assert_eq!(h.screen()[5], "");
    assert!(h.editor.state().is_editing());
}

#[test]
fn test_typing_during_sleep_is_ignored() {
    let mut h = Harness::new(40, 10);
    h.type_line("yes");
    assert_eq!(h.send("q"), Effect::None);
    assert_eq!(h.send("\r"), Effect::None);
    h.send(CTRL_C);
    assert_eq!(h.buffer(), "");
}

#[test]
fn test_ctrl_c_with_nothing_pending_rejects_next_request() {
    let term = Rc::new(HeadlessTerminal::new(40, 10));
    let editor = LineEditor::new(term.clone());

    assert_eq!(editor.handle_input(CTRL_C), Effect::KillDeferred);
    assert!(editor.state().kill_pending());
    assert_eq!(
        block_on(editor.read_line(ReadOptions::default())),
        Err(IoError::Killed)
    );
    assert!(!editor.state().kill_pending());
    assert_eq!(term.transcript(), "");

    editor.handle_input(CTRL_C);
    assert_eq!(block_on(editor.sleep(10)), Err(IoError::Killed));

    editor.handle_input(CTRL_C);
    assert_eq!(block_on(editor.write("lost")), Err(IoError::Killed));
    assert_eq!(block_on(editor.write("kept")), Ok(()));
    assert_eq!(term.screen()[0], "kept");
}

/// A terminal whose next write stays in flight until the gate opens
struct GatedTerminal {
    inner: Rc<HeadlessTerminal>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl GatedTerminal {
    fn new(cols: usize, rows: usize) -> (Rc<Self>, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let term = Rc::new(Self {
            inner: Rc::new(HeadlessTerminal::new(cols, rows)),
            gate: RefCell::new(Some(rx)),
        });
        (term, tx)
    }
}

impl TerminalHost for GatedTerminal {
    fn write(&self, data: &str) -> LocalBoxFuture<'static, ()> {
        let written = self.inner.write(data);
        match self.gate.borrow_mut().take() {
            Some(rx) => async move {
                let _ = rx.await;
            }
            .boxed_local(),
            None => written,
        }
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn cursor(&self) -> CursorReport {
        self.inner.cursor()
    }

    fn size(&self) -> TermSize {
        self.inner.size()
    }

    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        self.inner.sleep(ms)
    }
}

#[test]
fn test_interrupt_during_prompt_write_rejects_read() {
    let (term, open) = GatedTerminal::new(40, 10);
    let editor = LineEditor::new(term.clone());
    let mut pool = LocalPool::new();

    let result: Rc<RefCell<Option<IoResult<String>>>> = Rc::new(RefCell::new(None));
    let reader = editor.clone();
    let slot = result.clone();
    pool.spawner()
        .spawn_local(async move {
            let line = reader.read_line(ReadOptions::default()).await;
            *slot.borrow_mut() = Some(line);
        })
        .unwrap();
    pool.run_until_stalled();

    // Still writing the prologue, so nothing is pending yet
    assert!(result.borrow().is_none());
    assert!(editor.state().is_idle());
    assert_eq!(editor.handle_input(CTRL_C), Effect::KillDeferred);

    open.send(()).unwrap();
    pool.run_until_stalled();

    assert_eq!(*result.borrow(), Some(Err(IoError::Killed)));
    assert!(!editor.state().kill_pending());
    assert!(editor.state().is_idle());

    // The interrupt was spent on that read; the next one edits normally
    let reader = editor.clone();
    let slot = result.clone();
    pool.spawner()
        .spawn_local(async move {
            let line = reader.read_line(ReadOptions::default()).await;
            *slot.borrow_mut() = Some(line);
        })
        .unwrap();
    pool.run_until_stalled();
    assert!(editor.state().is_editing());
    for key in ["o", "k", "\r"] {
        editor.handle_input(key);
    }
    pool.run_until_stalled();
    assert_eq!(*result.borrow(), Some(Ok("ok".to_string())));
}

#[test]
fn test_second_reader_is_busy() {
    let term = Rc::new(HeadlessTerminal::new(40, 10));
    let editor = LineEditor::new(term.clone());
    let mut pool = LocalPool::new();

    let first = editor.clone();
    pool.spawner()
        .spawn_local(async move {
            let _ = first.read_line(ReadOptions::default()).await;
        })
        .unwrap();
    pool.run_until_stalled();
    assert!(editor.state().is_editing());

    assert_eq!(
        block_on(editor.read_line(ReadOptions::default())),
        Err(IoError::Busy)
    );
}

// ============================================================================
// Wrapping and Scrolling
// ============================================================================

#[test]
fn test_input_wraps_and_scrolls_at_bottom() {
    let mut h = Harness::new(10, 3);
    h.send("\r");
    h.send("\r");
    assert_eq!(h.screen(), vec!["$", "$", "$"]);

    h.type_str("abcdefghi");
    assert_eq!(h.screen(), vec!["$", "$ abcdefgh", "i"]);
    assert_eq!(h.term.cursor().viewport_y, 1);
    assert_eq!((h.term.cursor().x, h.term.cursor().y), (1, 2));

    h.type_str("j");
    assert_eq!(h.screen(), vec!["$", "$ abcdefgh", "ij"]);
    assert_eq!((h.term.cursor().x, h.term.cursor().y), (2, 2));

    // Editing back across the wrap point
    h.send(LEFT);
    h.send(LEFT);
    h.send(LEFT);
    assert_eq!((h.term.cursor().x, h.term.cursor().y), (9, 1));
    h.send(BACKSPACE);
    assert_eq!(h.buffer(), "abcdefhij");
    assert_eq!(h.screen(), vec!["$", "$ abcdefhi", "j"]);

    h.send("\r");
    assert_eq!(h.term.line(4).as_deref(), Some("abcdefhij:"));
}

#[test]
fn test_prompt_filling_last_column() {
    let config = ShellConfig {
        prompt: "0123456789".into(),
        banner: Vec::new(),
        ..ShellConfig::default()
    };
    let mut h = Harness::with_config(10, 3, config);
    // Pending wrap: the input line starts on the next row
    assert_eq!(h.editor.state().origin().row, 1);
    h.type_str("ab");
    assert_eq!(h.screen(), vec!["0123456789", "ab", ""]);
}

#[test]
fn test_default_banner() {
    let h = Harness::with_config(120, 10, ShellConfig::default());
    let screen = h.screen();
    assert_eq!(screen[0], "Welcome to my personal website!");
    assert!(screen[1].starts_with("Type 'help' to see available commands."));
    assert_eq!(screen[2], "[0x0c5cbae8 ~]$");
    assert_eq!(h.term.size().cols, 120);
}
