//! Shell - command dispatcher
//!
//! Reads a line, splits it on whitespace, and runs the command with that
//! name. There is no parsing beyond that: no quotes, pipes or variables.
//! Programs get a [`Context`] and suspend through it; an interrupt during
//! any of their awaits unwinds them with [`IoError::Killed`] and the shell
//! prints `^C` before the next prompt.

pub mod programs;
pub mod registry;

pub use registry::{Command, CommandFn, CommandRegistry, HelpEntry};

use crate::config::ShellConfig;
use crate::console_log;
use crate::editor::{IoError, IoResult, LineEditor, ReadOptions};
use std::rc::Rc;

/// What a running program can reach
#[derive(Clone)]
pub struct Context {
    editor: LineEditor,
    commands: Rc<CommandRegistry>,
    config: Rc<ShellConfig>,
}

impl Context {
    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub async fn print(&self, text: &str) -> IoResult<()> {
        self.editor.write(text).await
    }

    pub async fn read_line(&self, options: ReadOptions) -> IoResult<String> {
        self.editor.read_line(options).await
    }

    pub async fn sleep(&self, ms: u32) -> IoResult<()> {
        self.editor.sleep(ms).await
    }

    pub fn clear(&self) {
        self.editor.clear();
    }
}

/// The shell: a registry bound to an editor
#[derive(Clone)]
pub struct Shell {
    ctx: Context,
}

impl Shell {
    /// A shell with every program registered
    pub fn new(editor: LineEditor, config: ShellConfig) -> Self {
        let mut commands = CommandRegistry::new();
        programs::register(&mut commands);
        Self::with_registry(editor, config, commands)
    }

    pub fn with_registry(editor: LineEditor, config: ShellConfig, commands: CommandRegistry) -> Self {
        Self {
            ctx: Context {
                editor,
                commands: Rc::new(commands),
                config: Rc::new(config),
            },
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn editor(&self) -> &LineEditor {
        &self.ctx.editor
    }

    /// Print the banner
    pub async fn greet(&self) -> IoResult<()> {
        for line in &self.ctx.config.banner {
            self.ctx.print(&format!("{}\r\n", line)).await?;
        }
        Ok(())
    }

    /// One prompt/read/dispatch cycle
    pub async fn step(&self) -> IoResult<()> {
        self.ctx.print(&self.ctx.config.prompt).await?;
        let line = self.ctx.read_line(ReadOptions::history()).await?;
        self.submit(&line).await
    }

    /// Run one submitted line.
    pub async fn submit(&self, line: &str) -> IoResult<()> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            // Blank line: nothing to run, just re-anchor for the next prompt
            return self.ctx.print("").await;
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        match self.ctx.commands.get(name).copied() {
            Some(command) => (command.run)(self.ctx.clone(), args).await,
            None => {
                console_log!("[shell] unknown command: {}", name);
                self.ctx
                    .print(&format!("{}: command not found\r\n", name))
                    .await
            }
        }
    }

    /// Greet, then prompt forever.
    ///
    /// Returns only if the editor reports something other than an interrupt,
    /// which means two requests were issued at once.
    pub async fn run(&self) {
        console_log!("[shell] started");
        if let Err(e) = self.greet().await {
            console_log!("[shell] banner interrupted: {}", e);
        }

        loop {
            match self.step().await {
                Ok(()) => {}
                Err(IoError::Killed) => {
                    if let Err(e) = self.ctx.print("^C\r\n").await {
                        console_log!("[shell] could not print interrupt marker: {}", e);
                    }
                }
                Err(e) => {
                    console_log!("[shell] stopping: {}", e);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessTerminal;
    use futures::executor::block_on;

    fn shell() -> (Rc<HeadlessTerminal>, Shell) {
        let term = Rc::new(HeadlessTerminal::new(80, 24));
        let editor = LineEditor::new(term.clone());
        (term, Shell::new(editor, ShellConfig::default()))
    }

    #[test]
    fn test_unknown_command() {
        let (term, shell) = shell();
        block_on(shell.submit("unknowncmd arg1")).unwrap();
        assert_eq!(term.transcript(), "unknowncmd: command not found\r\n");
    }

    #[test]
    fn test_blank_line_is_a_no_op() {
        let (term, shell) = shell();
        block_on(shell.submit("   ")).unwrap();
        assert_eq!(term.transcript(), "");
    }

    #[test]
    fn test_whitespace_runs_split_args() {
        let (term, shell) = shell();
        block_on(shell.submit("  echo   a\tb  ")).unwrap();
        assert_eq!(term.transcript(), "a b\r\n");
    }

    #[test]
    fn test_lookup_is_exact() {
        let (term, shell) = shell();
        block_on(shell.submit("ECHO hi")).unwrap();
        assert_eq!(term.transcript(), "ECHO: command not found\r\n");
    }

    #[test]
    fn test_greet_prints_banner() {
        let (term, shell) = shell();
        block_on(shell.greet()).unwrap();
        assert_eq!(term.screen()[0], "Welcome to my personal website!");
    }

    #[test]
    fn test_deferred_interrupt_rejects_next_print() {
        let (_term, shell) = shell();
        shell.editor().handle_input("\x03");
        assert_eq!(block_on(shell.submit("no")), Err(IoError::Killed));
        // The interrupt is spent
        assert_eq!(block_on(shell.submit("no")), Ok(()));
    }
}
