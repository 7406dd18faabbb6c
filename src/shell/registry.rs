//! Command registry
//!
//! Maps a command name to its handler and help metadata. Hidden commands
//! run normally but are left out of listings and have no help.

use super::Context;
use crate::editor::IoResult;
use futures::future::LocalBoxFuture;
use std::collections::BTreeMap;

/// A command handler: the shell context plus argument tokens
pub type CommandFn = fn(Context, Vec<String>) -> LocalBoxFuture<'static, IoResult<()>>;

/// A registered command
#[derive(Clone, Copy)]
pub struct Command {
    pub run: CommandFn,
    pub help: Option<&'static str>,
    pub hidden: bool,
}

impl Command {
    /// A listed command without help text
    pub fn new(run: CommandFn) -> Self {
        Self {
            run,
            help: None,
            hidden: false,
        }
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// What `help <name>` can say about a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpEntry {
    /// Listed, with a description
    Text(&'static str),
    /// Listed, but nobody wrote a description
    Undocumented,
    /// Hidden or unknown
    Unavailable,
}

/// Name → command, kept in alphabetical order
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, command: Command) {
        self.commands.insert(name.to_string(), command);
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Names of commands that show up in listings, alphabetical
    pub fn visible(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|(_, command)| !command.hidden)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn help(&self, name: &str) -> HelpEntry {
        match self.get(name) {
            Some(command) if !command.hidden => match command.help {
                Some(text) => HelpEntry::Text(text),
                None => HelpEntry::Undocumented,
            },
            _ => HelpEntry::Unavailable,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
