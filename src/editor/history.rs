//! Command history
//!
//! Submitted lines followed by a draft slot holding the line being typed.
//! Leaving the draft copies the live buffer into it, so walking back down
//! restores whatever was there before navigation started.

/// Command history with a trailing draft slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    /// Never empty; the last entry is the draft
    entries: Vec<String>,
    index: usize,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: vec![String::new()],
            index: 0,
        }
    }

    /// History holding `lines` (blank ones skipped) plus an empty draft
    pub fn with_entries<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<String> = lines
            .into_iter()
            .map(Into::into)
            .filter(|line: &String| !line.trim().is_empty())
            .collect();
        entries.push(String::new());
        let index = entries.len() - 1;
        Self { entries, index }
    }

    /// All slots, draft included
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of slots, draft included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been submitted yet
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    /// Navigation index
    pub fn index(&self) -> usize {
        self.index
    }

    fn draft_index(&self) -> usize {
        self.entries.len() - 1
    }

    /// Step back one entry. `live` is saved into the draft when leaving it.
    pub fn previous(&mut self, live: &str) -> Option<&str> {
        let draft = self.draft_index();
        if self.index == draft {
            self.entries[draft] = live.to_string();
        }
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step forward one entry, ending on the draft
    pub fn next(&mut self) -> Option<&str> {
        if self.index >= self.draft_index() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    /// Record a submitted line. Blank lines are not recorded.
    /// Either way navigation restarts from an empty draft.
    /// Returns true if the line was recorded.
    pub fn commit(&mut self, line: &str) -> bool {
        let draft = self.draft_index();
        if line.trim().is_empty() {
            self.entries[draft].clear();
            self.index = draft;
            return false;
        }
        self.entries[draft] = line.to_string();
        self.entries.push(String::new());
        self.index = self.draft_index();
        true
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
