//! Platform Abstraction Layer
//!
//! The line editor never talks to a terminal directly. It goes through
//! [`TerminalHost`], which covers everything the editor needs from the grid:
//! raw writes with a completion signal, live cursor introspection, size,
//! clearing, and a timer for `sleep`.
//!
//! - Browser (wasm32): xterm.js through wasm-bindgen, see `web`
//! - Native: an in-memory grid emulator, see `headless`

pub mod headless;
pub mod timer;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::HeadlessTerminal;
pub use timer::{TimerId, TimerQueue};

use futures::future::LocalBoxFuture;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Platform-specific errors
#[derive(Debug, Clone)]
pub enum PlatformError {
    /// A browser object the host needs is missing (window, document, element)
    Missing(String),
    /// Initialization failed
    InitFailed(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Missing(s) => write!(f, "Missing: {}", s),
            PlatformError::InitFailed(s) => write!(f, "Init failed: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Terminal dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub cols: usize,
    pub rows: usize,
}

/// Live cursor position as the terminal reports it.
///
/// `x` may equal the column count: xterm parks the cursor there after a
/// character lands in the last column, until the next character wraps it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorReport {
    /// Column, 0-based
    pub x: usize,
    /// Row relative to the top of the viewport, 0-based
    pub y: usize,
    /// Rows between the top of scrollback and the top of the viewport
    pub viewport_y: usize,
}

/// The terminal grid the editor renders into.
///
/// All methods take `&self`: the host is shared between the input callback
/// and the running shell, and implementations use interior mutability.
pub trait TerminalHost {
    /// Issue a raw write. The write is queued immediately, in call order;
    /// the returned future resolves once the terminal has processed it, at
    /// which point [`TerminalHost::cursor`] reflects it.
    fn write(&self, data: &str) -> LocalBoxFuture<'static, ()>;

    /// Clear the screen and scrollback, keeping the cursor line.
    fn clear(&self);

    /// Current cursor position.
    fn cursor(&self) -> CursorReport;

    /// Current dimensions in character cells.
    fn size(&self) -> TermSize;

    /// Resolve after `ms` milliseconds.
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;

    /// Give up keyboard focus.
    fn blur(&self) {}
}
