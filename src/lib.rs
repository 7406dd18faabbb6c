//! shush - a fake shell for a personal website, compiled to WASM
//!
//! Nothing here runs real programs. The interesting part is the line editor:
//! it keeps an input buffer, cursor and history in memory and patches the
//! terminal with absolute cursor escapes, tracking where the input line
//! starts as the terminal wraps and scrolls.
//!
//! Layers:
//! - `platform`: the terminal host trait, the xterm.js binding (browser) and
//!   a headless grid emulator (native, tests)
//! - `editor`: buffer/cursor/history state, escape rendering, suspension points
//! - `shell`: command registry, dispatcher, joke programs
//! - `config`: widget settings

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod config;
pub mod editor;
pub mod platform;
pub mod shell;

#[cfg(target_arch = "wasm32")]
mod boot;

pub use config::{ConfigError, ShellConfig};
pub use editor::{IoError, IoResult, LineEditor, ReadOptions};
pub use platform::{CursorReport, TermSize, TerminalHost};
pub use shell::{CommandRegistry, Shell};

/// Initialize panic hook for better error messages in browser console
#[cfg(target_arch = "wasm32")]
fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM module entry point. Only installs the panic hook; the page calls
/// [`start`] once the xterm.js scripts are loaded.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    init_panic_hook();
}

/// Mount the shell in the element with id `element_id`.
///
/// `config_json` optionally overrides [`ShellConfig`] fields.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start(element_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    boot::boot(element_id, config_json.as_deref())
}

/// Console logging helper
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// Log to browser console (WASM)
#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        $crate::log(&format!($($t)*))
    };
}

/// Log to stderr (native)
#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        eprintln!($($t)*)
    };
}
