//! Boot sequence
//!
//! Parse the config, mount the terminal, wire input into the editor and
//! start the shell loop on the browser's microtask queue.

use crate::config::ShellConfig;
use crate::console_log;
use crate::editor::LineEditor;
use crate::platform::web::XtermHost;
use crate::shell::Shell;
use std::rc::Rc;
use wasm_bindgen::JsValue;

/// Mount the shell in `element_id` and start it
pub fn boot(element_id: &str, config_json: Option<&str>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => ShellConfig::from_json(json).unwrap_or_else(|e| {
            console_log!("[boot] {}, using defaults", e);
            ShellConfig::default()
        }),
        None => ShellConfig::default(),
    };

    let host = Rc::new(XtermHost::mount(element_id, &config).map_err(|e| JsValue::from_str(&e.to_string()))?);
    if let Err(e) = host.fit_on_resize() {
        console_log!("[boot] {}", e);
    }

    let editor = LineEditor::new(host.clone());
    let input = editor.clone();
    host.on_data(move |data| {
        input.handle_input(&data);
    });
    host.focus();

    let shell = Shell::new(editor, config);
    wasm_bindgen_futures::spawn_local(async move { shell.run().await });

    console_log!("[boot] shell mounted in #{}", element_id);
    Ok(())
}
