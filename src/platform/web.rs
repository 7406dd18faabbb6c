//! Browser platform: xterm.js
//!
//! Direct wasm_bindgen bindings to the xterm.js and xterm-addon-fit globals
//! loaded via script tag, so no bundler is needed.

use super::{CursorReport, PlatformError, PlatformResult, TermSize, TerminalHost};
use crate::config::ShellConfig;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    /// The xterm.js Terminal class (global `Terminal`)
    #[wasm_bindgen(js_name = Terminal)]
    type XTerm;

    #[wasm_bindgen(constructor, js_class = "Terminal")]
    fn new(options: &JsValue) -> XTerm;

    #[wasm_bindgen(method)]
    fn open(this: &XTerm, element: &web_sys::HtmlElement);

    /// `write(data, callback)`: the callback fires once xterm has parsed `data`
    #[wasm_bindgen(method, js_name = write)]
    fn write_with_callback(this: &XTerm, data: &str, callback: &JsValue);

    #[wasm_bindgen(method)]
    fn clear(this: &XTerm);

    #[wasm_bindgen(method)]
    fn focus(this: &XTerm);

    #[wasm_bindgen(method)]
    fn blur(this: &XTerm);

    #[wasm_bindgen(method, js_name = loadAddon)]
    fn load_addon(this: &XTerm, addon: &JsValue);

    #[wasm_bindgen(method, js_name = onData)]
    fn on_data(this: &XTerm, callback: &js_sys::Function);

    #[wasm_bindgen(method, getter)]
    fn cols(this: &XTerm) -> u32;

    #[wasm_bindgen(method, getter)]
    fn rows(this: &XTerm) -> u32;

    #[wasm_bindgen(method, getter)]
    fn buffer(this: &XTerm) -> XTermBufferNamespace;

    /// `terminal.buffer`
    type XTermBufferNamespace;

    #[wasm_bindgen(method, getter)]
    fn active(this: &XTermBufferNamespace) -> XTermBuffer;

    /// `terminal.buffer.active`
    type XTermBuffer;

    #[wasm_bindgen(method, getter, js_name = cursorX)]
    fn cursor_x(this: &XTermBuffer) -> u32;

    #[wasm_bindgen(method, getter, js_name = cursorY)]
    fn cursor_y(this: &XTermBuffer) -> u32;

    #[wasm_bindgen(method, getter, js_name = viewportY)]
    fn viewport_y(this: &XTermBuffer) -> u32;

    /// The xterm-addon-fit FitAddon class (global `FitAddon`)
    #[wasm_bindgen(js_name = FitAddon)]
    type XTermFitAddon;

    #[wasm_bindgen(constructor, js_class = "FitAddon")]
    fn new_fit() -> XTermFitAddon;

    #[wasm_bindgen(method)]
    fn fit(this: &XTermFitAddon);
}

/// A live xterm.js terminal mounted in the page
pub struct XtermHost {
    term: XTerm,
    fit: Rc<XTermFitAddon>,
}

impl XtermHost {
    /// Create the terminal and open it inside the element with `element_id`.
    pub fn mount(element_id: &str, config: &ShellConfig) -> PlatformResult<Self> {
        let window = web_sys::window().ok_or_else(|| PlatformError::Missing("window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| PlatformError::Missing("document".into()))?;
        let container: web_sys::HtmlElement = document
            .get_element_by_id(element_id)
            .ok_or_else(|| PlatformError::Missing(format!("element #{}", element_id)))?
            .dyn_into()
            .map_err(|_| PlatformError::InitFailed(format!("#{} is not an HTML element", element_id)))?;

        let options = js_sys::JSON::parse(&config.xterm_options().to_string())
            .map_err(|e| PlatformError::InitFailed(format!("terminal options: {:?}", e)))?;

        let term = XTerm::new(&options);
        term.open(&container);

        let fit = Rc::new(XTermFitAddon::new_fit());
        term.load_addon(fit.unchecked_ref());
        fit.fit();

        Ok(Self { term, fit })
    }

    /// Deliver every `onData` chunk to `handler`. The closure lives as long as the page.
    pub fn on_data(&self, handler: impl FnMut(String) + 'static) {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(String)>);
        self.term.on_data(callback.as_ref().unchecked_ref());
        callback.forget();
    }

    /// Refit the grid whenever the window resizes
    pub fn fit_on_resize(&self) -> PlatformResult<()> {
        let fit = self.fit.clone();
        let callback = Closure::wrap(Box::new(move || {
            fit.fit();
        }) as Box<dyn FnMut()>);

        let window = web_sys::window().ok_or_else(|| PlatformError::Missing("window".into()))?;
        window
            .add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
            .map_err(|e| PlatformError::InitFailed(format!("resize listener: {:?}", e)))?;
        callback.forget();
        Ok(())
    }

    pub fn focus(&self) {
        self.term.focus();
    }
}

impl TerminalHost for XtermHost {
    fn write(&self, data: &str) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        let done = Closure::once_into_js(move || {
            let _ = tx.send(());
        });
        self.term.write_with_callback(data, &done);
        // A dropped sender means the terminal went away; nothing left to wait for
        rx.map(|_| ()).boxed_local()
    }

    fn clear(&self) {
        self.term.clear();
    }

    fn cursor(&self) -> CursorReport {
        let active = self.term.buffer().active();
        CursorReport {
            x: active.cursor_x() as usize,
            y: active.cursor_y() as usize,
            viewport_y: active.viewport_y() as usize,
        }
    }

    fn size(&self) -> TermSize {
        TermSize {
            cols: self.term.cols() as usize,
            rows: self.term.rows() as usize,
        }
    }

    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                crate::console_log!("[platform] setTimeout unavailable, not sleeping");
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        JsFuture::from(promise).map(|_| ()).boxed_local()
    }

    fn blur(&self) {
        self.term.blur();
    }
}
