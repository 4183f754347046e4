//! Report template editor - browser bindings
//!
//! Wraps the core editing session for the page and talks to the backend
//! services with `fetch`: number formatting, text replacement, pre-signed
//! uploads, and document analysis.

use wasm_bindgen::prelude::*;

pub mod client;
pub mod config;
pub mod session;

pub use config::ClientConfig;
pub use session::WasmReportSession;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"Report editor WASM initialized".into());
}

/// Object key of a user's template, as the report generator expects it
#[wasm_bindgen(js_name = templateKey)]
pub fn template_key(user_sub: &str, template: &str) -> Result<String, JsValue> {
    report_core::ReportTarget::now(user_sub, template)
        .map(|target| target.template_key)
        .map_err(client::to_js)
}
