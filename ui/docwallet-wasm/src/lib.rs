//! DocWallet WASM front end.
//!
//! One bundle for every page of the flow: restores and persists the document
//! parameters on load, wires the bottom-bar navigation, and drives the masked
//! password field on the pages that have one.

pub mod dom;
pub mod events;
pub mod navigation;
pub mod password;
pub mod state;

use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init()
}

fn init() -> Result<(), JsValue> {
    let config = state::load_config();
    state::with_mut(|s| s.config = config);

    let params = navigation::load_params();
    gloo_console::debug!("docwallet: page parameters", params.len());

    let els = dom::Elements::bind();
    events::bind_events(&els)
}
