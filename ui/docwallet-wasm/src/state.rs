//! Page-wide state and the browser side of the parameter seams.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).

use crate::dom;
use anyhow::{Result, anyhow};
use dw_config::WalletConfig;
use dw_params::{PageLocation, ParameterSet, SessionStore};
use std::cell::RefCell;
use wasm_bindgen::JsValue;

pub const CONFIG_ELEMENT_ID: &str = "docwallet-config";

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub config: WalletConfig,
    /// Set resolved for this page on load.
    pub params: ParameterSet,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

/// Run a closure with shared read access to the state.
pub fn with<F, R>(f: F) -> R
where
    F: FnOnce(&AppState) -> R,
{
    STATE.with(|s| f(&s.borrow()))
}

/// Run a closure with mutable access to the state.
pub fn with_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    STATE.with(|s| f(&mut s.borrow_mut()))
}

pub fn config() -> WalletConfig {
    with(|s| s.config.clone())
}

pub fn params() -> ParameterSet {
    with(|s| s.params.clone())
}

/// Read the inline `<script type="application/json" id="docwallet-config">` block.
/// A missing block means defaults; a broken one is reported and ignored.
pub fn load_config() -> WalletConfig {
    let Some(el) = dom::by_id(CONFIG_ELEMENT_ID) else {
        return WalletConfig::default();
    };
    match WalletConfig::from_json(&dom::text(&el)) {
        Ok(config) => config,
        Err(err) => {
            gloo_console::warn!("docwallet: ignoring config block:", err.to_string());
            WalletConfig::default()
        }
    }
}

fn js_err(err: JsValue) -> anyhow::Error {
    anyhow!("{err:?}")
}

// ── sessionStorage ──

/// `window.sessionStorage`; denied or disabled storage surfaces as an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserSessionStore;

impl BrowserSessionStore {
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| anyhow!("no window"))?
            .session_storage()
            .map_err(js_err)?
            .ok_or_else(|| anyhow!("sessionStorage unavailable"))
    }
}

impl SessionStore for BrowserSessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?.get_item(key).map_err(js_err)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?.set_item(key, value).map_err(js_err)
    }
}

// ── location / history ──

pub struct BrowserLocation {
    window: web_sys::Window,
}

impl BrowserLocation {
    pub fn current() -> Self {
        Self {
            window: gloo_utils::window(),
        }
    }
}

impl PageLocation for BrowserLocation {
    fn pathname(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn search(&self) -> String {
        self.window.location().search().unwrap_or_default()
    }

    fn replace_url(&mut self, url: &str) -> Result<()> {
        self.window
            .history()
            .map_err(js_err)?
            .replace_state_with_url(&JsValue::NULL, "", Some(url))
            .map_err(js_err)
    }

    fn navigate(&mut self, href: &str) -> Result<()> {
        self.window.location().set_href(href).map_err(js_err)
    }
}
