//! DOM element bindings.
//!
//! Every page in the flow loads the same bundle, so each element is optional and a
//! page simply lacks the ones it does not render.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

// ── Helpers ──

fn doc() -> Document {
    gloo_utils::document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().get_element_by_id(id)
}

pub fn query(selector: &str) -> Option<Element> {
    doc().query_selector(selector).ok()?
}

pub fn query_typed<T: JsCast>(selector: &str) -> Option<T> {
    query(selector).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Ok(nl) = doc().query_selector_all(selector) else {
        return Vec::new();
    };
    let mut v = Vec::new();
    for i in 0..nl.length() {
        if let Some(e) = nl.item(i) {
            if let Ok(el) = e.dyn_into::<Element>() {
                v.push(el);
            }
        }
    }
    v
}

pub fn text(el: &Element) -> String {
    el.text_content().unwrap_or_default()
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

/// Drop focus from whatever element holds it.
pub fn blur_active() {
    if let Some(active) = doc().active_element() {
        if let Ok(html) = active.dyn_into::<HtmlElement>() {
            let _ = html.blur();
        }
    }
}

// ── Elements struct ──

pub const NAV_ITEM_SELECTOR: &str = ".bottom_element_grid";
pub const NAV_KEY_ATTR: &str = "send";

/// Page elements the bundle reacts to.
#[derive(Clone)]
pub struct Elements {
    /// Bottom bar entries; each carries its destination key in `send`.
    pub nav_items: Vec<Element>,
    pub login: Option<Element>,
    pub password_input: Option<HtmlInputElement>,
    /// Reveal toggle; class `eye_close` marks the revealed state.
    pub eye: Option<Element>,
}

impl Elements {
    pub fn bind() -> Self {
        Self {
            nav_items: query_all(NAV_ITEM_SELECTOR),
            login: query(".login"),
            password_input: query_typed(".password_input"),
            eye: query(".eye"),
        }
    }
}
