//! Event binding.
//!
//! Wires the bottom bar, the login button, and the password field. Elements a page
//! does not render are skipped.

use crate::dom::{self, Elements};
use crate::navigation;
use crate::password::PasswordField;
use crate::state;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Helper: attach a typed event handler and leak it for the page's lifetime.
macro_rules! listen {
    ($el:expr, $event:literal, $ty:ty, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut($ty)>);
        $el.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after the page parameters are loaded.
pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    // ── Bottom bar ──
    for item in &els.nav_items {
        let key = item.get_attribute(dom::NAV_KEY_ATTR).unwrap_or_default();
        listen!(item, "click", web_sys::MouseEvent, move |_: web_sys::MouseEvent| {
            navigation::send_to(&key);
        });
    }

    // ── Login ──
    if let Some(login) = &els.login {
        listen!(login, "click", web_sys::MouseEvent, move |_: web_sys::MouseEvent| {
            navigation::enter_home();
        });
    }

    // ── Password field ──
    if let Some(input) = &els.password_input {
        let options = state::config().mask_options();
        let field = PasswordField::new(input.clone(), els.eye.clone(), options);

        {
            let field = field.clone();
            listen!(input, "keypress", web_sys::KeyboardEvent, move |e: web_sys::KeyboardEvent| {
                field.on_keypress(&e);
            });
        }
        {
            let field = field.clone();
            listen!(input, "input", web_sys::Event, move |_: web_sys::Event| {
                field.on_input();
            });
        }
        if let Some(eye) = &els.eye {
            let field = field.clone();
            listen!(eye, "click", web_sys::MouseEvent, move |_: web_sys::MouseEvent| {
                field.on_toggle();
            });
        }
    }

    Ok(())
}
