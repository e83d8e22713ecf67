//! Browser host for the masked password field.
//!
//! Executes the controller's reactions: writes the field, runs hide timers, blurs.

use crate::dom;
use dw_masked_input::{HideTicket, MaskOptions, MaskedInputController, Reaction};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use web_sys::{Element, HtmlInputElement, KeyboardEvent};

pub const REVEALED_CLASS: &str = "eye_close";

pub struct PasswordField {
    input: HtmlInputElement,
    eye: Option<Element>,
    controller: RefCell<MaskedInputController>,
    timeouts: RefCell<HashMap<HideTicket, Timeout>>,
}

impl PasswordField {
    pub fn new(input: HtmlInputElement, eye: Option<Element>, options: MaskOptions) -> Rc<Self> {
        Rc::new(Self {
            input,
            eye,
            controller: RefCell::new(MaskedInputController::new(options)),
            timeouts: RefCell::new(HashMap::new()),
        })
    }

    pub fn on_input(self: &Rc<Self>) {
        let raw = self.input.value();
        let reaction = self.controller.borrow_mut().on_input(&raw);
        self.apply(reaction);
    }

    pub fn on_toggle(self: &Rc<Self>) {
        let reaction = self.controller.borrow_mut().toggle();
        self.apply(reaction);
        if let Some(eye) = &self.eye {
            let revealed = self.controller.borrow().is_revealed();
            dom::toggle_class(eye, REVEALED_CLASS, revealed);
        }
    }

    pub fn on_keypress(self: &Rc<Self>, event: &KeyboardEvent) {
        if event.key() == "Enter" {
            let reaction = self.controller.borrow().commit();
            self.apply(reaction);
        }
    }

    fn on_hide_elapsed(self: &Rc<Self>, ticket: HideTicket) {
        // Still executing inside this timer's closure, so it must not be dropped here.
        if let Some(fired) = self.timeouts.borrow_mut().remove(&ticket) {
            let _ = fired.forget();
        }
        let reaction = self.controller.borrow_mut().on_hide_elapsed(ticket);
        self.apply(reaction);
    }

    fn apply(self: &Rc<Self>, reaction: Reaction) {
        for ticket in &reaction.cancel {
            // Dropping a `Timeout` clears it.
            self.timeouts.borrow_mut().remove(ticket);
        }
        if let Some(text) = &reaction.display {
            self.input.set_value(text);
        }
        if let Some(hide) = reaction.schedule {
            let field: Weak<Self> = Rc::downgrade(self);
            let timeout = Timeout::new(hide.delay_ms, move || {
                if let Some(field) = field.upgrade() {
                    field.on_hide_elapsed(hide.ticket);
                }
            });
            self.timeouts.borrow_mut().insert(hide.ticket, timeout);
        }
        if reaction.blur {
            dom::blur_active();
        }
    }
}
