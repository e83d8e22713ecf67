//! Password-style field that shows placeholder glyphs while tracking the typed value.
//!
//! States: `Masked` (initial) ⇄ `Revealed`.
//!
//! Edits are reconciled with a length-delta heuristic that only understands
//! single-character appends and deletions at the tail of the field. Mid-string edits
//! and multi-character pastes produce a wrong true value; this controller is meant
//! for plain typing/backspacing UIs only.
//!
//! Handlers never touch the host directly. Each returns a [`Reaction`] carrying the
//! text to put in the field plus the timer commands to execute.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

pub const DEFAULT_PLACEHOLDER: char = '•';
pub const DEFAULT_HIDE_DELAY_MS: u32 = 3_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Masked,
    Revealed,
}

/// How re-mask timers from consecutive keystrokes interact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HidePolicy {
    /// Every keystroke's timer runs to completion. A timer from an earlier keystroke
    /// can mask a newer character before its own delay has elapsed.
    #[default]
    Independent,
    /// A keystroke cancels the previous pending timer; revealing cancels it too.
    Debounced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HideTicket(u64);

impl HideTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleHide {
    pub ticket: HideTicket,
    pub delay_ms: u32,
}

/// Side effects requested by a handler, in execution order: cancel, display, schedule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct Reaction {
    pub cancel: Vec<HideTicket>,
    /// New field text; `None` leaves the field alone.
    pub display: Option<String>,
    pub schedule: Option<ScheduleHide>,
    pub blur: bool,
}

impl Reaction {
    pub fn none() -> Self {
        Self::default()
    }

    fn show(display: String) -> Self {
        Self {
            display: Some(display),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MaskOptions {
    pub placeholder: char,
    pub hide_delay_ms: u32,
    pub policy: HidePolicy,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER,
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
            policy: HidePolicy::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MaskedInputController {
    options: MaskOptions,
    true_value: String,
    displayed: String,
    visibility: Visibility,
    next_ticket: u64,
    pending: BTreeSet<HideTicket>,
}

impl MaskedInputController {
    pub fn new(options: MaskOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn true_value(&self) -> &str {
        &self.true_value
    }

    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_revealed(&self) -> bool {
        self.visibility == Visibility::Revealed
    }

    pub fn options(&self) -> &MaskOptions {
        &self.options
    }

    /// Tickets scheduled and neither fired nor cancelled yet.
    pub fn pending_hides(&self) -> usize {
        self.pending.len()
    }

    /// The field's raw value changed to `raw`.
    pub fn on_input(&mut self, raw: &str) -> Reaction {
        let tracked = self.true_value.chars().count();
        let typed = raw.chars().count();
        let last = raw.chars().last();

        if typed > tracked {
            // Only the trailing character is taken, whatever the delta.
            if let Some(c) = last {
                self.true_value.push(c);
            }
        } else if typed < tracked {
            self.true_value.pop();
        }
        trace!(tracked, typed, "masked input edit");

        if self.is_revealed() {
            self.displayed = self.true_value.clone();
            return Reaction::show(self.displayed.clone());
        }

        let mut display = self.glyphs(typed.saturating_sub(1));
        display.extend(last);
        self.displayed = display;

        let cancel = match self.options.policy {
            HidePolicy::Independent => Vec::new(),
            HidePolicy::Debounced => std::mem::take(&mut self.pending).into_iter().collect(),
        };
        let ticket = self.issue_ticket();
        Reaction {
            cancel,
            display: Some(self.displayed.clone()),
            schedule: Some(ScheduleHide {
                ticket,
                delay_ms: self.options.hide_delay_ms,
            }),
            blur: false,
        }
    }

    /// A scheduled hide delay elapsed.
    ///
    /// Masks the trailing character of whatever is displayed, not the character the
    /// ticket was issued for. Cancelled tickets and a revealed field are ignored.
    pub fn on_hide_elapsed(&mut self, ticket: HideTicket) -> Reaction {
        if !self.pending.remove(&ticket) {
            trace!(ticket = ticket.id(), "stale hide ticket");
            return Reaction::none();
        }
        if self.is_revealed() || self.displayed.is_empty() {
            return Reaction::none();
        }
        self.displayed.pop();
        self.displayed.push(self.options.placeholder);
        Reaction::show(self.displayed.clone())
    }

    /// Reveal/hide control activated. Never alters the true value.
    pub fn toggle(&mut self) -> Reaction {
        match self.visibility {
            Visibility::Masked => {
                self.visibility = Visibility::Revealed;
                self.displayed = self.true_value.clone();
                let cancel = match self.options.policy {
                    HidePolicy::Independent => Vec::new(),
                    HidePolicy::Debounced => {
                        std::mem::take(&mut self.pending).into_iter().collect()
                    }
                };
                Reaction {
                    cancel,
                    display: Some(self.displayed.clone()),
                    ..Reaction::default()
                }
            }
            Visibility::Revealed => {
                self.visibility = Visibility::Masked;
                self.displayed = self.glyphs(self.true_value.chars().count());
                Reaction::show(self.displayed.clone())
            }
        }
    }

    /// Enter pressed: drop focus, nothing else.
    pub fn commit(&self) -> Reaction {
        Reaction {
            blur: true,
            ..Reaction::default()
        }
    }

    fn glyphs(&self, count: usize) -> String {
        std::iter::repeat_n(self.options.placeholder, count).collect()
    }

    fn issue_ticket(&mut self) -> HideTicket {
        let ticket = HideTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket);
        ticket
    }
}
