//! Page-load parameter resolution and click-driven navigation.

use crate::state::{self, BrowserLocation, BrowserSessionStore};
use dw_params::ParameterSet;

/// Resolve this page's parameters, persist them, and rewrite the address if needed.
pub fn load_params() -> ParameterSet {
    let store = state::config().param_store(BrowserSessionStore);
    let params = store.load(&mut BrowserLocation::current());
    state::with_mut(|s| s.params = params.clone());
    params
}

/// Bottom bar click.
pub fn send_to(key: &str) {
    let config = state::config();
    let store = config.param_store(BrowserSessionStore);
    config
        .router()
        .send_to(&store, &mut BrowserLocation::current(), key);
}

/// Login button on the identity page.
pub fn enter_home() {
    let params = state::params();
    state::config()
        .router()
        .enter_home(&params, &mut BrowserLocation::current());
}
