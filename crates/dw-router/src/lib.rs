use dw_params::{ACCESS_KEY, PageLocation, ParamStore, ParameterSet, SessionStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_EXTENSION: &str = ".html";
pub const HOME_ROUTE: &str = "home";

const DEFAULT_ROUTES: &[&str] = &[
    "home",
    "services",
    "qr",
    "more",
    "moreid",
    "id",
    "shortcuts",
    "pesel",
    "scanqr",
    "showqr",
    "gen",
    "card",
];

/// Navigation key → page file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable(BTreeMap<String, String>);

impl Default for RouteTable {
    fn default() -> Self {
        DEFAULT_ROUTES
            .iter()
            .map(|key| (key.to_string(), format!("{key}{DEFAULT_PAGE_EXTENSION}")))
            .collect()
    }
}

impl FromIterator<(String, String)> for RouteTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl RouteTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, file: impl Into<String>) {
        self.0.insert(key.into(), file.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct Router {
    routes: RouteTable,
    page_extension: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouteTable::default(), DEFAULT_PAGE_EXTENSION)
    }
}

impl Router {
    pub fn new(routes: RouteTable, page_extension: impl Into<String>) -> Self {
        Self {
            routes,
            page_extension: page_extension.into(),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Table lookup, falling back to `key` as a literal file name.
    pub fn resolve_page(&self, key: &str) -> String {
        if let Some(file) = self.routes.get(key) {
            return file.to_owned();
        }
        if key.ends_with(&self.page_extension) {
            key.to_owned()
        } else {
            format!("{key}{}", self.page_extension)
        }
    }

    /// `<page>` or `<page>?<query>`; an empty set adds no `?`.
    pub fn href(&self, key: &str, params: &ParameterSet) -> String {
        let file = self.resolve_page(key);
        let query = params.to_query_string();
        if query.is_empty() {
            file
        } else {
            format!("{file}?{query}")
        }
    }

    /// Navigate to `key`, carrying the freshest parameter set along.
    ///
    /// The persisted set wins. Without one, the page's own query is used minus the
    /// access token so a one-time credential is not forwarded.
    pub fn send_to<S, P>(&self, store: &ParamStore<S>, page: &mut P, key: &str) -> String
    where
        S: SessionStore,
        P: PageLocation + ?Sized,
    {
        let params = match store.persisted() {
            Some(stored) => stored,
            None => {
                let mut current = ParameterSet::parse(&page.search());
                current.remove(ACCESS_KEY);
                current
            }
        };
        let href = self.href(key, &params);
        debug!(key, %href, "navigating");
        if let Err(err) = page.navigate(&href) {
            warn!(error = %err, %href, "navigation failed");
        }
        href
    }

    /// Login action: go home with the set this page already resolved.
    ///
    /// Always emits the `?`, even for an empty set.
    pub fn enter_home<P>(&self, params: &ParameterSet, page: &mut P) -> String
    where
        P: PageLocation + ?Sized,
    {
        let href = format!(
            "{}?{}",
            self.resolve_page(HOME_ROUTE),
            params.to_query_string()
        );
        if let Err(err) = page.navigate(&href) {
            warn!(error = %err, %href, "navigation failed");
        }
        href
    }
}
