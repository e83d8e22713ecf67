//! Document parameter propagation across page loads.
//!
//! A page's query string carries the document data (`name`, ...) and sometimes a
//! one-time `access` token. The last set that carried real document data is kept in
//! tab-scoped session storage so pages reached without a query (or with only the
//! token) can restore it.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};
use url::form_urlencoded;

pub const NAME_KEY: &str = "name";
pub const ACCESS_KEY: &str = "access";
pub const DEFAULT_STORAGE_KEY: &str = "docParams";

// ── Parameter set ──

/// Ordered key/value pairs parsed from a query string.
///
/// Follows `application/x-www-form-urlencoded` rules, so it round-trips with what a
/// browser's `URLSearchParams` produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    pairs: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string. A leading `?` is ignored; malformed input never fails.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove every pair stored under `key`.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Carries real document data rather than just a token.
    pub fn has_document_data(&self) -> bool {
        self.contains(NAME_KEY)
    }

    pub fn is_access_only(&self) -> bool {
        self.contains(ACCESS_KEY) && !self.contains(NAME_KEY)
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ── Host seams ──

/// Tab-scoped key/value storage (the browser's `sessionStorage`).
pub trait SessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    items: RefCell<HashMap<String, String>>,
}

impl SessionStore for InMemorySessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// The current page's address.
pub trait PageLocation {
    fn pathname(&self) -> String;
    /// Raw query component, with or without the leading `?`.
    fn search(&self) -> String;
    /// Rewrite the visible address without reloading.
    fn replace_url(&mut self, url: &str) -> Result<()>;
    /// Full navigation to `href`.
    fn navigate(&mut self, href: &str) -> Result<()>;
}

// ── Store ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Written,
    /// Empty or access-only sets never overwrite the stored one.
    SkippedNoDocumentData,
    StorageUnavailable,
}

/// Reconciles the page's query with the persisted set and keeps the richer one.
pub struct ParamStore<S> {
    store: S,
    storage_key: String,
}

impl<S> ParamStore<S>
where
    S: SessionStore,
{
    pub fn new(store: S) -> Self {
        Self::with_storage_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_storage_key(store: S, storage_key: impl Into<String>) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// The stored set, if any. Unavailable storage reads as "nothing stored".
    pub fn persisted(&self) -> Option<ParameterSet> {
        match self.store.get_item(&self.storage_key) {
            Ok(Some(raw)) if !raw.is_empty() => Some(ParameterSet::parse(&raw)),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "session storage unavailable, nothing to restore");
                None
            }
        }
    }

    /// Pick the parameter set for the current page.
    ///
    /// An empty or access-only query yields to the persisted set. When the adopted set
    /// carries document data the address bar is rewritten to match it.
    pub fn resolve<P>(&self, page: &mut P) -> ParameterSet
    where
        P: PageLocation + ?Sized,
    {
        let params = ParameterSet::parse(&page.search());
        if !params.is_empty() && !params.is_access_only() {
            return params;
        }

        let Some(stored) = self.persisted() else {
            return params;
        };
        debug!(
            access_only = params.is_access_only(),
            "adopting persisted parameters"
        );

        if !stored.is_empty() && stored.has_document_data() {
            let url = format!("{}?{}", page.pathname(), stored.to_query_string());
            if let Err(err) = page.replace_url(&url) {
                warn!(error = %err, "failed to rewrite page address");
            }
        }
        stored
    }

    /// Store `set` if it carries document data, replacing whatever was stored.
    pub fn persist(&self, set: &ParameterSet) -> PersistOutcome {
        if set.is_empty() || !set.has_document_data() {
            return PersistOutcome::SkippedNoDocumentData;
        }
        match self
            .store
            .set_item(&self.storage_key, &set.to_query_string())
        {
            Ok(()) => PersistOutcome::Written,
            Err(err) => {
                debug!(error = %err, "session storage unavailable, parameters not persisted");
                PersistOutcome::StorageUnavailable
            }
        }
    }

    /// Page-load sequence: resolve, then persist the winner.
    pub fn load<P>(&self, page: &mut P) -> ParameterSet
    where
        P: PageLocation + ?Sized,
    {
        let params = self.resolve(page);
        self.persist(&params);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[derive(Default)]
    struct FakePage {
        pathname: String,
        search: String,
        replaced: Vec<String>,
        navigated: Vec<String>,
    }

    impl FakePage {
        fn at(pathname: &str, search: &str) -> Self {
            Self {
                pathname: pathname.to_owned(),
                search: search.to_owned(),
                ..Self::default()
            }
        }
    }

    impl PageLocation for FakePage {
        fn pathname(&self) -> String {
            self.pathname.clone()
        }

        fn search(&self) -> String {
            self.search.clone()
        }

        fn replace_url(&mut self, url: &str) -> Result<()> {
            self.replaced.push(url.to_owned());
            Ok(())
        }

        fn navigate(&mut self, href: &str) -> Result<()> {
            self.navigated.push(href.to_owned());
            Ok(())
        }
    }

    struct DeniedStore;

    impl SessionStore for DeniedStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("SecurityError: storage disabled"))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("SecurityError: storage disabled"))
        }
    }

    #[test]
    fn parses_like_url_search_params() {
        let set = ParameterSet::parse("?name=Jan+Kowalski&&flag&surname=Nowak%C3%B3");
        assert_eq!(set.get("name"), Some("Jan Kowalski"));
        assert_eq!(set.get("flag"), Some(""));
        assert_eq!(set.get("surname"), Some("Nowakó"));
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.to_query_string(),
            "name=Jan+Kowalski&flag=&surname=Nowak%C3%B3"
        );
    }

    #[test]
    fn empty_and_garbage_queries_are_empty_sets() {
        assert!(ParameterSet::parse("").is_empty());
        assert!(ParameterSet::parse("?").is_empty());
        assert!(ParameterSet::parse("&&&").is_empty());
        assert_eq!(ParameterSet::parse("").to_query_string(), "");
    }

    #[test]
    fn remove_drops_every_pair_for_key() {
        let mut set = ParameterSet::parse("access=a&name=x&access=b");
        set.remove(ACCESS_KEY);
        assert_eq!(set.to_query_string(), "name=x");
    }

    #[test]
    fn persisted_set_survives_to_fresh_page() {
        let storage = InMemorySessionStore::default();
        let set = ParameterSet::from_iter([("name", "Anna"), ("pesel", "90010112345")]);

        let first = ParamStore::new(&storage);
        assert_eq!(first.persist(&set), PersistOutcome::Written);

        let second = ParamStore::new(&storage);
        let mut page = FakePage::at("/card.html", "");
        assert_eq!(second.resolve(&mut page), set);
        assert_eq!(page.replaced, vec!["/card.html?name=Anna&pesel=90010112345"]);
    }

    #[test]
    fn access_only_query_yields_to_persisted_set() {
        let storage = InMemorySessionStore::default();
        let params = ParamStore::new(&storage);
        params.persist(&ParameterSet::parse("name=Anna&surname=Nowak"));

        let mut page = FakePage::at("/id.html", "?access=tok123");
        let resolved = params.load(&mut page);

        assert_eq!(resolved.get("name"), Some("Anna"));
        assert!(!resolved.contains(ACCESS_KEY));
        assert_eq!(
            storage.get_item(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some("name=Anna&surname=Nowak")
        );
    }

    #[test]
    fn access_only_set_is_never_persisted() {
        let storage = InMemorySessionStore::default();
        let params = ParamStore::new(&storage);
        params.persist(&ParameterSet::parse("name=Anna"));

        let outcome = params.persist(&ParameterSet::parse("access=tok"));
        assert_eq!(outcome, PersistOutcome::SkippedNoDocumentData);
        assert_eq!(params.persisted(), Some(ParameterSet::parse("name=Anna")));
    }

    #[test]
    fn access_only_query_without_stored_state_is_kept() {
        let storage = InMemorySessionStore::default();
        let params = ParamStore::new(&storage);
        let mut page = FakePage::at("/id.html", "access=tok");

        let resolved = params.load(&mut page);
        assert_eq!(resolved.get(ACCESS_KEY), Some("tok"));
        assert!(page.replaced.is_empty());
        assert_eq!(params.persisted(), None);
    }

    #[test]
    fn richer_query_overwrites_stored_set() {
        let storage = InMemorySessionStore::default();
        let params = ParamStore::new(&storage);
        params.persist(&ParameterSet::parse("name=Old"));

        let mut page = FakePage::at("/home.html", "name=New&access=tok");
        let resolved = params.load(&mut page);

        assert_eq!(resolved.get("name"), Some("New"));
        assert!(page.replaced.is_empty());
        assert_eq!(
            params.persisted(),
            Some(ParameterSet::parse("name=New&access=tok"))
        );
    }

    #[test]
    fn stored_set_without_name_is_adopted_but_address_kept() {
        let storage = InMemorySessionStore::default();
        storage.set_item(DEFAULT_STORAGE_KEY, "theme=dark").unwrap();
        let params = ParamStore::new(&storage);

        let mut page = FakePage::at("/home.html", "");
        let resolved = params.resolve(&mut page);
        assert_eq!(resolved.get("theme"), Some("dark"));
        assert!(page.replaced.is_empty());
    }

    #[test]
    fn denied_storage_degrades_to_query_string() {
        let params = ParamStore::new(DeniedStore);
        let mut page = FakePage::at("/home.html", "name=Anna");

        let resolved = params.load(&mut page);
        assert_eq!(resolved.get("name"), Some("Anna"));
        assert_eq!(params.persisted(), None);
        assert_eq!(params.persist(&resolved), PersistOutcome::StorageUnavailable);

        let mut empty = FakePage::at("/home.html", "");
        assert!(params.resolve(&mut empty).is_empty());
        assert!(empty.navigated.is_empty());
    }

    #[test]
    fn custom_storage_key_is_isolated() {
        let storage = InMemorySessionStore::default();
        let a = ParamStore::with_storage_key(&storage, "a");
        let b = ParamStore::with_storage_key(&storage, "b");
        a.persist(&ParameterSet::parse("name=A"));

        assert_eq!(b.persisted(), None);
        assert_eq!(a.storage_key(), "a");
    }
}
