use dw_masked_input::{DEFAULT_HIDE_DELAY_MS, DEFAULT_PLACEHOLDER, HidePolicy, MaskOptions};
use dw_params::{DEFAULT_STORAGE_KEY, ParamStore, SessionStore};
use dw_router::{DEFAULT_PAGE_EXTENSION, RouteTable, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage key cannot be empty")]
    EmptyStorageKey,
    #[error("page extension must start with '.', got {0:?}")]
    BadPageExtension(String),
}

/// Tunables for one page bundle. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub storage_key: String,
    pub page_extension: String,
    pub routes: RouteTable,
    pub placeholder: char,
    pub hide_delay_ms: u32,
    pub hide_policy: HidePolicy,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            page_extension: DEFAULT_PAGE_EXTENSION.to_owned(),
            routes: RouteTable::default(),
            placeholder: DEFAULT_PLACEHOLDER,
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
            hide_policy: HidePolicy::default(),
        }
    }
}

impl WalletConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if !self.page_extension.starts_with('.') {
            return Err(ConfigError::BadPageExtension(self.page_extension.clone()));
        }
        Ok(())
    }

    pub fn param_store<S: SessionStore>(&self, store: S) -> ParamStore<S> {
        ParamStore::with_storage_key(store, self.storage_key.clone())
    }

    pub fn router(&self) -> Router {
        Router::new(self.routes.clone(), self.page_extension.clone())
    }

    pub fn mask_options(&self) -> MaskOptions {
        MaskOptions {
            placeholder: self.placeholder,
            hide_delay_ms: self.hide_delay_ms,
            policy: self.hide_policy,
        }
    }
}
