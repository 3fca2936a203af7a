pub mod api;
pub mod config;
pub mod error;
pub mod providers;
pub mod store;

pub use config::Config;
pub use error::RelayError;

use std::sync::Arc;

use providers::{AccountingApi, IdentityProvider, XeroAccounting, XeroIdentity};
use store::FirmStore;

/// Shared application state passed to all API handlers.
pub struct AppState {
    pub config: Config,
    pub store: FirmStore,
    pub identity: Box<dyn IdentityProvider>,
    pub accounting: Box<dyn AccountingApi>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// State wired to the real Xero endpoints named in `config`.
    pub fn from_config(config: Config) -> Result<Self, RelayError> {
        let identity = XeroIdentity::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.token_url.clone(),
            config.upstream_timeout,
        )?;
        let accounting = XeroAccounting::new(config.api_url.clone(), config.upstream_timeout)?;

        Ok(Self {
            config,
            store: FirmStore::new(),
            identity: Box::new(identity),
            accounting: Box::new(accounting),
        })
    }
}
