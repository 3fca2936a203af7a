//! Process-local firm state: credential store, token cache, and the
//! on-demand refresher that keeps both current.

pub mod firms;
pub mod refresh;

pub use firms::{CachedToken, Firm, FirmStore};
pub use refresh::access_token;
