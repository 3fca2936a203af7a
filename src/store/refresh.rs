//! On-demand access token refresh with refresh-token rotation.
//!
//! A cached token is reused while it has more than [`EXPIRY_MARGIN_SECS`]
//! left. Otherwise the firm's refresh token is exchanged for a new token set,
//! and the rotated refresh token replaces the stored one.

use chrono::Duration;
use tracing::{debug, error, info};

use super::firms::{CachedToken, FirmStore};
use crate::error::RelayError;
use crate::providers::IdentityProvider;

/// Tokens this close to expiry are treated as already expired.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the provider omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 1800;

/// Return a usable access token for `firm_id`, refreshing if needed.
pub async fn access_token(
    store: &FirmStore,
    identity: &dyn IdentityProvider,
    firm_id: &str,
) -> Result<String, RelayError> {
    let margin = Duration::seconds(EXPIRY_MARGIN_SECS);

    if let Some(token) = fresh_token(store, firm_id, margin).await {
        return Ok(token);
    }

    let guard = store.refresh_guard(firm_id);
    let _refreshing = guard.lock().await;

    // Another request may have refreshed while we waited on the guard.
    if let Some(token) = fresh_token(store, firm_id, margin).await {
        return Ok(token);
    }

    let firm = store
        .get(firm_id)
        .await
        .filter(|f| !f.refresh_token.is_empty())
        .ok_or_else(|| RelayError::NotConnected(firm_id.to_string()))?;

    let tokens = match identity.refresh_token(&firm.refresh_token).await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!(firm_id, "Token refresh failed: {e}");
            return Err(e);
        }
    };

    if let Some(rotated) = tokens.refresh_token {
        store.rotate_refresh_token(firm_id, rotated).await;
    }

    let cached = CachedToken::new(
        tokens.access_token.clone(),
        tokens.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
    );
    info!(firm_id, expires_at = %cached.expires_at, "Refreshed access token");
    store.cache_token(firm_id, cached).await;

    Ok(tokens.access_token)
}

async fn fresh_token(store: &FirmStore, firm_id: &str, margin: Duration) -> Option<String> {
    let cached = store.cached_token(firm_id).await?;
    if cached.is_fresh(margin) {
        debug!(firm_id, "Using cached access token");
        Some(cached.access_token)
    } else {
        None
    }
}
