//! In-memory credential store and token cache, keyed by firm id.
//!
//! State lives for the lifetime of the process only.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// Connection state for one firm.
#[derive(Debug, Clone, PartialEq)]
pub struct Firm {
    pub firm_id: String,
    pub tenant_id: String,
    /// Latest refresh token this process has seen; replaced on every rotation.
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(access_token: String, expires_in_secs: u64) -> Self {
        // clamp so absurd upstream values cannot overflow the timestamp
        let secs = expires_in_secs.min(i32::MAX as u64) as i64;
        Self {
            access_token,
            expires_at: Utc::now() + Duration::seconds(secs),
        }
    }

    /// True when more than `margin` remains before expiry.
    pub fn is_fresh(&self, margin: Duration) -> bool {
        self.expires_at - Utc::now() > margin
    }
}

/// Credential store + token cache.
///
/// The per-firm refresh guards serialize refresh-token grants so one
/// rotation cannot race another for the same firm.
#[derive(Default)]
pub struct FirmStore {
    firms: RwLock<HashMap<String, Firm>>,
    tokens: RwLock<HashMap<String, CachedToken>>,
    guards: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FirmStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite a firm and drop its cached token.
    ///
    /// Waits out any refresh in flight for the firm, so its result cannot
    /// land on top of the new credentials.
    pub async fn connect(&self, firm: Firm) {
        let firm_id = firm.firm_id.clone();
        let guard = self.refresh_guard(&firm_id);
        let _refreshing = guard.lock().await;

        self.firms.write().await.insert(firm_id.clone(), firm);
        self.tokens.write().await.remove(&firm_id);
    }

    pub async fn get(&self, firm_id: &str) -> Option<Firm> {
        self.firms.read().await.get(firm_id).cloned()
    }

    pub async fn cached_token(&self, firm_id: &str) -> Option<CachedToken> {
        self.tokens.read().await.get(firm_id).cloned()
    }

    pub async fn cache_token(&self, firm_id: &str, token: CachedToken) {
        self.tokens.write().await.insert(firm_id.to_string(), token);
    }

    /// Replace the stored refresh token after a rotation.
    ///
    /// No-op if the firm vanished; connect is the only way to create one.
    pub async fn rotate_refresh_token(&self, firm_id: &str, refresh_token: String) {
        if let Some(firm) = self.firms.write().await.get_mut(firm_id) {
            firm.refresh_token = refresh_token;
        }
    }

    /// Guard that must be held while refreshing `firm_id`.
    pub fn refresh_guard(&self, firm_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut guards = self
            .guards
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guards.entry(firm_id.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firm(id: &str, refresh: &str) -> Firm {
        Firm {
            firm_id: id.into(),
            tenant_id: format!("tenant-{id}"),
            refresh_token: refresh.into(),
        }
    }

    #[tokio::test]
    async fn test_connect_overwrites_and_clears_cache() {
        let store = FirmStore::new();
        store.connect(firm("f1", "r1")).await;
        store
            .cache_token("f1", CachedToken::new("a1".into(), 1800))
            .await;

        store.connect(firm("f1", "r2")).await;

        assert_eq!(store.get("f1").await.unwrap().refresh_token, "r2");
        assert!(store.cached_token("f1").await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() {
        let store = FirmStore::new();
        store.connect(firm("f1", "r1")).await;
        assert!(store.get("f1").await.is_some());
        assert!(store.get("F1").await.is_none());
        assert!(store.get("f1 ").await.is_none());
    }

    #[tokio::test]
    async fn test_rotate_refresh_token() {
        let store = FirmStore::new();
        store.connect(firm("f1", "r1")).await;
        store.rotate_refresh_token("f1", "r2".into()).await;
        assert_eq!(store.get("f1").await.unwrap().refresh_token, "r2");

        // unknown firms are not created by rotation
        store.rotate_refresh_token("ghost", "x".into()).await;
        assert!(store.get("ghost").await.is_none());
    }

    #[test]
    fn test_freshness_margin() {
        let margin = Duration::seconds(60);
        assert!(CachedToken::new("a".into(), 1800).is_fresh(margin));
        assert!(!CachedToken::new("a".into(), 30).is_fresh(margin));
        assert!(!CachedToken::new("a".into(), 0).is_fresh(margin));
    }

    #[test]
    fn test_guard_is_shared_per_firm() {
        let store = FirmStore::new();
        let a = store.refresh_guard("f1");
        let b = store.refresh_guard("f1");
        let c = store.refresh_guard("f2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
