use anyhow::{Context, Result};
use std::time::Duration;

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,

    // ── Xero OAuth app credentials ──────────────────────────────────────
    /// Empty when `XERO_CLIENT_ID` is unset; refreshes will then be rejected upstream.
    pub client_id: String,
    pub client_secret: String,

    // ── Upstream endpoints ──────────────────────────────────────────────
    pub token_url: String,
    pub api_url: String,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let timeout_secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .context("Invalid UPSTREAM_TIMEOUT_SECS")?;

        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "10000".into())
                .parse()
                .context("Invalid PORT")?,

            client_id: std::env::var("XERO_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("XERO_CLIENT_SECRET").unwrap_or_default(),

            token_url: std::env::var("XERO_TOKEN_URL")
                .unwrap_or_else(|_| "https://identity.xero.com/connect/token".into()),
            api_url: std::env::var("XERO_API_URL")
                .unwrap_or_else(|_| "https://api.xero.com/api.xro/2.0".into()),
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Whether both halves of the OAuth client credential pair are present.
    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 10000,
            client_id: "id".into(),
            client_secret: String::new(),
            token_url: "http://localhost/token".into(),
            api_url: "http://localhost/api".into(),
            upstream_timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_missing_secret_is_not_a_credential_pair() {
        let mut config = sample();
        assert!(!config.has_client_credentials());
        config.client_secret = "secret".into();
        assert!(config.has_client_credentials());
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(sample().bind_addr(), "127.0.0.1:10000");
    }
}
