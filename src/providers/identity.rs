use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::traits::{IdentityProvider, TokenSet};
use crate::error::RelayError;

/// Xero identity provider (`identity.xero.com`).
///
/// Quirks:
/// - Client credentials go in HTTP Basic auth, not the form body.
/// - Refresh tokens are single-use: every successful refresh returns a new one.
/// - Access tokens live 30 minutes.
pub struct XeroIdentity {
    client_id: String,
    client_secret: String,
    token_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct XeroTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl XeroIdentity {
    pub fn new(
        client_id: String,
        client_secret: String,
        token_url: String,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client_id,
            client_secret,
            token_url,
            http,
        })
    }
}

#[async_trait]
impl IdentityProvider for XeroIdentity {
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, RelayError> {
        let resp = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Refresh request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let token_resp: XeroTokenResponse = resp.json().await.map_err(|e| {
            RelayError::InvalidResponse(format!("Failed to parse refresh response: {e}"))
        })?;

        Ok(TokenSet {
            access_token: token_resp.access_token,
            refresh_token: token_resp.refresh_token,
            expires_in: token_resp.expires_in,
        })
    }
}
