use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::traits::{AccountingApi, Contact};
use crate::error::RelayError;

/// Xero Accounting API client for the `/Contacts` endpoints.
///
/// Every call is scoped to an organisation by the `xero-tenant-id` header.
/// Xero answers in XML unless JSON is asked for explicitly.
pub struct XeroAccounting {
    api_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ContactsResponse {
    #[serde(rename = "Contacts", default)]
    contacts: Vec<Contact>,
}

impl XeroAccounting {
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { api_url, http })
    }

    /// Build `<api_url>/<segments...>` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RelayError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| RelayError::Internal(format!("Invalid XERO_API_URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| RelayError::Internal("XERO_API_URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_contacts(
        &self,
        url: Url,
        access_token: &str,
        tenant_id: &str,
    ) -> Result<Vec<Contact>, RelayError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header("xero-tenant-id", tenant_id)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Contacts request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ContactsResponse = resp.json().await.map_err(|e| {
            RelayError::InvalidResponse(format!("Failed to parse contacts response: {e}"))
        })?;

        Ok(parsed.contacts)
    }
}

/// `Name.Contains("...")` filter with quotes and backslashes escaped.
pub fn name_contains_filter(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
    format!("Name.Contains(\"{escaped}\")")
}

#[async_trait]
impl AccountingApi for XeroAccounting {
    async fn search_contacts(
        &self,
        access_token: &str,
        tenant_id: &str,
        query: &str,
    ) -> Result<Vec<Contact>, RelayError> {
        let mut url = self.endpoint(&["Contacts"])?;
        url.query_pairs_mut()
            .append_pair("where", &name_contains_filter(query));

        self.fetch_contacts(url, access_token, tenant_id).await
    }

    async fn get_contact(
        &self,
        access_token: &str,
        tenant_id: &str,
        contact_id: &str,
    ) -> Result<Option<Contact>, RelayError> {
        let url = self.endpoint(&["Contacts", contact_id])?;
        let contacts = self.fetch_contacts(url, access_token, tenant_id).await?;
        Ok(contacts.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> XeroAccounting {
        XeroAccounting::new(base.into(), Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn test_name_filter_escapes_quotes() {
        assert_eq!(name_contains_filter("Acme"), r#"Name.Contains("Acme")"#);
        assert_eq!(
            name_contains_filter(r#"Bob "B" \ Co"#),
            r#"Name.Contains("Bob \"B\" \\ Co")"#
        );
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("https://api.xero.com/api.xro/2.0");
        let url = api.endpoint(&["Contacts", "c1"]).unwrap();
        assert_eq!(url.as_str(), "https://api.xero.com/api.xro/2.0/Contacts/c1");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash_and_encodes_ids() {
        let api = client("https://api.xero.com/api.xro/2.0/");
        let url = api.endpoint(&["Contacts", "a/b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.xero.com/api.xro/2.0/Contacts/a%2Fb%20c"
        );
    }
}
