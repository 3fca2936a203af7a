use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RelayError;

/// Tokens returned by the identity provider after a refresh-token grant.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// A contact as returned by the accounting API.
///
/// Every field is optional upstream; shaping decides what a missing field means.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    #[serde(rename = "ContactID")]
    pub contact_id: Option<String>,
    pub name: Option<String>,
    pub email_address: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phones: Vec<Phone>,
}

/// Xero sends `null` for some empty collections; treat it like a missing key.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Phone {
    pub phone_number: Option<String>,
}

/// OAuth2 token endpoint that mints access tokens from refresh tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a refresh token for a new token set.
    ///
    /// Providers that rotate refresh tokens return the replacement in
    /// [`TokenSet::refresh_token`]; the old one must not be used again.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, RelayError>;
}

/// Tenant-scoped contact lookups on the accounting platform.
#[async_trait]
pub trait AccountingApi: Send + Sync {
    /// Contacts whose name contains `query`, in upstream order.
    async fn search_contacts(
        &self,
        access_token: &str,
        tenant_id: &str,
        query: &str,
    ) -> Result<Vec<Contact>, RelayError>;

    /// A single contact by id, or `None` if upstream returned an empty list.
    async fn get_contact(
        &self,
        access_token: &str,
        tenant_id: &str,
        contact_id: &str,
    ) -> Result<Option<Contact>, RelayError>;
}
