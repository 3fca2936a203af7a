//! Reduce upstream contacts to the flat shapes callers consume.

use serde::Serialize;

use crate::providers::Contact;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedClient {
    pub client_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

/// "Name — Email", or just "Name" when there is no email.
pub fn label(name: &str, email: &str) -> String {
    if email.is_empty() {
        name.to_string()
    } else {
        format!("{name} — {email}")
    }
}

/// First `limit` contacts in upstream order, minus any without an id or name.
pub fn options(contacts: Vec<Contact>, limit: usize) -> Vec<ClientOption> {
    contacts
        .into_iter()
        .take(limit)
        .filter_map(|c| {
            let id = c.contact_id.filter(|s| !s.is_empty())?;
            let name = c.name.filter(|s| !s.is_empty())?;
            let email = c.email_address.unwrap_or_default();
            Some(ClientOption {
                label: label(&name, &email),
                id,
            })
        })
        .collect()
}

/// Flatten a contact using its first address and first phone.
///
/// `client_id` falls back to the requested id when upstream omits it.
pub fn resolve(contact: Contact, requested_id: &str) -> ResolvedClient {
    let address = contact.addresses.into_iter().next().unwrap_or_default();
    let phone = contact.phones.into_iter().next().unwrap_or_default();

    ResolvedClient {
        client_id: contact
            .contact_id
            .unwrap_or_else(|| requested_id.to_string()),
        full_name: contact.name.unwrap_or_default(),
        email: contact.email_address.unwrap_or_default(),
        phone: phone.phone_number.unwrap_or_default(),
        address_line1: address.address_line1.unwrap_or_default(),
        city: address.city.unwrap_or_default(),
        state: address.region.unwrap_or_default(),
        postcode: address.postal_code.unwrap_or_default(),
        country: address.country.unwrap_or_default(),
    }
}
