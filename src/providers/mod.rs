mod accounting;
mod identity;
mod traits;

pub use accounting::{name_contains_filter, XeroAccounting};
pub use identity::XeroIdentity;
pub use traits::{AccountingApi, Address, Contact, IdentityProvider, Phone, TokenSet};
