mod api_client;
mod credential_store;

pub use api_client::{ApiClient, ApiClients};
pub use credential_store::CredentialStore;
