pub mod document_store;
pub mod env_config;
pub mod identity_document;
pub mod identity_errors;
pub mod local_identity_provider;
pub mod local_store_connector;
pub mod password;

pub use document_store::{DocumentStore, JsonFileDocumentStore, MemoryDocumentStore};
pub use env_config::*;
pub use identity_document::{IdentityDocument, CURRENT_SCHEMA_VERSION};
pub use local_identity_provider::LocalIdentityProvider;
pub use local_store_connector::LocalStoreConnector;
pub use password::{Argon2PasswordHasher, PasswordPolicy};
