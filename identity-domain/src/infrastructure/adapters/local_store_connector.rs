use super::{
    document_store::{DocumentStore, JsonFileDocumentStore, MemoryDocumentStore},
    identity_document::{IdentityDocument, MIGRATIONS},
    local_identity_provider::LocalIdentityProvider,
    password::{Argon2PasswordHasher, PasswordPolicy},
};
use crate::{
    application::ports::{ConnectionTarget, IdentityProvider, IdentityStoreConnector, PasswordConfig},
    domain::errors::{DomainResult, StoreError},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

const MEMORY_PREFIX: &str = "memory:";
const PATH_KEYS: &[&str] = &["Data Source", "Filename"];

/// Connects to local identity stores.
///
/// Accepted targets:
/// - `memory:<name>`: a named store kept in this connector for the life of the process
/// - `Data Source=<path>` or `Filename=<path>`, optionally among other `key=value;` pairs
/// - a bare file path
pub struct LocalStoreConnector {
    password: PasswordConfig,
    memory_stores: Mutex<HashMap<String, Arc<MemoryDocumentStore>>>,
}

impl LocalStoreConnector {
    pub fn new(password: PasswordConfig) -> DomainResult<Self> {
        password.validate()?;
        Ok(Self {
            password,
            memory_stores: Mutex::new(HashMap::new()),
        })
    }

    async fn resolve(&self, target: &ConnectionTarget) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let raw = target.as_str();

        if let Some(name) = strip_prefix_ignore_case(raw, MEMORY_PREFIX) {
            let name = name.trim();
            if name.is_empty() {
                return Err(StoreError::InvalidTarget {
                    message: "Memory store name is empty".to_string(),
                });
            }
            let mut stores = self.memory_stores.lock().await;
            let store: Arc<dyn DocumentStore> = stores
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(MemoryDocumentStore::new(name)))
                .clone();
            return Ok(store);
        }

        let path = if target.is_key_value() {
            PATH_KEYS
                .iter()
                .find_map(|key| target.setting(key))
                .filter(|path| !path.is_empty())
                .ok_or_else(|| StoreError::InvalidTarget {
                    message: format!("'{raw}' names neither a Data Source nor a Filename"),
                })?
        } else {
            raw
        };

        Ok(Arc::new(JsonFileDocumentStore::new(path)?))
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

#[async_trait]
impl IdentityStoreConnector for LocalStoreConnector {
    #[instrument(skip(self), fields(target = %target))]
    async fn connect(&self, target: &ConnectionTarget) -> DomainResult<Arc<dyn IdentityProvider>> {
        let store = self.resolve(target).await?;
        let document = store.load().await?;

        let pending = document.pending_migrations();
        if !pending.is_empty() {
            warn!(
                "Store {} has {} pending migrations: {}",
                store.location(),
                pending.len(),
                pending.join(", ")
            );
        }

        let provider = LocalIdentityProvider::new(
            store,
            Argon2PasswordHasher::from_config(&self.password)?,
            PasswordPolicy::from_config(&self.password),
        );
        info!("Connected to identity store {}", provider.location());
        Ok(Arc::new(provider))
    }

    async fn ensure_created(&self, target: &ConnectionTarget) -> DomainResult<()> {
        let store = self.resolve(target).await?;
        if store.exists().await? {
            return Ok(());
        }
        store.save(&IdentityDocument::new()).await?;
        info!("Created identity store {}", store.location());
        Ok(())
    }

    async fn pending_migrations(&self, target: &ConnectionTarget) -> DomainResult<Vec<String>> {
        let store = self.resolve(target).await?;
        if !store.exists().await? {
            return Ok(MIGRATIONS.iter().map(|m| m.name.to_string()).collect());
        }
        let document = store.load().await?;
        Ok(document
            .pending_migrations()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    async fn migrate(&self, target: &ConnectionTarget) -> DomainResult<()> {
        let store = self.resolve(target).await?;
        if !store.exists().await? {
            store.save(&IdentityDocument::new()).await?;
            info!("Created identity store {}", store.location());
            return Ok(());
        }

        let mut document = store.load().await?;
        let applied = document.migrate()?;
        if !applied.is_empty() {
            store.save(&document).await?;
        }
        Ok(())
    }
}
