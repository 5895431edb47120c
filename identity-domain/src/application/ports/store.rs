use super::identity::IdentityProvider;
use crate::domain::errors::{DomainError, DomainResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Normalized descriptor of the identity store to connect to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionTarget(String);

impl ConnectionTarget {
    /// Trims surrounding whitespace and collapses doubled backslashes.
    ///
    /// Connection strings pasted from escaped source (`C:\\data\\users.json`)
    /// resolve to the same target as their unescaped form.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = normalize_connection_string(raw);
        if normalized.is_empty() {
            return Err(DomainError::blank_argument("connectionString"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of a `key=value;` setting, matching keys case-insensitively and
    /// ignoring spaces inside the key (`Data Source` == `DataSource`)
    pub fn setting(&self, key: &str) -> Option<&str> {
        let wanted = compact_key(key);
        self.0.split(';').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (compact_key(k) == wanted).then(|| v.trim())
        })
    }

    /// True when the target is written as `key=value` pairs
    pub fn is_key_value(&self) -> bool {
        self.0.contains('=')
    }
}

impl std::fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trim, then replace every `\\` with `\`
pub fn normalize_connection_string(raw: &str) -> String {
    raw.trim().replace("\\\\", "\\")
}

fn compact_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Port for binding identity providers to a data store
#[async_trait]
pub trait IdentityStoreConnector: Send + Sync {
    /// Build a fresh provider bound to `target`
    async fn connect(&self, target: &ConnectionTarget) -> DomainResult<Arc<dyn IdentityProvider>>;

    /// Create the store with the current schema if it does not exist yet
    async fn ensure_created(&self, target: &ConnectionTarget) -> DomainResult<()>;

    /// Names of schema migrations not yet applied to the store, oldest first
    async fn pending_migrations(&self, target: &ConnectionTarget) -> DomainResult<Vec<String>>;

    /// Apply every pending migration
    async fn migrate(&self, target: &ConnectionTarget) -> DomainResult<()>;
}
