use super::identity_document::IdentityDocument;
use crate::domain::errors::StoreError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Whole-document persistence for a local identity store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable location used in logs and errors
    fn location(&self) -> String;

    async fn exists(&self) -> Result<bool, StoreError>;

    /// Fails with `StoreError::Missing` when the store was never created
    async fn load(&self) -> Result<IdentityDocument, StoreError>;

    async fn save(&self, document: &IdentityDocument) -> Result<(), StoreError>;
}

/// Process-local store; lives as long as the connector that registered it
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    name: String,
    document: RwLock<Option<IdentityDocument>>,
}

impl MemoryDocumentStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document: RwLock::new(None),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.document.read().await.is_some())
    }

    async fn load(&self) -> Result<IdentityDocument, StoreError> {
        self.document
            .read()
            .await
            .clone()
            .ok_or_else(|| StoreError::Missing {
                location: self.location(),
            })
    }

    async fn save(&self, document: &IdentityDocument) -> Result<(), StoreError> {
        *self.document.write().await = Some(document.clone());
        Ok(())
    }
}

/// JSON file store; saves go through a temp file in the same directory and a rename
#[derive(Debug, Clone)]
pub struct JsonFileDocumentStore {
    path: PathBuf,
}

impl JsonFileDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(StoreError::InvalidTarget {
                message: "Identity store path is empty".to_string(),
            });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            location: self.location(),
            source,
        }
    }

    async fn create_temp_file(&self, dir: &Path) -> Result<(tokio::fs::File, PathBuf), StoreError> {
        const MAX_ATTEMPTS: u32 = 100;
        let base = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "identity".to_string());

        for attempt in 0..MAX_ATTEMPTS {
            let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(file) => return Ok((file, candidate)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(self.io_error(e)),
            }
        }

        Err(self.io_error(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "no free temp file name after repeated attempts",
        )))
    }
}

#[async_trait]
impl DocumentStore for JsonFileDocumentStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn load(&self) -> Result<IdentityDocument, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Missing {
                    location: self.location(),
                })
            }
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, document: &IdentityDocument) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(document)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| self.io_error(e))?;

        let (mut file, temp_path) = self.create_temp_file(&dir).await?;

        let written = async {
            file.write_all(&content).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                warn!("Failed to remove temp file {}: {}", temp_path.display(), cleanup);
            }
            return Err(self.io_error(e));
        }

        debug!("Saved identity store to {}", self.location());
        Ok(())
    }
}
