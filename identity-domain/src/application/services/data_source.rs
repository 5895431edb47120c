use super::user_management::{ActiveStore, UserManagementService};
use crate::{
    application::ports::{ConnectionTarget, IdentityStoreConnector},
    domain::errors::DomainResult,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

impl UserManagementService {
    /// Connect to `connection_string`, creating and migrating the store first when `initialize` is set
    pub async fn open(
        connector: Arc<dyn IdentityStoreConnector>,
        connection_string: &str,
        initialize: bool,
    ) -> DomainResult<Self> {
        let target = ConnectionTarget::parse(connection_string)?;
        if initialize {
            bootstrap(connector.as_ref(), &target).await;
        }

        let provider = connector.connect(&target).await?;
        let state = ActiveStore::load(provider, Some(target)).await?;
        Ok(Self {
            connector,
            state: RwLock::new(state),
        })
    }

    /// Point the service at another store.
    ///
    /// The new provider and its lookups are loaded before the swap; on any
    /// failure the current provider stays active. The swap waits for in-flight
    /// workflows to finish.
    #[instrument(skip(self))]
    pub async fn change_connection_string(&self, connection_string: &str) -> DomainResult<()> {
        let target = ConnectionTarget::parse(connection_string)?;

        info!("Switching identity store to '{}'", target);

        let provider = self.connector.connect(&target).await?;
        let next = ActiveStore::load(provider, Some(target)).await?;

        let mut state = self.state.write().await;
        *state = next;

        info!("Identity store switched ({} roles)", state.cache.role_count());
        Ok(())
    }

    /// Create the store if missing and apply pending migrations.
    ///
    /// Bootstrap failures are logged and ignored; an existing store counts as
    /// initialized.
    #[instrument(skip(self))]
    pub async fn initialize_database(&self, connection_string: &str) -> DomainResult<()> {
        let target = ConnectionTarget::parse(connection_string)?;
        bootstrap(self.connector.as_ref(), &target).await;
        Ok(())
    }
}

async fn bootstrap(connector: &dyn IdentityStoreConnector, target: &ConnectionTarget) {
    if let Err(e) = connector.ensure_created(target).await {
        debug!("Store '{}' was not created: {}", target, e);
    }

    match connector.pending_migrations(target).await {
        Ok(pending) if pending.is_empty() => {
            debug!("Store '{}' is up to date", target);
        }
        Ok(pending) => {
            info!("Applying {} migrations to '{}'", pending.len(), target);
            if let Err(e) = connector.migrate(target).await {
                debug!("Migrating store '{}' failed: {}", target, e);
            }
        }
        Err(e) => debug!("Reading migrations of '{}' failed: {}", target, e),
    }
}
