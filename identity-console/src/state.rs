use crate::config::Config;
use crate::error::ConsoleResult;
use identity_domain::{infrastructure::adapters::LocalStoreConnector, UserManagementService};
use std::sync::Arc;
use tracing::info;

/// Open the identity store named by the configuration and wire the service around it
pub async fn build_service(config: &Config) -> ConsoleResult<UserManagementService> {
    let connector = Arc::new(LocalStoreConnector::new(config.password.clone())?);

    let service = UserManagementService::open(
        connector,
        &config.store.connection_string,
        config.store.initialize_on_startup,
    )
    .await?;

    info!(
        connection = %config.store.connection_string,
        initialized = config.store.initialize_on_startup,
        "Identity store connected"
    );
    Ok(service)
}
