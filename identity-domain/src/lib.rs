/*!
# Identity Domain

User and role identity management over a pluggable identity provider, using
hexagonal architecture principles.

This crate provides:
- Domain models for users, roles, claims and workflow responses
- Port definitions for the identity provider, store connector and configuration
- `UserManagementService`, the orchestration layer used by front-ends
- Local adapters: in-memory and JSON-file identity stores with Argon2 password hashing

## Architecture

```text
┌─────────────────────────────────────────────────────────────┐
│                    Primary Adapters                         │
│              identity-console (menu and scripts)            │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│                Application Layer                            │
│  • UserManagementService    • LookupCache    • Delta        │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│                 Domain Layer (Ports)                        │
│  • IdentityProvider  • IdentityStoreConnector               │
│  • ConfigurationPort                                        │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│              Infrastructure Layer (Adapters)                │
│  • LocalStoreConnector      • LocalIdentityProvider         │
│  • EnvConfigurationAdapter  • Argon2PasswordHasher          │
└─────────────────────────────────────────────────────────────┘
```

## Usage

```rust,no_run
use identity_domain::{
    application::services::UserManagementService,
    infrastructure::adapters::LocalStoreConnector,
    PasswordConfig,
};
use std::sync::Arc;

# async fn run() -> identity_domain::DomainResult<()> {
let connector = Arc::new(LocalStoreConnector::new(PasswordConfig::default())?);
let service = UserManagementService::open(connector, "memory:default", true).await?;

let response = service
    .create_user("alice", "Alice Liddell", "alice@example.com", "Wonder1and!")
    .await?;
assert!(response.success);

let users = service.get_users(Some("alice")).await?;
# Ok(())
# }
```
*/

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::ports::*;
pub use application::services::*;
pub use domain::entities::*;
pub use domain::errors::*;
