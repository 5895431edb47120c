//! Persisted shape of a local identity store and its schema migrations.

use crate::domain::{
    entities::{Claim, EntityId, Role, User},
    errors::StoreError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Ordered schema migrations; each one moves the document to `version`
pub struct Migration {
    pub name: &'static str,
    pub version: u32,
    apply: fn(&mut IdentityDocument) -> Result<(), StoreError>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "0001_initial_schema",
        version: 1,
        apply: initial_schema,
    },
    Migration {
        name: "0002_user_lockout",
        version: 2,
        apply: enable_lockout,
    },
];

fn initial_schema(_: &mut IdentityDocument) -> Result<(), StoreError> {
    Ok(())
}

// Schema 1 had no lockout support; every existing account becomes lockable.
fn enable_lockout(document: &mut IdentityDocument) -> Result<(), StoreError> {
    for user in &mut document.users {
        user.lockout_enabled = true;
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityDocument {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub applied_migrations: Vec<String>,
    #[serde(default)]
    pub users: Vec<StoredUser>,
    #[serde(default)]
    pub roles: Vec<StoredRole>,
    #[serde(default)]
    pub user_roles: Vec<UserRoleLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: EntityId,
    pub username: String,
    pub normalized_username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed: bool,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub lockout_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lockout_enabled: bool,
    #[serde(default)]
    pub access_failed_count: u32,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRole {
    pub id: EntityId,
    pub name: String,
    pub normalized_name: String,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleLink {
    pub user_id: EntityId,
    pub role_id: EntityId,
}

/// Case-insensitive lookup key for user and role names
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

impl IdentityDocument {
    /// Empty document at the current schema with every migration recorded
    pub fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            applied_migrations: MIGRATIONS.iter().map(|m| m.name.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn pending_migrations(&self) -> Vec<&'static str> {
        MIGRATIONS
            .iter()
            .filter(|m| !self.applied_migrations.iter().any(|a| a == m.name))
            .map(|m| m.name)
            .collect()
    }

    /// Apply pending migrations in order and return their names
    pub fn migrate(&mut self) -> Result<Vec<String>, StoreError> {
        let mut applied = Vec::new();
        for migration in MIGRATIONS {
            if self.applied_migrations.iter().any(|a| a == migration.name) {
                continue;
            }
            (migration.apply)(self).map_err(|e| StoreError::Migration {
                name: migration.name.to_string(),
                message: e.to_string(),
            })?;
            self.schema_version = self.schema_version.max(migration.version);
            self.applied_migrations.push(migration.name.to_string());
            info!("Applied migration {}", migration.name);
            applied.push(migration.name.to_string());
        }
        Ok(applied)
    }

    pub fn user(&self, id: &str) -> Option<&StoredUser> {
        self.users.iter().find(|u| u.id.as_str() == id)
    }

    pub fn user_mut(&mut self, id: &str) -> Option<&mut StoredUser> {
        self.users.iter_mut().find(|u| u.id.as_str() == id)
    }

    pub fn user_by_name(&self, username: &str) -> Option<&StoredUser> {
        let wanted = normalize_name(username);
        self.users.iter().find(|u| u.normalized_username == wanted)
    }

    pub fn role(&self, id: &str) -> Option<&StoredRole> {
        self.roles.iter().find(|r| r.id.as_str() == id)
    }

    pub fn role_mut(&mut self, id: &str) -> Option<&mut StoredRole> {
        self.roles.iter_mut().find(|r| r.id.as_str() == id)
    }

    pub fn role_by_name(&self, name: &str) -> Option<&StoredRole> {
        let wanted = normalize_name(name);
        self.roles.iter().find(|r| r.normalized_name == wanted)
    }

    pub fn is_member(&self, user_id: &str, role_id: &str) -> bool {
        self.user_roles
            .iter()
            .any(|l| l.user_id.as_str() == user_id && l.role_id.as_str() == role_id)
    }

    /// Role ids of a user, ordered by role name
    pub fn role_ids_of(&self, user_id: &str) -> Vec<EntityId> {
        let mut roles: Vec<&StoredRole> = self
            .user_roles
            .iter()
            .filter(|l| l.user_id.as_str() == user_id)
            .filter_map(|l| self.role(l.role_id.as_str()))
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles.into_iter().map(|r| r.id.clone()).collect()
    }

    pub fn to_user(&self, stored: &StoredUser) -> User {
        User {
            id: stored.id.clone(),
            username: stored.username.clone(),
            email: stored.email.clone(),
            email_confirmed: stored.email_confirmed,
            lockout_end: stored.lockout_end,
            lockout_enabled: stored.lockout_enabled,
            access_failed_count: stored.access_failed_count,
            role_ids: self.role_ids_of(stored.id.as_str()),
            claims: stored.claims.clone(),
        }
    }

    pub fn to_role(stored: &StoredRole) -> Role {
        Role {
            id: stored.id.clone(),
            name: stored.name.clone(),
            claims: stored.claims.clone(),
        }
    }
}

impl StoredUser {
    pub fn from_user(user: &User, password_hash: Option<String>) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            normalized_username: normalize_name(&user.username),
            email: user.email.clone(),
            email_confirmed: user.email_confirmed,
            password_hash,
            lockout_end: user.lockout_end,
            lockout_enabled: user.lockout_enabled,
            access_failed_count: user.access_failed_count,
            claims: user.claims.clone(),
        }
    }
}

impl StoredRole {
    pub fn from_role(role: &Role) -> Self {
        Self {
            id: role.id.clone(),
            name: role.name.clone(),
            normalized_name: normalize_name(&role.name),
            claims: role.claims.clone(),
        }
    }
}
