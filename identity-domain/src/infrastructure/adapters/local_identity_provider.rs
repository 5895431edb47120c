use super::{
    document_store::DocumentStore,
    identity_document::{normalize_name, IdentityDocument, StoredRole, StoredUser, UserRoleLink},
    identity_errors,
    password::{Argon2PasswordHasher, PasswordPolicy},
};
use crate::{
    application::ports::IdentityProvider,
    domain::{
        entities::*,
        errors::{DomainResult, StoreError},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Identity provider backed by a [`DocumentStore`].
///
/// Every mutation loads the document, applies the change and saves it back
/// under a single write lock. Refused changes are never saved.
pub struct LocalIdentityProvider {
    store: Arc<dyn DocumentStore>,
    hasher: Argon2PasswordHasher,
    policy: PasswordPolicy,
    write_lock: Mutex<()>,
}

impl LocalIdentityProvider {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        hasher: Argon2PasswordHasher,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    async fn read<T, F>(&self, f: F) -> DomainResult<T>
    where
        F: FnOnce(&IdentityDocument) -> T + Send,
    {
        let document = self.store.load().await?;
        Ok(f(&document))
    }

    async fn write<F>(&self, f: F) -> DomainResult<IdentityResult>
    where
        F: FnOnce(&mut IdentityDocument) -> IdentityResult + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await?;
        let result = f(&mut document);
        if result.succeeded() {
            self.store.save(&document).await?;
        } else {
            debug!("Change refused: {}", result.messages());
        }
        Ok(result)
    }

    /// Argon2 runs on the blocking pool
    async fn hash(&self, password: &str) -> Result<String, StoreError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(hashing_task_failed)?
    }

    async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, StoreError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(hashing_task_failed)
    }
}

fn hashing_task_failed(err: tokio::task::JoinError) -> StoreError {
    StoreError::Hashing {
        message: err.to_string(),
    }
}

fn valid_user_name(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._@+".contains(c))
}

fn check_user_name(document: &IdentityDocument, user: &User) -> Vec<IdentityError> {
    if !valid_user_name(&user.username) {
        return vec![identity_errors::invalid_user_name(&user.username)];
    }
    match document.user_by_name(&user.username) {
        Some(other) if other.id != user.id => {
            vec![identity_errors::duplicate_user_name(&user.username)]
        }
        _ => Vec::new(),
    }
}

fn check_role_name(document: &IdentityDocument, role: &Role) -> Vec<IdentityError> {
    if role.name.trim().is_empty() {
        return vec![identity_errors::invalid_role_name(&role.name)];
    }
    match document.role_by_name(&role.name) {
        Some(other) if other.id != role.id => {
            vec![identity_errors::duplicate_role_name(&role.name)]
        }
        _ => Vec::new(),
    }
}

fn with_user<F>(document: &mut IdentityDocument, user_id: &str, f: F) -> IdentityResult
where
    F: FnOnce(&mut StoredUser) -> IdentityResult,
{
    match document.user_mut(user_id) {
        Some(user) => f(user),
        None => IdentityResult::failed(vec![identity_errors::user_not_found(user_id)]),
    }
}

fn with_role<F>(document: &mut IdentityDocument, role_id: &str, f: F) -> IdentityResult
where
    F: FnOnce(&mut StoredRole) -> IdentityResult,
{
    match document.role_mut(role_id) {
        Some(role) => f(role),
        None => IdentityResult::failed(vec![identity_errors::role_not_found(role_id)]),
    }
}

fn remove_claim(claims: &mut Vec<Claim>, claim: &Claim) {
    claims.retain(|c| !c.matches(&claim.claim_type, &claim.value));
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn find_user_by_id(&self, user_id: &str) -> DomainResult<Option<User>> {
        self.read(|doc| doc.user(user_id).map(|u| doc.to_user(u))).await
    }

    async fn find_user_by_name(&self, username: &str) -> DomainResult<Option<User>> {
        self.read(|doc| doc.user_by_name(username).map(|u| doc.to_user(u)))
            .await
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.read(|doc| doc.users.iter().map(|u| doc.to_user(u)).collect())
            .await
    }

    #[instrument(skip(self, user, password), fields(username = %user.username))]
    async fn create_user(&self, user: &User, password: &str) -> DomainResult<IdentityResult> {
        let password_errors = self.policy.validate(password);
        let password_hash = if password_errors.is_empty() {
            Some(self.hash(password).await?)
        } else {
            None
        };

        self.write(|doc| {
            let mut errors = check_user_name(doc, user);
            if doc.user(user.id.as_str()).is_some() {
                errors.push(identity_errors::duplicate_user_name(&user.username));
            }
            errors.extend(password_errors);
            if !errors.is_empty() {
                return IdentityResult::failed(errors);
            }

            doc.users.push(StoredUser::from_user(user, password_hash));
            IdentityResult::success()
        })
        .await
    }

    async fn update_user(&self, user: &User) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            let errors = check_user_name(doc, user);
            if !errors.is_empty() {
                return IdentityResult::failed(errors);
            }
            with_user(doc, user.id.as_str(), |stored| {
                stored.username = user.username.clone();
                stored.normalized_username = normalize_name(&user.username);
                stored.email = user.email.clone();
                stored.email_confirmed = user.email_confirmed;
                stored.lockout_enabled = user.lockout_enabled;
                IdentityResult::success()
            })
        })
        .await
    }

    async fn delete_user(&self, user_id: &str) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            if doc.user(user_id).is_none() {
                return IdentityResult::failed(vec![identity_errors::user_not_found(user_id)]);
            }
            doc.users.retain(|u| u.id.as_str() != user_id);
            doc.user_roles.retain(|l| l.user_id.as_str() != user_id);
            IdentityResult::success()
        })
        .await
    }

    async fn get_user_roles(&self, user_id: &str) -> DomainResult<Vec<String>> {
        self.read(|doc| {
            doc.role_ids_of(user_id)
                .iter()
                .filter_map(|id| doc.role(id.as_str()).map(|r| r.name.clone()))
                .collect()
        })
        .await
    }

    async fn add_user_to_role(
        &self,
        user_id: &str,
        role_name: &str,
    ) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            if doc.user(user_id).is_none() {
                return IdentityResult::failed(vec![identity_errors::user_not_found(user_id)]);
            }
            let Some(role_id) = doc.role_by_name(role_name).map(|r| r.id.clone()) else {
                return IdentityResult::failed(vec![identity_errors::role_not_found(role_name)]);
            };
            if doc.is_member(user_id, role_id.as_str()) {
                return IdentityResult::failed(vec![identity_errors::user_already_in_role(
                    role_name,
                )]);
            }
            doc.user_roles.push(UserRoleLink {
                user_id: EntityId::from(user_id),
                role_id,
            });
            IdentityResult::success()
        })
        .await
    }

    async fn remove_user_from_role(
        &self,
        user_id: &str,
        role_name: &str,
    ) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            let role_id = doc.role_by_name(role_name).map(|r| r.id.clone());
            match role_id {
                Some(role_id) if doc.is_member(user_id, role_id.as_str()) => {
                    doc.user_roles.retain(|l| {
                        !(l.user_id.as_str() == user_id && l.role_id == role_id)
                    });
                    IdentityResult::success()
                }
                _ => IdentityResult::failed(vec![identity_errors::user_not_in_role(role_name)]),
            }
        })
        .await
    }

    async fn get_users_in_role(&self, role_name: &str) -> DomainResult<Vec<User>> {
        self.read(|doc| {
            let Some(role) = doc.role_by_name(role_name) else {
                return Vec::new();
            };
            doc.users
                .iter()
                .filter(|u| doc.is_member(u.id.as_str(), role.id.as_str()))
                .map(|u| doc.to_user(u))
                .collect()
        })
        .await
    }

    async fn get_user_claims(&self, user_id: &str) -> DomainResult<Vec<Claim>> {
        self.read(|doc| doc.user(user_id).map(|u| u.claims.clone()).unwrap_or_default())
            .await
    }

    async fn add_user_claim(&self, user_id: &str, claim: &Claim) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            with_user(doc, user_id, |user| {
                user.claims.push(claim.clone());
                IdentityResult::success()
            })
        })
        .await
    }

    async fn remove_user_claim(
        &self,
        user_id: &str,
        claim: &Claim,
    ) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            with_user(doc, user_id, |user| {
                remove_claim(&mut user.claims, claim);
                IdentityResult::success()
            })
        })
        .await
    }

    async fn has_password(&self, user_id: &str) -> DomainResult<bool> {
        self.read(|doc| doc.user(user_id).is_some_and(|u| u.password_hash.is_some()))
            .await
    }

    async fn add_password(&self, user_id: &str, password: &str) -> DomainResult<IdentityResult> {
        let errors = self.policy.validate(password);
        if !errors.is_empty() {
            return Ok(IdentityResult::failed(errors));
        }
        let hash = self.hash(password).await?;

        self.write(|doc| {
            with_user(doc, user_id, |user| {
                if user.password_hash.is_some() {
                    return IdentityResult::failed(vec![
                        identity_errors::user_already_has_password(),
                    ]);
                }
                user.password_hash = Some(hash);
                IdentityResult::success()
            })
        })
        .await
    }

    async fn remove_password(&self, user_id: &str) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            with_user(doc, user_id, |user| {
                user.password_hash = None;
                IdentityResult::success()
            })
        })
        .await
    }

    #[instrument(skip(self, current_password, new_password))]
    async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<IdentityResult> {
        let stored_hash = self
            .read(|doc| doc.user(user_id).map(|u| u.password_hash.clone()))
            .await?;

        let Some(stored_hash) = stored_hash else {
            return Ok(IdentityResult::failed(vec![identity_errors::user_not_found(
                user_id,
            )]));
        };

        let verified = match stored_hash.as_deref() {
            Some(hash) => self.verify(current_password, hash).await?,
            None => false,
        };
        if !verified {
            return Ok(IdentityResult::failed(vec![identity_errors::password_mismatch()]));
        }

        let errors = self.policy.validate(new_password);
        if !errors.is_empty() {
            return Ok(IdentityResult::failed(errors));
        }
        let hash = self.hash(new_password).await?;

        self.write(|doc| {
            with_user(doc, user_id, |user| {
                user.password_hash = Some(hash);
                IdentityResult::success()
            })
        })
        .await
    }

    async fn get_lockout_end(&self, user_id: &str) -> DomainResult<Option<DateTime<Utc>>> {
        self.read(|doc| doc.user(user_id).and_then(|u| u.lockout_end))
            .await
    }

    async fn set_lockout_end(
        &self,
        user_id: &str,
        lockout_end: Option<DateTime<Utc>>,
    ) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            with_user(doc, user_id, |user| {
                if !user.lockout_enabled {
                    return IdentityResult::failed(vec![
                        identity_errors::user_lockout_not_enabled(),
                    ]);
                }
                user.lockout_end = lockout_end;
                IdentityResult::success()
            })
        })
        .await
    }

    async fn get_access_failed_count(&self, user_id: &str) -> DomainResult<u32> {
        self.read(|doc| doc.user(user_id).map_or(0, |u| u.access_failed_count))
            .await
    }

    async fn reset_access_failed_count(&self, user_id: &str) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            with_user(doc, user_id, |user| {
                user.access_failed_count = 0;
                IdentityResult::success()
            })
        })
        .await
    }

    async fn find_role_by_id(&self, role_id: &str) -> DomainResult<Option<Role>> {
        self.read(|doc| doc.role(role_id).map(IdentityDocument::to_role))
            .await
    }

    async fn list_roles(&self) -> DomainResult<Vec<Role>> {
        self.read(|doc| doc.roles.iter().map(IdentityDocument::to_role).collect())
            .await
    }

    async fn create_role(&self, role: &Role) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            let errors = check_role_name(doc, role);
            if !errors.is_empty() {
                return IdentityResult::failed(errors);
            }
            doc.roles.push(StoredRole::from_role(role));
            IdentityResult::success()
        })
        .await
    }

    async fn update_role(&self, role: &Role) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            let errors = check_role_name(doc, role);
            if !errors.is_empty() {
                return IdentityResult::failed(errors);
            }
            with_role(doc, role.id.as_str(), |stored| {
                stored.name = role.name.clone();
                stored.normalized_name = normalize_name(&role.name);
                IdentityResult::success()
            })
        })
        .await
    }

    async fn delete_role(&self, role_id: &str) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            if doc.role(role_id).is_none() {
                return IdentityResult::failed(vec![identity_errors::role_not_found(role_id)]);
            }
            doc.roles.retain(|r| r.id.as_str() != role_id);
            doc.user_roles.retain(|l| l.role_id.as_str() != role_id);
            IdentityResult::success()
        })
        .await
    }

    async fn get_role_claims(&self, role_id: &str) -> DomainResult<Vec<Claim>> {
        self.read(|doc| doc.role(role_id).map(|r| r.claims.clone()).unwrap_or_default())
            .await
    }

    async fn add_role_claim(&self, role_id: &str, claim: &Claim) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            with_role(doc, role_id, |role| {
                role.claims.push(claim.clone());
                IdentityResult::success()
            })
        })
        .await
    }

    async fn remove_role_claim(
        &self,
        role_id: &str,
        claim: &Claim,
    ) -> DomainResult<IdentityResult> {
        self.write(|doc| {
            with_role(doc, role_id, |role| {
                remove_claim(&mut role.claims, claim);
                IdentityResult::success()
            })
        })
        .await
    }
}
