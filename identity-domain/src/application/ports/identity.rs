use crate::domain::{entities::*, errors::DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Identity provider port: storage, password and lockout operations for users and roles.
///
/// Operations that can be refused for business reasons (duplicate name, weak
/// password, ...) return an [`IdentityResult`] describing the refusal; `Err` is
/// reserved for infrastructure failures.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    // User operations
    async fn find_user_by_id(&self, user_id: &str) -> DomainResult<Option<User>>;
    async fn find_user_by_name(&self, username: &str) -> DomainResult<Option<User>>;
    /// All users with role memberships and claims loaded
    async fn list_users(&self) -> DomainResult<Vec<User>>;
    async fn create_user(&self, user: &User, password: &str) -> DomainResult<IdentityResult>;
    /// Persists email, email-confirmed and lockout fields of an existing user
    async fn update_user(&self, user: &User) -> DomainResult<IdentityResult>;
    async fn delete_user(&self, user_id: &str) -> DomainResult<IdentityResult>;

    // Role membership operations
    /// Names of the roles the user belongs to
    async fn get_user_roles(&self, user_id: &str) -> DomainResult<Vec<String>>;
    async fn add_user_to_role(&self, user_id: &str, role_name: &str)
        -> DomainResult<IdentityResult>;
    async fn remove_user_from_role(
        &self,
        user_id: &str,
        role_name: &str,
    ) -> DomainResult<IdentityResult>;
    async fn get_users_in_role(&self, role_name: &str) -> DomainResult<Vec<User>>;

    // User claim operations
    async fn get_user_claims(&self, user_id: &str) -> DomainResult<Vec<Claim>>;
    async fn add_user_claim(&self, user_id: &str, claim: &Claim) -> DomainResult<IdentityResult>;
    async fn remove_user_claim(&self, user_id: &str, claim: &Claim)
        -> DomainResult<IdentityResult>;

    // Password operations
    async fn has_password(&self, user_id: &str) -> DomainResult<bool>;
    async fn add_password(&self, user_id: &str, password: &str) -> DomainResult<IdentityResult>;
    async fn remove_password(&self, user_id: &str) -> DomainResult<IdentityResult>;
    async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<IdentityResult>;

    // Lockout operations
    async fn get_lockout_end(&self, user_id: &str) -> DomainResult<Option<DateTime<Utc>>>;
    async fn set_lockout_end(
        &self,
        user_id: &str,
        lockout_end: Option<DateTime<Utc>>,
    ) -> DomainResult<IdentityResult>;
    async fn get_access_failed_count(&self, user_id: &str) -> DomainResult<u32>;
    async fn reset_access_failed_count(&self, user_id: &str) -> DomainResult<IdentityResult>;

    // Role operations
    async fn find_role_by_id(&self, role_id: &str) -> DomainResult<Option<Role>>;
    /// All roles with claims loaded
    async fn list_roles(&self) -> DomainResult<Vec<Role>>;
    async fn create_role(&self, role: &Role) -> DomainResult<IdentityResult>;
    /// Persists the name of an existing role
    async fn update_role(&self, role: &Role) -> DomainResult<IdentityResult>;
    async fn delete_role(&self, role_id: &str) -> DomainResult<IdentityResult>;

    // Role claim operations
    async fn get_role_claims(&self, role_id: &str) -> DomainResult<Vec<Claim>>;
    async fn add_role_claim(&self, role_id: &str, claim: &Claim) -> DomainResult<IdentityResult>;
    async fn remove_role_claim(&self, role_id: &str, claim: &Claim)
        -> DomainResult<IdentityResult>;
}
