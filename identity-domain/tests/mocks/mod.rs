#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use identity_domain::{
    application::ports::{ConnectionTarget, IdentityProvider, IdentityStoreConnector},
    domain::{
        entities::*,
        errors::{DomainError, DomainResult},
    },
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct MockState {
    pub users: Vec<User>,
    pub passwords: HashMap<String, String>,
    pub roles: Vec<Role>,
    /// (user id, role id)
    pub memberships: Vec<(String, String)>,
}

impl MockState {
    fn with_roles(&self, mut user: User) -> User {
        user.role_ids = self
            .memberships
            .iter()
            .filter(|(u, _)| *u == user.id.as_str())
            .map(|(_, r)| EntityId::from(r.as_str()))
            .collect();
        user
    }

    fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.name == name)
    }
}

/// Mock identity provider recording every call
pub struct MockIdentityProvider {
    pub state: Arc<Mutex<MockState>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub should_fail: Arc<Mutex<bool>>, // For testing infrastructure failures
    pub refused: Arc<Mutex<Vec<String>>>, // Operations answered with a refusal
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
            refused: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn refuse(&self, operation: &str) {
        self.refused.lock().unwrap().push(operation.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn seed_user(&self, username: &str, email: &str) -> String {
        let user = User::new(username, Some(email.to_string()));
        let id = user.id.to_string();
        self.state.lock().unwrap().users.push(user);
        id
    }

    pub fn seed_role(&self, name: &str) -> String {
        let role = Role::new(name);
        let id = role.id.to_string();
        self.state.lock().unwrap().roles.push(role);
        id
    }

    pub fn seed_membership(&self, user_id: &str, role_id: &str) {
        self.state
            .lock()
            .unwrap()
            .memberships
            .push((user_id.to_string(), role_id.to_string()));
    }

    pub fn seed_password(&self, user_id: &str, password: &str) {
        self.state
            .lock()
            .unwrap()
            .passwords
            .insert(user_id.to_string(), password.to_string());
    }

    pub fn seed_claim(&self, user_id: &str, claim: Claim) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.id.as_str() == user_id) {
            user.claims.push(claim);
        }
    }

    pub fn with_user<F: FnOnce(&mut User)>(&self, user_id: &str, f: F) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.id.as_str() == user_id) {
            f(user);
        }
    }

    pub fn user(&self, user_id: &str) -> Option<User> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|u| u.id.as_str() == user_id)
            .cloned()
            .map(|u| state.with_roles(u))
    }

    pub fn role_names_of(&self, user_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .memberships
            .iter()
            .filter(|(u, _)| u == user_id)
            .filter_map(|(_, r)| state.roles.iter().find(|role| role.id.as_str() == r))
            .map(|r| r.name.clone())
            .collect()
    }

    fn record(&self, call: String) -> DomainResult<()> {
        self.calls.lock().unwrap().push(call);
        if *self.should_fail.lock().unwrap() {
            Err(DomainError::Store {
                message: "Mock failure enabled".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn refusal(&self, operation: &str) -> Option<IdentityResult> {
        self.refused
            .lock()
            .unwrap()
            .iter()
            .any(|r| r == operation)
            .then(|| IdentityResult::failed_with("MockRefused", format!("{operation} refused.")))
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn find_user_by_id(&self, user_id: &str) -> DomainResult<Option<User>> {
        self.record(format!("find_user_by_id {user_id}"))?;
        Ok(self.user(user_id))
    }

    async fn find_user_by_name(&self, username: &str) -> DomainResult<Option<User>> {
        self.record(format!("find_user_by_name {username}"))?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .map(|u| state.with_roles(u)))
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.record("list_users".to_string())?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .cloned()
            .map(|u| state.with_roles(u))
            .collect())
    }

    async fn create_user(&self, user: &User, password: &str) -> DomainResult<IdentityResult> {
        self.record(format!("create_user {}", user.username))?;
        if let Some(refused) = self.refusal("create_user") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.username == user.username) {
            return Ok(IdentityResult::failed_with(
                "DuplicateUserName",
                format!("Username '{}' is already taken.", user.username),
            ));
        }
        state.users.push(user.clone());
        state
            .passwords
            .insert(user.id.to_string(), password.to_string());
        Ok(IdentityResult::success())
    }

    async fn update_user(&self, user: &User) -> DomainResult<IdentityResult> {
        self.record(format!("update_user {}", user.id))?;
        if let Some(refused) = self.refusal("update_user") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        match state.users.iter_mut().find(|u| u.id == user.id) {
            Some(stored) => {
                stored.email = user.email.clone();
                stored.email_confirmed = user.email_confirmed;
                Ok(IdentityResult::success())
            }
            None => Ok(IdentityResult::failed_with("UserNotFound", "User not found.")),
        }
    }

    async fn delete_user(&self, user_id: &str) -> DomainResult<IdentityResult> {
        self.record(format!("delete_user {user_id}"))?;
        if let Some(refused) = self.refusal("delete_user") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        state.users.retain(|u| u.id.as_str() != user_id);
        Ok(IdentityResult::success())
    }

    async fn get_user_roles(&self, user_id: &str) -> DomainResult<Vec<String>> {
        self.record(format!("get_user_roles {user_id}"))?;
        Ok(self.role_names_of(user_id))
    }

    async fn add_user_to_role(
        &self,
        user_id: &str,
        role_name: &str,
    ) -> DomainResult<IdentityResult> {
        self.record(format!("add_user_to_role {user_id} {role_name}"))?;
        if let Some(refused) = self.refusal("add_user_to_role") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        let Some(role_id) = state.role_by_name(role_name).map(|r| r.id.to_string()) else {
            return Ok(IdentityResult::failed_with(
                "RoleNotFound",
                format!("Role '{role_name}' does not exist."),
            ));
        };
        state.memberships.push((user_id.to_string(), role_id));
        Ok(IdentityResult::success())
    }

    async fn remove_user_from_role(
        &self,
        user_id: &str,
        role_name: &str,
    ) -> DomainResult<IdentityResult> {
        self.record(format!("remove_user_from_role {user_id} {role_name}"))?;
        if let Some(refused) = self.refusal("remove_user_from_role") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        let role_id = state.role_by_name(role_name).map(|r| r.id.to_string());
        state
            .memberships
            .retain(|(u, r)| !(u == user_id && Some(r) == role_id.as_ref()));
        Ok(IdentityResult::success())
    }

    async fn get_users_in_role(&self, role_name: &str) -> DomainResult<Vec<User>> {
        self.record(format!("get_users_in_role {role_name}"))?;
        let state = self.state.lock().unwrap();
        let Some(role) = state.role_by_name(role_name) else {
            return Ok(Vec::new());
        };
        let role_id = role.id.to_string();
        Ok(state
            .users
            .iter()
            .filter(|u| {
                state
                    .memberships
                    .iter()
                    .any(|(m_user, m_role)| m_user == u.id.as_str() && *m_role == role_id)
            })
            .cloned()
            .collect())
    }

    async fn get_user_claims(&self, user_id: &str) -> DomainResult<Vec<Claim>> {
        self.record(format!("get_user_claims {user_id}"))?;
        Ok(self.user(user_id).map(|u| u.claims).unwrap_or_default())
    }

    async fn add_user_claim(&self, user_id: &str, claim: &Claim) -> DomainResult<IdentityResult> {
        self.record(format!("add_user_claim {user_id} {}", claim.value))?;
        if let Some(refused) = self.refusal("add_user_claim") {
            return Ok(refused);
        }
        self.with_user(user_id, |u| u.claims.push(claim.clone()));
        Ok(IdentityResult::success())
    }

    async fn remove_user_claim(
        &self,
        user_id: &str,
        claim: &Claim,
    ) -> DomainResult<IdentityResult> {
        self.record(format!("remove_user_claim {user_id} {}", claim.value))?;
        if let Some(refused) = self.refusal("remove_user_claim") {
            return Ok(refused);
        }
        self.with_user(user_id, |u| {
            u.claims
                .retain(|c| !c.matches(&claim.claim_type, &claim.value))
        });
        Ok(IdentityResult::success())
    }

    async fn has_password(&self, user_id: &str) -> DomainResult<bool> {
        self.record(format!("has_password {user_id}"))?;
        Ok(self.state.lock().unwrap().passwords.contains_key(user_id))
    }

    async fn add_password(&self, user_id: &str, password: &str) -> DomainResult<IdentityResult> {
        self.record(format!("add_password {user_id}"))?;
        if let Some(refused) = self.refusal("add_password") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        if state.passwords.contains_key(user_id) {
            return Ok(IdentityResult::failed_with(
                "UserAlreadyHasPassword",
                "User already has a password set.",
            ));
        }
        state
            .passwords
            .insert(user_id.to_string(), password.to_string());
        Ok(IdentityResult::success())
    }

    async fn remove_password(&self, user_id: &str) -> DomainResult<IdentityResult> {
        self.record(format!("remove_password {user_id}"))?;
        if let Some(refused) = self.refusal("remove_password") {
            return Ok(refused);
        }
        self.state.lock().unwrap().passwords.remove(user_id);
        Ok(IdentityResult::success())
    }

    async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<IdentityResult> {
        self.record(format!("change_password {user_id}"))?;
        let mut state = self.state.lock().unwrap();
        if state.passwords.get(user_id).map(String::as_str) != Some(current_password) {
            return Ok(IdentityResult::failed_with(
                "PasswordMismatch",
                "Incorrect password.",
            ));
        }
        state
            .passwords
            .insert(user_id.to_string(), new_password.to_string());
        Ok(IdentityResult::success())
    }

    async fn get_lockout_end(&self, user_id: &str) -> DomainResult<Option<DateTime<Utc>>> {
        self.record(format!("get_lockout_end {user_id}"))?;
        Ok(self.user(user_id).and_then(|u| u.lockout_end))
    }

    async fn set_lockout_end(
        &self,
        user_id: &str,
        lockout_end: Option<DateTime<Utc>>,
    ) -> DomainResult<IdentityResult> {
        self.record(format!("set_lockout_end {user_id}"))?;
        if let Some(refused) = self.refusal("set_lockout_end") {
            return Ok(refused);
        }
        self.with_user(user_id, |u| u.lockout_end = lockout_end);
        Ok(IdentityResult::success())
    }

    async fn get_access_failed_count(&self, user_id: &str) -> DomainResult<u32> {
        self.record(format!("get_access_failed_count {user_id}"))?;
        Ok(self.user(user_id).map_or(0, |u| u.access_failed_count))
    }

    async fn reset_access_failed_count(&self, user_id: &str) -> DomainResult<IdentityResult> {
        self.record(format!("reset_access_failed_count {user_id}"))?;
        self.with_user(user_id, |u| u.access_failed_count = 0);
        Ok(IdentityResult::success())
    }

    async fn find_role_by_id(&self, role_id: &str) -> DomainResult<Option<Role>> {
        self.record(format!("find_role_by_id {role_id}"))?;
        let state = self.state.lock().unwrap();
        Ok(state.roles.iter().find(|r| r.id.as_str() == role_id).cloned())
    }

    async fn list_roles(&self) -> DomainResult<Vec<Role>> {
        self.record("list_roles".to_string())?;
        Ok(self.state.lock().unwrap().roles.clone())
    }

    async fn create_role(&self, role: &Role) -> DomainResult<IdentityResult> {
        self.record(format!("create_role {}", role.name))?;
        if let Some(refused) = self.refusal("create_role") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        if state.role_by_name(&role.name).is_some() {
            return Ok(IdentityResult::failed_with(
                "DuplicateRoleName",
                format!("Role name '{}' is already taken.", role.name),
            ));
        }
        state.roles.push(role.clone());
        Ok(IdentityResult::success())
    }

    async fn update_role(&self, role: &Role) -> DomainResult<IdentityResult> {
        self.record(format!("update_role {}", role.id))?;
        if let Some(refused) = self.refusal("update_role") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        if let Some(stored) = state.roles.iter_mut().find(|r| r.id == role.id) {
            stored.name = role.name.clone();
        }
        Ok(IdentityResult::success())
    }

    async fn delete_role(&self, role_id: &str) -> DomainResult<IdentityResult> {
        self.record(format!("delete_role {role_id}"))?;
        if let Some(refused) = self.refusal("delete_role") {
            return Ok(refused);
        }
        self.state
            .lock()
            .unwrap()
            .roles
            .retain(|r| r.id.as_str() != role_id);
        Ok(IdentityResult::success())
    }

    async fn get_role_claims(&self, role_id: &str) -> DomainResult<Vec<Claim>> {
        self.record(format!("get_role_claims {role_id}"))?;
        let state = self.state.lock().unwrap();
        Ok(state
            .roles
            .iter()
            .find(|r| r.id.as_str() == role_id)
            .map(|r| r.claims.clone())
            .unwrap_or_default())
    }

    async fn add_role_claim(&self, role_id: &str, claim: &Claim) -> DomainResult<IdentityResult> {
        self.record(format!("add_role_claim {role_id} {}", claim.value))?;
        if let Some(refused) = self.refusal("add_role_claim") {
            return Ok(refused);
        }
        let mut state = self.state.lock().unwrap();
        if let Some(role) = state.roles.iter_mut().find(|r| r.id.as_str() == role_id) {
            role.claims.push(claim.clone());
        }
        Ok(IdentityResult::success())
    }

    async fn remove_role_claim(
        &self,
        role_id: &str,
        claim: &Claim,
    ) -> DomainResult<IdentityResult> {
        self.record(format!("remove_role_claim {role_id} {}", claim.value))?;
        let mut state = self.state.lock().unwrap();
        if let Some(role) = state.roles.iter_mut().find(|r| r.id.as_str() == role_id) {
            role.claims
                .retain(|c| !c.matches(&claim.claim_type, &claim.value));
        }
        Ok(IdentityResult::success())
    }
}

/// Mock connector handing out pre-registered providers by connection target
pub struct MockStoreConnector {
    pub providers: Arc<Mutex<HashMap<String, Arc<MockIdentityProvider>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub pending: Arc<Mutex<Vec<String>>>,
    pub fail_ensure_created: Arc<Mutex<bool>>,
    pub fail_migrate: Arc<Mutex<bool>>,
}

impl MockStoreConnector {
    pub fn new() -> Self {
        Self {
            providers: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            pending: Arc::new(Mutex::new(Vec::new())),
            fail_ensure_created: Arc::new(Mutex::new(false)),
            fail_migrate: Arc::new(Mutex::new(false)),
        }
    }

    pub fn register(&self, target: &str, provider: Arc<MockIdentityProvider>) {
        self.providers
            .lock()
            .unwrap()
            .insert(target.to_string(), provider);
    }

    pub fn set_pending(&self, migrations: &[&str]) {
        *self.pending.lock().unwrap() = migrations.iter().map(|m| m.to_string()).collect();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityStoreConnector for MockStoreConnector {
    async fn connect(&self, target: &ConnectionTarget) -> DomainResult<Arc<dyn IdentityProvider>> {
        self.record(format!("connect {target}"));
        let provider: Arc<dyn IdentityProvider> = self
            .providers
            .lock()
            .unwrap()
            .get(target.as_str())
            .cloned()
            .ok_or_else(|| DomainError::Store {
                message: format!("No store at {target}"),
            })?;
        Ok(provider)
    }

    async fn ensure_created(&self, target: &ConnectionTarget) -> DomainResult<()> {
        self.record(format!("ensure_created {target}"));
        if *self.fail_ensure_created.lock().unwrap() {
            return Err(DomainError::Store {
                message: "already exists".to_string(),
            });
        }
        Ok(())
    }

    async fn pending_migrations(&self, target: &ConnectionTarget) -> DomainResult<Vec<String>> {
        self.record(format!("pending_migrations {target}"));
        Ok(self.pending.lock().unwrap().clone())
    }

    async fn migrate(&self, target: &ConnectionTarget) -> DomainResult<()> {
        self.record(format!("migrate {target}"));
        if *self.fail_migrate.lock().unwrap() {
            return Err(DomainError::Store {
                message: "migration failed".to_string(),
            });
        }
        self.pending.lock().unwrap().clear();
        Ok(())
    }
}
