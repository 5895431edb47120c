use crate::{
    application::{
        ports::*,
        services::{
            delta::{claim_delta, role_delta},
            LookupCache,
        },
    },
    domain::{
        entities::*,
        errors::{require_non_blank, DomainError, DomainResult},
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Provider handle and lookups that are always swapped together
pub(super) struct ActiveStore {
    pub(super) provider: Arc<dyn IdentityProvider>,
    pub(super) cache: LookupCache,
    pub(super) target: Option<ConnectionTarget>,
}

impl ActiveStore {
    pub(super) async fn load(
        provider: Arc<dyn IdentityProvider>,
        target: Option<ConnectionTarget>,
    ) -> DomainResult<Self> {
        let roles = provider.list_roles().await?;
        Ok(Self {
            provider,
            cache: LookupCache::build(&roles),
            target,
        })
    }

    /// Reload role lookups; keeps the previous lookups if the provider fails
    pub(super) async fn refresh_cache(&mut self) {
        match self.provider.list_roles().await {
            Ok(roles) => self.cache = LookupCache::build(&roles),
            Err(e) => warn!("Failed to refresh role lookups: {}", e),
        }
    }
}

/// User and role management façade over an identity provider.
///
/// Reads and user workflows hold the state read guard for their whole
/// duration. Role mutations and connection swaps take the write guard, so a
/// workflow never sees a provider paired with another provider's lookups.
pub struct UserManagementService {
    pub(super) connector: Arc<dyn IdentityStoreConnector>,
    pub(super) state: RwLock<ActiveStore>,
}

#[derive(Debug, Clone, Copy)]
enum LockoutAction {
    Lock(DateTime<Utc>),
    Unlock,
    ResetCount,
}

impl LockoutAction {
    fn verb(&self) -> &'static str {
        match self {
            LockoutAction::Lock(_) => "locking",
            LockoutAction::Unlock => "unlocking",
            LockoutAction::ResetCount => "resetting lockout count of",
        }
    }
}

impl UserManagementService {
    /// Build the service around an already-connected provider and load its lookups
    pub async fn new(
        connector: Arc<dyn IdentityStoreConnector>,
        provider: Arc<dyn IdentityProvider>,
    ) -> DomainResult<Self> {
        let state = ActiveStore::load(provider, None).await?;
        Ok(Self {
            connector,
            state: RwLock::new(state),
        })
    }

    /// Connect through `connector` to the store named by `connection_string`
    pub async fn connect(
        connector: Arc<dyn IdentityStoreConnector>,
        connection_string: &str,
    ) -> DomainResult<Self> {
        let target = ConnectionTarget::parse(connection_string)?;
        let provider = connector.connect(&target).await?;
        let state = ActiveStore::load(provider, Some(target)).await?;
        Ok(Self {
            connector,
            state: RwLock::new(state),
        })
    }

    /// Snapshot of the current role and claim-type lookups
    pub async fn lookups(&self) -> LookupCache {
        self.state.read().await.cache.clone()
    }

    /// Connection target of the active provider, when it was set through a connection string
    pub async fn current_target(&self) -> Option<ConnectionTarget> {
        self.state.read().await.target.clone()
    }

    /// Create a user and attach a `Name` claim carrying the display name
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn create_user(
        &self,
        username: &str,
        name: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<Response> {
        require_non_blank("userName", username)?;
        require_non_blank("name", name)?;
        require_non_blank("email", email)?;
        require_non_blank("password", password)?;

        info!("Creating user '{}'", username);

        let state = self.state.read().await;
        let outcome = create_user_steps(state.provider.as_ref(), username, name, email, password).await;
        Ok(settle(outcome, "creating", "user", username))
    }

    /// Validate a create-user request, then create the user
    pub async fn create_user_from(&self, request: &CreateUserRequest) -> DomainResult<Response> {
        request.validate()?;
        self.create_user(
            request.username.as_deref().unwrap_or_default(),
            request.name.as_deref().unwrap_or_default(),
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await
    }

    /// Users whose email or username contains `filter`, ordered by username.
    ///
    /// The filter is trimmed; a missing or blank filter returns every user.
    #[instrument(skip(self))]
    pub async fn get_users(&self, filter: Option<&str>) -> DomainResult<Vec<UserView>> {
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());

        let state = self.state.read().await;
        let mut users = state.provider.list_users().await?;

        if let Some(filter) = filter {
            users.retain(|u| u.matches_filter(filter));
        }
        users.sort_by(|a, b| a.username.cmp(&b.username));

        let now = Utc::now();
        let views: Vec<UserView> = users
            .iter()
            .map(|u| user_view(u, &state.cache, now))
            .collect();

        debug!("Found {} users", views.len());
        Ok(views)
    }

    /// Get a user by id
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> DomainResult<User> {
        require_non_blank("id", id)?;

        let state = self.state.read().await;
        state
            .provider
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    /// Apply email fields from `user`, then reconcile its roles with `roles` and its
    /// claims with `user.claims`.
    ///
    /// Each role or claim change is a separate provider call. A refused change
    /// is recorded in the response and the remaining changes are still applied.
    #[instrument(skip(self, user), fields(user_id = %user.id, roles = ?roles))]
    pub async fn update_user(&self, user: &UserView, roles: &[String]) -> DomainResult<Response> {
        if user.id.trim().is_empty() {
            return Err(DomainError::missing_argument("user"));
        }

        info!("Updating user '{}'", user.id);

        let state = self.state.read().await;
        let outcome = update_user_steps(state.provider.as_ref(), &state.cache, user, roles).await;
        Ok(settle(outcome, "updating", "user", &user.id))
    }

    /// Change a password after verifying the current one
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<Response> {
        require_non_blank("userId", user_id)?;
        require_non_blank("currentPassword", current_password)?;
        require_non_blank("newPassword", new_password)?;

        let state = self.state.read().await;
        let outcome = change_password_steps(
            state.provider.as_ref(),
            user_id,
            current_password,
            new_password,
        )
        .await;
        Ok(settle(outcome, "changing password for", "user", user_id))
    }

    /// Delete a user, optionally removing its role memberships first
    #[instrument(skip(self))]
    pub async fn delete_user(
        &self,
        id: &str,
        delete_role_assignments: bool,
    ) -> DomainResult<Response> {
        require_non_blank("id", id)?;

        info!("Deleting user '{}'", id);

        let state = self.state.read().await;
        let outcome = delete_user_steps(state.provider.as_ref(), id, delete_role_assignments).await;
        Ok(settle(outcome, "deleting", "user", id))
    }

    /// Replace a user's password without knowing the current one.
    ///
    /// A mismatched confirmation aborts before the provider is touched.
    #[instrument(skip(self, password, verify))]
    pub async fn reset_password(
        &self,
        id: &str,
        password: &str,
        verify: &str,
    ) -> DomainResult<Response> {
        require_non_blank("id", id)?;
        require_non_blank("password", password)?;
        require_non_blank("verify", verify)?;

        if password != verify {
            return Ok(Response::failed("Passwords entered do not match."));
        }

        let state = self.state.read().await;
        match reset_password_steps(state.provider.as_ref(), id, password).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("Password reset for user '{}' failed: {}", id, e);
                Ok(Response::failed(format!(
                    "Failed password reset for user {id}: {e}"
                )))
            }
        }
    }

    /// Validate a reset-password request, then reset the password
    pub async fn hard_reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> DomainResult<Response> {
        request.validate()?;
        self.reset_password(
            request.user_id.as_deref().unwrap_or_default(),
            request.new_password.as_deref().unwrap_or_default(),
            request.confirm_password.as_deref().unwrap_or_default(),
        )
        .await
    }

    /// Lock the account until `until`
    #[instrument(skip(self))]
    pub async fn lock(&self, user_id: &str, until: DateTime<Utc>) -> DomainResult<bool> {
        require_non_blank("userId", user_id)?;
        Ok(self.apply_lockout(user_id, LockoutAction::Lock(until)).await)
    }

    /// Clear the lockout end
    #[instrument(skip(self))]
    pub async fn unlock(&self, user_id: &str) -> DomainResult<bool> {
        require_non_blank("userId", user_id)?;
        Ok(self.apply_lockout(user_id, LockoutAction::Unlock).await)
    }

    /// Reset the failed access attempt counter
    #[instrument(skip(self))]
    pub async fn reset_lockout_count(&self, user_id: &str) -> DomainResult<bool> {
        require_non_blank("userId", user_id)?;
        Ok(self.apply_lockout(user_id, LockoutAction::ResetCount).await)
    }

    async fn apply_lockout(&self, user_id: &str, action: LockoutAction) -> bool {
        let state = self.state.read().await;
        match lockout_steps(state.provider.as_ref(), user_id, action).await {
            Ok(done) => done,
            Err(e) => {
                warn!("Failure {} user {}: {}", action.verb(), user_id, e);
                false
            }
        }
    }
}

async fn create_user_steps(
    provider: &dyn IdentityProvider,
    username: &str,
    name: &str,
    email: &str,
    password: &str,
) -> DomainResult<Response> {
    let user = User::new(username, Some(email.to_string()));
    let result = provider.create_user(&user, password).await?;
    if !result.succeeded() {
        return Ok(Response::failed(result.messages()));
    }

    let mut response = Response::succeeded(format!("Created user {username}."));
    let claim = Claim::new(claim_types::NAME_CLAIM_TYPE, name);
    let step = provider.add_user_claim(user.id.as_str(), &claim).await?;
    if !step.succeeded() {
        // Creation stands without the Name claim
        warn!("Name claim for '{}' was refused: {}", username, step.messages());
        response.push_message(step.messages());
    }
    Ok(response)
}

async fn update_user_steps(
    provider: &dyn IdentityProvider,
    cache: &LookupCache,
    view: &UserView,
    roles: &[String],
) -> DomainResult<Response> {
    let Some(mut user) = provider.find_user_by_id(&view.id).await? else {
        return Ok(Response::failed("User not found."));
    };

    let target_claims = match cache.resolve_pairs(&view.claims) {
        Ok(claims) => claims,
        Err(message) => return Ok(Response::failed(message)),
    };

    user.email = view.email.clone();
    user.email_confirmed = view.email_confirmed;

    let result = provider.update_user(&user).await?;
    if !result.succeeded() {
        return Ok(Response::failed(result.messages()));
    }

    let mut response = Response::succeeded(format!("Updated user {}.", user.username));
    let user_id = user.id.as_str();

    // Known roles are addressed by their stored spelling
    let roles: Vec<String> = roles
        .iter()
        .map(|name| {
            cache
                .canonical_role_name(name)
                .map_or_else(|| name.trim().to_string(), str::to_string)
        })
        .collect();

    let current_roles = provider.get_user_roles(user_id).await?;
    let roles_delta = role_delta(&current_roles, &roles);
    for role in &roles_delta.to_add {
        let step = provider.add_user_to_role(user_id, role).await?;
        apply_step(&mut response, &step);
    }
    for role in &roles_delta.to_remove {
        let step = provider.remove_user_from_role(user_id, role).await?;
        apply_step(&mut response, &step);
    }

    let current_claims = provider.get_user_claims(user_id).await?;
    let claims_delta = claim_delta(&current_claims, &target_claims);
    for claim in &claims_delta.to_add {
        let step = provider.add_user_claim(user_id, claim).await?;
        apply_step(&mut response, &step);
    }
    for claim in &claims_delta.to_remove {
        let step = provider.remove_user_claim(user_id, claim).await?;
        apply_step(&mut response, &step);
    }

    debug!(
        "Applied {} role and {} claim changes",
        roles_delta.len(),
        claims_delta.len()
    );
    Ok(response)
}

async fn change_password_steps(
    provider: &dyn IdentityProvider,
    user_id: &str,
    current_password: &str,
    new_password: &str,
) -> DomainResult<Response> {
    let Some(user) = provider.find_user_by_id(user_id).await? else {
        return Ok(Response::failed("User not found."));
    };

    let result = provider
        .change_password(user_id, current_password, new_password)
        .await?;

    Ok(if result.succeeded() {
        Response::succeeded(format!("Password changed for {}.", user.username))
    } else {
        Response::failed(result.messages())
    })
}

async fn delete_user_steps(
    provider: &dyn IdentityProvider,
    id: &str,
    delete_role_assignments: bool,
) -> DomainResult<Response> {
    let Some(user) = provider.find_user_by_id(id).await? else {
        return Ok(Response::failed("User not found."));
    };

    let mut response = Response::succeeded("");

    if delete_role_assignments {
        for role in provider.get_user_roles(id).await? {
            let step = provider.remove_user_from_role(id, &role).await?;
            apply_step(&mut response, &step);
        }
    }

    let result = provider.delete_user(id).await?;
    if result.succeeded() {
        response.push_message(format!("Deleted user {}.", user.username));
    } else {
        response.record_failure(result.messages());
    }
    Ok(response)
}

async fn reset_password_steps(
    provider: &dyn IdentityProvider,
    id: &str,
    password: &str,
) -> DomainResult<Response> {
    let Some(user) = provider.find_user_by_id(id).await? else {
        return Ok(Response::failed("User not found."));
    };

    if provider.has_password(id).await? {
        let removed = provider.remove_password(id).await?;
        if !removed.succeeded() {
            return Ok(Response::failed(removed.messages()));
        }
    }

    let result = provider.add_password(id, password).await?;
    Ok(if result.succeeded() {
        Response::succeeded(format!("Password reset for {}.", user.username))
    } else {
        Response::failed(result.messages())
    })
}

async fn lockout_steps(
    provider: &dyn IdentityProvider,
    user_id: &str,
    action: LockoutAction,
) -> DomainResult<bool> {
    if provider.find_user_by_id(user_id).await?.is_none() {
        debug!("User '{}' not found", user_id);
        return Ok(false);
    }

    let result = match action {
        LockoutAction::Lock(until) => provider.set_lockout_end(user_id, Some(until)).await?,
        LockoutAction::Unlock => provider.set_lockout_end(user_id, None).await?,
        LockoutAction::ResetCount => provider.reset_access_failed_count(user_id).await?,
    };

    if !result.succeeded() {
        warn!(
            "Identity provider refused {} user '{}': {}",
            action.verb(),
            user_id,
            result.messages()
        );
    }
    Ok(result.succeeded())
}

/// Record a refused delta step on the response
pub(super) fn apply_step(response: &mut Response, step: &IdentityResult) {
    if !step.succeeded() {
        let messages = step.messages();
        warn!("Identity provider refused a change: {}", messages);
        response.record_failure(messages);
    }
}

/// Turn an infrastructure failure inside a workflow into an unsuccessful response
pub(super) fn settle(
    outcome: DomainResult<Response>,
    verb: &str,
    entity: &str,
    id: &str,
) -> Response {
    match outcome {
        Ok(response) => response,
        Err(e) => {
            warn!("Failure {} {} '{}': {}", verb, entity, id, e);
            Response::failed(format!("Failure {verb} {entity} {id}: {e}"))
        }
    }
}

fn user_view(user: &User, cache: &LookupCache, now: DateTime<Utc>) -> UserView {
    let roles = user
        .role_ids
        .iter()
        .filter_map(|id| {
            let name = cache.role_name(id.as_str());
            if name.is_none() {
                debug!("Role '{}' of user '{}' is not in the lookups", id, user.username);
            }
            name.map(str::to_string)
        })
        .collect();

    UserView {
        id: user.id.to_string(),
        username: user.username.clone(),
        email: user.email.clone(),
        email_confirmed: user.email_confirmed,
        locked_out: if user.is_locked_out_at(now) {
            LOCKED_OUT_MARKER.to_string()
        } else {
            String::new()
        },
        roles,
        claims: user.claims.iter().map(|c| cache.to_pair(c)).collect(),
        display_name: user.display_name().map(str::to_string),
    }
}
