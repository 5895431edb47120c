use super::{
    delta::claim_delta,
    user_management::{apply_step, settle, UserManagementService},
    LookupCache,
};
use crate::{
    application::ports::IdentityProvider,
    domain::{
        entities::*,
        errors::{require_non_blank, DomainResult},
    },
};
use tracing::{debug, info, instrument};

impl UserManagementService {
    /// Roles whose name contains `filter`, ordered by name
    #[instrument(skip(self))]
    pub async fn get_roles(&self, filter: Option<&str>) -> DomainResult<Vec<RoleView>> {
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());

        let state = self.state.read().await;
        let mut roles = state.provider.list_roles().await?;

        if let Some(filter) = filter {
            roles.retain(|r| r.matches_filter(filter));
        }
        roles.sort_by(|a, b| a.name.cmp(&b.name));

        let views: Vec<RoleView> = roles
            .iter()
            .map(|r| RoleView {
                id: r.id.to_string(),
                name: r.name.clone(),
                claims: r.claims.iter().map(|c| state.cache.to_pair(c)).collect(),
            })
            .collect();

        debug!("Found {} roles", views.len());
        Ok(views)
    }

    /// Create a role and reload the role lookups
    #[instrument(skip(self))]
    pub async fn create_role(&self, name: &str) -> DomainResult<Response> {
        require_non_blank("name", name)?;

        info!("Creating role '{}'", name);

        let mut state = self.state.write().await;
        let outcome = create_role_steps(state.provider.as_ref(), name).await;
        state.refresh_cache().await;

        Ok(settle(outcome, "creating", "role", name))
    }

    /// Rename a role and reconcile its claims with `claims`, then reload the role lookups
    #[instrument(skip(self, claims), fields(claims = claims.len()))]
    pub async fn update_role(
        &self,
        id: &str,
        name: &str,
        claims: &[ClaimPair],
    ) -> DomainResult<Response> {
        require_non_blank("id", id)?;
        require_non_blank("name", name)?;

        info!("Updating role '{}'", id);

        let mut state = self.state.write().await;
        let outcome = update_role_steps(state.provider.as_ref(), &state.cache, id, name, claims).await;
        state.refresh_cache().await;

        Ok(settle(outcome, "updating", "role", id))
    }

    /// Delete a role, optionally removing every user from it first
    #[instrument(skip(self))]
    pub async fn delete_role(
        &self,
        id: &str,
        delete_user_assignments: bool,
    ) -> DomainResult<Response> {
        require_non_blank("id", id)?;

        info!("Deleting role '{}'", id);

        let mut state = self.state.write().await;
        let outcome = delete_role_steps(state.provider.as_ref(), id, delete_user_assignments).await;
        state.refresh_cache().await;

        Ok(settle(outcome, "deleting", "role", id))
    }
}

async fn create_role_steps(provider: &dyn IdentityProvider, name: &str) -> DomainResult<Response> {
    let result = provider.create_role(&Role::new(name)).await?;
    Ok(if result.succeeded() {
        Response::succeeded(format!("Created role {name}."))
    } else {
        Response::failed(result.messages())
    })
}

async fn update_role_steps(
    provider: &dyn IdentityProvider,
    cache: &LookupCache,
    id: &str,
    name: &str,
    claims: &[ClaimPair],
) -> DomainResult<Response> {
    let Some(mut role) = provider.find_role_by_id(id).await? else {
        return Ok(Response::failed("Role not found."));
    };

    let target_claims = match cache.resolve_pairs(claims) {
        Ok(claims) => claims,
        Err(message) => return Ok(Response::failed(message)),
    };

    role.name = name.to_string();
    let result = provider.update_role(&role).await?;
    if !result.succeeded() {
        return Ok(Response::failed(result.messages()));
    }

    let mut response = Response::succeeded(format!("Updated role {name}."));

    let current_claims = provider.get_role_claims(id).await?;
    let delta = claim_delta(&current_claims, &target_claims);
    for claim in &delta.to_add {
        let step = provider.add_role_claim(id, claim).await?;
        apply_step(&mut response, &step);
    }
    for claim in &delta.to_remove {
        let step = provider.remove_role_claim(id, claim).await?;
        apply_step(&mut response, &step);
    }

    debug!("Applied {} claim changes", delta.len());
    Ok(response)
}

async fn delete_role_steps(
    provider: &dyn IdentityProvider,
    id: &str,
    delete_user_assignments: bool,
) -> DomainResult<Response> {
    let Some(role) = provider.find_role_by_id(id).await? else {
        return Ok(Response::failed("Role not found."));
    };

    let mut response = Response::succeeded("");

    if delete_user_assignments {
        for user in provider.get_users_in_role(&role.name).await? {
            let step = provider
                .remove_user_from_role(user.id.as_str(), &role.name)
                .await?;
            apply_step(&mut response, &step);
        }
    }

    let result = provider.delete_role(id).await?;
    if result.succeeded() {
        response.push_message(format!("Deleted role {}.", role.name));
    } else {
        response.record_failure(result.messages());
    }
    Ok(response)
}
