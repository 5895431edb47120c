use super::claim_types;
use super::common::*;
use crate::domain::errors::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value shown in `UserView::locked_out` for an account that is currently locked
pub const LOCKED_OUT_MARKER: &str = "Yes";

/// User account as owned by the identity provider, with role memberships and claims loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: Option<String>,
    pub email_confirmed: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub lockout_enabled: bool,
    pub access_failed_count: u32,
    pub role_ids: Vec<EntityId>,
    pub claims: Vec<Claim>,
}

impl User {
    /// Create a new user with a freshly generated id
    pub fn new(username: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: EntityId::new(),
            username: username.into(),
            email,
            email_confirmed: false,
            lockout_end: None,
            lockout_enabled: true,
            access_failed_count: 0,
            role_ids: Vec::new(),
            claims: Vec::new(),
        }
    }

    /// Locked only while the lockout end lies strictly after `now`
    pub fn is_locked_out_at(&self, now: DateTime<Utc>) -> bool {
        self.lockout_end.is_some_and(|end| end > now)
    }

    /// Value of the first `Name` claim, if any
    pub fn display_name(&self) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_types::NAME_CLAIM_TYPE)
            .map(|c| c.value.as_str())
    }

    /// Case-sensitive substring match on email or username
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.username.contains(filter)
            || self.email.as_deref().is_some_and(|e| e.contains(filter))
    }
}

/// Read model returned by user listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub email_confirmed: bool,
    pub locked_out: String,
    pub roles: Vec<String>,
    pub claims: Vec<ClaimPair>,
    pub display_name: Option<String>,
}

impl UserView {
    pub fn is_locked_out(&self) -> bool {
        self.locked_out == LOCKED_OUT_MARKER
    }
}

/// Request to create a new user; every field is required
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CreateUserRequest {
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: Some(username.into()),
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        required("UserName", self.username.as_deref())?;
        required("Name", self.name.as_deref())?;
        let email = required("Email", self.email.as_deref())?;
        required("Password", self.password.as_deref())?;
        validate_email(email)
    }
}

/// Request to overwrite a user's password without knowing the current one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub user_id: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ResetPasswordRequest {
    pub fn new(
        user_id: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            new_password: Some(new_password.into()),
            confirm_password: Some(confirm_password.into()),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        required("UserId", self.user_id.as_deref())?;
        let new_password = required("NewPassword", self.new_password.as_deref())?;
        let confirm = required("ConfirmPassword", self.confirm_password.as_deref())?;

        if new_password != confirm {
            return Err(DomainError::Validation {
                field: "ConfirmPassword".to_string(),
                message: "The password and confirmation password do not match.".to_string(),
            });
        }

        Ok(())
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> DomainResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::Validation {
            field: field.to_string(),
            message: format!("The {field} field is required."),
        }),
    }
}

/// Basic email address format check
pub fn validate_email(email: &str) -> DomainResult<()> {
    let invalid = || DomainError::Validation {
        field: "Email".to_string(),
        message: format!("The Email field is not a valid e-mail address: {email}"),
    };

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    Ok(())
}
