//! Error codes and descriptions reported by the local identity provider.

use crate::domain::entities::IdentityError;

pub fn password_mismatch() -> IdentityError {
    IdentityError::new("PasswordMismatch", "Incorrect password.")
}

pub fn invalid_user_name(username: &str) -> IdentityError {
    IdentityError::new(
        "InvalidUserName",
        format!("Username '{username}' is invalid, can only contain letters or digits."),
    )
}

pub fn invalid_role_name(name: &str) -> IdentityError {
    IdentityError::new("InvalidRoleName", format!("Role name '{name}' is invalid."))
}

pub fn duplicate_user_name(username: &str) -> IdentityError {
    IdentityError::new(
        "DuplicateUserName",
        format!("Username '{username}' is already taken."),
    )
}

pub fn duplicate_role_name(name: &str) -> IdentityError {
    IdentityError::new(
        "DuplicateRoleName",
        format!("Role name '{name}' is already taken."),
    )
}

pub fn user_already_has_password() -> IdentityError {
    IdentityError::new("UserAlreadyHasPassword", "User already has a password set.")
}

pub fn user_lockout_not_enabled() -> IdentityError {
    IdentityError::new("UserLockoutNotEnabled", "Lockout is not enabled for this user.")
}

pub fn user_already_in_role(role: &str) -> IdentityError {
    IdentityError::new("UserAlreadyInRole", format!("User already in role '{role}'."))
}

pub fn user_not_in_role(role: &str) -> IdentityError {
    IdentityError::new("UserNotInRole", format!("User is not in role '{role}'."))
}

pub fn user_not_found(id: &str) -> IdentityError {
    IdentityError::new("UserNotFound", format!("User '{id}' does not exist."))
}

pub fn role_not_found(name: &str) -> IdentityError {
    IdentityError::new("RoleNotFound", format!("Role '{name}' does not exist."))
}

pub fn password_too_short(length: usize) -> IdentityError {
    IdentityError::new(
        "PasswordTooShort",
        format!("Passwords must be at least {length} characters."),
    )
}

pub fn password_requires_non_alphanumeric() -> IdentityError {
    IdentityError::new(
        "PasswordRequiresNonAlphanumeric",
        "Passwords must have at least one non alphanumeric character.",
    )
}

pub fn password_requires_digit() -> IdentityError {
    IdentityError::new(
        "PasswordRequiresDigit",
        "Passwords must have at least one digit ('0'-'9').",
    )
}

pub fn password_requires_lower() -> IdentityError {
    IdentityError::new(
        "PasswordRequiresLower",
        "Passwords must have at least one lowercase ('a'-'z').",
    )
}

pub fn password_requires_upper() -> IdentityError {
    IdentityError::new(
        "PasswordRequiresUpper",
        "Passwords must have at least one uppercase ('A'-'Z').",
    )
}
