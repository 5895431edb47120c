//! Output formatting utilities.

use colored::Colorize;
use identity_domain::{RoleView, UserView};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct UserRow<'a> {
    #[tabled(rename = "Username")]
    username: &'a str,
    #[tabled(rename = "Email")]
    email: &'a str,
    #[tabled(rename = "Locked out")]
    locked_out: &'a str,
    #[tabled(rename = "Roles")]
    roles: String,
}

#[derive(Tabled)]
struct RoleRow<'a> {
    #[tabled(rename = "Role Name")]
    name: &'a str,
    #[tabled(rename = "Claims")]
    claims: String,
}

/// Formats a success message.
pub fn success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

/// Formats an error message.
pub fn error(message: &str) -> String {
    format!("{} {}", "✗".red().bold(), message)
}

/// Formats an informational message.
pub fn info(message: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), message)
}

/// Renders users as a table, or a notice when there are none.
pub fn users_table(users: &[UserView]) -> String {
    if users.is_empty() {
        return info("No users found.");
    }

    let rows: Vec<UserRow<'_>> = users
        .iter()
        .map(|user| UserRow {
            username: &user.username,
            email: user.email.as_deref().unwrap_or(""),
            locked_out: &user.locked_out,
            roles: user.roles.join(", "),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Renders roles as a table, or a notice when there are none.
pub fn roles_table(roles: &[RoleView]) -> String {
    if roles.is_empty() {
        return info("No roles found.");
    }

    let rows: Vec<RoleRow<'_>> = roles
        .iter()
        .map(|role| RoleRow {
            name: &role.name,
            claims: role
                .claims
                .iter()
                .map(|c| format!("{}={}", c.key, c.value))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
