//! Interactive numbered menu driving the user management service.

use crate::error::ConsoleResult;
use crate::output;
use crate::terminal::Terminal;
use identity_domain::{
    DomainResult, ResetPasswordRequest, Response, RoleView, UserManagementService, UserView,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    CreateDatabase,
    SwitchDatabase,
    AddUser,
    AddRole,
    ModifyUserRoles,
    DeleteUser,
    DeleteRole,
    ShowUsers,
    ShowRoles,
    ChangePassword,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 11] = [
        MenuChoice::CreateDatabase,
        MenuChoice::SwitchDatabase,
        MenuChoice::AddUser,
        MenuChoice::AddRole,
        MenuChoice::ModifyUserRoles,
        MenuChoice::DeleteUser,
        MenuChoice::DeleteRole,
        MenuChoice::ShowUsers,
        MenuChoice::ShowRoles,
        MenuChoice::ChangePassword,
        MenuChoice::Exit,
    ];

    pub fn parse(input: &str) -> Option<Self> {
        let number: u8 = input.trim().parse().ok()?;
        Self::ALL.into_iter().find(|c| c.number() == number)
    }

    pub fn number(self) -> u8 {
        match self {
            MenuChoice::Exit => 0,
            MenuChoice::CreateDatabase => 1,
            MenuChoice::SwitchDatabase => 2,
            MenuChoice::AddUser => 3,
            MenuChoice::AddRole => 4,
            MenuChoice::ModifyUserRoles => 5,
            MenuChoice::DeleteUser => 6,
            MenuChoice::DeleteRole => 7,
            MenuChoice::ShowUsers => 8,
            MenuChoice::ShowRoles => 9,
            MenuChoice::ChangePassword => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Exit => "Exit",
            MenuChoice::CreateDatabase => "Create a new database",
            MenuChoice::SwitchDatabase => "Switch auth databases",
            MenuChoice::AddUser => "Add a user",
            MenuChoice::AddRole => "Add a role",
            MenuChoice::ModifyUserRoles => "Modify user roles",
            MenuChoice::DeleteUser => "Delete a user",
            MenuChoice::DeleteRole => "Delete a role",
            MenuChoice::ShowUsers => "Show all users",
            MenuChoice::ShowRoles => "Show all roles",
            MenuChoice::ChangePassword => "Change user password",
        }
    }
}

/// Splits the comma-separated role answer into trimmed names
pub fn parse_role_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct Menu<'a, T: Terminal> {
    service: &'a UserManagementService,
    terminal: T,
}

impl<'a, T: Terminal> Menu<'a, T> {
    pub fn new(service: &'a UserManagementService, terminal: T) -> Self {
        Self { service, terminal }
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    /// Runs until the operator picks 0 or input ends.
    pub async fn run(&mut self) -> ConsoleResult<()> {
        self.say("Welcome to the Identity Manager console demo.")?;

        loop {
            self.say("")?;
            self.say("Choose an option:")?;
            for choice in MenuChoice::ALL {
                self.say(&format!("{}. {}", choice.number(), choice.label()))?;
            }

            let Some(answer) = self.terminal.read_line("> ")? else {
                break;
            };
            self.say("")?;

            match MenuChoice::parse(&answer) {
                Some(MenuChoice::Exit) => break,
                Some(choice) => self.dispatch(choice).await?,
                None => self.say(&output::error("Invalid choice"))?,
            }
        }

        debug!("Console menu closed");
        Ok(())
    }

    /// Executes one menu entry. Service errors are reported and the menu carries on.
    pub async fn dispatch(&mut self, choice: MenuChoice) -> ConsoleResult<()> {
        debug!(choice = choice.number(), "Menu choice");
        let result = match choice {
            MenuChoice::Exit => Ok(()),
            MenuChoice::CreateDatabase => self.create_database().await,
            MenuChoice::SwitchDatabase => self.switch_database().await,
            MenuChoice::AddUser => self.add_user().await,
            MenuChoice::AddRole => self.add_role().await,
            MenuChoice::ModifyUserRoles => self.modify_user_roles().await,
            MenuChoice::DeleteUser => self.delete_user().await,
            MenuChoice::DeleteRole => self.delete_role().await,
            MenuChoice::ShowUsers => self.show_users().await,
            MenuChoice::ShowRoles => self.show_roles().await,
            MenuChoice::ChangePassword => self.change_password().await,
        };

        match result {
            Err(crate::error::ConsoleError::Domain(e)) => {
                warn!(error = %e, "Menu action failed");
                self.say(&output::error(&e.to_string()))
            }
            other => other,
        }
    }

    async fn create_database(&mut self) -> ConsoleResult<()> {
        let connection_string = self.ask("Enter connection string: ")?;
        self.service.initialize_database(&connection_string).await?;
        self.say(&output::success("Database created successfully."))?;
        self.service
            .change_connection_string(&connection_string)
            .await?;
        self.say(&output::success("Switched to new database."))
    }

    async fn switch_database(&mut self) -> ConsoleResult<()> {
        let connection_string = self.ask("Enter new connection string: ")?;
        self.service
            .change_connection_string(&connection_string)
            .await?;
        self.say(&output::success("Switched to new database."))
    }

    async fn add_user(&mut self) -> ConsoleResult<()> {
        let username = self.ask("Enter username: ")?;
        let name = self.ask("Enter name: ")?;
        let email = self.ask("Enter email: ")?;
        let password = self.terminal.read_password("Enter password: ")?;

        let outcome = self
            .service
            .create_user(&username, &name, &email, &password)
            .await;
        self.report(outcome, "User added successfully.", "Failed to add user")
    }

    async fn add_role(&mut self) -> ConsoleResult<()> {
        let name = self.ask("Enter role name: ")?;
        let outcome = self.service.create_role(&name).await;
        self.report(outcome, "Role added successfully.", "Failed to add role")
    }

    async fn modify_user_roles(&mut self) -> ConsoleResult<()> {
        self.show_users().await?;
        let Some(user) = self.pick_user().await? else {
            return Ok(());
        };

        self.show_roles().await?;
        self.say("Current roles:")?;
        for role in &user.roles {
            self.say(role)?;
        }

        let answer = self.ask("Enter roles to assign (comma-separated): ")?;
        let roles = parse_role_list(&answer);
        let outcome = self.service.update_user(&user, &roles).await;
        self.report(
            outcome,
            "User roles updated successfully.",
            "Failed to update user roles",
        )
    }

    async fn delete_user(&mut self) -> ConsoleResult<()> {
        let Some(user) = self.pick_user().await? else {
            return Ok(());
        };
        let delete_assignments = self.confirm_assignments()?;
        let outcome = self.service.delete_user(&user.id, delete_assignments).await;
        self.report(outcome, "User deleted successfully.", "Failed to delete user")
    }

    async fn delete_role(&mut self) -> ConsoleResult<()> {
        let Some(role) = self.pick_role().await? else {
            return Ok(());
        };
        let delete_assignments = self.confirm_assignments()?;
        let outcome = self.service.delete_role(&role.id, delete_assignments).await;
        self.report(outcome, "Role deleted successfully.", "Failed to delete role")
    }

    async fn show_users(&mut self) -> ConsoleResult<()> {
        let users = self.service.get_users(None).await?;
        self.say(&output::users_table(&users))
    }

    async fn show_roles(&mut self) -> ConsoleResult<()> {
        let roles = self.service.get_roles(None).await?;
        self.say(&output::roles_table(&roles))
    }

    async fn change_password(&mut self) -> ConsoleResult<()> {
        self.show_users().await?;
        let Some(user) = self.pick_user().await? else {
            return Ok(());
        };

        let first = self.terminal.read_password("Enter new password: ")?;
        let second = self.terminal.read_password("Confirm new password: ")?;
        if first != second {
            return self.say(&output::error("Passwords do not match."));
        }

        let request = ResetPasswordRequest::new(user.id, first, second);
        let outcome = self.service.hard_reset_password(&request).await;
        self.report(
            outcome,
            "User password updated successfully.",
            "Failed to update user password",
        )
    }

    async fn pick_user(&mut self) -> ConsoleResult<Option<UserView>> {
        let username = self.ask("Enter username: ")?;
        let user = self
            .service
            .get_users(Some(&username))
            .await?
            .into_iter()
            .find(|u| u.username == username.trim());
        if user.is_none() {
            self.say(&output::error("User not found."))?;
        }
        Ok(user)
    }

    async fn pick_role(&mut self) -> ConsoleResult<Option<RoleView>> {
        let name = self.ask("Enter role name: ")?;
        let role = self
            .service
            .get_roles(Some(&name))
            .await?
            .into_iter()
            .find(|r| r.name == name.trim());
        if role.is_none() {
            self.say(&output::error("Role not found."))?;
        }
        Ok(role)
    }

    fn confirm_assignments(&mut self) -> ConsoleResult<bool> {
        let answer = self.ask("Do you want to delete the user role assignments? (y/n): ")?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    fn report(
        &mut self,
        outcome: DomainResult<Response>,
        done: &str,
        failed: &str,
    ) -> ConsoleResult<()> {
        let line = match outcome {
            Ok(response) if response.success => output::success(done),
            Ok(response) => output::error(&format!("{failed}: {}", response.messages)),
            Err(e) => output::error(&format!("{failed}: {e}")),
        };
        self.say(&line)
    }

    /// Reads an answer; end of input counts as an empty answer
    fn ask(&mut self, prompt: &str) -> ConsoleResult<String> {
        Ok(self.terminal.read_line(prompt)?.unwrap_or_default())
    }

    fn say(&mut self, line: &str) -> ConsoleResult<()> {
        self.terminal.write_line(line)?;
        Ok(())
    }
}
