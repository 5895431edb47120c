//! # identity-console
//!
//! Interactive console for the identity management service: a numbered menu
//! for creating and switching identity stores, adding and removing users and
//! roles, assigning roles and resetting passwords.

pub mod cli;
pub mod config;
pub mod error;
pub mod menu;
pub mod output;
pub mod state;
pub mod terminal;

pub use cli::Cli;
pub use config::Config;
pub use error::{ConsoleError, ConsoleResult};
pub use menu::{Menu, MenuChoice};
pub use terminal::{ScriptedTerminal, StdTerminal, Terminal};
