//! Command-line argument parsing.

use clap::{Parser, ValueEnum};
use identity_domain::LogFormat;

/// Identity Manager console - interactive administration of users and roles.
#[derive(Debug, Parser)]
#[command(name = "identity-console")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Identity store connection string (overrides IDENTITY_CONNECTION_STRING).
    #[arg(short, long)]
    pub connection_string: Option<String>,

    /// Log output format (overrides LOG_FORMAT).
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormatArg>,

    /// Skip creating and migrating the store at startup.
    #[arg(long)]
    pub no_initialize: bool,

    /// Script commands. When present the console runs non-interactively.
    #[arg(trailing_var_arg = true)]
    pub script: Vec<String>,
}

impl Cli {
    pub fn is_script_mode(&self) -> bool {
        !self.script.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Compact,
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
