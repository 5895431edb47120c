use crate::cli::Cli;
use crate::error::ConsoleResult;
use identity_domain::{
    infrastructure::adapters::EnvConfigurationAdapter, ConfigurationPort, LogFormat, LogLevel,
    PasswordConfig, StoreConfig,
};

/// Effective console settings: environment configuration with command-line overrides applied
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub password: PasswordConfig,
    pub log_format: LogFormat,
    pub log_level: LogLevel,
    pub development: bool,
}

impl Config {
    pub fn load(cli: &Cli) -> ConsoleResult<Self> {
        let adapter = EnvConfigurationAdapter::new()?;
        Self::from_adapter(adapter, cli)
    }

    pub fn from_adapter(mut adapter: EnvConfigurationAdapter, cli: &Cli) -> ConsoleResult<Self> {
        if let Some(connection_string) = &cli.connection_string {
            adapter = adapter.with_connection_string(connection_string.clone());
        }
        adapter.validate()?;

        let mut store = adapter.get_store_config().clone();
        if cli.no_initialize {
            store.initialize_on_startup = false;
        }

        Ok(Self {
            store,
            password: adapter.get_password_config().clone(),
            log_format: cli
                .log_format
                .map(LogFormat::from)
                .unwrap_or(adapter.get_logging_config().format),
            log_level: adapter.get_logging_config().level,
            development: adapter.is_development(),
        })
    }
}

impl Config {
    /// Filter used when `RUST_LOG` is unset; `LOG_LEVEL` drives the domain crate
    pub fn default_log_filter(&self) -> String {
        format!("identity_console=info,identity_domain={}", self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use identity_domain::AppConfig;

    fn adapter() -> EnvConfigurationAdapter {
        EnvConfigurationAdapter::from_config(AppConfig::default()).unwrap()
    }

    #[test]
    fn command_line_overrides_environment() {
        let cli = Cli::parse_from([
            "identity-console",
            "-c",
            "memory:other",
            "--log-format",
            "pretty",
            "--no-initialize",
        ]);

        let config = Config::from_adapter(adapter(), &cli).unwrap();

        assert_eq!(config.store.connection_string, "memory:other");
        assert!(!config.store.initialize_on_startup);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn blank_override_is_rejected() {
        let cli = Cli::parse_from(["identity-console", "--connection-string", "  "]);
        assert!(Config::from_adapter(adapter(), &cli).is_err());
    }

    #[test]
    fn defaults_pass_through() {
        let cli = Cli::parse_from(["identity-console"]);
        let config = Config::from_adapter(adapter(), &cli).unwrap();
        assert_eq!(config.store.connection_string, "memory:default");
        assert!(config.store.initialize_on_startup);
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.development);
    }

    #[test]
    fn log_level_and_environment_come_from_config() {
        let mut app = AppConfig::default();
        app.logging.level = LogLevel::Debug;
        app.environment = identity_domain::Environment::Production;
        let adapter = EnvConfigurationAdapter::from_config(app).unwrap();

        let config = Config::from_adapter(adapter, &Cli::parse_from(["identity-console"])).unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.development);
        assert_eq!(
            config.default_log_filter(),
            "identity_console=info,identity_domain=debug"
        );
    }
}
