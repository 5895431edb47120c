use crate::application::ports::{
    AppConfig, ConfigurationPort, LoggingConfig, PasswordConfig, StoreConfig,
};
use crate::domain::errors::DomainResult;

/// Environment-based configuration adapter
#[derive(Debug, Clone)]
pub struct EnvConfigurationAdapter {
    config: AppConfig,
}

impl EnvConfigurationAdapter {
    pub fn new() -> DomainResult<Self> {
        let config = AppConfig::from_env()?;
        Ok(Self { config })
    }

    pub fn from_config(config: AppConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Replace the connection string, e.g. from a command line flag
    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.config.store.connection_string = connection_string.into();
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl ConfigurationPort for EnvConfigurationAdapter {
    fn get_store_config(&self) -> &StoreConfig {
        &self.config.store
    }

    fn get_password_config(&self) -> &PasswordConfig {
        &self.config.password
    }

    fn get_logging_config(&self) -> &LoggingConfig {
        &self.config.logging
    }

    fn validate(&self) -> DomainResult<()> {
        self.config.validate()
    }

    fn is_development(&self) -> bool {
        self.config.is_development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_override_is_validated() {
        let adapter = EnvConfigurationAdapter::from_config(AppConfig::default())
            .unwrap()
            .with_connection_string("   ");
        assert!(adapter.validate().is_err());

        let adapter = adapter.with_connection_string("memory:other");
        assert!(adapter.validate().is_ok());
        assert_eq!(adapter.get_store_config().connection_string, "memory:other");
        assert!(adapter.is_development());
    }
}
