use crate::domain::errors::{ConfigError, DomainResult};
use serde::{Deserialize, Serialize};

/// Configuration port for accessing application configuration
pub trait ConfigurationPort: Send + Sync {
    /// Get identity store configuration
    fn get_store_config(&self) -> &StoreConfig;

    /// Get password validation and hashing configuration
    fn get_password_config(&self) -> &PasswordConfig;

    /// Get logging configuration
    fn get_logging_config(&self) -> &LoggingConfig;

    /// Validate all configuration
    fn validate(&self) -> DomainResult<()>;

    /// Check if running in development mode
    fn is_development(&self) -> bool;
}

/// Identity store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub connection_string: String,
    /// Run `ensure_created` and pending migrations at startup
    pub initialize_on_startup: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection_string: "memory:default".to_string(),
            initialize_on_startup: true,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> DomainResult<()> {
        if self.connection_string.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "IDENTITY_CONNECTION_STRING".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Password rules enforced by the identity provider, plus Argon2 cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            required_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
            hash_memory_kib: 19 * 1024,
            hash_iterations: 2,
        }
    }
}

impl PasswordConfig {
    pub fn validate(&self) -> DomainResult<()> {
        if self.required_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "IDENTITY_PASSWORD_MIN_LENGTH".to_string(),
                message: "Must be greater than 0".to_string(),
            }
            .into());
        }

        // Argon2 rejects memory below 8 KiB per lane
        if self.hash_memory_kib < 8 {
            return Err(ConfigError::InvalidValue {
                key: "IDENTITY_HASH_MEMORY_KIB".to_string(),
                message: "Must be at least 8".to_string(),
            }
            .into());
        }

        if self.hash_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "IDENTITY_HASH_ITERATIONS".to_string(),
                message: "Must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
        }
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log format enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Environment-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub password: PasswordConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> DomainResult<()> {
        self.store.validate()?;
        self.password.validate()?;
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Load configuration from environment variables
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .unwrap_or_else(|| "development".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "ENVIRONMENT".to_string(),
                message: "Must be one of: development, test, staging, production".to_string(),
            })?;

        let store_defaults = StoreConfig::default();
        let store = StoreConfig {
            connection_string: lookup("IDENTITY_CONNECTION_STRING")
                .unwrap_or(store_defaults.connection_string),
            initialize_on_startup: parse_or(
                &lookup,
                "IDENTITY_INITIALIZE_ON_STARTUP",
                store_defaults.initialize_on_startup,
            )?,
        };

        let pw = PasswordConfig::default();
        let password = PasswordConfig {
            required_length: parse_or(&lookup, "IDENTITY_PASSWORD_MIN_LENGTH", pw.required_length)?,
            require_digit: parse_or(&lookup, "IDENTITY_PASSWORD_REQUIRE_DIGIT", pw.require_digit)?,
            require_lowercase: parse_or(
                &lookup,
                "IDENTITY_PASSWORD_REQUIRE_LOWERCASE",
                pw.require_lowercase,
            )?,
            require_uppercase: parse_or(
                &lookup,
                "IDENTITY_PASSWORD_REQUIRE_UPPERCASE",
                pw.require_uppercase,
            )?,
            require_non_alphanumeric: parse_or(
                &lookup,
                "IDENTITY_PASSWORD_REQUIRE_NON_ALPHANUMERIC",
                pw.require_non_alphanumeric,
            )?,
            hash_memory_kib: parse_or(&lookup, "IDENTITY_HASH_MEMORY_KIB", pw.hash_memory_kib)?,
            hash_iterations: parse_or(&lookup, "IDENTITY_HASH_ITERATIONS", pw.hash_iterations)?,
        };

        let logging = LoggingConfig {
            level: lookup("LOG_LEVEL")
                .unwrap_or_else(|| "warn".to_string())
                .parse()
                .unwrap_or(LogLevel::Warn),
            format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "compact".to_string())
                .parse()
                .unwrap_or(LogFormat::Compact),
        };

        let config = AppConfig {
            environment,
            store,
            password,
            logging,
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> DomainResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("Cannot parse '{raw}'"),
            }
            .into()
        }),
    }
}

/// String parsing implementations
impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {s}")),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {s}")),
        }
    }
}
