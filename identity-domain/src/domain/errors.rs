use thiserror::Error;

/// Domain-specific errors for identity management operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("The argument {argument} {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Identity store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    /// Error for a required string argument that was empty or whitespace
    pub fn blank_argument(argument: &str) -> Self {
        DomainError::InvalidArgument {
            argument: argument.to_string(),
            message: "cannot be null or empty.".to_string(),
        }
    }

    /// Error for a required argument that was not supplied at all
    pub fn missing_argument(argument: &str) -> Self {
        DomainError::InvalidArgument {
            argument: argument.to_string(),
            message: "cannot be null.".to_string(),
        }
    }

    pub fn user_not_found(id: &str) -> Self {
        DomainError::NotFound {
            entity: "User".to_string(),
            id: id.to_string(),
        }
    }

    pub fn role_not_found(id: &str) -> Self {
        DomainError::NotFound {
            entity: "Role".to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, DomainError::InvalidArgument { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Returns `InvalidArgument` when `value` is empty or only whitespace
pub fn require_non_blank(argument: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::blank_argument(argument));
    }
    Ok(())
}

/// Identity store errors raised by storage adapters
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Identity store does not exist: {location}")]
    Missing { location: String },

    #[error("I/O failure on {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("Migration {name} failed: {message}")]
    Migration { name: String, message: String },

    #[error("Password hashing failed: {message}")]
    Hashing { message: String },

    #[error("Invalid connection target: {message}")]
    InvalidTarget { message: String },
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidTarget { message } => DomainError::Configuration { message },
            other => DomainError::Store {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl From<ConfigError> for DomainError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingRequired { key } => DomainError::Configuration {
                message: format!("Missing required configuration: {key}"),
            },
            ConfigError::InvalidValue { key, message } => DomainError::Configuration {
                message: format!("Invalid value for {key}: {message}"),
            },
        }
    }
}
