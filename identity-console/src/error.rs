use identity_domain::DomainError;
use thiserror::Error;

/// Console error type.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ConsoleError {
    /// Exit code reported by the binary for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ConsoleError::Domain(DomainError::Configuration { .. })
            | ConsoleError::InvalidArgument(_) => 2,
            _ => 1,
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_exit_with_two() {
        let err: ConsoleError = DomainError::Configuration {
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);

        let err: ConsoleError = DomainError::Store {
            message: "gone".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "Identity store error: gone");
    }
}
