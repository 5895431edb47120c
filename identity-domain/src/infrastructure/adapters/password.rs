//! Password hashing with Argon2id and password strength rules.

use super::identity_errors;
use crate::{
    application::ports::PasswordConfig,
    domain::{
        entities::IdentityError,
        errors::{DomainResult, StoreError},
    },
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Hashes and verifies passwords as PHC strings
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, StoreError> {
        let params = Params::new(memory_kib, iterations, 1, None).map_err(|e| {
            StoreError::Hashing {
                message: e.to_string(),
            }
        })?;
        Ok(Self { params })
    }

    pub fn from_config(config: &PasswordConfig) -> DomainResult<Self> {
        Ok(Self::new(config.hash_memory_kib, config.hash_iterations)?)
    }

    pub fn hash(&self, password: &str) -> Result<String, StoreError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::Hashing {
                message: e.to_string(),
            })?;
        Ok(hash.to_string())
    }

    /// False for a wrong password and for a malformed stored hash
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Character-class and length rules applied to new passwords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::from_config(&PasswordConfig::default())
    }
}

impl PasswordPolicy {
    pub fn from_config(config: &PasswordConfig) -> Self {
        Self {
            required_length: config.required_length,
            require_digit: config.require_digit,
            require_lowercase: config.require_lowercase,
            require_uppercase: config.require_uppercase,
            require_non_alphanumeric: config.require_non_alphanumeric,
        }
    }

    /// Every rule the password breaks, in a fixed order
    pub fn validate(&self, password: &str) -> Vec<IdentityError> {
        let mut errors = Vec::new();

        if password.chars().count() < self.required_length {
            errors.push(identity_errors::password_too_short(self.required_length));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(identity_errors::password_requires_non_alphanumeric());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(identity_errors::password_requires_digit());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(identity_errors::password_requires_lower());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(identity_errors::password_requires_upper());
        }

        errors
    }
}
