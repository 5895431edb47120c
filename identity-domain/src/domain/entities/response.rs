use serde::{Deserialize, Serialize};

/// Outcome of a mutating workflow.
///
/// Not an error channel: callers inspect `success` and read `messages`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub messages: String,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeded(messages: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: messages.into(),
        }
    }

    pub fn failed(messages: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: messages.into(),
        }
    }

    /// Appends a message, space-separated from whatever is already recorded
    pub fn push_message(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        if message.is_empty() {
            return;
        }
        if !self.messages.is_empty() {
            self.messages.push(' ');
        }
        self.messages.push_str(message);
    }

    /// Records a failed step: appends its message and clears `success`
    pub fn record_failure(&mut self, message: impl AsRef<str>) {
        self.success = false;
        self.push_message(message);
    }
}

/// A single failure reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

impl IdentityError {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Result of an identity provider operation; succeeded when no errors were reported
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResult {
    pub errors: Vec<IdentityError>,
}

impl IdentityResult {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failed(errors: Vec<IdentityError>) -> Self {
        Self { errors }
    }

    pub fn failed_with(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            errors: vec![IdentityError::new(code, description)],
        }
    }

    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// All error descriptions joined by a single space, in reported order
    pub fn messages(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.description.as_str())
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
