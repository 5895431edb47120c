use super::common::*;
use serde::{Deserialize, Serialize};

/// Role as owned by the identity provider, with its claims loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    pub claims: Vec<Claim>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            claims: Vec::new(),
        }
    }

    /// Case-sensitive substring match on the role name
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.name.contains(filter)
    }
}

/// Read model returned by role listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleView {
    pub id: String,
    pub name: String,
    pub claims: Vec<ClaimPair>,
}
