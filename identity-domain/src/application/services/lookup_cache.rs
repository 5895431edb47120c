use crate::domain::entities::{claim_types, Claim, ClaimPair, Role};
use std::collections::HashMap;

/// Role-name and claim-type lookups shared by the orchestration workflows.
///
/// Rebuilt wholesale after role mutations and on connection changes; never
/// patched in place.
#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    /// `(role id, role name)` ordered by name
    roles: Vec<(String, String)>,
    role_index: HashMap<String, usize>,
    claim_types: HashMap<String, String>,
    claim_keys: HashMap<String, String>,
}

impl LookupCache {
    pub fn build(roles: &[Role]) -> Self {
        let mut ordered: Vec<(String, String)> = roles
            .iter()
            .map(|r| (r.id.to_string(), r.name.clone()))
            .collect();
        ordered.sort_by(|a, b| a.1.cmp(&b.1));

        let role_index = ordered
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i))
            .collect();

        let mut types_by_key = HashMap::new();
        let mut keys_by_type = HashMap::new();
        for (key, uri) in claim_types::well_known() {
            keys_by_type.insert(uri.clone(), key.to_string());
            types_by_key.insert(key.to_string(), uri);
        }

        Self {
            roles: ordered,
            role_index,
            claim_types: types_by_key,
            claim_keys: keys_by_type,
        }
    }

    pub fn role_name(&self, role_id: &str) -> Option<&str> {
        self.role_index
            .get(role_id)
            .map(|&i| self.roles[i].1.as_str())
    }

    /// Role names in ascending order
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|(_, name)| name.as_str())
    }

    /// Stored spelling of `name`, matched trimmed and case-insensitively
    pub fn canonical_role_name(&self, name: &str) -> Option<&str> {
        let key = name.trim().to_uppercase();
        self.role_names().find(|stored| stored.to_uppercase() == key)
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Full claim type URI for a short key such as `Name`
    pub fn claim_type(&self, short_key: &str) -> Option<&str> {
        self.claim_types.get(short_key).map(String::as_str)
    }

    /// Short key for a claim type URI
    pub fn claim_key(&self, claim_type: &str) -> Option<&str> {
        self.claim_keys.get(claim_type).map(String::as_str)
    }

    /// Converts a stored claim to its display pair; unknown types keep the raw URI as key
    pub fn to_pair(&self, claim: &Claim) -> ClaimPair {
        let key = self
            .claim_key(&claim.claim_type)
            .unwrap_or(claim.claim_type.as_str());
        ClaimPair::new(key, claim.value.clone())
    }

    /// Resolves display pairs to stored claims, failing on the first unknown key.
    ///
    /// A key containing `:` is taken as a literal claim type URI, so pairs
    /// produced by [`Self::to_pair`] always resolve back.
    pub fn resolve_pairs(&self, pairs: &[ClaimPair]) -> Result<Vec<Claim>, String> {
        pairs
            .iter()
            .map(|pair| {
                let claim_type = self
                    .claim_type(&pair.key)
                    .map(str::to_string)
                    .or_else(|| pair.key.contains(':').then(|| pair.key.clone()))
                    .ok_or_else(|| format!("Unknown claim type '{}'.", pair.key))?;
                Ok(Claim::new(claim_type, pair.value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityId;

    fn role(id: &str, name: &str) -> Role {
        Role {
            id: EntityId::from(id),
            name: name.to_string(),
            claims: Vec::new(),
        }
    }

    #[test]
    fn roles_are_ordered_by_name() {
        let cache = LookupCache::build(&[role("3", "Viewer"), role("1", "Admin"), role("2", "Editor")]);
        let names: Vec<_> = cache.role_names().collect();
        assert_eq!(names, vec!["Admin", "Editor", "Viewer"]);
        assert_eq!(cache.role_name("2"), Some("Editor"));
        assert_eq!(cache.role_name("missing"), None);
        assert_eq!(cache.role_count(), 3);
    }

    #[test]
    fn canonical_role_name_ignores_case() {
        let cache = LookupCache::build(&[role("1", "Admin")]);
        assert_eq!(cache.canonical_role_name(" admin "), Some("Admin"));
        assert_eq!(cache.canonical_role_name("ADMIN"), Some("Admin"));
        assert_eq!(cache.canonical_role_name("Admins"), None);
    }

    #[test]
    fn claim_lookups_round_trip() {
        let cache = LookupCache::build(&[]);
        let uri = cache.claim_type("Name").unwrap();
        assert_eq!(uri, claim_types::NAME_CLAIM_TYPE);
        assert_eq!(cache.claim_key(uri), Some("Name"));
        assert_eq!(cache.claim_type("NoSuchKey"), None);
    }

    #[test]
    fn unknown_claim_type_displays_raw_uri() {
        let cache = LookupCache::build(&[]);
        let pair = cache.to_pair(&Claim::new("urn:custom:tier", "gold"));
        assert_eq!(pair, ClaimPair::new("urn:custom:tier", "gold"));
    }

    #[test]
    fn resolve_pairs_rejects_unknown_keys() {
        let cache = LookupCache::build(&[]);
        let claims = cache
            .resolve_pairs(&[ClaimPair::new("Email", "a@b.c")])
            .unwrap();
        assert_eq!(claims[0].value, "a@b.c");
        assert!(claims[0].claim_type.ends_with("emailaddress"));

        let err = cache
            .resolve_pairs(&[ClaimPair::new("Nope", "x")])
            .unwrap_err();
        assert_eq!(err, "Unknown claim type 'Nope'.");

        let raw = cache
            .resolve_pairs(&[ClaimPair::new("urn:custom:tier", "gold")])
            .unwrap();
        assert_eq!(raw[0], Claim::new("urn:custom:tier", "gold"));
    }
}
