//! Set differences between a desired and a current collection of roles or claims.

use crate::domain::entities::Claim;

/// Changes needed to turn one collection into another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta<T> {
    pub to_add: Vec<T>,
    pub to_remove: Vec<T>,
}

impl<T> Delta<T> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }
}

/// Role names to add (in `target`, not in `current`) and remove (the reverse).
///
/// Names are compared trimmed and case-insensitively, the way identity
/// providers look roles up. Each name appears at most once in either list, in
/// first-seen order. Blank names in `target` are ignored.
pub fn role_delta(current: &[String], target: &[String]) -> Delta<String> {
    Delta {
        to_add: distinct_missing(
            target.iter().filter(|n| !n.trim().is_empty()),
            current,
            |a, b| role_key(a) == role_key(b),
        ),
        to_remove: distinct_missing(current.iter(), target, |a, b| role_key(a) == role_key(b)),
    }
}

fn role_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Claims to add and remove, compared by `(claim_type, value)`
pub fn claim_delta(current: &[Claim], target: &[Claim]) -> Delta<Claim> {
    Delta {
        to_add: distinct_missing(target.iter(), current, |a, b| {
            a.matches(&b.claim_type, &b.value)
        }),
        to_remove: distinct_missing(current.iter(), target, |a, b| {
            a.matches(&b.claim_type, &b.value)
        }),
    }
}

fn distinct_missing<'a, T, I, F>(candidates: I, existing: &[T], eq: F) -> Vec<T>
where
    T: Clone + 'a,
    I: Iterator<Item = &'a T>,
    F: Fn(&T, &T) -> bool,
{
    let mut out: Vec<T> = Vec::new();
    for item in candidates {
        if existing.iter().any(|e| eq(item, e)) || out.iter().any(|o| eq(item, o)) {
            continue;
        }
        out.push(item.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn role_delta_adds_and_removes() {
        let delta = role_delta(&names(&["Admin", "Viewer"]), &names(&["Viewer", "Editor"]));
        assert_eq!(delta.to_add, names(&["Editor"]));
        assert_eq!(delta.to_remove, names(&["Admin"]));
        assert_eq!(delta.len(), 2);
    }

    #[test]
    fn role_delta_is_empty_for_same_set() {
        let delta = role_delta(&names(&["Admin", "Viewer"]), &names(&["Viewer", "Admin"]));
        assert!(delta.is_empty());
    }

    #[test]
    fn role_delta_skips_blank_and_duplicate_targets() {
        let delta = role_delta(&[], &names(&["Editor", "", "  ", "Editor"]));
        assert_eq!(delta.to_add, names(&["Editor"]));
        assert!(delta.to_remove.is_empty());
    }

    #[test]
    fn role_delta_ignores_case_and_padding() {
        let delta = role_delta(&names(&["Admin"]), &names(&["admin", " ADMIN "]));
        assert!(delta.is_empty());

        let delta = role_delta(&names(&["Admin"]), &names(&["viewer", "VIEWER"]));
        assert_eq!(delta.to_add, names(&["viewer"]));
        assert_eq!(delta.to_remove, names(&["Admin"]));
    }

    #[test]
    fn claim_delta_compares_type_and_value() {
        let current = vec![Claim::new("urn:name", "Alice"), Claim::new("urn:email", "a@x.io")];
        let target = vec![Claim::new("urn:name", "Alice"), Claim::new("urn:email", "a@y.io")];
        let delta = claim_delta(&current, &target);
        assert_eq!(delta.to_add, vec![Claim::new("urn:email", "a@y.io")]);
        assert_eq!(delta.to_remove, vec![Claim::new("urn:email", "a@x.io")]);
    }
}
