use chrono::{Duration, Utc};
use identity_domain::{
    application::{
        ports::ConnectionTarget,
        services::{claim_delta, role_delta, LookupCache},
    },
    domain::entities::{claim_types, Claim, ClaimPair, Response, User},
};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Property-based tests for the orchestration invariants
/// These tests verify set reconciliation, lookups and formatting under arbitrary inputs

mod delta_properties {
    use super::*;

    fn role_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop_oneof![Just(String::new()), "[A-E][a-z]{0,3}"], 0..8)
    }

    proptest! {
        /// Property: applying a role delta to the current set yields the non-blank target set
        #[test]
        fn role_delta_reaches_target(current in role_names(), target in role_names()) {
            let current: Vec<String> = current.into_iter().filter(|n| !n.is_empty()).collect();
            let delta = role_delta(&current, &target);

            let mut result: BTreeSet<String> = current.iter().cloned().collect();
            for name in &delta.to_remove {
                prop_assert!(result.remove(name), "removed {} was not current", name);
            }
            for name in &delta.to_add {
                prop_assert!(result.insert(name.clone()), "added {} was already current", name);
            }

            let expected: BTreeSet<String> = target.into_iter().filter(|n| !n.trim().is_empty()).collect();
            prop_assert_eq!(result, expected);
        }

        /// Property: identical sets produce no changes
        #[test]
        fn role_delta_of_same_set_is_empty(names in role_names()) {
            let names: Vec<String> = names.into_iter().filter(|n| !n.is_empty()).collect();
            let mut shuffled = names.clone();
            shuffled.reverse();
            prop_assert!(role_delta(&names, &shuffled).is_empty());
        }

        /// Property: claim deltas never add and remove the same claim
        #[test]
        fn claim_delta_lists_are_disjoint(
            current in prop::collection::vec(("[ab]", "[xyz]"), 0..6),
            target in prop::collection::vec(("[ab]", "[xyz]"), 0..6),
        ) {
            let current: Vec<Claim> = current.into_iter().map(|(t, v)| Claim::new(t, v)).collect();
            let target: Vec<Claim> = target.into_iter().map(|(t, v)| Claim::new(t, v)).collect();

            let delta = claim_delta(&current, &target);

            for added in &delta.to_add {
                prop_assert!(!delta.to_remove.contains(added));
                prop_assert!(target.contains(added));
                prop_assert!(!current.contains(added));
            }
            for removed in &delta.to_remove {
                prop_assert!(current.contains(removed));
                prop_assert!(!target.contains(removed));
            }
        }
    }
}

mod lookup_properties {
    use super::*;

    proptest! {
        /// Property: every well-known claim survives display and resolution unchanged
        #[test]
        fn known_claims_round_trip(index in 0usize..40, value in "[ -~]{0,20}") {
            let cache = LookupCache::build(&[]);
            let (_, uri) = claim_types::well_known().nth(index).unwrap();
            let claim = Claim::new(uri, value);

            let pair = cache.to_pair(&claim);
            let resolved = cache.resolve_pairs(&[pair]).unwrap();

            prop_assert_eq!(resolved, vec![claim]);
        }

        /// Property: unknown short keys without ':' are always rejected with the key in the message
        #[test]
        fn unknown_keys_are_rejected(key in "Zz[a-z]{1,10}") {
            let cache = LookupCache::build(&[]);
            let err = cache.resolve_pairs(&[ClaimPair::new(key.clone(), "v")]).unwrap_err();
            prop_assert_eq!(err, format!("Unknown claim type '{}'.", key));
        }
    }
}

mod formatting_properties {
    use super::*;

    proptest! {
        /// Property: parsed connection targets carry no surrounding whitespace
        #[test]
        fn connection_targets_are_trimmed(body in "[a-zA-Z0-9:=;/._]{1,30}", pad in "[ \t\n]{0,4}") {
            let raw = format!("{pad}{body}{pad}");
            let target = ConnectionTarget::parse(&raw).unwrap();
            prop_assert_eq!(target.as_str(), body.as_str());
        }

        /// Property: whitespace-only connection strings are invalid arguments
        #[test]
        fn blank_connection_strings_fail(raw in "[ \t\n]{0,6}") {
            let err = ConnectionTarget::parse(&raw).unwrap_err();
            prop_assert!(err.is_invalid_argument());
        }

        /// Property: recorded failures are joined by single spaces and clear success
        #[test]
        fn response_messages_are_space_joined(messages in prop::collection::vec("[a-z]{1,8}", 1..5)) {
            let mut response = Response::succeeded("");
            for message in &messages {
                response.record_failure(message);
            }
            prop_assert!(!response.success);
            prop_assert_eq!(response.messages, messages.join(" "));
        }

        /// Property: every substring of a username selects that user
        #[test]
        fn username_substrings_match(username in "[a-z]{1,12}", start in 0usize..12, len in 1usize..12) {
            let user = User::new(username.clone(), None);
            let start = start.min(username.len() - 1);
            let end = (start + len).min(username.len());
            prop_assert!(user.matches_filter(&username[start..end]));
            let non_substring = format!("{username}!");
            prop_assert!(!user.matches_filter(&non_substring));
        }

        /// Property: an account is locked exactly while its lockout end lies in the future
        #[test]
        fn lockout_follows_end_time(offset_secs in -10_000i64..10_000) {
            let now = Utc::now();
            let mut user = User::new("prop", None);
            user.lockout_end = Some(now + Duration::seconds(offset_secs));
            prop_assert_eq!(user.is_locked_out_at(now), offset_secs > 0);
        }
    }
}
