//! Reconciliation of the local collection with a remote snapshot.
//!
//! # Algorithm
//!
//! 1. Index remote quotes by id (first occurrence of a duplicated id wins)
//! 2. Walk local quotes in order:
//!    - id matched and content differs: emit the remote quote (conflict)
//!    - id matched and content equal: emit the local quote
//!    - no id, or id unknown to the remote: emit the local quote
//! 3. Append remote quotes that matched nothing, in remote order
//!
//! The remote breaks ties but is never a source of deletions: local quotes it
//! does not return are kept.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::quotes::Quote;

/// Result of merging a local collection with a remote snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub merged: Vec<Quote>,
    /// Local quotes replaced by a differing remote version.
    pub conflicts_resolved: usize,
    /// Remote quotes appended because no local quote carried their id.
    pub new_from_server: usize,
}

/// Merge `local` with `remote`. Pure and deterministic.
pub fn merge(local: &[Quote], remote: &[Quote]) -> MergeOutcome {
    let mut lookup: HashMap<i64, usize> = HashMap::with_capacity(remote.len());
    for (index, quote) in remote.iter().enumerate() {
        if let Some(id) = quote.id {
            lookup.entry(id).or_insert(index);
        }
    }

    let mut merged = Vec::with_capacity(local.len() + remote.len());
    let mut conflicts_resolved = 0;

    for local_quote in local {
        let matched = local_quote.id.and_then(|id| lookup.remove(&id));
        match matched {
            Some(index) => {
                let remote_quote = &remote[index];
                if remote_quote.same_content(local_quote) {
                    merged.push(local_quote.clone());
                } else {
                    conflicts_resolved += 1;
                    merged.push(remote_quote.clone());
                }
            }
            None => merged.push(local_quote.clone()),
        }
    }

    let mut new_from_server = 0;
    for (index, remote_quote) in remote.iter().enumerate() {
        let Some(id) = remote_quote.id else {
            continue;
        };
        // Matched ids were removed from the lookup; later duplicates never match.
        if lookup.get(&id) == Some(&index) {
            merged.push(remote_quote.clone());
            new_from_server += 1;
        }
    }

    MergeOutcome {
        merged,
        conflicts_resolved,
        new_from_server,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsynced(text: &str) -> Quote {
        Quote::new_local(text, "local").unwrap()
    }

    #[test]
    fn test_remote_wins_on_conflict() {
        let local = vec![Quote::with_id(1, "A", "x")];
        let remote = vec![Quote::with_id(1, "B", "x")];

        let outcome = merge(&local, &remote);
        assert_eq!(outcome.merged, vec![Quote::with_id(1, "B", "x")]);
        assert_eq!(outcome.conflicts_resolved, 1);
        assert_eq!(outcome.new_from_server, 0);
    }

    #[test]
    fn test_category_difference_is_a_conflict() {
        let local = vec![Quote::with_id(1, "A", "x")];
        let remote = vec![Quote::with_id(1, "A", "X")];

        let outcome = merge(&local, &remote);
        assert_eq!(outcome.merged, remote);
        assert_eq!(outcome.conflicts_resolved, 1);
    }

    #[test]
    fn test_identical_quote_is_not_a_conflict() {
        let local = vec![Quote::with_id(1, "A", "x")];
        let outcome = merge(&local, &local.clone());
        assert_eq!(outcome.merged, local);
        assert_eq!(outcome.conflicts_resolved, 0);
        assert_eq!(outcome.new_from_server, 0);
    }

    #[test]
    fn test_local_quote_missing_from_remote_is_kept() {
        let local = vec![Quote::with_id(5, "Z", "x")];
        let outcome = merge(&local, &[]);
        assert_eq!(outcome.merged, local);
        assert_eq!(outcome.conflicts_resolved, 0);
    }

    #[test]
    fn test_new_remote_quotes_are_appended_once() {
        let local = vec![unsynced("mine"), Quote::with_id(1, "A", "x")];
        let remote = vec![
            Quote::with_id(3, "C", "y"),
            Quote::with_id(1, "A", "x"),
            Quote::with_id(2, "B", "y"),
        ];

        let outcome = merge(&local, &remote);
        assert_eq!(
            outcome.merged,
            vec![
                unsynced("mine"),
                Quote::with_id(1, "A", "x"),
                Quote::with_id(3, "C", "y"),
                Quote::with_id(2, "B", "y"),
            ]
        );
        assert_eq!(outcome.new_from_server, 2);
    }

    #[test]
    fn test_conflict_replacement_keeps_local_position() {
        let local = vec![
            Quote::with_id(1, "A", "x"),
            unsynced("between"),
            Quote::with_id(2, "B", "x"),
        ];
        let remote = vec![Quote::with_id(2, "B2", "x"), Quote::with_id(1, "A", "x")];

        let outcome = merge(&local, &remote);
        assert_eq!(
            outcome.merged,
            vec![
                Quote::with_id(1, "A", "x"),
                unsynced("between"),
                Quote::with_id(2, "B2", "x"),
            ]
        );
        assert_eq!(outcome.conflicts_resolved, 1);
        assert_eq!(outcome.new_from_server, 0);
    }

    #[test]
    fn test_unsynced_quotes_are_never_deduplicated() {
        let local = vec![unsynced("same"), unsynced("same")];
        let remote = vec![Quote {
            id: Some(9),
            text: "same".to_string(),
            category: "local".to_string(),
        }];

        let outcome = merge(&local, &remote);
        assert_eq!(outcome.merged.len(), 3);
        assert_eq!(outcome.new_from_server, 1);
    }

    #[test]
    fn test_duplicate_remote_ids_keep_first_occurrence() {
        let remote = vec![Quote::with_id(4, "first", "x"), Quote::with_id(4, "second", "x")];

        let outcome = merge(&[], &remote);
        assert_eq!(outcome.merged, vec![Quote::with_id(4, "first", "x")]);
        assert_eq!(outcome.new_from_server, 1);
    }

    #[test]
    fn test_merge_is_idempotent_for_same_inputs() {
        let local = vec![
            Quote::with_id(1, "A", "x"),
            unsynced("pending"),
            Quote::with_id(7, "kept", "z"),
        ];
        let remote = vec![Quote::with_id(1, "A'", "x"), Quote::with_id(8, "new", "y")];

        let first = merge(&local, &remote);
        let second = merge(&local, &remote);
        assert_eq!(first, second);
    }

    #[test]
    fn test_remerging_output_is_stable() {
        let local = vec![Quote::with_id(1, "A", "x"), unsynced("pending")];
        let remote = vec![Quote::with_id(1, "B", "x"), Quote::with_id(2, "C", "y")];

        let first = merge(&local, &remote);
        let second = merge(&first.merged, &remote);
        assert_eq!(second.merged, first.merged);
        assert_eq!(second.conflicts_resolved, 0);
        assert_eq!(second.new_from_server, 0);
    }
}
