//! The vote-validity cascade.
//!
//! Corrections are an ordered list of pure passes over the full vote list.
//! Each pass re-derives the list; later passes overwrite earlier verdicts
//! on the same vote, so the most specific problem wins. The order is
//! load-bearing: duplicate and self-vote detection run on the
//! amnesty-adjusted state, and multiple-placement detection runs last,
//! restricted to votes not already disqualified.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::config::{Vote, VoteError, Voter};

/// Read-only view of the voter verdicts, indexed by name.
pub struct VerdictTable<'a> {
    by_name: HashMap<&'a str, &'a Voter>,
}

impl<'a> VerdictTable<'a> {
    pub fn new(voters: &'a [Voter]) -> VerdictTable<'a> {
        VerdictTable {
            by_name: voters.iter().map(|v| (v.name.as_str(), v)).collect(),
        }
    }

    fn inherited_error(&self, name: &str) -> Option<VoteError> {
        self.by_name
            .get(name)
            .and_then(|v| v.error)
            .map(VoteError::from)
    }
}

type Pass = fn(Vec<Vote>, &VerdictTable) -> Vec<Vote>;

/// The correction passes, applied in order.
const PASSES: &[(&str, Pass)] = &[
    ("inherit_voter_errors", inherit_voter_errors),
    ("praise_amnesty", praise_amnesty),
    ("mark_duplicates", mark_duplicates),
    ("mark_unsigned", mark_unsigned),
    ("mark_self_votes", mark_self_votes),
    ("mark_multiple_placements", mark_multiple_placements),
];

/// Runs the cascade over all votes, returning the corrected list in the
/// same (document) order. Requires the complete verdict set.
pub fn classify_votes(votes: &[Vote], voters: &[Voter]) -> Vec<Vote> {
    let table = VerdictTable::new(voters);
    let mut current: Vec<Vote> = votes.to_vec();
    for (name, pass) in PASSES {
        current = pass(current, &table);
        debug!(
            "{}: {} votes flagged",
            name,
            current.iter().filter(|v| v.error.is_some()).count()
        );
    }
    current
}

// Pass 1: every vote starts from its voter's verdict.
fn inherit_voter_errors(votes: Vec<Vote>, table: &VerdictTable) -> Vec<Vote> {
    votes
        .into_iter()
        .map(|mut v| {
            if let Some(e) = table.inherited_error(&v.voter) {
                v.error = Some(e);
            }
            v
        })
        .collect()
}

// Pass 2: ineligible voters may still award praises.
fn praise_amnesty(votes: Vec<Vote>, _table: &VerdictTable) -> Vec<Vote> {
    votes
        .into_iter()
        .map(|mut v| {
            if v.award == 0 && v.error.is_some() {
                v.error = None;
            }
            v
        })
        .collect()
}

// Pass 3: same voter, same entry: only the first vote stands.
fn mark_duplicates(votes: Vec<Vote>, _table: &VerdictTable) -> Vec<Vote> {
    let mut seen: HashSet<(Option<u32>, String)> = HashSet::new();
    votes
        .into_iter()
        .map(|mut v| {
            if !seen.insert((v.entry_number, v.voter.clone())) {
                v.error = Some(VoteError::DuplicateVote);
            }
            v
        })
        .collect()
}

// Pass 4.
fn mark_unsigned(votes: Vec<Vote>, _table: &VerdictTable) -> Vec<Vote> {
    votes
        .into_iter()
        .map(|mut v| {
            if v.voter.is_empty() {
                v.error = Some(VoteError::Unsigned);
            }
            v
        })
        .collect()
}

// Pass 5. Unsigned lines under a creator-less entry stay unsigned, hence
// the non-empty guard.
fn mark_self_votes(votes: Vec<Vote>, _table: &VerdictTable) -> Vec<Vote> {
    votes
        .into_iter()
        .map(|mut v| {
            if !v.voter.is_empty() && v.voter == v.creator {
                v.error = Some(VoteError::SelfVote);
            }
            v
        })
        .collect()
}

// Pass 6: a voter may cast one 1st, one 2nd and one 3rd. Every member of an
// offending (award, voter) group is invalidated; votes already flagged do
// not count toward a group.
fn mark_multiple_placements(votes: Vec<Vote>, _table: &VerdictTable) -> Vec<Vote> {
    let mut group_sizes: HashMap<(u8, String), u32> = HashMap::new();
    for v in votes.iter() {
        if v.award > 0 && v.error.is_none() {
            *group_sizes.entry((v.award, v.voter.clone())).or_insert(0) += 1;
        }
    }
    votes
        .into_iter()
        .map(|mut v| {
            if v.award > 0
                && v.error.is_none()
                && group_sizes
                    .get(&(v.award, v.voter.clone()))
                    .map(|&n| n > 1)
                    .unwrap_or(false)
            {
                v.error = Some(VoteError::MultiPlacement);
            }
            v
        })
        .collect()
}
