//! Aggregates accepted votes into the ranked result table.
//!
//! The score is the sum of the 3*/2*/1* awards; the support is the count of
//! accepted votes, praises included. In the event of a tie vote, the
//! support decides the rank.

use std::collections::HashMap;

use log::debug;

use crate::config::{Entry, ScoredEntry, Vote};

/// Scores and ranks every entry. The result is ordered by rank; entries
/// sharing a rank keep their document order, so reruns are byte-identical.
pub fn score_entries(entries: &[Entry], votes: &[Vote]) -> Vec<ScoredEntry> {
    // (score, support) per entry number, over accepted votes only. Votes
    // with no entry number never match an entry.
    let mut tally: HashMap<u32, (u32, u32)> = HashMap::new();
    for v in votes.iter().filter(|v| v.error.is_none()) {
        if let Some(n) = v.entry_number {
            let t = tally.entry(n).or_insert((0, 0));
            t.0 += v.award as u32;
            t.1 += 1;
        }
    }

    let mut scored: Vec<ScoredEntry> = entries
        .iter()
        .map(|e| {
            let (score, support) = e
                .number
                .and_then(|n| tally.get(&n).copied())
                .unwrap_or((0, 0));
            ScoredEntry {
                entry: e.clone(),
                score,
                support,
                rank: 0,
            }
        })
        .collect();

    // The composite key orders by score first and support second:
    // score + support / (max_support + 1), in integer arithmetic.
    let max_support = scored.iter().map(|s| s.support).max().unwrap_or(0);
    let key = |s: &ScoredEntry| s.score as u64 * (max_support as u64 + 1) + s.support as u64;

    // Stable sort: equal keys stay in document order.
    scored.sort_by_key(|s| std::cmp::Reverse(key(s)));

    // Dense ranks: equal keys share a rank, the next distinct key takes the
    // following one.
    let mut rank = 0u32;
    let mut prev_key: Option<u64> = None;
    for s in scored.iter_mut() {
        let k = key(s);
        if prev_key != Some(k) {
            rank += 1;
            prev_key = Some(k);
        }
        s.rank = rank;
    }

    debug!(
        "score_entries: {} entries, max support {}",
        scored.len(),
        max_support
    );
    scored
}
