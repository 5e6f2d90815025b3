/*!
Extraction and adjudication engine for community photo-challenge voting
rounds.

The input is the raw wikitext of a voting page: a human-edited,
inconsistently formatted ledger of submitted images and signed votes. The
engine recovers the record structure, classifies every voter and every vote
against the round's eligibility and fraud rules, and produces a
deterministic ranking together with the full audit trail of corrections.

The pipeline, in order:
1. [scan] tags each line lexically;
2. [parse] assembles [Entry] and [Vote] records;
3. [voters] computes one eligibility verdict per distinct voter, querying
   the injected [IdentityService];
4. [votes] runs the error-precedence cascade over all votes;
5. [scoring] aggregates accepted votes into score, support and rank.

Nothing about document content ever fails: malformed input degrades to
skipped lines, empty fields and error codes. See [manual] for the input
formats.
*/

mod config;
pub mod manual;
pub mod parse;
pub mod scan;
pub mod scoring;
pub mod voters;
pub mod votes;

use log::info;

pub use crate::config::*;

/// Runs the full audit for one round.
///
/// Arguments:
/// * `wiki_text` the raw voting-page content
/// * `round` the round label, fixing the voting-open instant
/// * `identity` the account-lookup capability; queried once per distinct
///   voter name
pub fn run_audit(
    wiki_text: &str,
    round: &ChallengeRound,
    identity: &dyn IdentityService,
) -> Result<AuditResult, AuditErrors> {
    let open_date = round.voting_open_date()?;
    info!(
        "Auditing round {:?}, voting opened {}",
        round.label(),
        open_date
    );

    let ledger = parse::parse_ledger(wiki_text);
    info!(
        "Parsed {} entries and {} votes",
        ledger.entries.len(),
        ledger.votes.len()
    );

    let voters = voters::classify_voters(&ledger.votes, open_date, identity);
    info!("Classified {} distinct voters", voters.len());

    let votes = votes::classify_votes(&ledger.votes, &voters);
    let rejected = votes.iter().filter(|v| v.error.is_some()).count();
    info!("{} of {} votes rejected", rejected, votes.len());

    let ranking = scoring::score_entries(&ledger.entries, &votes);

    Ok(AuditResult {
        ranking,
        votes,
        voters,
    })
}
