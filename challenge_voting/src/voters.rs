//! Eligibility classification, one verdict per distinct voter name.
//!
//! The round's rule, as published on every voting page: voting is open to
//! registered contributors whose account is at least 10 days old with at
//! least 50 edits, and to new contributors who entered the challenge with a
//! picture of their own.

use chrono::NaiveDate;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{IdentityRecord, IdentityService, Vote, Voter, VoterError, VoterNote};

/// Minimum account age at the voting-open instant.
pub const MIN_ACCOUNT_AGE_DAYS: i64 = 10;
/// Minimum lifetime edit count.
pub const MIN_EDIT_COUNT: i64 = 50;

// An IP-address-literal signature. Matched before any lookup.
static IP_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9.]+$").unwrap());

/// Classifies every distinct non-empty voter name, in order of first
/// appearance. One identity lookup per name; a failed lookup degrades that
/// voter to an unknown record instead of aborting the batch.
pub fn classify_voters(
    votes: &[Vote],
    open_date: NaiveDate,
    identity: &dyn IdentityService,
) -> Vec<Voter> {
    let mut verdicts: Vec<Voter> = Vec::new();
    for vote in votes {
        let name = vote.voter.as_str();
        if name.is_empty() || verdicts.iter().any(|v| v.name == name) {
            continue;
        }
        verdicts.push(classify_one(name, open_date, identity));
    }
    debug!("classify_voters: {} distinct voters", verdicts.len());
    verdicts
}

fn classify_one(name: &str, open_date: NaiveDate, identity: &dyn IdentityService) -> Voter {
    let mut voter = Voter {
        name: name.to_string(),
        edit_count: -1,
        registration_date: None,
        error: None,
        note: None,
    };

    if IP_LITERAL.is_match(name) {
        voter.error = Some(VoterError::IpAddress);
        return voter;
    }

    let record = identity.lookup(name).unwrap_or_else(|e| {
        warn!("identity lookup failed for {:?}: {}", name, e);
        IdentityRecord::unknown()
    });
    voter.edit_count = record.edit_count;
    voter.registration_date = record.registration_date;

    if !record.is_registered {
        voter.error = Some(VoterError::Unregistered);
        return voter;
    }
    if record.is_blocked {
        voter.note = Some(VoterNote::Blocked);
    }
    let registered = match record.registration_date {
        Some(d) => d,
        // A registered account with no recorded registration date cannot be
        // aged; it falls under the not-registered rule.
        None => {
            voter.error = Some(VoterError::Unregistered);
            return voter;
        }
    };

    let days_active = open_date.signed_duration_since(registered).num_days();
    if days_active < MIN_ACCOUNT_AGE_DAYS || record.edit_count < MIN_EDIT_COUNT {
        // New contributors who entered the challenge with a picture may
        // vote; the violation is then advisory only. When both checks
        // fail, the later assignment overwrites the earlier.
        if record.has_direct_submission {
            if days_active < MIN_ACCOUNT_AGE_DAYS {
                voter.note = Some(VoterNote::NewAccountExempt);
            }
            if record.edit_count < MIN_EDIT_COUNT {
                voter.note = Some(VoterNote::LowEditsExempt);
            }
        } else {
            if days_active < MIN_ACCOUNT_AGE_DAYS {
                voter.error = Some(VoterError::NewAccount);
            }
            if record.edit_count < MIN_EDIT_COUNT {
                voter.error = Some(VoterError::LowEdits);
            }
        }
    }
    voter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditErrors;
    use std::collections::HashMap;

    struct FakeDirectory {
        records: HashMap<String, IdentityRecord>,
        failing: Vec<String>,
    }

    impl FakeDirectory {
        fn new() -> FakeDirectory {
            FakeDirectory {
                records: HashMap::new(),
                failing: Vec::new(),
            }
        }

        fn with(mut self, name: &str, record: IdentityRecord) -> FakeDirectory {
            self.records.insert(name.to_string(), record);
            self
        }

        fn failing_on(mut self, name: &str) -> FakeDirectory {
            self.failing.push(name.to_string());
            self
        }
    }

    impl IdentityService for FakeDirectory {
        fn lookup(&self, name: &str) -> Result<IdentityRecord, AuditErrors> {
            if self.failing.iter().any(|n| n == name) {
                return Err(AuditErrors::LookupFailed);
            }
            Ok(self
                .records
                .get(name)
                .cloned()
                .unwrap_or_else(IdentityRecord::unknown))
        }
    }

    fn open_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 30).unwrap()
    }

    fn registered(days_before_open: i64, edit_count: i64) -> IdentityRecord {
        IdentityRecord {
            is_registered: true,
            registration_date: Some(open_date() - chrono::Duration::days(days_before_open)),
            edit_count,
            is_blocked: false,
            has_direct_submission: false,
        }
    }

    fn vote_by(name: &str) -> Vote {
        Vote {
            entry_number: Some(1),
            award: 3,
            voter: name.to_string(),
            creator: "Someone".to_string(),
            raw_line: String::new(),
            error: None,
        }
    }

    #[test]
    fn ip_literal_short_circuits_without_lookup() {
        // The directory would fail on this name; the IP rule fires first.
        let dir = FakeDirectory::new().failing_on("192.168.0.1");
        let votes = vec![vote_by("192.168.0.1")];
        let verdicts = classify_voters(&votes, open_date(), &dir);
        assert_eq!(verdicts[0].error, Some(VoterError::IpAddress));
        assert_eq!(verdicts[0].edit_count, -1);
    }

    #[test]
    fn unknown_name_is_unregistered() {
        let dir = FakeDirectory::new();
        let verdicts = classify_voters(&[vote_by("Ghost")], open_date(), &dir);
        assert_eq!(verdicts[0].error, Some(VoterError::Unregistered));
    }

    #[test]
    fn established_account_is_eligible() {
        let dir = FakeDirectory::new().with("Vet", registered(400, 9000));
        let verdicts = classify_voters(&[vote_by("Vet")], open_date(), &dir);
        assert_eq!(verdicts[0].error, None);
        assert_eq!(verdicts[0].note, None);
        assert_eq!(verdicts[0].edit_count, 9000);
    }

    #[test]
    fn low_edits_overwrites_new_account_when_both_fail() {
        let dir = FakeDirectory::new().with("Newbie", registered(5, 10));
        let verdicts = classify_voters(&[vote_by("Newbie")], open_date(), &dir);
        assert_eq!(verdicts[0].error, Some(VoterError::LowEdits));
    }

    #[test]
    fn new_account_alone_keeps_its_code() {
        let dir = FakeDirectory::new().with("Fresh", registered(5, 200));
        let verdicts = classify_voters(&[vote_by("Fresh")], open_date(), &dir);
        assert_eq!(verdicts[0].error, Some(VoterError::NewAccount));
    }

    #[test]
    fn challenge_entrant_is_downgraded_to_note() {
        let mut record = registered(5, 10);
        record.has_direct_submission = true;
        let dir = FakeDirectory::new().with("Entrant", record);
        let verdicts = classify_voters(&[vote_by("Entrant")], open_date(), &dir);
        assert_eq!(verdicts[0].error, None);
        assert_eq!(verdicts[0].note, Some(VoterNote::LowEditsExempt));
    }

    #[test]
    fn blocked_is_a_note_not_an_error() {
        let mut record = registered(400, 9000);
        record.is_blocked = true;
        let dir = FakeDirectory::new().with("Held", record);
        let verdicts = classify_voters(&[vote_by("Held")], open_date(), &dir);
        assert_eq!(verdicts[0].error, None);
        assert_eq!(verdicts[0].note, Some(VoterNote::Blocked));
    }

    #[test]
    fn failed_lookup_degrades_that_voter_only() {
        let dir = FakeDirectory::new()
            .with("Vet", registered(400, 9000))
            .failing_on("Flaky");
        let votes = vec![vote_by("Flaky"), vote_by("Vet")];
        let verdicts = classify_voters(&votes, open_date(), &dir);
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[0].error, Some(VoterError::Unregistered));
        assert_eq!(verdicts[0].edit_count, -1);
        assert_eq!(verdicts[1].error, None);
    }

    #[test]
    fn one_verdict_per_name_in_first_appearance_order() {
        let dir = FakeDirectory::new()
            .with("A", registered(400, 9000))
            .with("B", registered(400, 9000));
        let votes = vec![vote_by("B"), vote_by("A"), vote_by("B"), vote_by("")];
        let verdicts = classify_voters(&votes, open_date(), &dir);
        let names: Vec<&str> = verdicts.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
