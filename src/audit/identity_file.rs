//! The JSON-backed identity directory.
//!
//! Account facts come from a local file instead of a live wiki: a JSON
//! object mapping voter names to records. Unknown names degrade to "not
//! registered" rather than failing, as the engine's contract requires.

use std::collections::HashMap;
use std::fs;

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use challenge_voting::{AuditErrors, IdentityRecord, IdentityService};

use crate::audit::{OpeningJsonSnafu, ParsingJsonSnafu, TallyResult};
use snafu::prelude::*;

// Pages under this prefix with exactly one separator are direct challenge
// submissions, the ones that exempt a new contributor.
const CHALLENGE_NAMESPACE: &str = "Commons:Photo challenge/";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "isRegistered")]
    pub is_registered: Option<bool>,
    /// ISO date, e.g. "2019-03-01".
    #[serde(rename = "registrationDate")]
    pub registration_date: Option<String>,
    #[serde(rename = "editCount")]
    pub edit_count: Option<i64>,
    #[serde(rename = "isBlocked")]
    pub is_blocked: Option<bool>,
    /// Page titles the account contributed to. Used to derive
    /// `hasDirectSubmission` when that flag is not given directly.
    pub contributions: Option<Vec<String>>,
    #[serde(rename = "hasDirectSubmission")]
    pub has_direct_submission: Option<bool>,
}

pub struct IdentityDirectory {
    records: HashMap<String, AccountRecord>,
}

impl IdentityDirectory {
    pub fn load(path: &str) -> TallyResult<IdentityDirectory> {
        let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
            path: path.to_string(),
        })?;
        let records: HashMap<String, AccountRecord> = serde_json::from_str(&contents)
            .context(ParsingJsonSnafu {
                path: path.to_string(),
            })?;
        debug!("identity directory: {} records", records.len());
        Ok(IdentityDirectory { records })
    }

    /// A directory with no records: every voter is unknown.
    pub fn empty() -> IdentityDirectory {
        IdentityDirectory {
            records: HashMap::new(),
        }
    }
}

impl IdentityService for IdentityDirectory {
    fn lookup(&self, name: &str) -> Result<IdentityRecord, AuditErrors> {
        let record = match self.records.get(name) {
            Some(r) => r,
            None => return Ok(IdentityRecord::unknown()),
        };
        let registration_date = record.registration_date.as_deref().and_then(|s| {
            let parsed = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
            if parsed.is_none() {
                warn!("unreadable registration date {:?} for {:?}", s, name);
            }
            parsed
        });
        let has_direct_submission = record.has_direct_submission.unwrap_or_else(|| {
            record
                .contributions
                .iter()
                .flatten()
                .any(|title| is_direct_challenge_page(title))
        });
        Ok(IdentityRecord {
            is_registered: record.is_registered.unwrap_or(true),
            registration_date,
            edit_count: record.edit_count.unwrap_or(-1),
            is_blocked: record.is_blocked.unwrap_or(false),
            has_direct_submission,
        })
    }
}

fn is_direct_challenge_page(title: &str) -> bool {
    title.starts_with(CHALLENGE_NAMESPACE) && title.matches('/').count() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> AccountRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn direct_challenge_pages() {
        assert!(is_direct_challenge_page(
            "Commons:Photo challenge/2025 - August - Bark"
        ));
        // Sub-pages such as the voting page itself do not count.
        assert!(!is_direct_challenge_page(
            "Commons:Photo challenge/2025 - August - Bark/Voting"
        ));
        assert!(!is_direct_challenge_page("Commons:Village pump"));
    }

    #[test]
    fn unknown_names_are_unregistered() {
        let dir = IdentityDirectory::empty();
        let rec = dir.lookup("Ghost").unwrap();
        assert!(!rec.is_registered);
        assert_eq!(rec.edit_count, -1);
    }

    #[test]
    fn contributions_derive_the_submission_flag() {
        let mut dir = IdentityDirectory::empty();
        dir.records.insert(
            "Entrant".to_string(),
            record(
                r#"{"editCount": 12, "registrationDate": "2025-08-20",
                    "contributions": ["Commons:Photo challenge/2025 - August - Bark"]}"#,
            ),
        );
        let rec = dir.lookup("Entrant").unwrap();
        assert!(rec.is_registered);
        assert!(rec.has_direct_submission);
        assert_eq!(rec.edit_count, 12);
        assert_eq!(
            rec.registration_date,
            NaiveDate::from_ymd_opt(2025, 8, 20)
        );
    }

    #[test]
    fn explicit_flag_wins_over_contributions() {
        let mut dir = IdentityDirectory::empty();
        dir.records.insert(
            "Stated".to_string(),
            record(r#"{"hasDirectSubmission": true}"#),
        );
        assert!(dir.lookup("Stated").unwrap().has_direct_submission);
    }

    #[test]
    fn unreadable_dates_degrade_to_none() {
        let mut dir = IdentityDirectory::empty();
        dir.records.insert(
            "Odd".to_string(),
            record(r#"{"registrationDate": "twelfth of never"}"#),
        );
        assert_eq!(dir.lookup("Odd").unwrap().registration_date, None);
    }
}
