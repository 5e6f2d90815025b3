// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

/// One submitted image under adjudication.
///
/// Entries are created by the ledger parser once the header, file and
/// creator lines of a section have been seen, and are immutable afterwards.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Entry {
    /// Sequence number recovered from the section anchor. `None` when the
    /// header carried no recoverable number; such entries are kept for the
    /// audit trail but never matched by votes.
    pub number: Option<u32>,
    pub file_name: String,
    /// Display title, empty when the image link had no caption segment.
    pub title: String,
    /// Creator identity. Empty when the creator line could not be parsed;
    /// this is a data-quality defect, not an error code.
    pub creator: String,
}

/// A single (voter, entry, award) triple extracted from the ledger.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    /// The entry this vote points at, by section number.
    pub entry_number: Option<u32>,
    /// 0 is a "highly commended" praise, 1-3 are 3rd/2nd/1st place.
    pub award: u8,
    /// Signing identity. Empty means the vote is unsigned.
    pub voter: String,
    /// Creator of the referenced entry, copied at parse time so the
    /// self-vote pass needs no entry lookup.
    pub creator: String,
    /// Original line text (signature placeholder stripped), kept for audit.
    pub raw_line: String,
    /// Final verdict. `None` means the vote counts normally.
    pub error: Option<VoteError>,
}

/// Eligibility verdict for one distinct voter name.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Voter {
    pub name: String,
    /// -1 when unknown.
    pub edit_count: i64,
    pub registration_date: Option<NaiveDate>,
    /// Disqualifying issue, if any. All of this voter's placement votes
    /// inherit it.
    pub error: Option<VoterError>,
    /// Advisory flag that does not disqualify.
    pub note: Option<VoterNote>,
}

/// Entry enriched with the outcome of the scoring pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoredEntry {
    pub entry: Entry,
    /// Sum of awards over accepted votes.
    pub score: u32,
    /// Count of accepted votes, praises included.
    pub support: u32,
    /// Dense rank, 1-based. Entries with equal score and support share it.
    pub rank: u32,
}

// ******** Error and note codes *********

// The discriminants keep the numbering used by the ledger's audit pages for
// years, so reports and CSV dumps stay comparable across rounds.

/// Disqualifying issue attached to a voter.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[repr(u8)]
pub enum VoterError {
    /// The name is an anonymous IP-address literal.
    IpAddress = 1,
    /// No registered account under this name.
    Unregistered = 2,
    /// Registered less than the required days before voting opened.
    NewAccount = 3,
    /// Fewer edits than required.
    LowEdits = 4,
}

/// Advisory flag attached to a voter. Does not invalidate votes.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[repr(u8)]
pub enum VoterNote {
    /// The account is currently blocked.
    Blocked = 1,
    /// Account younger than required, but the voter entered the challenge
    /// with a picture of their own.
    NewAccountExempt = 3,
    /// Fewer edits than required, same exemption.
    LowEditsExempt = 4,
}

/// Final verdict attached to a vote. The first four variants are inherited
/// from the voter's verdict, the rest are vote-specific.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[repr(u8)]
pub enum VoteError {
    IpAddress = 1,
    Unregistered = 2,
    NewAccount = 3,
    LowEdits = 4,
    /// Same voter voted more than once for the same entry; all votes after
    /// the first are dropped.
    DuplicateVote = 5,
    /// The vote line carried no recognizable signature.
    Unsigned = 6,
    /// The entry's creator voted for their own picture.
    SelfVote = 7,
    /// The voter gave the same placement award to several entries.
    MultiPlacement = 8,
}

impl VoterError {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl VoterNote {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl VoteError {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<VoterError> for VoteError {
    fn from(e: VoterError) -> VoteError {
        match e {
            VoterError::IpAddress => VoteError::IpAddress,
            VoterError::Unregistered => VoteError::Unregistered,
            VoterError::NewAccount => VoteError::NewAccount,
            VoterError::LowEdits => VoteError::LowEdits,
        }
    }
}

// ******** Identity service *********

/// Account facts for one voter name, as reported by the identity service.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IdentityRecord {
    pub is_registered: bool,
    pub registration_date: Option<NaiveDate>,
    /// -1 when unknown.
    pub edit_count: i64,
    pub is_blocked: bool,
    /// Whether the account submitted a picture directly to a challenge.
    pub has_direct_submission: bool,
}

impl IdentityRecord {
    /// The degraded record used when a lookup fails: such a voter is
    /// treated as not registered, with no edit history.
    pub fn unknown() -> IdentityRecord {
        IdentityRecord {
            is_registered: false,
            registration_date: None,
            edit_count: -1,
            is_blocked: false,
            has_direct_submission: false,
        }
    }
}

/// The injected account-lookup capability.
///
/// Implementations must not fail on *unknown* names; those are reported as
/// `is_registered: false`. An `Err` return models a failed lookup (the
/// backing store was unreachable); the voter classifier degrades that
/// voter to [IdentityRecord::unknown] and keeps going.
pub trait IdentityService {
    fn lookup(&self, name: &str) -> Result<IdentityRecord, AuditErrors>;
}

// ******** Round context *********

/// A challenge round label of the form `"<year> - <month-name> - <theme>"`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChallengeRound {
    pub year: String,
    pub month: String,
    pub theme: String,
}

impl ChallengeRound {
    /// Splits a round label into its parts. The date itself is only
    /// validated by [ChallengeRound::voting_open_date].
    pub fn parse(label: &str) -> Result<ChallengeRound, AuditErrors> {
        let parts: Vec<&str> = label.split(" - ").collect();
        match parts.as_slice() {
            [year, month, theme] => Ok(ChallengeRound {
                year: year.trim().to_string(),
                month: month.trim().to_string(),
                theme: theme.trim().to_string(),
            }),
            _ => Err(AuditErrors::InvalidChallengeLabel),
        }
    }

    /// The label as it appears in page names.
    pub fn label(&self) -> String {
        format!("{} - {} - {}", self.year, self.month, self.theme)
    }

    /// The documented voting-open instant: day 30 of the submission month.
    pub fn voting_open_date(&self) -> Result<NaiveDate, AuditErrors> {
        NaiveDate::parse_from_str(&format!("30 {} {}", self.month, self.year), "%d %B %Y")
            .map_err(|_| AuditErrors::InvalidChallengeLabel)
    }
}

// ******** Output data structures *********

/// The full outcome of auditing one round.
///
/// Everything is ordered stably so a report assembler can re-render the
/// round without re-deriving any business logic: `ranking` by rank,
/// `votes` in document order with their final codes, `voters` in order of
/// first appearance in the ledger.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AuditResult {
    pub ranking: Vec<ScoredEntry>,
    pub votes: Vec<Vote>,
    pub voters: Vec<Voter>,
}

/// Errors that prevent the audit from starting at all. Document content
/// never raises; malformed input degrades to skips and error codes.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AuditErrors {
    InvalidChallengeLabel,
    LookupFailed,
}

impl Error for AuditErrors {}

impl Display for AuditErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditErrors::InvalidChallengeLabel => {
                write!(f, "challenge label is not of the form <year> - <month> - <theme>")
            }
            AuditErrors::LookupFailed => write!(f, "identity lookup failed"),
        }
    }
}
