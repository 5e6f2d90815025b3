//! Recovers `Entry` and `Vote` records from the tagged line stream.
//!
//! The parser is a small state machine around one register, the "current
//! entry context", reset on every header line. It never fails: malformed
//! lines degrade to skips or empty fields and are reported, if at all, as
//! error codes further down the pipeline.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{Entry, Vote};
use crate::scan::{scan_lines, LineKind, FILE_MARKER};

/// The placeholder illustrating how to vote. Lines under it look like votes
/// but are never emitted.
pub const SAMPLE_IMAGE: &str = "Sample-image.svg";

// Signature gadget some editors carry in their signature; stripped from the
// stored raw line so audit output stays readable.
const SIGNATURE_PLACEHOLDER: &str =
    "<span class=\"signature-talk\">{{int:Talkpagelinktext}}</span>";

// Entry number inside the header anchor, e.g. `<span ... id="7">7</span>`.
static ANCHOR_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<span[^>]*>(\d+)</span>").unwrap());
// Legacy header form `===7. name===`.
static HEADER_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"===+\s*(\d+)\.").unwrap());
// Creator attribution link.
static CREATOR_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[User:([^|\]]+)").unwrap());
// Signature of an anonymous or scripted voter.
static CONTRIBUTIONS_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[Special:Contributions/([^|\]]+)").unwrap());
// Localized user link; the ledger has seen at least these three spellings.
static USER_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(?:[Uu]ser|[Bb]enutzer|[Uu]suario):([^|\]]+)").unwrap());
// The award template, `{{0/3*}}` through `{{3/3*}}`.
static AWARD_TEMPLATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\d)/3\*\}\}").unwrap());

/// The immutable snapshot of one parsed round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ledger {
    pub entries: Vec<Entry>,
    pub votes: Vec<Vote>,
}

// The current-entry register. Reset on every header line.
#[derive(Debug, Clone, Default)]
struct EntryContext {
    number: Option<u32>,
    file_name: String,
    title: String,
    creator: String,
}

// First capture group, trimmed, or empty.
fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn header_number(line: &str) -> Option<u32> {
    let num = capture(&ANCHOR_NUMBER, line);
    let num = if num.is_empty() {
        capture(&HEADER_NUMBER, line)
    } else {
        num
    };
    num.parse::<u32>().ok()
}

/// Parses the raw document into entries and votes, in document order.
pub fn parse_ledger(text: &str) -> Ledger {
    let mut entries: Vec<Entry> = Vec::new();
    let mut votes: Vec<Vote> = Vec::new();
    let mut ctx = EntryContext::default();

    for line in scan_lines(text) {
        match line.kind {
            LineKind::Header => {
                ctx = EntryContext {
                    number: header_number(line.raw),
                    ..EntryContext::default()
                };
                if ctx.number.is_none() {
                    debug!("header with no recoverable number: {:?}", line.raw);
                }
            }
            LineKind::File => {
                // `[[File:name|...|...|...|title ...` with stray `[` treated
                // as one more delimiter. The last file line under a header
                // wins.
                let cleaned = line.raw.replace(FILE_MARKER, "").replace('[', "|");
                let parts: Vec<&str> = cleaned.split('|').collect();
                ctx.file_name = parts[0].trim().to_string();
                if parts.len() >= 5 {
                    ctx.title = parts[4].trim().to_string();
                }
            }
            LineKind::Creator => {
                ctx.creator = capture(&CREATOR_LINK, line.raw);
                entries.push(Entry {
                    number: ctx.number,
                    file_name: ctx.file_name.clone(),
                    title: ctx.title.clone(),
                    creator: ctx.creator.clone(),
                });
            }
            LineKind::VoteCandidate => {
                if ctx.file_name == SAMPLE_IMAGE {
                    continue;
                }
                let voter = if line.raw.contains("[[Special:Contributions/") {
                    capture(&CONTRIBUTIONS_LINK, line.raw)
                } else {
                    capture(&USER_LINK, line.raw)
                };
                let award = capture(&AWARD_TEMPLATE, line.raw);
                match award.parse::<u8>() {
                    Ok(award) => votes.push(Vote {
                        entry_number: ctx.number,
                        award,
                        voter,
                        creator: ctx.creator.clone(),
                        raw_line: line.raw.replace(SIGNATURE_PLACEHOLDER, ""),
                        error: None,
                    }),
                    // No award digit: a comment or a malformed vote. Not an
                    // error, the line just is not a vote.
                    Err(_) => debug!("vote candidate without award: {:?}", line.raw),
                }
            }
            LineKind::Other => {}
        }
    }

    debug!(
        "parse_ledger: {} entries, {} votes",
        entries.len(),
        votes.len()
    );
    Ledger { entries, votes }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"__NOTOC__
'''Voting will end at midnight UTC on 30 September 2025'''. The theme was '''Bark'''.
===<span class="anchor" id="1">1</span>. Sample-image.svg===
[[File:Sample-image.svg|none|thumb|300px|How to vote]]
<!-- '''Creator:''' [[User:Example|Example]] -->
* {{3/3*}} [[User:Nobody|Nobody]] 09:00, 1 September 2025 (UTC)
===<span class="anchor" id="2">2</span>. Old oak.jpg===
[[File:Old oak.jpg|none|thumb|450px|Old oak in winter [{{filepath:Old oak.jpg}}<br>''(Full size image)'']]]
<!-- '''Creator:''' [[User:Alice|Alice]] -->
* {{3/3*}} [[User:Bob|Bob]] 10:03, 2 September 2025 (UTC)
* {{0/3*}} [[Benutzer:Karl|Karl]] 11:40, 2 September 2025 (UTC)
* {{2/3*}} [[Special:Contributions/198.51.100.7|198.51.100.7]] 12:00, 3 September 2025 (UTC)
* a comment that mentions an award close marker *}} but votes nothing
===<span class="anchor" id="3">3</span>. Birch row.jpg===
[[File:Wrong upload.jpg|none|thumb|450px|First try]]
[[File:Birch row.jpg|none|thumb|450px|Birch row at dusk]]
'''Creator:''' [[User:Carol|Carol]]
* {{1/3*}} [[User:Alice|Alice]]<span class="signature-talk">{{int:Talkpagelinktext}}</span> 19:12, 4 September 2025 (UTC)
=== Unnumbered section ===
[[File:Stray.jpg|none|thumb|450px|Stray]]
'''Creator:''' [[User:Dave|Dave]]
* {{1/3*}} [[User:Erin|Erin]] 20:00, 5 September 2025 (UTC)
"#;

    #[test]
    fn recovers_entries_in_document_order() {
        let ledger = parse_ledger(PAGE);
        let numbers: Vec<Option<u32>> = ledger.entries.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3), None]);
        assert_eq!(ledger.entries[1].file_name, "Old oak.jpg");
        assert_eq!(ledger.entries[1].title, "Old oak in winter");
        assert_eq!(ledger.entries[1].creator, "Alice");
    }

    #[test]
    fn last_file_line_wins() {
        let ledger = parse_ledger(PAGE);
        assert_eq!(ledger.entries[2].file_name, "Birch row.jpg");
        assert_eq!(ledger.entries[2].creator, "Carol");
    }

    #[test]
    fn sample_image_votes_are_not_emitted() {
        let ledger = parse_ledger(PAGE);
        assert!(ledger.votes.iter().all(|v| v.voter != "Nobody"));
    }

    #[test]
    fn votes_carry_entry_and_creator_context() {
        let ledger = parse_ledger(PAGE);
        let bob = ledger.votes.iter().find(|v| v.voter == "Bob").unwrap();
        assert_eq!(bob.entry_number, Some(2));
        assert_eq!(bob.award, 3);
        assert_eq!(bob.creator, "Alice");
    }

    #[test]
    fn localized_and_contributions_signatures() {
        let ledger = parse_ledger(PAGE);
        let karl = ledger.votes.iter().find(|v| v.voter == "Karl").unwrap();
        assert_eq!(karl.award, 0);
        let ip = ledger
            .votes
            .iter()
            .find(|v| v.voter == "198.51.100.7")
            .unwrap();
        assert_eq!(ip.award, 2);
    }

    #[test]
    fn award_less_candidate_lines_are_silently_skipped() {
        let ledger = parse_ledger(PAGE);
        // Entry 2 got exactly three votes; the stray comment is not one.
        let on_two = ledger
            .votes
            .iter()
            .filter(|v| v.entry_number == Some(2))
            .count();
        assert_eq!(on_two, 3);
    }

    #[test]
    fn signature_placeholder_is_stripped_from_raw_line() {
        let ledger = parse_ledger(PAGE);
        let alice = ledger.votes.iter().find(|v| v.voter == "Alice").unwrap();
        assert!(!alice.raw_line.contains("signature-talk"));
        assert!(alice.raw_line.contains("{{1/3*}}"));
    }

    #[test]
    fn unnumbered_header_yields_empty_number() {
        let ledger = parse_ledger(PAGE);
        let erin = ledger.votes.iter().find(|v| v.voter == "Erin").unwrap();
        assert_eq!(erin.entry_number, None);
    }

    #[test]
    fn legacy_header_number_form() {
        let ledger = parse_ledger("===12. Old pier.jpg===\n[[File:Old pier.jpg|x]]\n'''Creator:''' [[User:Fay|Fay]]\n");
        assert_eq!(ledger.entries[0].number, Some(12));
    }

    #[test]
    fn unsigned_vote_has_empty_voter() {
        let page = "===<span class=\"anchor\" id=\"1\">1</span>. A.jpg===\n[[File:A.jpg|x]]\n'''Creator:''' [[User:Ann|Ann]]\n* {{2/3*}} unsigned scribble\n";
        let ledger = parse_ledger(page);
        assert_eq!(ledger.votes.len(), 1);
        assert_eq!(ledger.votes[0].voter, "");
    }
}
