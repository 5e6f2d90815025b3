//! Renders the engine's structured output as wiki markup.
//!
//! Every function here is a pure `AuditResult -> String` mapping; nothing
//! re-derives business logic. The page shapes follow the round's
//! long-standing conventions: a corrections list, the sortable result
//! table, the winners-table template and the revised voting page.

use challenge_voting::{
    AuditResult, ChallengeRound, VoteError, Voter, VoterError, VoterNote,
};

const TALK_PLACEHOLDER: &str = "<span class=\"signature-talk\">{{int:Talkpagelinktext}}</span>";
const COLLAPSE_TOP: &str =
    "{{Collapse top|Current votes – please choose your own winners before looking}}";
const NOT_COUNTED: &str = "🡆 their votes were not counted";

fn user_link(name: &str) -> String {
    format!("[[User:{}]]", name)
}

fn contributions_link(name: &str, text: &str) -> String {
    format!("[[Special:Contributions/{}|{}]]", name, text)
}

// Link to the new-user log, the canonical evidence for a registration date.
fn registration_log_link(name: &str) -> String {
    format!(
        "<span class=\"plainlinks\">[https://commons.wikimedia.org/wiki/Special:Log?type=newusers&user={} registered]</span>",
        name
    )
}

fn image_link(label: &str, num: Option<u32>) -> String {
    match num {
        Some(n) => format!(
            "[[Commons:Photo challenge/{}/Voting#{}|Image #{}]]",
            label, n, n
        ),
        None => "an unnumbered image".to_string(),
    }
}

// "a", "a and b", "a, b and c".
fn join_natural(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

/// The corrections section: every nonzero error and note code, rendered as
/// a line item, or "no issues found".
pub fn issue_lines(result: &AuditResult, round: &ChallengeRound) -> Vec<String> {
    let label = round.label();
    let mut lines = vec!["=== Issues corrected by the software ===".to_string()];

    // Voter-based issues, by code.
    let mut flagged: Vec<&Voter> = result.voters.iter().filter(|v| v.error.is_some()).collect();
    flagged.sort_by_key(|v| v.error.map(VoterError::code));
    for v in flagged {
        let error = v.error.unwrap();
        let line = match error {
            VoterError::IpAddress => format!(
                "* ({}) {} is an anonymous IP address {}",
                error.code(),
                contributions_link(&v.name, &v.name),
                NOT_COUNTED
            ),
            VoterError::Unregistered => format!(
                "* ({}) {} is not registered {}",
                error.code(),
                user_link(&v.name),
                NOT_COUNTED
            ),
            VoterError::NewAccount => {
                let on = v
                    .registration_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "an unknown date".to_string());
                format!(
                    "* ({}) {} {} on {}, less than the required 10 days before voting started {}",
                    error.code(),
                    user_link(&v.name),
                    registration_log_link(&v.name),
                    on,
                    NOT_COUNTED
                )
            }
            VoterError::LowEdits => format!(
                "* ({}) {} made {}, less than the required 50 {}",
                error.code(),
                user_link(&v.name),
                contributions_link(&v.name, &format!("{} edits", v.edit_count)),
                NOT_COUNTED
            ),
        };
        lines.push(line);
    }

    // Vote-based issues, by code, document order within each.
    for code in [
        VoteError::DuplicateVote,
        VoteError::Unsigned,
        VoteError::SelfVote,
    ] {
        for v in result.votes.iter().filter(|v| v.error == Some(code)) {
            let image = image_link(&label, v.entry_number);
            let line = match code {
                VoteError::DuplicateVote => format!(
                    "* ({}) {} voted more than once for {} 🡆 subsequent votes were not counted",
                    code.code(),
                    user_link(&v.voter),
                    image
                ),
                VoteError::Unsigned => format!(
                    "* ({}) Unsigned vote for {} was detected 🡆 it was not counted (line was: \"{}\")",
                    code.code(),
                    image,
                    v.raw_line
                ),
                _ => format!(
                    "* ({}) {} voted for their own {} 🡆 their vote was not counted",
                    code.code(),
                    user_link(&v.voter),
                    image
                ),
            };
            lines.push(line);
        }
    }

    // Multiple placements, grouped per offender and award.
    let mut offenders: Vec<&str> = Vec::new();
    for v in result.votes.iter() {
        if v.error == Some(VoteError::MultiPlacement) && !offenders.contains(&v.voter.as_str()) {
            offenders.push(&v.voter);
        }
    }
    let place = ["", "3rd", "2nd", "1st"];
    for voter in offenders {
        for award in 1..=3u8 {
            let images: Vec<String> = result
                .votes
                .iter()
                .filter(|v| {
                    v.error == Some(VoteError::MultiPlacement)
                        && v.voter == voter
                        && v.award == award
                })
                .map(|v| match v.entry_number {
                    Some(n) => format!(
                        "[[Commons:Photo challenge/{}/Voting#{}|{}]]",
                        label, n, n
                    ),
                    None => "?".to_string(),
                })
                .collect();
            if images.is_empty() {
                continue;
            }
            lines.push(format!(
                "* {} awarded {} place to multiple images ({}) 🡆 those votes were not counted",
                user_link(voter),
                place[award as usize],
                join_natural(&images)
            ));
        }
    }

    if lines.len() == 1 {
        lines.push("* no issues found".to_string());
    }

    // Advisory notes.
    let mut noted: Vec<&Voter> = result.voters.iter().filter(|v| v.note.is_some()).collect();
    noted.sort_by_key(|v| v.note.map(VoterNote::code));
    if !noted.is_empty() {
        lines.push("\n=== Other (potential) issues ===".to_string());
    }
    for v in noted {
        let what = match v.note.unwrap() {
            VoterNote::Blocked => "is currently blocked".to_string(),
            VoterNote::NewAccountExempt => {
                "registered less than 10 days before voting started; however, they have entered the challenge with a picture"
                    .to_string()
            }
            VoterNote::LowEditsExempt => format!(
                "{}; however, they have entered the challenge with a picture",
                contributions_link(&v.name, "made less than the required 50 edits")
            ),
        };
        lines.push(format!("* {} {}", user_link(&v.name), what));
    }

    lines
}

/// The result page: counts, the sortable score table (rows stop at zero
/// support), then the corrections list.
pub fn result_page(result: &AuditResult, issues: &[String]) -> String {
    let mut creators: Vec<&str> = Vec::new();
    for s in result.ranking.iter() {
        if !creators.contains(&s.entry.creator.as_str()) {
            creators.push(&s.entry.creator);
        }
    }

    let mut out = String::new();
    out.push_str(&format!("*Number of contributors: {}\n", creators.len()));
    out.push_str(&format!("*Number of voters:       {}\n", result.voters.len()));
    out.push_str(&format!("*Number of images:       {}\n\n", result.ranking.len()));
    out.push_str("The Score is the sum of the 3*/2*/1* votes. ");
    out.push_str("The Support is the count of 3*/2*/1* votes and 0* likes. ");
    out.push_str("In the event of a tie vote, the support decides the rank.\n\n");
    out.push_str("{| class=\"sortable wikitable\"\n|-\n");
    out.push_str("! class=\"unsortable\"| Image\n");
    out.push_str("! Author\n");
    out.push_str("! data-sort-type=\"number\" | Rank\n");
    out.push_str("! data-sort-type=\"number\" | Score\n");
    out.push_str("! data-sort-type=\"number\" | Support\n");
    for s in result.ranking.iter() {
        if s.support == 0 {
            break;
        }
        let author = format!(
            "[[User:{0}|{0}]] ([[User talk:{0}|{1}]])",
            s.entry.creator, TALK_PLACEHOLDER
        );
        out.push_str(&format!(
            "|-\n| [[File:{}|120px]] || {} || {} || {} || {}\n",
            s.entry.file_name, author, s.rank, s.score, s.support
        ));
    }
    out.push_str("|}\n\n");
    for issue in issues {
        out.push_str(issue);
        out.push('\n');
    }
    out
}

/// The winners page: the winners-table template, talk-page snippets for the
/// medal ranks, and the announcement.
pub fn winners_page(result: &AuditResult, round: &ChallengeRound) -> String {
    let mut out = String::new();
    out.push_str("{{Photo challenge winners table\n");
    out.push_str(&format!("|page     = Photo challenge/{}\n", round.label()));
    out.push_str(&format!("|theme    = {}\n", round.theme));
    out.push_str("|height   = {{{height|240}}}\n");
    for (i, s) in result.ranking.iter().take(3).enumerate() {
        let slot = i + 1;
        out.push_str(&format!("|image_{}  = {}\n", slot, s.entry.file_name));
        out.push_str(&format!(
            "|title_{}  = {}\n",
            slot,
            add_line_breaks(&s.entry.title, 40)
        ));
        out.push_str(&format!("|author_{} = {}\n", slot, s.entry.creator));
        out.push_str(&format!("|score_{}  = {}\n", slot, s.score));
        out.push_str(&format!("|rank_{}   = {}\n", slot, s.rank));
        out.push_str(&format!(
            "|num_{}    = {}\n",
            slot,
            s.entry
                .number
                .map(|n| n.to_string())
                .unwrap_or_default()
        ));
    }
    out.push_str("}}\n\n");

    // Medal templates for the creators' talk pages.
    let medal = ["", "Gold", "Silver", "Bronze"];
    for s in result.ranking.iter().take(10) {
        let rank = s.rank as usize;
        if rank > 3 || s.support == 0 {
            continue;
        }
        out.push_str(&format!(
            "Add to [[User talk:{}]] talk page:\n",
            s.entry.creator
        ));
        out.push_str(&format!(
            "Header: === [[Commons:Photo challenge/{}/Winners]] ===\n",
            round.label()
        ));
        out.push_str(&format!(
            "{{{{Photo Challenge {}|File:{}|{}|{}|{}}}}}\n\n",
            medal[rank], s.entry.file_name, round.theme, round.year, round.month
        ));
    }

    // The announcement for the challenge talk page.
    let winners: Vec<String> = result
        .ranking
        .iter()
        .take(3)
        .filter(|s| s.support > 0)
        .map(|s| format!("[[User:{}|]]", s.entry.creator))
        .collect();
    out.push_str(&format!(
        "== [[Commons:Photo challenge|Photo challenge]] {} results ==\n",
        round.month
    ));
    out.push_str(&format!(
        "Congratulations to {}. -- ~~~~\n",
        join_natural(&winners)
    ));
    out
}

/// Rewrites the voting page for the closed round: creator attributions are
/// uncollapsed, collapse markers dropped, the deadline notice flipped to
/// past tense.
pub fn revised_page(wiki_text: &str) -> String {
    let mut out = String::from("{{Discussion top}}\n");
    for line in wiki_text.lines() {
        if line.starts_with("<!-- '''Creator") {
            out.push_str(
                &line
                    .replace("<!-- ", "")
                    .replace(" -->", "")
                    .replace(COLLAPSE_TOP, ""),
            );
        } else if line.starts_with("{{Collapse bottom}}") {
            continue;
        } else if line.starts_with("'''Voting will end") {
            out.push_str(&line.replace("Voting will end", "Voting ended"));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out.push_str("{{Discussion bottom}}\n");
    out
}

// Soft-wraps a winner title for the fixed-width table column.
fn add_line_breaks(sentence: &str, max_len: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in sentence.split_whitespace() {
        let sep = if current.is_empty() { 0 } else { 1 };
        if current.len() + sep + word.len() <= max_len {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(current.clone());
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join(" <br/>")
}
