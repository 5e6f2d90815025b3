//! Lexical classification of ledger lines.
//!
//! The scanner is stateless: each line is tagged on its own, by prefix and
//! substring tests only. Anything contextual (which entry is open, whether
//! the entry is the placeholder sample) belongs to the parser.

/// Marker opening a section header.
pub const HEADER_MARKER: &str = "===";
/// Marker of an embedded image link.
pub const FILE_MARKER: &str = "[[File:";
/// Close marker of the award template, `{{N/3*}}`.
pub const AWARD_CLOSE_MARKER: &str = "*}}";

// The creator label, either live or wrapped in an HTML comment.
const CREATOR_PREFIXES: [&str; 2] = ["<!-- '''C", "'''C"];

/// The tag assigned to a line.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum LineKind {
    /// Section marker, opens a new entry.
    Header,
    /// Carries an embedded image link.
    File,
    /// Creator attribution line.
    Creator,
    /// Carries the award close marker and may hold a vote.
    VoteCandidate,
    /// Everything else. Ignored by the parser.
    Other,
}

/// A single tagged line. `raw` is trimmed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScannedLine<'a> {
    pub kind: LineKind,
    pub raw: &'a str,
}

pub fn classify_line(line: &str) -> LineKind {
    if line.starts_with(HEADER_MARKER) {
        LineKind::Header
    } else if line.contains(FILE_MARKER) {
        LineKind::File
    } else if CREATOR_PREFIXES.iter().any(|p| line.starts_with(p)) {
        LineKind::Creator
    } else if line.contains(AWARD_CLOSE_MARKER) {
        LineKind::VoteCandidate
    } else {
        LineKind::Other
    }
}

/// Tags every line of the document, in order. The returned iterator is lazy
/// and the document can be re-scanned at will.
pub fn scan_lines(text: &str) -> impl Iterator<Item = ScannedLine<'_>> {
    text.lines().map(|l| {
        let raw = l.trim();
        ScannedLine {
            kind: classify_line(raw),
            raw,
        }
    })
}
