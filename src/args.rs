use clap::Parser;

/// Audits and tallies one photo-challenge voting round.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The raw wikitext of the round's voting page.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// The round label, of the form "<year> - <month-name> - <theme>",
    /// for example "2025 - August - Bark". It fixes the voting-open date
    /// used by the eligibility rules.
    #[clap(short, long, value_parser)]
    pub challenge: String,

    /// (file path, optional) A JSON directory of voter account records.
    /// Voters missing from it are treated as not registered. See the
    /// library manual for the file format.
    #[clap(long, value_parser)]
    pub identities: Option<String>,

    /// (directory path, default ".") Where the report pages and the audit
    /// tables are written.
    #[clap(short, long, value_parser)]
    pub out_dir: Option<String>,

    /// (file path, optional) A reference summary in JSON format. If
    /// provided, chtally checks that the computed summary matches the
    /// reference and fails on any difference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
