use log::{debug, info};

use challenge_voting::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod identity_file;
pub mod report;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error reading the voting page {path}"))]
    OpeningLedger {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingPage {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing table {path}"))]
    WritingTable { source: csv::Error, path: String },
    #[snafu(display("{source}"))]
    Engine { source: AuditErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

pub fn run_challenge(args: &Args) -> TallyResult<()> {
    let round = ChallengeRound::parse(&args.challenge).context(EngineSnafu {})?;

    let wiki_text = fs::read_to_string(&args.input).context(OpeningLedgerSnafu {
        path: args.input.clone(),
    })?;

    let directory = match &args.identities {
        Some(path) => identity_file::IdentityDirectory::load(path)?,
        None => identity_file::IdentityDirectory::empty(),
    };

    let result = run_audit(&wiki_text, &round, &directory).context(EngineSnafu {})?;

    let out_dir = args.out_dir.clone().unwrap_or_else(|| ".".to_string());
    let label = round.label();

    write_tables(&result, &out_dir, &label)?;

    let issues = report::issue_lines(&result, &round);
    write_page(
        &out_dir,
        &format!("{}_result.txt", label),
        &report::result_page(&result, &issues),
    )?;
    write_page(
        &out_dir,
        &format!("{}_winners.txt", label),
        &report::winners_page(&result, &round),
    )?;
    write_page(
        &out_dir,
        &format!("{}_revised.txt", label),
        &report::revised_page(&wiki_text),
    )?;

    // Assemble the final json
    let summary = build_summary_js(&round, &result);
    let pretty_js_summary = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {
        path: "<summary>".to_string(),
    })?;
    println!("{}", pretty_js_summary);

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let reference = read_summary(reference_path)?;
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {
                path: reference_path.clone(),
            })?;
        if pretty_js_reference != pretty_js_summary {
            print_diff(
                pretty_js_reference.as_str(),
                pretty_js_summary.as_str(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary");
        }
        info!("Summary matches the reference {}", reference_path);
    }

    Ok(())
}

fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.to_string(),
    })?;
    debug!("read content: {:?}", contents);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
        path: path.to_string(),
    })
}

fn write_page(out_dir: &str, name: &str, content: &str) -> TallyResult<()> {
    let path: PathBuf = [out_dir, name].iter().collect();
    let p = path.as_path().display().to_string();
    info!("Writing {}", p);
    fs::write(&path, content).context(WritingPageSnafu { path: p })
}

// The intermediate tables, one row per vote / entry / voter. Absent values
// are empty fields, error codes are their historical integers.
fn write_tables(result: &AuditResult, out_dir: &str, label: &str) -> TallyResult<()> {
    let opt_num = |n: Option<u32>| n.map(|x| x.to_string()).unwrap_or_default();

    let path = table_path(out_dir, label, "votes");
    let mut w = csv::Writer::from_path(&path).context(WritingTableSnafu { path: path.clone() })?;
    w.write_record(["num", "award", "voter", "creator", "error", "line"])
        .context(WritingTableSnafu { path: path.clone() })?;
    for v in result.votes.iter() {
        w.write_record([
            opt_num(v.entry_number),
            v.award.to_string(),
            v.voter.clone(),
            v.creator.clone(),
            v.error.map(|e| e.code().to_string()).unwrap_or_default(),
            v.raw_line.clone(),
        ])
        .context(WritingTableSnafu { path: path.clone() })?;
    }
    w.flush()
        .map_err(csv::Error::from)
        .context(WritingTableSnafu { path })?;

    let path = table_path(out_dir, label, "files");
    let mut w = csv::Writer::from_path(&path).context(WritingTableSnafu { path: path.clone() })?;
    w.write_record([
        "num", "file_name", "title", "creator", "score", "support", "rank",
    ])
    .context(WritingTableSnafu { path: path.clone() })?;
    for s in result.ranking.iter() {
        w.write_record([
            opt_num(s.entry.number),
            s.entry.file_name.clone(),
            s.entry.title.clone(),
            s.entry.creator.clone(),
            s.score.to_string(),
            s.support.to_string(),
            s.rank.to_string(),
        ])
        .context(WritingTableSnafu { path: path.clone() })?;
    }
    w.flush()
        .map_err(csv::Error::from)
        .context(WritingTableSnafu { path })?;

    let path = table_path(out_dir, label, "voters");
    let mut w = csv::Writer::from_path(&path).context(WritingTableSnafu { path: path.clone() })?;
    w.write_record(["voter", "edit_count", "reg_date", "error", "note"])
        .context(WritingTableSnafu { path: path.clone() })?;
    for v in result.voters.iter() {
        w.write_record([
            v.name.clone(),
            v.edit_count.to_string(),
            v.registration_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            v.error.map(|e| e.code().to_string()).unwrap_or_default(),
            v.note.map(|n| n.code().to_string()).unwrap_or_default(),
        ])
        .context(WritingTableSnafu { path: path.clone() })?;
    }
    w.flush()
        .map_err(csv::Error::from)
        .context(WritingTableSnafu { path })
}

fn table_path(out_dir: &str, label: &str, table: &str) -> String {
    let file = format!("{}_{}.csv", label, table);
    let p: PathBuf = [out_dir, file.as_str()].iter().collect();
    p.as_path().display().to_string()
}

fn build_summary_js(round: &ChallengeRound, result: &AuditResult) -> JSValue {
    let ranking: Vec<JSValue> = result
        .ranking
        .iter()
        .map(|s| {
            json!({
                "num": s.entry.number,
                "fileName": s.entry.file_name,
                "creator": s.entry.creator,
                "rank": s.rank,
                "score": s.score,
                "support": s.support,
            })
        })
        .collect();
    let rejected: Vec<JSValue> = result
        .votes
        .iter()
        .filter_map(|v| {
            v.error.map(|e| {
                json!({
                    "num": v.entry_number,
                    "award": v.award,
                    "voter": v.voter,
                    "error": e.code(),
                })
            })
        })
        .collect();
    let voters: Vec<JSValue> = result
        .voters
        .iter()
        .map(|v| {
            json!({
                "voter": v.name,
                "editCount": v.edit_count,
                "error": v.error.map(|e| e.code()),
                "note": v.note.map(|n| n.code()),
            })
        })
        .collect();
    json!({
        "challenge": round.label(),
        "ranking": ranking,
        "rejectedVotes": rejected,
        "voters": voters,
    })
}
