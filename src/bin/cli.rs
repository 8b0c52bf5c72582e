use anyhow::Result;
use serde_json::json;
use structopt::StructOpt;

use edgar_extract::parsing::{
    chunk_by_sections, detect_8k_items, extract_sections, filing_summary, normalize_content,
};
use edgar_extract::primary::select_primary_document;
use edgar_extract::submission::{flatten_submission, parse_submission};
use edgar_extract::xbrl::{
    discover_company_concepts, extract_concept, extract_statement, segment_breakdown,
    ContextTable, StatementKind,
};
use edgar_extract::{enforce_ceiling, ExtractConfig, ExtractError};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "edgar-extract",
    about = "Decompose SEC EDGAR full-submission filings and extract inline-XBRL facts"
)]
struct Opt {
    /// Path to a full-submission .txt archive
    #[structopt(parse(from_os_str))]
    input: std::path::PathBuf,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// List every document in the submission with its metadata
    Documents,
    /// Flatten every document into one readable text
    Flatten,
    /// Print the primary document's content
    Primary,
    /// Print the primary document normalized to plain text
    Normalize,
    /// Identify canonical filing sections in the primary document
    Sections,
    /// Summarize the filing's section structure
    Summary,
    /// Chunk the primary document section by section
    Chunks {
        #[structopt(long)]
        chunk_size: Option<usize>,
        #[structopt(long)]
        overlap: Option<usize>,
    },
    /// Extract one inline-XBRL concept
    Fact { concept: String },
    /// Extract a statement's concept set (income | balance | cash)
    Statement { kind: StatementKind },
    /// Segment breakdown for a concept, grouped by dimension members
    Segments { concept: String },
    /// Discover company-specific namespaces and concept buckets
    Discover,
    /// Detect 8-K item codes
    Events,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let raw = std::fs::read_to_string(&opt.input)?;
    let config = ExtractConfig::from_env()?;

    let value = run(&raw, opt.command, &config)?;
    let rendered = serde_json::to_string_pretty(&value)?;
    enforce_ceiling(&rendered, config.max_response_bytes)?;
    println!("{}", rendered);
    Ok(())
}

fn run(raw: &str, command: Command, config: &ExtractConfig) -> Result<serde_json::Value> {
    match command {
        Command::Documents => {
            let documents = parse_submission(raw);
            if documents.is_empty() {
                return Err(ExtractError::StructuralParseFailure.into());
            }
            Ok(serde_json::to_value(documents)?)
        }
        Command::Flatten => Ok(json!({ "content": flatten_submission(raw) })),
        Command::Primary => {
            let content = select_primary_document(&parse_submission(raw));
            Ok(json!({ "content": content }))
        }
        Command::Normalize => {
            let content = select_primary_document(&parse_submission(raw));
            Ok(json!({ "content": normalize_content(&content) }))
        }
        Command::Sections => {
            let text = normalize_content(&select_primary_document(&parse_submission(raw)));
            Ok(serde_json::to_value(extract_sections(&text))?)
        }
        Command::Summary => {
            let text = normalize_content(&select_primary_document(&parse_submission(raw)));
            Ok(serde_json::to_value(filing_summary(&extract_sections(
                &text,
            )))?)
        }
        Command::Chunks {
            chunk_size,
            overlap,
        } => {
            let text = normalize_content(&select_primary_document(&parse_submission(raw)));
            let sections = extract_sections(&text);
            let chunks = chunk_by_sections(
                &sections,
                chunk_size.unwrap_or(config.chunk_size),
                overlap.unwrap_or(config.overlap_size),
            );
            Ok(serde_json::to_value(chunks)?)
        }
        Command::Fact { concept } => {
            let contexts = ContextTable::build(raw);
            let fact = extract_concept(raw, &concept, &contexts)
                .ok_or(ExtractError::ConceptNotFound(concept))?;
            Ok(serde_json::to_value(fact)?)
        }
        Command::Statement { kind } => {
            let contexts = ContextTable::build(raw);
            Ok(serde_json::to_value(extract_statement(
                raw, kind, &contexts,
            ))?)
        }
        Command::Segments { concept } => {
            let contexts = ContextTable::build(raw);
            Ok(serde_json::to_value(segment_breakdown(
                raw, &concept, &contexts,
            ))?)
        }
        Command::Discover => Ok(serde_json::to_value(discover_company_concepts(raw))?),
        Command::Events => Ok(serde_json::to_value(detect_8k_items(raw))?),
    }
}
