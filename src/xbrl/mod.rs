pub mod context;
pub mod facts;
pub mod segments;

pub use context::{ContextPeriod, ContextTable, XbrlContext};
pub use facts::{
    extract_concept, extract_concept_facts, extract_concepts, extract_statement, StatementKind,
};
pub use segments::{
    categorize_concepts, discover_company_concepts, discover_company_prefixes, group_by_segment,
    segment_breakdown, CompanyConcepts, ConceptBucket, SegmentGroup,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One axis→member qualifier on a fact, both sides kept as the
/// `prefix:Name` strings declared in the filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionMember {
    pub axis: String,
    pub member: String,
}

/// The reporting period a fact resolved to. `Unknown` marks a dangling
/// or absent contextRef; the fact itself is always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum FactPeriod {
    Instant(NaiveDate),
    DurationEnd(NaiveDate),
    Unknown,
}

/// A scalar financial fact lifted from inline-XBRL markup.
///
/// `numeric_value` already carries the scale: it is the parsed decimal
/// multiplied by 10^scale, so a displayed "1,234" at scale 6 comes back
/// as 1_234_000_000. A value that would not parse as a number is kept
/// as a textual fact with `numeric_value = None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XbrlFact {
    pub concept: String,
    pub namespace: Option<String>,
    pub raw_value: String,
    pub numeric_value: Option<f64>,
    pub scale: i32,
    pub context_ref: Option<String>,
    pub period: FactPeriod,
    pub dimensions: Vec<DimensionMember>,
}
