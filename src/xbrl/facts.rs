use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::context::ContextTable;
use super::{FactPeriod, XbrlFact};

static SCALE_ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"scale="(-?\d+)""#).unwrap());
static CONTEXT_ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"contextRef="([^"]+)""#).unwrap());
static STRAY_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^--\d{2}-\d{2}$").unwrap());

/// Tag-instance patterns for one concept, in priority order: exact
/// namespaced name, exact unqualified name, then substring match (some
/// issuers use nonstandard namespace abbreviations), first over
/// `ix:nonFraction` and then `ix:nonNumeric`. The captured groups are
/// the full name attribute and the tag's inner text.
fn concept_patterns(concept: &str) -> Vec<Regex> {
    let escaped = regex::escape(concept);
    let mut patterns = Vec::with_capacity(6);

    for tag in ["nonFraction", "nonNumeric"] {
        for name_expr in [
            format!(r#"[^"]*:{escaped}"#),
            escaped.clone(),
            format!(r#"[^"]*{escaped}[^"]*"#),
        ] {
            let pattern = format!(
                r#"(?is)<ix:{tag}\s[^>]*?name="({name_expr})"[^>]*>([^<]*)</ix:{tag}>"#
            );
            patterns.push(Regex::new(&pattern).expect("concept pattern"));
        }
    }

    patterns
}

// Placeholder glyphs that stand in for an absent number: dashes,
// em/en-dashes, and stray date fragments like "--06-30".
fn is_placeholder(value: &str) -> bool {
    value.is_empty()
        || value.chars().all(|c| c == '-')
        || value == "\u{2014}"
        || value == "\u{2013}"
        || STRAY_DATE_RE.is_match(value)
}

fn parse_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '(' | ')'))
        .collect();
    let value: f64 = cleaned.trim().parse().ok()?;

    // Parenthesized amounts are negative by accounting convention.
    if raw.contains('(') && raw.contains(')') {
        Some(-value)
    } else {
        Some(value)
    }
}

fn build_fact(tag: &str, name_attr: &str, text: &str, contexts: &ContextTable) -> XbrlFact {
    let (namespace, concept) = match name_attr.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, name_attr.to_string()),
    };

    let scale: i32 = SCALE_ATTR_RE
        .captures(tag)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0);
    let context_ref = CONTEXT_ATTR_RE.captures(tag).map(|c| c[1].to_string());

    let numeric_value = parse_numeric(text).map(|v| v * 10f64.powi(scale));

    let (period, dimensions) = match context_ref.as_deref() {
        Some(id) => match contexts.resolve(id) {
            Ok(context) => (context.period.fact_period(), context.dimensions.clone()),
            Err(err) => {
                log::debug!("{}; keeping fact with unresolved period", err);
                (FactPeriod::Unknown, Vec::new())
            }
        },
        None => (FactPeriod::Unknown, Vec::new()),
    };

    XbrlFact {
        concept,
        namespace,
        raw_value: text.to_string(),
        numeric_value,
        scale,
        context_ref,
        period,
        dimensions,
    }
}

/// Every tag instance of the winning pattern tier for `concept`, in
/// document order. An empty result means the concept has no tag at
/// all, distinguishable from a present-but-zero fact.
pub fn extract_concept_facts(
    content: &str,
    concept: &str,
    contexts: &ContextTable,
) -> Vec<XbrlFact> {
    for pattern in concept_patterns(concept) {
        let mut facts = Vec::new();
        for cap in pattern.captures_iter(content) {
            let text = decode_html_entities(&cap[2]).trim().to_string();
            if is_placeholder(&text) {
                continue;
            }
            facts.push(build_fact(&cap[0], &cap[1], &text, contexts));
        }
        if !facts.is_empty() {
            return facts;
        }
    }

    log::debug!("concept {} not present", concept);
    Vec::new()
}

/// First usable fact for `concept`, or `None` when the filing carries
/// no tag for it.
pub fn extract_concept(content: &str, concept: &str, contexts: &ContextTable) -> Option<XbrlFact> {
    extract_concept_facts(content, concept, contexts).into_iter().next()
}

/// Extracts each named concept that is present, keyed by the requested
/// name. Absent concepts are simply missing from the map.
pub fn extract_concepts(
    content: &str,
    concepts: &[&str],
    contexts: &ContextTable,
) -> BTreeMap<String, XbrlFact> {
    let mut found = BTreeMap::new();
    for concept in concepts {
        if let Some(fact) = extract_concept(content, concept, contexts) {
            found.insert((*concept).to_string(), fact);
        }
    }
    found
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Income,
    Balance,
    CashFlow,
}

impl StatementKind {
    pub fn concepts(self) -> &'static [&'static str] {
        match self {
            StatementKind::Income => INCOME_STATEMENT_CONCEPTS,
            StatementKind::Balance => BALANCE_SHEET_CONCEPTS,
            StatementKind::CashFlow => CASH_FLOW_CONCEPTS,
        }
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(StatementKind::Income),
            "balance" => Ok(StatementKind::Balance),
            "cash" | "cashflow" | "cash-flow" => Ok(StatementKind::CashFlow),
            other => Err(format!(
                "unknown statement kind {:?}, expected income | balance | cash",
                other
            )),
        }
    }
}

pub const INCOME_STATEMENT_CONCEPTS: &[&str] = &[
    "Revenues",
    "RevenueFromContractWithCustomerExcludingAssessedTax",
    "NetIncomeLoss",
    "OperatingIncomeLoss",
    "GrossProfit",
    "CostOfRevenue",
    "EarningsPerShareBasic",
    "EarningsPerShareDiluted",
];

pub const BALANCE_SHEET_CONCEPTS: &[&str] = &[
    "Assets",
    "AssetsCurrent",
    "Liabilities",
    "LiabilitiesCurrent",
    "StockholdersEquity",
    "CashAndCashEquivalentsAtCarryingValue",
    "AccountsReceivableNetCurrent",
    "PropertyPlantAndEquipmentNet",
];

pub const CASH_FLOW_CONCEPTS: &[&str] = &[
    "NetCashProvidedByUsedInOperatingActivities",
    "NetCashProvidedByUsedInInvestingActivities",
    "NetCashProvidedByUsedInFinancingActivities",
    "CashAndCashEquivalentsAtCarryingValue",
    "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents",
    "NetIncreaseDecreaseInCashAndCashEquivalents",
];

/// Extracts the standard concept set of one financial statement.
pub fn extract_statement(
    content: &str,
    kind: StatementKind,
    contexts: &ContextTable,
) -> BTreeMap<String, XbrlFact> {
    extract_concepts(content, kind.concepts(), contexts)
}
