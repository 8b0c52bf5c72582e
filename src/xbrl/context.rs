use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{DimensionMember, FactPeriod};
use crate::error::ExtractError;

// Context blocks appear with and without a namespace prefix depending
// on the issuer's tooling, so the prefix is optional everywhere.
static CONTEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(?:[a-z][\w.-]*:)?context\s[^>]*?id="([^"]+)"[^>]*>(.*?)</(?:[a-z][\w.-]*:)?context>"#)
        .unwrap()
});
static INSTANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:[a-z][\w.-]*:)?instant>([^<]+)<").unwrap());
static START_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:[a-z][\w.-]*:)?startDate>([^<]+)<").unwrap());
static END_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:[a-z][\w.-]*:)?endDate>([^<]+)<").unwrap());
static EXPLICIT_MEMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(?:[a-z][\w.-]*:)?explicitMember\s[^>]*?dimension="([^"]+)"[^>]*>([^<]+)<"#)
        .unwrap()
});

/// Period of one XBRL context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextPeriod {
    Instant { date: NaiveDate },
    Duration {
        start: Option<NaiveDate>,
        end: NaiveDate,
    },
    Unknown,
}

impl ContextPeriod {
    /// Collapses to the fact-level period: an instant, or a duration's
    /// end date.
    pub fn fact_period(&self) -> FactPeriod {
        match self {
            ContextPeriod::Instant { date } => FactPeriod::Instant(*date),
            ContextPeriod::Duration { end, .. } => FactPeriod::DurationEnd(*end),
            ContextPeriod::Unknown => FactPeriod::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XbrlContext {
    pub id: String,
    pub period: ContextPeriod,
    pub dimensions: Vec<DimensionMember>,
}

/// All contexts of a filing, built in one scan and indexed by id so
/// per-fact resolution is O(1).
#[derive(Debug, Default)]
pub struct ContextTable {
    contexts: HashMap<String, XbrlContext>,
}

impl ContextTable {
    pub fn build(content: &str) -> Self {
        let mut contexts = HashMap::new();

        for cap in CONTEXT_RE.captures_iter(content) {
            let id = cap[1].to_string();
            let block = &cap[2];

            let dimensions = EXPLICIT_MEMBER_RE
                .captures_iter(block)
                .map(|member| DimensionMember {
                    axis: member[1].trim().to_string(),
                    member: member[2].trim().to_string(),
                })
                .collect();

            contexts.insert(
                id.clone(),
                XbrlContext {
                    id,
                    period: parse_period(block),
                    dimensions,
                },
            );
        }

        log::debug!("indexed {} context(s)", contexts.len());
        Self { contexts }
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&XbrlContext> {
        self.contexts.get(id)
    }

    /// Looks up a fact's contextRef. A dangling reference is a
    /// `MalformedContext` error; callers recover by keeping the fact
    /// with an unresolved period.
    pub fn resolve(&self, context_ref: &str) -> Result<&XbrlContext, ExtractError> {
        self.contexts
            .get(context_ref)
            .ok_or_else(|| ExtractError::MalformedContext(context_ref.to_string()))
    }
}

fn parse_period(block: &str) -> ContextPeriod {
    if let Some(cap) = INSTANT_RE.captures(block) {
        if let Some(date) = parse_date(&cap[1]) {
            return ContextPeriod::Instant { date };
        }
    }
    if let Some(cap) = END_DATE_RE.captures(block) {
        if let Some(end) = parse_date(&cap[1]) {
            let start = START_DATE_RE
                .captures(block)
                .and_then(|c| parse_date(&c[1]));
            return ContextPeriod::Duration { start, end };
        }
    }
    ContextPeriod::Unknown
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXTS: &str = r#"
        <xbrli:context id="i2024">
            <xbrli:entity><xbrli:identifier scheme="http://www.sec.gov/CIK">0000320193</xbrli:identifier></xbrli:entity>
            <xbrli:period><xbrli:instant>2024-12-31</xbrli:instant></xbrli:period>
        </xbrli:context>
        <context id="d2024">
            <period><startDate>2024-01-01</startDate><endDate>2024-12-31</endDate></period>
        </context>
        <xbrli:context id="seg1">
            <xbrli:entity>
                <xbrli:segment>
                    <xbrldi:explicitMember dimension="srt:StatementGeographicalAxis">country:US</xbrldi:explicitMember>
                </xbrli:segment>
            </xbrli:entity>
            <xbrli:period><xbrli:endDate>2024-12-31</xbrli:endDate></xbrli:period>
        </xbrli:context>
        <xbrli:context id="broken">
            <xbrli:period><xbrli:instant>not-a-date</xbrli:instant></xbrli:period>
        </xbrli:context>
    "#;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_build_indexes_all_contexts() {
        let table = ContextTable::build(CONTEXTS);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_instant_period() {
        let table = ContextTable::build(CONTEXTS);
        let ctx = table.get("i2024").unwrap();
        assert_eq!(
            ctx.period,
            ContextPeriod::Instant {
                date: date("2024-12-31")
            }
        );
        assert_eq!(ctx.period.fact_period(), FactPeriod::Instant(date("2024-12-31")));
    }

    #[test]
    fn test_duration_period_without_prefix() {
        let table = ContextTable::build(CONTEXTS);
        let ctx = table.get("d2024").unwrap();
        assert_eq!(
            ctx.period,
            ContextPeriod::Duration {
                start: Some(date("2024-01-01")),
                end: date("2024-12-31"),
            }
        );
        assert_eq!(
            ctx.period.fact_period(),
            FactPeriod::DurationEnd(date("2024-12-31"))
        );
    }

    #[test]
    fn test_dimension_members() {
        let table = ContextTable::build(CONTEXTS);
        let ctx = table.get("seg1").unwrap();
        assert_eq!(ctx.dimensions.len(), 1);
        assert_eq!(ctx.dimensions[0].axis, "srt:StatementGeographicalAxis");
        assert_eq!(ctx.dimensions[0].member, "country:US");
    }

    #[test]
    fn test_unparseable_date_degrades_to_unknown() {
        let table = ContextTable::build(CONTEXTS);
        assert_eq!(table.get("broken").unwrap().period, ContextPeriod::Unknown);
    }

    #[test]
    fn test_resolve_dangling_reference() {
        let table = ContextTable::build(CONTEXTS);
        let err = table.resolve("missing").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContext(id) if id == "missing"));
    }
}
