use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::context::ContextTable;
use super::facts::extract_concept_facts;
use super::XbrlFact;

// Standard SEC/XBRL namespace prefixes. Anything else declared via
// xmlns: is treated as company-specific.
const STANDARD_PREFIXES: &[&str] = &[
    "xbrli", "xbrldi", "xbrldt", "ix", "ixt", "ixt-sec", "link", "xlink", "xsi", "xsd", "xs",
    "dei", "us-gaap", "srt", "country", "currency", "exch", "naics", "sic", "stpr", "iso4217",
    "utr", "ecd", "cef", "rr",
];

static XMLNS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"xmlns:([A-Za-z][\w.-]*)\s*="#).unwrap());

const MAX_KEYWORD_BUCKETS: usize = 8;
const MIN_BUCKET_MEMBERS: usize = 2;

/// Namespace prefixes declared by the issuer itself, deduplicated and
/// sorted.
pub fn discover_company_prefixes(content: &str) -> Vec<String> {
    XMLNS_RE
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .filter(|prefix| {
            let lowered = prefix.to_lowercase();
            !STANDARD_PREFIXES.contains(&lowered.as_str())
        })
        .unique()
        .sorted()
        .collect()
}

/// Everything discovered for one company prefix: the distinct concept
/// names and their keyword buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConcepts {
    pub prefix: String,
    pub concepts: Vec<String>,
    pub buckets: Vec<ConceptBucket>,
}

/// Enumerates distinct `prefix:ConceptName` occurrences for every
/// company prefix, from element tags and `name="…"` attributes alike.
pub fn discover_company_concepts(content: &str) -> Vec<CompanyConcepts> {
    discover_company_prefixes(content)
        .into_iter()
        .filter_map(|prefix| {
            let escaped = regex::escape(&prefix);
            let pattern = format!(r#"(?:<|name="){escaped}:([A-Za-z][A-Za-z0-9_.-]*)"#);
            let re = Regex::new(&pattern).expect("concept discovery pattern");

            let concepts: Vec<String> = re
                .captures_iter(content)
                .map(|cap| cap[1].to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            if concepts.is_empty() {
                return None;
            }
            let buckets = categorize_concepts(&concepts);
            Some(CompanyConcepts {
                prefix,
                concepts,
                buckets,
            })
        })
        .collect()
}

/// A dynamic category of company concepts: either the concepts sharing
/// one frequent name word, or the unmatched remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConceptBucket {
    Keyword { word: String, concepts: Vec<String> },
    Other { concepts: Vec<String> },
}

/// Buckets concept names by their most frequent CamelCase words.
///
/// Candidate words must cover at least two concepts; the top eight are
/// kept, ranked by coverage descending with ties broken
/// lexicographically so the output is stable across runs. Each concept
/// lands in the highest-ranked bucket whose word it contains; the rest
/// go to a single trailing `Other` bucket.
pub fn categorize_concepts(concepts: &[String]) -> Vec<ConceptBucket> {
    let tokenized: Vec<Vec<String>> = concepts
        .iter()
        .map(|concept| camel_case_words(concept))
        .collect();

    let mut coverage: BTreeMap<&str, usize> = BTreeMap::new();
    for words in &tokenized {
        for word in words.iter().unique() {
            *coverage.entry(word.as_str()).or_insert(0) += 1;
        }
    }

    let top_words: Vec<String> = coverage
        .into_iter()
        .filter(|(_, count)| *count >= MIN_BUCKET_MEMBERS)
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(MAX_KEYWORD_BUCKETS)
        .map(|(word, _)| word.to_string())
        .collect();

    let mut keyword_members: Vec<Vec<String>> = vec![Vec::new(); top_words.len()];
    let mut other = Vec::new();
    for (concept, words) in concepts.iter().zip(&tokenized) {
        match top_words.iter().position(|w| words.contains(w)) {
            Some(rank) => keyword_members[rank].push(concept.clone()),
            None => other.push(concept.clone()),
        }
    }

    let mut buckets: Vec<ConceptBucket> = top_words
        .into_iter()
        .zip(keyword_members)
        .filter(|(_, members)| !members.is_empty())
        .map(|(word, concepts)| ConceptBucket::Keyword { word, concepts })
        .collect();
    if !other.is_empty() {
        buckets.push(ConceptBucket::Other { concepts: other });
    }
    buckets
}

fn camel_case_words(concept: &str) -> Vec<String> {
    let chars: Vec<char> = concept.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let after_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let before_lower = chars.get(i + 1).map_or(false, |next| next.is_lowercase());
            if !current.is_empty() && (after_lower || before_lower) {
                words.push(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
        } else if c.is_alphanumeric() {
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Facts sharing one dimensional context, keyed by the ordered member
/// names declared on it. An empty member list is the undimensioned
/// (consolidated) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentGroup {
    pub members: Vec<String>,
    pub facts: Vec<XbrlFact>,
}

/// Groups facts by their ordered member-name set. Group order follows
/// the key ordering, facts within a group keep input order, so repeated
/// runs over identical input group identically.
pub fn group_by_segment(facts: &[XbrlFact]) -> Vec<SegmentGroup> {
    let mut groups: BTreeMap<Vec<String>, Vec<XbrlFact>> = BTreeMap::new();
    for fact in facts {
        let key: Vec<String> = fact
            .dimensions
            .iter()
            .map(|dimension| dimension.member.clone())
            .collect();
        groups.entry(key).or_default().push(fact.clone());
    }

    groups
        .into_iter()
        .map(|(members, facts)| SegmentGroup { members, facts })
        .collect()
}

/// Segment breakdown for one concept: every instance of the concept,
/// grouped by the dimension members of its context.
pub fn segment_breakdown(
    content: &str,
    concept: &str,
    contexts: &ContextTable,
) -> Vec<SegmentGroup> {
    group_by_segment(&extract_concept_facts(content, concept, contexts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_company_prefixes_excludes_standard() {
        let content = r#"
            <html xmlns:ix="http://www.xbrl.org/2013/inlineXBRL"
                  xmlns:us-gaap="http://fasb.org/us-gaap/2024"
                  xmlns:aapl="http://www.apple.com/20240928"
                  xmlns:dei="http://xbrl.sec.gov/dei/2024">
        "#;
        assert_eq!(discover_company_prefixes(content), vec!["aapl"]);
    }

    #[test]
    fn test_discover_company_concepts() {
        let content = r#"
            <html xmlns:aapl="http://www.apple.com/20240928">
            <ix:nonFraction name="aapl:AmericasSegmentRevenue">1</ix:nonFraction>
            <ix:nonFraction name="aapl:EuropeSegmentRevenue">2</ix:nonFraction>
            <aapl:WearablesRevenue contextRef="c">3</aapl:WearablesRevenue>
        "#;
        let discovered = discover_company_concepts(content);
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].prefix, "aapl");
        assert_eq!(
            discovered[0].concepts,
            vec![
                "AmericasSegmentRevenue",
                "EuropeSegmentRevenue",
                "WearablesRevenue"
            ]
        );
    }

    #[test]
    fn test_categorize_concepts_buckets_by_frequent_words() {
        let concepts: Vec<String> = [
            "AmericasSegmentRevenue",
            "EuropeSegmentRevenue",
            "JapanSegmentRevenue",
            "DeferredMilesLiability",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let buckets = categorize_concepts(&concepts);

        // "revenue" and "segment" both cover three concepts; the
        // lexicographic tie-break ranks "revenue" first and claims all
        // three, leaving "segment" empty and dropped.
        match &buckets[0] {
            ConceptBucket::Keyword { word, concepts } => {
                assert_eq!(word, "revenue");
                assert_eq!(concepts.len(), 3);
            }
            other => panic!("expected keyword bucket, got {other:?}"),
        }
        match buckets.last().unwrap() {
            ConceptBucket::Other { concepts } => {
                assert_eq!(concepts, &vec!["DeferredMilesLiability".to_string()]);
            }
            other => panic!("expected other bucket, got {other:?}"),
        }
    }

    #[test]
    fn test_categorize_is_deterministic() {
        let concepts: Vec<String> = [
            "AlphaRevenue",
            "BetaRevenue",
            "AlphaCost",
            "BetaCost",
            "GammaThing",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let first = categorize_concepts(&concepts);
        for _ in 0..10 {
            assert_eq!(categorize_concepts(&concepts), first);
        }
    }

    #[test]
    fn test_camel_case_words() {
        assert_eq!(
            camel_case_words("RevenueFromContractWithCustomer"),
            vec!["revenue", "from", "contract", "with", "customer"]
        );
        assert_eq!(camel_case_words("EBITDAMargin"), vec!["ebitda", "margin"]);
        assert_eq!(camel_case_words("Simple"), vec!["simple"]);
    }

    #[test]
    fn test_segment_breakdown_groups_by_member() {
        let content = r#"
            <xbrli:context id="us">
                <xbrli:entity><xbrli:segment>
                    <xbrldi:explicitMember dimension="srt:StatementGeographicalAxis">country:US</xbrldi:explicitMember>
                </xbrli:segment></xbrli:entity>
                <xbrli:period><xbrli:endDate>2024-12-31</xbrli:endDate></xbrli:period>
            </xbrli:context>
            <xbrli:context id="cn">
                <xbrli:entity><xbrli:segment>
                    <xbrldi:explicitMember dimension="srt:StatementGeographicalAxis">country:CN</xbrldi:explicitMember>
                </xbrli:segment></xbrli:entity>
                <xbrli:period><xbrli:endDate>2024-12-31</xbrli:endDate></xbrli:period>
            </xbrli:context>
            <xbrli:context id="total">
                <xbrli:period><xbrli:endDate>2024-12-31</xbrli:endDate></xbrli:period>
            </xbrli:context>
            <ix:nonFraction contextRef="us" name="us-gaap:Revenues" scale="6">100</ix:nonFraction>
            <ix:nonFraction contextRef="cn" name="us-gaap:Revenues" scale="6">40</ix:nonFraction>
            <ix:nonFraction contextRef="total" name="us-gaap:Revenues" scale="6">140</ix:nonFraction>
        "#;
        let contexts = ContextTable::build(content);
        let groups = segment_breakdown(content, "Revenues", &contexts);

        assert_eq!(groups.len(), 3);
        // BTreeMap key order: [] < [country:CN] < [country:US]
        assert!(groups[0].members.is_empty());
        assert_eq!(groups[0].facts[0].numeric_value, Some(140_000_000.0));
        assert_eq!(groups[1].members, vec!["country:CN"]);
        assert_eq!(groups[2].members, vec!["country:US"]);

        let rerun = segment_breakdown(content, "Revenues", &contexts);
        assert_eq!(groups, rerun);
    }
}
