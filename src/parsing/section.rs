use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

/// Canonical annual-report section identifiers (Items 1-15 plus the
/// lettered sub-items). `Unknown` is reserved for content that matched
/// no canonical pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum SectionType {
    #[serde(rename = "item_1")]
    Item1,
    #[serde(rename = "item_1a")]
    Item1A,
    #[serde(rename = "item_2")]
    Item2,
    #[serde(rename = "item_3")]
    Item3,
    #[serde(rename = "item_4")]
    Item4,
    #[serde(rename = "item_5")]
    Item5,
    #[serde(rename = "item_6")]
    Item6,
    #[serde(rename = "item_7")]
    Item7,
    #[serde(rename = "item_7a")]
    Item7A,
    #[serde(rename = "item_8")]
    Item8,
    #[serde(rename = "item_9")]
    Item9,
    #[serde(rename = "item_9a")]
    Item9A,
    #[serde(rename = "item_9b")]
    Item9B,
    #[serde(rename = "item_10")]
    Item10,
    #[serde(rename = "item_11")]
    Item11,
    #[serde(rename = "item_12")]
    Item12,
    #[serde(rename = "item_13")]
    Item13,
    #[serde(rename = "item_14")]
    Item14,
    #[serde(rename = "item_15")]
    Item15,
    #[serde(rename = "unknown")]
    Unknown,
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            SectionType::Item1 => "item_1",
            SectionType::Item1A => "item_1a",
            SectionType::Item2 => "item_2",
            SectionType::Item3 => "item_3",
            SectionType::Item4 => "item_4",
            SectionType::Item5 => "item_5",
            SectionType::Item6 => "item_6",
            SectionType::Item7 => "item_7",
            SectionType::Item7A => "item_7a",
            SectionType::Item8 => "item_8",
            SectionType::Item9 => "item_9",
            SectionType::Item9A => "item_9a",
            SectionType::Item9B => "item_9b",
            SectionType::Item10 => "item_10",
            SectionType::Item11 => "item_11",
            SectionType::Item12 => "item_12",
            SectionType::Item13 => "item_13",
            SectionType::Item14 => "item_14",
            SectionType::Item15 => "item_15",
            SectionType::Unknown => "unknown",
        };
        write!(f, "{}", id)
    }
}

impl SectionType {
    // Item number plus its caption, case-insensitive. The caption gap is
    // bounded and confined to one line so scanning stays linear over
    // multi-megabyte documents.
    fn pattern(self) -> Option<&'static str> {
        match self {
            SectionType::Item1 => Some(r"(?i)item\s+1[^\w][^\n]{0,120}?business"),
            SectionType::Item1A => Some(r"(?i)item\s+1a[^\w][^\n]{0,120}?risk\s+factors"),
            SectionType::Item2 => Some(r"(?i)item\s+2[^\w][^\n]{0,120}?properties"),
            SectionType::Item3 => Some(r"(?i)item\s+3[^\w][^\n]{0,120}?legal\s+proceedings"),
            SectionType::Item4 => Some(r"(?i)item\s+4[^\w][^\n]{0,120}?mine\s+safety"),
            SectionType::Item5 => Some(r"(?i)item\s+5[^\w][^\n]{0,120}?market\s+for"),
            SectionType::Item6 => Some(r"(?i)item\s+6[^\w][^\n]{0,120}?selected\s+financial"),
            SectionType::Item7 => Some(r"(?i)item\s+7[^\w][^\n]{0,120}?management.s\s+discussion"),
            SectionType::Item7A => {
                Some(r"(?i)item\s+7a[^\w][^\n]{0,120}?quantitative\s+and\s+qualitative")
            }
            SectionType::Item8 => Some(r"(?i)item\s+8[^\w][^\n]{0,120}?financial\s+statements"),
            SectionType::Item9 => {
                Some(r"(?i)item\s+9[^\w][^\n]{0,120}?controls\s+and\s+procedures")
            }
            SectionType::Item9A => {
                Some(r"(?i)item\s+9a[^\w][^\n]{0,120}?controls\s+and\s+procedures")
            }
            SectionType::Item9B => Some(r"(?i)item\s+9b[^\w][^\n]{0,120}?other\s+information"),
            SectionType::Item10 => Some(r"(?i)item\s+10[^\w][^\n]{0,120}?directors"),
            SectionType::Item11 => Some(r"(?i)item\s+11[^\w][^\n]{0,120}?executive\s+compensation"),
            SectionType::Item12 => Some(r"(?i)item\s+12[^\w][^\n]{0,120}?security\s+ownership"),
            SectionType::Item13 => Some(r"(?i)item\s+13[^\w][^\n]{0,120}?certain\s+relationships"),
            SectionType::Item14 => Some(r"(?i)item\s+14[^\w][^\n]{0,120}?principal\s+accountant"),
            SectionType::Item15 => Some(r"(?i)item\s+15[^\w][^\n]{0,120}?exhibits"),
            SectionType::Unknown => None,
        }
    }
}

static SECTION_PATTERNS: Lazy<Vec<(SectionType, Regex)>> = Lazy::new(|| {
    SectionType::iter()
        .filter_map(|section_type| {
            section_type
                .pattern()
                .map(|p| (section_type, Regex::new(p).expect("section pattern")))
        })
        .collect()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One canonical section of a filing. Spans are byte offsets into the
/// text handed to `extract_sections`; `content` is the trimmed slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingSection {
    pub name: String,
    pub section_type: SectionType,
    pub start: usize,
    pub end: usize,
    pub content: String,
    pub word_count: usize,
    pub char_count: usize,
}

/// Maps text onto canonical sections: every pattern match starts a
/// section, each span runs to the next match (the last to end of
/// document). Repeated matches of one identifier stay separate
/// sections. No matches means no sections; the caller then treats the
/// whole text as one implicit section.
pub fn extract_sections(content: &str) -> Vec<FilingSection> {
    let mut matches: Vec<(usize, SectionType, &str)> = Vec::new();
    for (section_type, re) in SECTION_PATTERNS.iter() {
        for m in re.find_iter(content) {
            matches.push((m.start(), *section_type, m.as_str()));
        }
    }
    // Stable sort: same-offset matches keep canonical item order.
    matches.sort_by_key(|(start, ..)| *start);

    let mut sections = Vec::with_capacity(matches.len());
    for (i, (start, section_type, title)) in matches.iter().enumerate() {
        let end = matches
            .get(i + 1)
            .map_or(content.len(), |(next_start, ..)| *next_start);
        let body = content[*start..end].trim();

        sections.push(FilingSection {
            name: WHITESPACE_RE.replace_all(title, " ").trim().to_string(),
            section_type: *section_type,
            start: *start,
            end,
            content: body.to_string(),
            word_count: body.split_whitespace().count(),
            char_count: body.chars().count(),
        });
    }

    log::debug!("segmented {} section(s)", sections.len());
    sections
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSummary {
    pub name: String,
    pub section_type: SectionType,
    pub word_count: usize,
    pub char_count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingSummary {
    pub total_sections: usize,
    pub total_words: usize,
    pub total_chars: usize,
    pub sections: Vec<SectionSummary>,
}

/// Summarizes a filing's section structure: totals plus each section's
/// share of the document, rounded to one decimal.
pub fn filing_summary(sections: &[FilingSection]) -> FilingSummary {
    let total_words: usize = sections.iter().map(|s| s.word_count).sum();
    let total_chars: usize = sections.iter().map(|s| s.char_count).sum();

    let summaries = sections
        .iter()
        .map(|section| SectionSummary {
            name: section.name.clone(),
            section_type: section.section_type,
            word_count: section.word_count,
            char_count: section.char_count,
            percentage: if total_chars > 0 {
                (section.char_count as f64 / total_chars as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            },
        })
        .collect();

    FilingSummary {
        total_sections: sections.len(),
        total_words,
        total_chars,
        sections: summaries,
    }
}
