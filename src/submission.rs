use serde::{Deserialize, Serialize};

use crate::parsing::text::collapse_whitespace;

/// One document record inside a full-submission archive. Immutable once
/// built; the derived counts feed the primary-document selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionDocument {
    pub doc_type: String,
    pub sequence: Option<String>,
    pub filename: String,
    pub description: Option<String>,
    pub content: String,
    pub meaningful_lines: usize,
    pub total_chars: usize,
}

const DEFAULT_TYPE: &str = "UNKNOWN";
const DEFAULT_FILENAME: &str = "unknown";

// Tag-bracketed lines containing these may carry real displayed text
// and are kept as content instead of being dropped as metadata.
const MARKUP_KEYWORDS: &[&str] = &["html", "body", "table", "form"];

#[derive(Default)]
struct DocumentBuilder {
    doc_type: Option<String>,
    sequence: Option<String>,
    filename: Option<String>,
    description: Option<String>,
    lines: Vec<String>,
}

impl DocumentBuilder {
    fn build(self) -> SubmissionDocument {
        let content = self.lines.join("\n");
        let meaningful_lines = self
            .lines
            .iter()
            .filter(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with('<')
            })
            .count();
        let total_chars = content.chars().count();

        SubmissionDocument {
            doc_type: self.doc_type.unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            sequence: self.sequence,
            filename: self.filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            description: self.description,
            content,
            meaningful_lines,
            total_chars,
        }
    }
}

/// Splits a raw full-submission archive on its literal
/// `<DOCUMENT>`/`</DOCUMENT>` delimiters. Returns exactly one record per
/// block; an input with no blocks yields an empty list, never an error.
pub fn parse_submission(raw: &str) -> Vec<SubmissionDocument> {
    let mut documents = Vec::new();
    let mut current: Option<DocumentBuilder> = None;

    for line in raw.lines() {
        let stripped = line.trim();

        if stripped.starts_with("<DOCUMENT>") {
            // A repeated open tag discards the half-built block.
            current = Some(DocumentBuilder::default());
            continue;
        }
        if stripped.starts_with("</DOCUMENT>") {
            if let Some(builder) = current.take() {
                documents.push(builder.build());
            }
            continue;
        }

        let Some(builder) = current.as_mut() else {
            continue;
        };

        if let Some(value) = stripped.strip_prefix("<TYPE>") {
            builder.doc_type = Some(value.trim().to_string());
            continue;
        }
        if let Some(value) = stripped.strip_prefix("<SEQUENCE>") {
            builder.sequence = Some(value.trim().to_string());
            continue;
        }
        if let Some(value) = stripped.strip_prefix("<FILENAME>") {
            builder.filename = Some(value.trim().to_string());
            continue;
        }
        if let Some(value) = stripped.strip_prefix("<DESCRIPTION>") {
            builder.description = Some(value.trim().to_string());
            continue;
        }

        if stripped.starts_with('<') && stripped.ends_with('>') {
            let lower = stripped.to_lowercase();
            if !MARKUP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
                continue;
            }
        }

        builder.lines.push(line.to_string());
    }

    log::debug!("demultiplexed {} document(s)", documents.len());
    documents
}

/// Flattens every document's content into one readable text, separated
/// by a rule line when the submission holds more than one document.
pub fn flatten_submission(raw: &str) -> String {
    let documents = parse_submission(raw);
    let mut flattened = String::new();

    for (i, document) in documents.iter().enumerate() {
        if i > 0 {
            flattened.push('\n');
            flattened.push_str(&"=".repeat(80));
            flattened.push('\n');
        }
        flattened.push_str(&document.content);
    }

    collapse_whitespace(&flattened)
}
