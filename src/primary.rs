use crate::parsing::text::collapse_whitespace;
use crate::submission::SubmissionDocument;

// Nominal primary form types, in lookup priority order.
const PRIMARY_FORM_TYPES: &[&str] = &["10-Q", "10-K", "10-K/A", "10-Q/A", "8-K", "8-K/A"];

const MARKUP_EXTENSIONS: &[&str] = &[".htm", ".html", ".xhtml"];

// Below this, a document is a placeholder cover page: it is never
// trusted as the primary body and never competes in the rescoring pass.
const PLACEHOLDER_MAX_CHARS: usize = 500;

/// Picks the document carrying the filing's substantive content.
///
/// Some issuers file a minimal placeholder under the nominal primary
/// form type while the real narrative lives in a secondary markup file,
/// so an exact type match is only trusted when its content is big
/// enough; otherwise a scoring pass runs over the substantial
/// documents. Returns the selected content with whitespace collapsed
/// but markup intact, since fact extraction downstream needs the
/// inline-XBRL tags. An empty corpus yields an empty string, never an
/// error.
pub fn select_primary_document(documents: &[SubmissionDocument]) -> String {
    if documents.is_empty() {
        return String::new();
    }

    let by_type = PRIMARY_FORM_TYPES
        .iter()
        .find_map(|form| documents.iter().find(|doc| doc.doc_type == *form));

    if let Some(document) = by_type {
        if !is_placeholder(document) {
            return collapse_whitespace(&document.content);
        }

        log::debug!(
            "primary-typed document {} is a placeholder, rescoring {} candidates",
            document.filename,
            documents.len()
        );

        // First document wins a tied score, keeping selection stable
        // across runs.
        let mut best: Option<(i64, &SubmissionDocument)> = None;
        for document in documents.iter().filter(|doc| !is_placeholder(doc)) {
            let score = score_document(document);
            log::debug!("document {} scored {}", document.filename, score);
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, document));
            }
        }
        if let Some((_, document)) = best {
            return collapse_whitespace(&document.content);
        }
    }

    // No primary-typed document and nothing substantial to score: fall
    // back to sheer size.
    let mut largest: Option<&SubmissionDocument> = None;
    for document in documents {
        if largest.map_or(true, |top| document.total_chars > top.total_chars) {
            largest = Some(document);
        }
    }

    largest
        .map(|doc| collapse_whitespace(&doc.content))
        .unwrap_or_default()
}

fn is_placeholder(document: &SubmissionDocument) -> bool {
    document.content.trim().chars().count() < PLACEHOLDER_MAX_CHARS
}

fn score_document(document: &SubmissionDocument) -> i64 {
    let mut score = 0i64;

    if PRIMARY_FORM_TYPES.contains(&document.doc_type.as_str()) {
        score += 1000;
    }

    let filename = document.filename.to_lowercase();
    if MARKUP_EXTENSIONS.iter().any(|ext| filename.ends_with(ext)) {
        score += 500;
    }

    if document.meaningful_lines > 1000 {
        score += 300;
    } else if document.meaningful_lines > 100 {
        score += 100;
    }

    score += (document.total_chars / 1000).min(200) as i64;

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(doc_type: &str, filename: &str, content: String) -> SubmissionDocument {
        let meaningful_lines = content
            .lines()
            .filter(|l| !l.trim().is_empty() && !l.trim().starts_with('<'))
            .count();
        let total_chars = content.chars().count();
        SubmissionDocument {
            doc_type: doc_type.to_string(),
            sequence: None,
            filename: filename.to_string(),
            description: None,
            content,
            meaningful_lines,
            total_chars,
        }
    }

    #[test]
    fn test_type_match_wins_when_substantial() {
        let body = "narrative line\n".repeat(200);
        let documents = vec![
            doc("GRAPHIC", "chart.jpg", "binary-ish".to_string()),
            doc("10-K", "form10k.htm", body.clone()),
        ];
        let selected = select_primary_document(&documents);
        assert!(selected.contains("narrative line"));
    }

    #[test]
    fn test_placeholder_primary_falls_back_to_markup_sibling() {
        // Regression for the placeholder edge case: the nominal 10-Q is
        // a sub-500-char stub while the real body sits in an .htm
        // exhibit with well over 1000 meaningful lines.
        let stub = "cover page only".to_string();
        let body = "substantive filing line\n".repeat(1500);
        let documents = vec![
            doc("10-Q", "stub.txt", stub),
            doc("EX-99.1", "full-report.htm", body),
        ];
        let selected = select_primary_document(&documents);
        assert!(selected.contains("substantive filing line"));
        assert!(!selected.contains("cover page only"));
    }

    #[test]
    fn test_markup_sibling_beats_plain_text_sibling() {
        let stub = "cover page only".to_string();
        let plain = "plain narrative line\n".repeat(300);
        let markup = "markup narrative line\n".repeat(300);
        let documents = vec![
            doc("10-K", "stub.txt", stub),
            doc("EX-99.2", "notes.txt", plain),
            doc("EX-99.1", "report.htm", markup),
        ];
        let selected = select_primary_document(&documents);
        assert!(selected.contains("markup narrative line"));
    }

    #[test]
    fn test_all_placeholders_fall_back_to_largest() {
        let documents = vec![
            doc("10-K", "stub.txt", "tiny".to_string()),
            doc("EX-23.1", "consent.txt", "slightly bigger stub".to_string()),
        ];
        let selected = select_primary_document(&documents);
        assert_eq!(selected, "slightly bigger stub");
    }

    #[test]
    fn test_no_type_match_picks_largest() {
        let documents = vec![
            doc("EX-23.1", "consent.txt", "short".to_string()),
            doc("EX-99.2", "big.txt", "x".repeat(4000)),
        ];
        let selected = select_primary_document(&documents);
        assert_eq!(selected, "x".repeat(4000));
    }

    #[test]
    fn test_empty_corpus_returns_empty_content() {
        assert_eq!(select_primary_document(&[]), "");
    }
}
