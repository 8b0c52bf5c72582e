use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Common 8-K item codes and their meanings.
const EIGHT_K_ITEMS: &[(&str, &str)] = &[
    ("1.01", "Entry into Material Agreement"),
    ("1.02", "Termination of Material Agreement"),
    ("2.01", "Completion of Acquisition or Disposition"),
    ("2.02", "Results of Operations and Financial Condition"),
    ("2.03", "Creation of Direct Financial Obligation"),
    ("3.01", "Notice of Delisting"),
    ("4.01", "Changes in Accountant"),
    ("5.01", "Changes in Control"),
    ("5.02", "Departure/Election of Directors or Officers"),
    ("5.03", "Amendments to Articles/Bylaws"),
    ("7.01", "Regulation FD Disclosure"),
    ("8.01", "Other Events"),
];

static ITEM_PATTERNS: Lazy<Vec<(&'static str, &'static str, Regex)>> = Lazy::new(|| {
    EIGHT_K_ITEMS
        .iter()
        .map(|(code, description)| {
            let pattern = format!(r"(?i)item\s+{}\b", regex::escape(code));
            (*code, *description, Regex::new(&pattern).expect("item pattern"))
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EightKItem {
    pub code: String,
    pub description: String,
}

/// Scans 8-K content (raw or normalized) for the item codes it reports
/// under. Each code appears at most once, in canonical table order.
pub fn detect_8k_items(content: &str) -> Vec<EightKItem> {
    ITEM_PATTERNS
        .iter()
        .filter(|(_, _, re)| re.is_match(content))
        .map(|(code, description, _)| EightKItem {
            code: (*code).to_string(),
            description: (*description).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_reported_items() {
        let content = "Item 2.02 Results of Operations and Financial Condition\n\
                       On August 1 the registrant issued a press release.\n\
                       Item 9.01 Financial Statements and Exhibits";
        let items = detect_8k_items(content);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].code, "2.02");
    }

    #[test]
    fn test_items_come_back_in_table_order() {
        let content = "Item 8.01 Other Events ... Item 1.01 Entry into a Material Definitive Agreement";
        let items = detect_8k_items(content);
        let codes: Vec<&str> = items.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["1.01", "8.01"]);
    }

    #[test]
    fn test_no_items_in_plain_text() {
        assert!(detect_8k_items("quarterly narrative with no events").is_empty());
    }
}
