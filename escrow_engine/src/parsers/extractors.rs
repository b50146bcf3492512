//! Stateless text-to-field extraction helpers shared by all platform parsers.
//!
//! Extractors never fail: absence of a field is represented with `None`, garbage input yields `None` or an empty
//! list. Every extracted field is passed through [`clean_text`] before it is stored, so downstream consumers never
//! see embedded newlines or control characters.

use chrono::NaiveDate;
use regex::Regex;

/// Pattern for transfer codes: two uppercase letters, a hyphen, then 5-10 uppercase alphanumerics, e.g. `TM-ABC123`.
/// Kept in sync with [`crate::helpers::generate_transfer_code`].
pub const TRANSFER_CODE_PATTERN: &str = r"\b([A-Z]{2}-[A-Z0-9]{5,10})\b";

/// Returns the first code-shaped token in document order, or `None`.
///
/// If a body contains more than one code-shaped token (say, the escrow code plus a promo code), the first one wins.
/// Parsers that want to disambiguate should call [`extract_labeled_transfer_code`] instead.
pub fn extract_transfer_code(text: &str) -> Option<String> {
    let re = Regex::new(TRANSFER_CODE_PATTERN).unwrap();
    re.find(text).map(|m| m.as_str().to_string())
}

/// Prefers a code that sits next to a "Transfer Code" label, and only falls back to the first bare code-shaped
/// token when no labelled occurrence exists.
pub fn extract_labeled_transfer_code(text: &str) -> Option<String> {
    let re = Regex::new(r"(?i)transfer\s+code\s*[:#]?\s*([A-Z]{2}-[A-Z0-9]{5,10})\b").unwrap();
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()).or_else(|| extract_transfer_code(text))
}

/// Returns every email-shaped token in the text, in document order, duplicates included.
pub fn extract_emails(text: &str) -> Vec<String> {
    let re = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Tries a handful of common date shapes, in order:
/// 1. Prose: `Saturday, August 5, 2024` (the weekday is optional)
/// 2. `M/D/YYYY`
/// 3. `YYYY-MM-DD`
///
/// For each shape, only the first occurrence in the text is considered; if it does not parse to a valid calendar
/// date, the next shape is tried. No timezone interpretation is attempted.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    let prose = Regex::new(r"(?i)(\w+,?\s+\w+\s+\d{1,2},?\s+\d{4})").unwrap();
    if let Some(m) = prose.captures(text).and_then(|c| c.get(1)) {
        if let Some(date) = parse_prose_date(m.as_str()) {
            return Some(date);
        }
    }
    let slashed = Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap();
    if let Some(c) = slashed.captures(text) {
        let (m, d, y) = (c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?);
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return Some(date);
        }
    }
    let iso = Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").unwrap();
    if let Some(m) = iso.captures(text).and_then(|c| c.get(1)) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d") {
            return Some(date);
        }
    }
    None
}

fn parse_prose_date(s: &str) -> Option<NaiveDate> {
    // Any leading weekday token is dropped rather than validated; ticket emails routinely get it wrong.
    const FORMATS: [&str; 2] = ["%B %e, %Y", "%B %e %Y"];
    let s = clean_text(s);
    let candidates = [
        Some(s.clone()),
        s.split_once(", ").map(|(_, rest)| rest.to_string()),
        s.split_once(' ').map(|(_, rest)| rest.to_string()),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|c| FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(&c, fmt).ok()))
}

/// Collapses whitespace runs to single spaces, strips non-printable-ASCII characters and trims.
///
/// Idempotent: non-printables are dropped before whitespace is collapsed, so a second pass is a no-op.
pub fn clean_text(text: &str) -> String {
    let printable = text.chars().filter(|c| (' '..='~').contains(c) || c.is_whitespace()).collect::<String>();
    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn finds_transfer_codes() {
        assert_eq!(extract_transfer_code("Transfer Code: TM-ABC123"), Some("TM-ABC123".to_string()));
        assert_eq!(extract_transfer_code("code AX-XYZ789 in a sentence"), Some("AX-XYZ789".to_string()));
        assert_eq!(extract_transfer_code(""), None);
        assert_eq!(extract_transfer_code("no codes here"), None);
        // Too short a suffix
        assert_eq!(extract_transfer_code("TM-AB12"), None);
        // Lowercase never matches; codes are case-sensitive by design
        assert_eq!(extract_transfer_code("tm-abc123"), None);
    }

    #[test]
    fn first_code_wins_deterministically() {
        let body = "Promo: ZZ-PROMO99 applies. Transfer Code: TM-ABC123";
        for _ in 0..10 {
            assert_eq!(extract_transfer_code(body), Some("ZZ-PROMO99".to_string()));
        }
    }

    #[test]
    fn labeled_code_beats_document_order() {
        let body = "Promo: ZZ-PROMO99 applies. Transfer Code: TM-ABC123";
        assert_eq!(extract_labeled_transfer_code(body), Some("TM-ABC123".to_string()));
        // Without a label, document order still decides
        let bare = "ZZ-PROMO99 then TM-ABC123";
        assert_eq!(extract_labeled_transfer_code(bare), Some("ZZ-PROMO99".to_string()));
    }

    #[test]
    fn finds_all_emails_in_order() {
        let text = "From alice@example.com to escrow+axs@escrowtickets.com, cc alice@example.com";
        assert_eq!(
            extract_emails(text),
            vec!["alice@example.com", "escrow+axs@escrowtickets.com", "alice@example.com"]
        );
        assert!(extract_emails("nothing to see").is_empty());
        assert!(extract_emails("").is_empty());
    }

    #[test]
    fn extracts_dates_in_priority_order() {
        assert_eq!(
            extract_date("Date: Saturday, August 5, 2024 at 7:00 PM"),
            NaiveDate::from_ymd_opt(2024, 8, 5)
        );
        assert_eq!(extract_date("see you on 3/15/2024!"), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(extract_date("event_date=2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(extract_date("the 45/99/2024 is not a date"), None);
        assert_eq!(extract_date(""), None);
    }

    #[test]
    fn extractors_survive_garbage() {
        let garbage = "\u{0}\u{7}\u{1b}[31m🎫🎫🎫 ../../ %s %n \r\n\t";
        assert_eq!(extract_transfer_code(garbage), None);
        assert!(extract_emails(garbage).is_empty());
        assert_eq!(extract_date(garbage), None);
        let _ = clean_text(garbage);
    }

    #[test]
    fn clean_text_is_idempotent() {
        let cases = [
            "  hello   world  ",
            "tabs\tand\nnewlines",
            "unicode — stripped é here",
            "ctrl\u{1}chars\u{2}too",
            "",
            "a  é  b",
        ];
        for s in cases {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "not idempotent for {s:?}");
        }
        assert_eq!(clean_text("tabs\tand\nnewlines"), "tabs and newlines");
        assert_eq!(clean_text("a  é  b"), "a b");
    }
}
