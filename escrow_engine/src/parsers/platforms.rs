//! One parse function per ticket platform, plus the generic fallback.
//!
//! All of them follow the same shape — code, event name, venue, date, seating, quantity, confirmation number,
//! sender/receiver emails — but each carries its own regex vocabulary, tuned to how that platform words its
//! transfer-confirmation emails. Keeping the pattern sets separate keeps them small and independently testable,
//! and lets the generic parser degrade gracefully for platforms without a dedicated implementation.

use regex::Regex;

use super::{
    extractors::{clean_text, extract_date, extract_emails, extract_labeled_transfer_code},
    ParseError,
    ParsedTransfer,
};
use crate::db_types::Platform;

/// Ticketmaster. Subjects look like "Your Tickets for [Event] have been transferred".
pub fn parse_ticketmaster(body: &str, subject: &str) -> Result<ParsedTransfer, ParseError> {
    let mut data = ParsedTransfer::new(Platform::Ticketmaster);
    data.transfer_code = extract_labeled_transfer_code(body);
    data.event_name = first_capture(subject, &[r"(?i)tickets?\s+(?:for|to)\s+([^-]+)"])
        .or_else(|| first_capture(body, &[r"(?i)event:\s*([^\n]+)"]));
    data.venue = first_capture(body, &[
        r"(?i)venue:\s*([^\n]+)",
        r"(?i)location:\s*([^\n]+)",
        r"at\s+([A-Z][A-Za-z\s&]+(?:Arena|Stadium|Center|Theatre|Theater|Hall))",
    ]);
    data.event_date = first_capture(body, &[
        r"(?i)date:\s*([^\n]+)",
        r"(?i)(?:on|date:)\s*(\w+,?\s+\w+\s+\d{1,2},?\s+\d{4})",
    ])
    // No labelled date line; settle for the first bare date in the body, normalised to ISO
    .or_else(|| extract_date(body).map(|d| d.to_string()));
    fill_seating(&mut data, body, &[r"(?i)section:\s*([^\n,]+)"], &[r"(?i)row:\s*([^\n,]+)"], &[
        r"(?i)seats?:\s*([^\n]+)",
    ]);
    data.quantity = extract_quantity(body, &[r"(?i)(\d+)\s+tickets?"]);
    data.confirmation_number = first_capture(body, &[
        r"(?i)confirmation\s*[#]?\s*:?\s*([A-Z0-9-]+)",
        r"(?i)order\s*[#]?\s*:?\s*([A-Z0-9-]+)",
    ]);
    let (sender, receiver) = split_sender_receiver(&extract_emails(body), &["ticketmaster.com"]);
    data.sender_email = sender;
    data.receiver_email = receiver;
    Ok(data)
}

/// AXS. Subjects look like "Tickets transferred: [Event]"; bodies favour "Show:" and "Sec:" labels.
pub fn parse_axs(body: &str, subject: &str) -> Result<ParsedTransfer, ParseError> {
    let mut data = ParsedTransfer::new(Platform::Axs);
    data.transfer_code = extract_labeled_transfer_code(body);
    data.event_name = first_capture(subject, &[r"(?i)transferred:\s*([^-]+)", r"(?i)for\s+([^-]+)"])
        .or_else(|| first_capture(body, &[r"(?i)event:\s*([^\n]+)", r"(?i)show:\s*([^\n]+)"]));
    data.venue = first_capture(body, &[
        r"(?i)venue:\s*([^\n]+)",
        r"at\s+([A-Z][A-Za-z\s&]+(?:Arena|Stadium|Center|Theatre|Theater|Hall|Pavilion))",
    ]);
    data.event_date = first_capture(body, &[
        r"(?i)date[:\s]\s*([^\n]+)",
        r"(?i)(?:on|when:)\s*(\w+,?\s+\w+\s+\d{1,2},?\s+\d{4})",
    ])
    .or_else(|| extract_date(body).map(|d| d.to_string()));
    fill_seating(
        &mut data,
        body,
        &[r"(?i)section[:\s]\s*([^\n,]+)", r"(?i)sec[:\s]\s*([^\n,]+)"],
        &[r"(?i)row[:\s]\s*([^\n,]+)"],
        &[r"(?i)seats?[:\s]\s*([^\n]+)"],
    );
    data.quantity = extract_quantity(body, &[r"(?i)qty:?\s*(\d+)", r"(?i)(\d+)\s+tickets?"]);
    data.confirmation_number = first_capture(body, &[
        r"(?i)confirmation\s*[#]?\s*:?\s*([A-Z0-9-]+)",
        r"(?i)order\s*[#]?\s*:?\s*([A-Z0-9-]+)",
        r"(?i)reference\s*[#]?\s*:?\s*([A-Z0-9-]+)",
    ]);
    let (sender, receiver) = split_sender_receiver(&extract_emails(body), &["axs.com", "aegpresents.com"]);
    data.sender_email = sender;
    data.receiver_email = receiver;
    Ok(data)
}

/// StubHub. Sparse emails; only a subset of the fields is usually present.
pub fn parse_stubhub(body: &str, subject: &str) -> Result<ParsedTransfer, ParseError> {
    let mut data = ParsedTransfer::new(Platform::StubHub);
    data.transfer_code = extract_labeled_transfer_code(body);
    data.event_name = first_capture(subject, &[r"(?i)(?:for|to)\s+([^-]+)"])
        .or_else(|| first_capture(body, &[r"(?i)event:\s*([^\n]+)"]));
    data.venue = first_capture(body, &[r"(?i)venue:\s*([^\n]+)"]);
    fill_seating(&mut data, body, &[r"(?i)section[:\s]\s*([^\n,]+)"], &[r"(?i)row[:\s]\s*([^\n,]+)"], &[
        r"(?i)seats?[:\s]\s*([^\n]+)",
    ]);
    data.quantity = extract_quantity(body, &[r"(?i)(\d+)\s+tickets?"]);
    data.confirmation_number = first_capture(body, &[r"(?i)order\s*[#]?\s*:?\s*([A-Z0-9-]+)"]);
    let (sender, receiver) = split_sender_receiver(&extract_emails(body), &["stubhub.com"]);
    data.sender_email = sender;
    data.receiver_email = receiver;
    Ok(data)
}

/// Fallback for platforms without a dedicated parser: transfer code, a loose event-name pattern and a loose
/// confirmation-number pattern only.
pub fn parse_generic(body: &str, subject: &str) -> Result<ParsedTransfer, ParseError> {
    let mut data = ParsedTransfer::new(Platform::Other);
    data.transfer_code = extract_labeled_transfer_code(body);
    data.event_name = first_capture(body, &[r"(?i)event[:\s]\s*([^\n]+)"])
        .or_else(|| first_capture(subject, &[r"(?i)(?:for|to)\s+([^-]+)"]));
    data.confirmation_number =
        first_capture(body, &[r"(?i)(?:confirmation|order|reference)\s*[#]?\s*:?\s*([A-Z0-9-]+)"]);
    Ok(data)
}

/// First capture group of the first pattern that matches, cleaned. Patterns are tried in priority order.
fn first_capture(text: &str, patterns: &[&str]) -> Option<String> {
    patterns.iter().find_map(|p| {
        let re = Regex::new(p).unwrap();
        re.captures(text).and_then(|c| c.get(1)).map(|m| clean_text(m.as_str())).filter(|s| !s.is_empty())
    })
}

fn fill_seating(data: &mut ParsedTransfer, body: &str, section: &[&str], row: &[&str], seat: &[&str]) {
    data.section = first_capture(body, section);
    data.row = first_capture(body, row);
    data.seat = first_capture(body, seat);
}

fn extract_quantity(body: &str, patterns: &[&str]) -> Option<u32> {
    first_capture(body, patterns).and_then(|q| q.parse::<u32>().ok()).filter(|q| *q > 0)
}

/// Splits the email addresses found in a body into (sender, receiver).
///
/// The receiver is the escrow address (an "escrow" token in the local part). The sender is the first address that
/// is neither the escrow address, a "noreply"-style address, nor on one of the platform's own domains. If nothing
/// qualifies, the sender stays absent rather than being guessed from an unrelated address.
fn split_sender_receiver(emails: &[String], platform_domains: &[&str]) -> (Option<String>, Option<String>) {
    let receiver = emails.iter().find(|e| e.split('@').next().unwrap_or("").to_lowercase().contains("escrow")).cloned();
    let sender = emails
        .iter()
        .find(|e| {
            let lower = e.to_lowercase();
            !lower.contains("escrow")
                && !lower.contains("noreply")
                && !lower.contains("no-reply")
                && !platform_domains.iter().any(|d| lower.contains(d))
        })
        .cloned();
    (sender, receiver)
}
