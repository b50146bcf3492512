//! Identifies which ticket platform sent a confirmation email.

use crate::db_types::Platform;

/// Determines the originating platform from the sender address and the email body.
///
/// Platforms are checked in a fixed priority order so that an email matching several vocabularies is always
/// classified the same way. The sender address is the strongest signal; body text is the fallback for forwarded
/// mail where the original From header is lost.
pub fn detect_platform(from: &str, body: &str) -> Platform {
    let from = from.to_lowercase();
    let body = body.to_lowercase();
    if from.contains("ticketmaster") || body.contains("ticketmaster") {
        Platform::Ticketmaster
    } else if from.contains("axs.com") || from.contains("aegpresents") || body.contains("axs.com") {
        Platform::Axs
    } else if from.contains("stubhub") || body.contains("stubhub") {
        Platform::StubHub
    } else if from.contains("seatgeek") || body.contains("seatgeek") {
        Platform::SeatGeek
    } else if from.contains("vividseats") || body.contains("vivid seats") {
        Platform::VividSeats
    } else if from.contains("gametime") || body.contains("gametime") {
        Platform::Gametime
    } else {
        Platform::Other
    }
}
