//! Transfer-code and escrow-address generation.
//!
//! Every listing delivered by platform transfer gets a unique short code and a plus-addressed escrow inbox. The
//! recipient address doubles as a routing hint: `escrow+ticketmaster@…` tells the reconciler which parser to try
//! before any content sniffing happens.

use log::warn;
use rand::Rng;
use regex::Regex;

use crate::db_types::{Platform, TransferCode};

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_SUFFIX_LEN: usize = 7;

/// Generates a fresh transfer code for a listing: the platform's two-letter prefix, a hyphen, then seven random
/// uppercase alphanumerics, e.g. `TM-K4PZ2QA`.
///
/// Codes are not checked for uniqueness here. With 36^7 suffixes per platform, collisions across live listings
/// are vanishingly rare, and the matching step tolerates them by taking the oldest pending listing.
pub fn generate_transfer_code(platform: Platform) -> TransferCode {
    let mut rng = rand::thread_rng();
    let suffix: String =
        (0..CODE_SUFFIX_LEN).map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char).collect();
    TransferCode(format!("{}-{suffix}", platform.code_prefix()))
}

/// The escrow inbox sellers are told to transfer tickets to, e.g. `escrow+ticketmaster@escrowtickets.com`.
pub fn escrow_email_for(platform: Platform, domain: &str) -> String {
    format!("escrow+{}@{domain}", platform.token().to_lowercase())
}

/// Recovers the platform hint embedded in an escrow recipient address.
///
/// A plus-addressed tag always decides the parser: a tag that does not name a known platform resolves to
/// [`Platform::Other`], so the email is parsed generically rather than by whatever vocabulary its body happens to
/// mention. Only an address with no tag at all returns `None`, leaving content-based detection to decide.
pub fn platform_hint_from_recipient(to: &str) -> Option<Platform> {
    let re = Regex::new(r"(?i)escrow\+([a-z_]+)@").unwrap();
    let tag = re.captures(to)?.get(1)?.as_str();
    let platform = tag.parse::<Platform>().unwrap_or_else(|_| {
        warn!("📨️ Unrecognised platform tag in recipient address {to}. Using the generic parser");
        Platform::Other
    });
    Some(platform)
}
