//! The email-parsing pipeline: field extractors, per-platform parsers, platform detection and the dispatch table
//! that ties them together.
//!
//! Parsing is best-effort by design. A parser always returns a [`ParsedTransfer`] whose optional fields reflect
//! whatever could be extracted; only a genuine fault inside a parser surfaces as a [`ParseError`]. Callers must
//! tolerate absent fields.

pub mod detector;
pub mod extractors;
mod platforms;
mod registry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use detector::detect_platform;
pub use platforms::{parse_axs, parse_generic, parse_stubhub, parse_ticketmaster};
pub use registry::{ParserFn, ParserRegistry};

use crate::db_types::Platform;

/// Structured transfer metadata extracted from a single confirmation email. Ephemeral; the reconciler serializes it
/// onto the audit record but it is never persisted as a row of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransfer {
    pub platform: Platform,
    pub parsed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_email: Option<String>,
}

impl ParsedTransfer {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            parsed_at: Utc::now(),
            transfer_code: None,
            event_name: None,
            event_date: None,
            venue: None,
            section: None,
            row: None,
            seat: None,
            quantity: None,
            confirmation_number: None,
            sender_email: None,
            receiver_email: None,
        }
    }
}

/// A parser-level fault. Field absence is *not* an error; this only fires when extraction itself misbehaves.
#[derive(Debug, Clone, Error)]
#[error("Failed to parse {platform} email. {reason}")]
pub struct ParseError {
    pub platform: Platform,
    pub reason: String,
}

impl ParseError {
    pub fn new<S: Into<String>>(platform: Platform, reason: S) -> Self {
        Self { platform, reason: reason.into() }
    }
}
