//! Core data types shared between the parsing pipeline, the reconciler and the database backends.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------      Platform       ---------------------------------------------------------

/// The ticket platforms the pipeline knows about.
///
/// `Ticketmaster`, `Axs` and `StubHub` have dedicated parsers. The remaining named platforms are recognised by the
/// detector but parsed with the generic parser. `Other` is the catch-all for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum Platform {
    #[sqlx(rename = "TICKETMASTER")]
    #[serde(rename = "TICKETMASTER")]
    Ticketmaster,
    #[sqlx(rename = "AXS")]
    #[serde(rename = "AXS")]
    Axs,
    #[sqlx(rename = "STUBHUB")]
    #[serde(rename = "STUBHUB")]
    StubHub,
    #[sqlx(rename = "SEATGEEK")]
    #[serde(rename = "SEATGEEK")]
    SeatGeek,
    #[sqlx(rename = "VIVID_SEATS")]
    #[serde(rename = "VIVID_SEATS")]
    VividSeats,
    #[sqlx(rename = "GAMETIME")]
    #[serde(rename = "GAMETIME")]
    Gametime,
    #[sqlx(rename = "OTHER")]
    #[serde(rename = "OTHER")]
    Other,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Ticketmaster,
        Platform::Axs,
        Platform::StubHub,
        Platform::SeatGeek,
        Platform::VividSeats,
        Platform::Gametime,
        Platform::Other,
    ];

    /// The two-letter prefix used when generating transfer codes for listings on this platform.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Platform::Ticketmaster => "TM",
            Platform::Axs => "AX",
            Platform::StubHub => "ST",
            Platform::SeatGeek => "SG",
            Platform::VividSeats => "VS",
            Platform::Gametime => "GT",
            Platform::Other => "XX",
        }
    }

    /// The canonical uppercase token for the platform, as it appears in escrow addresses and API payloads.
    pub fn token(&self) -> &'static str {
        match self {
            Platform::Ticketmaster => "TICKETMASTER",
            Platform::Axs => "AXS",
            Platform::StubHub => "STUBHUB",
            Platform::SeatGeek => "SEATGEEK",
            Platform::VividSeats => "VIVID_SEATS",
            Platform::Gametime => "GAMETIME",
            Platform::Other => "OTHER",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown platform: {0}")]
pub struct UnknownPlatform(String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TICKETMASTER" => Ok(Platform::Ticketmaster),
            "AXS" => Ok(Platform::Axs),
            "STUBHUB" => Ok(Platform::StubHub),
            "SEATGEEK" => Ok(Platform::SeatGeek),
            "VIVID_SEATS" | "VIVIDSEATS" => Ok(Platform::VividSeats),
            "GAMETIME" => Ok(Platform::Gametime),
            "OTHER" => Ok(Platform::Other),
            s => Err(UnknownPlatform(s.to_string())),
        }
    }
}

impl From<&str> for Platform {
    /// Lossy conversion. An unrecognised identifier maps to `Other`, which in turn resolves to the generic parser.
    fn from(value: &str) -> Self {
        value.parse().unwrap_or(Platform::Other)
    }
}

//--------------------------------------    TransferCode     ---------------------------------------------------------

/// A lightweight wrapper around the short code that links a confirmation email back to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TransferCode(pub String);

/// Sentinel stored on audit records when no code could be extracted from an email.
pub const UNKNOWN_TRANSFER_CODE: &str = "UNKNOWN";

impl TransferCode {
    pub fn unknown() -> Self {
        Self(UNKNOWN_TRANSFER_CODE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TransferCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TransferCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for TransferCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------  VerificationStatus  --------------------------------------------------------

/// Verification state of a listing (tri-state) and of a transfer record (Verified/Failed only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    /// Waiting for a transfer confirmation email to arrive.
    Pending,
    /// A confirmation email was matched and trusted.
    Verified,
    /// The email could not be matched; kept for manual review.
    Failed,
}

impl Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "PENDING"),
            VerificationStatus::Verified => write!(f, "VERIFIED"),
            VerificationStatus::Failed => write!(f, "FAILED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid verification status: {0}")]
pub struct InvalidStatus(String);

impl FromStr for VerificationStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "VERIFIED" => Ok(Self::Verified),
            "FAILED" => Ok(Self::Failed),
            s => Err(InvalidStatus(s.to_string())),
        }
    }
}

impl From<String> for VerificationStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid verification status: {value}. But this conversion cannot fail. Defaulting to Pending");
            VerificationStatus::Pending
        })
    }
}

//--------------------------------------       Listing       ---------------------------------------------------------

/// The subset of a marketplace listing that the verification pipeline reads and writes.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub event_name: Option<String>,
    pub venue: Option<String>,
    pub ticket_platform: Platform,
    pub transfer_code: Option<TransferCode>,
    pub escrow_email: String,
    pub verification_status: VerificationStatus,
    /// JSON blob written by the reconciler on successful verification. See [`TicketDetails`].
    pub ticket_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewListing     ---------------------------------------------------------

/// A listing as created when a seller chooses transfer-based delivery. The transfer code and escrow email are
/// generated by [`crate::helpers::generate_transfer_code`] and [`crate::helpers::escrow_email_for`] respectively.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub event_name: Option<String>,
    pub venue: Option<String>,
    pub ticket_platform: Platform,
    pub transfer_code: Option<TransferCode>,
    pub escrow_email: String,
}

impl NewListing {
    pub fn new<S: Into<String>>(title: S, platform: Platform, code: TransferCode, escrow_email: S) -> Self {
        Self {
            title: title.into(),
            event_name: None,
            venue: None,
            ticket_platform: platform,
            transfer_code: Some(code),
            escrow_email: escrow_email.into(),
        }
    }

    pub fn with_event<S: Into<String>>(mut self, event_name: S, venue: S) -> Self {
        self.event_name = Some(event_name.into());
        self.venue = Some(venue.into());
        self
    }
}

//--------------------------------------    TransferRecord   ---------------------------------------------------------

/// Append-only audit record. Every inbound email that reaches the reconciler produces exactly one of these,
/// whatever the outcome.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub id: i64,
    /// `None` when no listing matched the extracted code. The record is kept for manual review.
    pub listing_id: Option<i64>,
    pub transfer_code: TransferCode,
    pub sender_email: Option<String>,
    pub receiver_email: Option<String>,
    pub received_at: DateTime<Utc>,
    /// Serialized [`EmailSnapshot`].
    pub email_snapshot: String,
    /// Serialized [`crate::parsers::ParsedTransfer`], when parsing succeeded.
    pub parsed_data: Option<String>,
    pub verification_status: VerificationStatus,
    pub verification_notes: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     InboundEmail    ---------------------------------------------------------

/// An email as delivered by the inbound relay webhook, or by the operator test endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
}

impl InboundEmail {
    pub fn new<S: Into<String>>(from: S, to: S, subject: S, text: S) -> Self {
        Self { from: from.into(), to: to.into(), subject: subject.into(), text: text.into(), html: None, received_at: None }
    }

    /// All four of `from`, `to`, `subject` and `text` must be present and non-empty before the pipeline runs.
    pub fn validate(&self) -> Result<(), String> {
        let missing = [("from", &self.from), ("to", &self.to), ("subject", &self.subject), ("text", &self.text)]
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| *k)
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required email fields: {}", missing.join(", ")))
        }
    }
}

//--------------------------------------    EmailSnapshot    ---------------------------------------------------------

/// What gets stored on the audit record: enough of the raw email for forensics, with the body truncated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSnapshot {
    pub subject: String,
    pub from: String,
    pub to: String,
    pub body: String,
}

const SNAPSHOT_BODY_LIMIT: usize = 1000;

impl From<&InboundEmail> for EmailSnapshot {
    fn from(email: &InboundEmail) -> Self {
        let mut body = email.text.clone();
        if body.len() > SNAPSHOT_BODY_LIMIT {
            // Truncate on a char boundary; the limit itself is approximate.
            let mut cut = SNAPSHOT_BODY_LIMIT;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Self { subject: email.subject.clone(), from: email.from.clone(), to: email.to.clone(), body }
    }
}

//--------------------------------------    TicketDetails    ---------------------------------------------------------

/// The structured blob written to `listings.ticket_details` when a transfer is verified. Parsed fields win;
/// fields the parser could not extract fall back to whatever the listing already holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails {
    pub event_name: Option<String>,
    pub venue: Option<String>,
    pub section: Option<String>,
    pub row: Option<String>,
    pub seat: Option<String>,
    pub quantity: Option<u32>,
    pub confirmation_number: Option<String>,
    pub verified_at: DateTime<Utc>,
    pub verified_via: String,
}
