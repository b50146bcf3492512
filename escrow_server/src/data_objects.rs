use std::fmt::Display;

use actix_multipart::form::{text::Text, MultipartForm};
use escrow_engine::db_types::{InboundEmail, Listing, Platform, TransferRecord, VerificationStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TransferData>,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string(), data: None }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string(), data: None }
    }

    pub fn verified(listing: &Listing, record: &TransferRecord) -> Self {
        Self {
            success: true,
            message: format!("Ticket transfer verified for listing {}", listing.id),
            data: Some(TransferData::from_record(record)),
        }
    }

    pub fn unverified<S: Display>(message: S, record: &TransferRecord) -> Self {
        Self { success: false, message: message.to_string(), data: Some(TransferData::from_record(record)) }
    }
}

/// The machine-readable part of a webhook response: which audit record was written, and what it concluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferData {
    pub listing_id: Option<i64>,
    pub transfer_id: i64,
    pub transfer_code: String,
    pub verification_status: VerificationStatus,
}

impl TransferData {
    pub fn from_record(record: &TransferRecord) -> Self {
        Self {
            listing_id: record.listing_id,
            transfer_id: record.id,
            transfer_code: record.transfer_code.to_string(),
            verification_status: record.verification_status,
        }
    }
}

/// Body of the operator parse endpoint: either a full email, or the name of a canned sample. An explicit
/// `platform` overrides both the recipient hint and content detection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    #[serde(default)]
    pub use_sample: Option<String>,
    #[serde(default)]
    pub email: Option<InboundEmail>,
    #[serde(default)]
    pub platform: Option<Platform>,
}

/// Query string for the audit-trail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferQuery {
    #[serde(default)]
    pub unmatched: bool,
}

/// The multipart rendering of an inbound email, as some relays deliver `multipart/form-data` rather than JSON.
#[derive(MultipartForm)]
pub struct EmailForm {
    pub from: Text<String>,
    pub to: Text<String>,
    pub subject: Text<String>,
    pub text: Text<String>,
    pub html: Option<Text<String>>,
    #[multipart(rename = "receivedAt")]
    pub received_at: Option<Text<String>>,
}

impl From<EmailForm> for InboundEmail {
    fn from(form: EmailForm) -> Self {
        let mut email = InboundEmail::new(form.from.0, form.to.0, form.subject.0, form.text.0);
        email.html = form.html.map(|t| t.0);
        email.received_at = form.received_at.and_then(|t| t.0.parse().ok());
        email
    }
}
