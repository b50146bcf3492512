//! The reconciler: takes inbound transfer-confirmation emails and matches them against listings.

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{InboundEmail, Listing, NewListing, Platform, TransferCode, TransferRecord},
    events::{EventProducers, TransferVerifiedEvent},
    helpers::{escrow_email_for, generate_transfer_code, platform_hint_from_recipient},
    parsers::{ParseError, ParsedTransfer, ParserRegistry},
    traits::{EscrowDatabase, EscrowDatabaseError},
};

/// What became of a single inbound email. Every variant carries the audit record that was written for it; there
/// is no code path through the reconciler that skips the audit trail.
#[derive(Debug)]
pub enum VerificationOutcome {
    /// The extracted code matched a pending listing; the listing is now verified.
    Verified { listing: Listing, record: TransferRecord },
    /// The email parsed, but contained nothing code-shaped.
    NoTransferCode { record: TransferRecord },
    /// A code was extracted but no pending listing carries it.
    NoMatchingListing { code: TransferCode, record: TransferRecord },
    /// The platform parser itself faulted. Kept for manual review like any other failure.
    ParseFailed { reason: String, record: TransferRecord },
}

/// `TransferFlowApi` is the primary API for the escrow verification pipeline: creating listings that expect a
/// platform transfer, and reconciling the confirmation emails that arrive for them.
///
/// The parser table is injected at construction, so deployments (and tests) can override individual platform
/// parsers without touching the flow logic.
pub struct TransferFlowApi<B> {
    db: B,
    registry: ParserRegistry,
    producers: EventProducers,
}

impl<B> Debug for TransferFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransferFlowApi")
    }
}

impl<B> TransferFlowApi<B> {
    pub fn new(db: B, registry: ParserRegistry, producers: EventProducers) -> Self {
        Self { db, registry, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    /// Parses an email without touching the database. Backs the operator test endpoint.
    ///
    /// An explicit `hint` takes precedence; otherwise the recipient address is consulted, and failing that,
    /// content detection decides.
    pub fn parse_email(&self, email: &InboundEmail, hint: Option<Platform>) -> Result<ParsedTransfer, ParseError> {
        let hint = hint.or_else(|| platform_hint_from_recipient(&email.to));
        self.registry.parse_email(&email.text, &email.subject, &email.from, hint)
    }
}

impl<B> TransferFlowApi<B>
where B: EscrowDatabase
{
    /// Stores a new listing, generating its transfer code and escrow address if the caller has not set them.
    pub async fn create_listing(
        &self,
        mut listing: NewListing,
        escrow_domain: &str,
    ) -> Result<Listing, EscrowDatabaseError> {
        if listing.transfer_code.is_none() {
            listing.transfer_code = Some(generate_transfer_code(listing.ticket_platform));
        }
        if listing.escrow_email.is_empty() {
            listing.escrow_email = escrow_email_for(listing.ticket_platform, escrow_domain);
        }
        let listing = self.db.insert_listing(listing).await?;
        debug!(
            "🔄️🎫️ Listing {} created. Expecting a {} transfer with code {}",
            listing.id,
            listing.ticket_platform,
            listing.transfer_code.as_ref().map(|c| c.as_str()).unwrap_or("<none>")
        );
        Ok(listing)
    }

    /// Runs one inbound email through the full pipeline: parse, match, verify.
    ///
    /// Exactly one audit record is written whatever the outcome. Database errors abort the pipeline and bubble
    /// up; everything short of that is reported through [`VerificationOutcome`].
    pub async fn process_incoming_email(
        &self,
        email: &InboundEmail,
    ) -> Result<VerificationOutcome, EscrowDatabaseError> {
        let hint = platform_hint_from_recipient(&email.to);
        let parsed = match self.registry.parse_email(&email.text, &email.subject, &email.from, hint) {
            Ok(parsed) => parsed,
            Err(e) => {
                let reason = e.to_string();
                warn!("🔄️📧️ {reason}");
                let record = self.db.record_unverified_transfer(email, None, None, &reason).await?;
                return Ok(VerificationOutcome::ParseFailed { reason, record });
            },
        };
        let Some(code) = parsed.transfer_code.clone().map(TransferCode::from) else {
            debug!("🔄️📧️ Email from {} contains no transfer code", email.from);
            let record = self
                .db
                .record_unverified_transfer(email, Some(&parsed), None, "No transfer code found in email")
                .await?;
            return Ok(VerificationOutcome::NoTransferCode { record });
        };
        let Some(listing) = self.db.fetch_listing_by_transfer_code(&code).await? else {
            debug!("🔄️📧️ Transfer code {code} does not match any pending listing");
            let notes = format!("No pending listing matches transfer code {code}");
            let record = self.db.record_unverified_transfer(email, Some(&parsed), Some(code.clone()), &notes).await?;
            return Ok(VerificationOutcome::NoMatchingListing { code, record });
        };
        let (listing, record) = self.db.verify_transfer(&listing, email, &parsed).await?;
        info!("🔄️🎫️ Listing {} verified by email from {}", listing.id, email.from);
        self.call_transfer_verified_hook(&listing, &record).await;
        Ok(VerificationOutcome::Verified { listing, record })
    }

    async fn call_transfer_verified_hook(&self, listing: &Listing, record: &TransferRecord) {
        for emitter in &self.producers.transfer_verified_producer {
            debug!("🔄️🎫️ Notifying transfer verified hook subscribers");
            let event = TransferVerifiedEvent::new(listing.clone(), record.clone());
            emitter.publish_event(event).await;
        }
    }

    pub async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, EscrowDatabaseError> {
        self.db.fetch_listing(id).await
    }

    pub async fn fetch_transfer_record(&self, id: i64) -> Result<Option<TransferRecord>, EscrowDatabaseError> {
        self.db.fetch_transfer_record(id).await
    }

    /// The audit trail, newest first. `unmatched_only` gives the manual-review queue.
    pub async fn fetch_transfer_records(
        &self,
        unmatched_only: bool,
    ) -> Result<Vec<TransferRecord>, EscrowDatabaseError> {
        self.db.fetch_transfer_records(unmatched_only).await
    }
}
