use thiserror::Error;

use crate::{
    db_types::{InboundEmail, Listing, NewListing, TransferCode, TransferRecord},
    parsers::ParsedTransfer,
};

/// The storage contract for the transfer-verification pipeline.
///
/// Two invariants are the backend's responsibility:
/// * **One audit record per email.** Every inbound email produces exactly one [`TransferRecord`], whether it
///   verified a listing, matched nothing, or failed to parse.
/// * **Verification is atomic.** [`verify_transfer`](EscrowDatabase::verify_transfer) updates the listing and
///   writes the audit record in a single transaction; a crash can never leave a verified listing without its
///   audit record or vice versa.
#[allow(async_fn_in_trait)]
pub trait EscrowDatabase {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new listing. The transfer code and escrow email must already be set by the caller.
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, EscrowDatabaseError>;

    /// Fetches a listing by its internal id.
    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, EscrowDatabaseError>;

    /// Finds the listing a transfer code belongs to.
    ///
    /// Only listings still awaiting verification are considered. In the (rare) event that several pending
    /// listings share a code, the oldest one wins, so behaviour stays deterministic.
    async fn fetch_listing_by_transfer_code(
        &self,
        code: &TransferCode,
    ) -> Result<Option<Listing>, EscrowDatabaseError>;

    /// Marks `listing` as verified and writes the matching audit record, in a single atomic transaction.
    ///
    /// The listing's `ticket_details` blob is rebuilt from `parsed`, with fields the parser could not extract
    /// falling back to the listing's existing values. Returns the updated listing and the new audit record.
    async fn verify_transfer(
        &self,
        listing: &Listing,
        email: &InboundEmail,
        parsed: &ParsedTransfer,
    ) -> Result<(Listing, TransferRecord), EscrowDatabaseError>;

    /// Writes an audit record for an email that did *not* verify a listing: no code, no matching listing, or a
    /// parser fault. `parsed` is `None` only in the parser-fault case; `notes` says which outcome applied.
    async fn record_unverified_transfer(
        &self,
        email: &InboundEmail,
        parsed: Option<&ParsedTransfer>,
        code: Option<TransferCode>,
        notes: &str,
    ) -> Result<TransferRecord, EscrowDatabaseError>;

    /// Fetches a single audit record by id.
    async fn fetch_transfer_record(&self, id: i64) -> Result<Option<TransferRecord>, EscrowDatabaseError>;

    /// Fetches audit records, newest first. With `unmatched_only`, restricts to records that did not verify a
    /// listing -- the manual-review queue.
    async fn fetch_transfer_records(&self, unmatched_only: bool) -> Result<Vec<TransferRecord>, EscrowDatabaseError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), EscrowDatabaseError> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum EscrowDatabaseError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The requested listing (internal id {0}) does not exist")]
    ListingNotFound(i64),
    #[error("Could not serialize record data. {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<sqlx::Error> for EscrowDatabaseError {
    fn from(e: sqlx::Error) -> Self {
        EscrowDatabaseError::DatabaseError(e.to_string())
    }
}
