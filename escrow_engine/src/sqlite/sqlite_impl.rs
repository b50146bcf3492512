//! `SqliteDatabase` is the concrete SQLite implementation of the [`EscrowDatabase`] storage contract.
use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::db::{listings, new_pool, transfers};
use crate::{
    db_types::{EmailSnapshot, InboundEmail, Listing, NewListing, TicketDetails, TransferCode, TransferRecord, VerificationStatus},
    parsers::ParsedTransfer,
    traits::{EscrowDatabase, EscrowDatabaseError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl EscrowDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, EscrowDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        listings::insert_listing(listing, &mut conn).await
    }

    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, EscrowDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let listing = listings::fetch_listing_by_id(id, &mut conn).await?;
        Ok(listing)
    }

    async fn fetch_listing_by_transfer_code(
        &self,
        code: &TransferCode,
    ) -> Result<Option<Listing>, EscrowDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let listing = listings::fetch_pending_listing_by_code(code, &mut conn).await?;
        Ok(listing)
    }

    /// The listing update and the audit-record insert happen inside one transaction. If either fails, neither is
    /// applied.
    async fn verify_transfer(
        &self,
        listing: &Listing,
        email: &InboundEmail,
        parsed: &ParsedTransfer,
    ) -> Result<(Listing, TransferRecord), EscrowDatabaseError> {
        // Parsed fields win; the listing's own data backfills whatever the parser missed.
        let details = TicketDetails {
            event_name: parsed.event_name.clone().or_else(|| listing.event_name.clone()),
            venue: parsed.venue.clone().or_else(|| listing.venue.clone()),
            section: parsed.section.clone(),
            row: parsed.row.clone(),
            seat: parsed.seat.clone(),
            quantity: parsed.quantity,
            confirmation_number: parsed.confirmation_number.clone(),
            verified_at: Utc::now(),
            verified_via: format!("{} transfer email", parsed.platform),
        };
        let details_json = serde_json::to_string(&details)?;
        let snapshot = serde_json::to_string(&EmailSnapshot::from(email))?;
        let parsed_json = serde_json::to_string(parsed)?;
        let code = listing.transfer_code.clone().unwrap_or_else(TransferCode::unknown);
        let sender = parsed.sender_email.as_deref().unwrap_or(email.from.as_str());
        let receiver = parsed.receiver_email.as_deref().unwrap_or(email.to.as_str());
        let received_at = email.received_at.unwrap_or_else(Utc::now);

        let mut tx = self.pool.begin().await?;
        let updated = listings::mark_listing_verified(listing.id, &details_json, &mut tx).await?;
        let record = transfers::insert_transfer_record(
            Some(listing.id),
            &code,
            Some(sender),
            Some(receiver),
            received_at,
            &snapshot,
            Some(&parsed_json),
            VerificationStatus::Verified,
            "Verified automatically by transfer-code match",
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        info!("🗃️ Listing {} verified against transfer record {}", updated.id, record.id);
        Ok((updated, record))
    }

    async fn record_unverified_transfer(
        &self,
        email: &InboundEmail,
        parsed: Option<&ParsedTransfer>,
        code: Option<TransferCode>,
        notes: &str,
    ) -> Result<TransferRecord, EscrowDatabaseError> {
        let snapshot = serde_json::to_string(&EmailSnapshot::from(email))?;
        let parsed_json = parsed.map(serde_json::to_string).transpose()?;
        let code = code.unwrap_or_else(TransferCode::unknown);
        let sender = parsed.and_then(|p| p.sender_email.as_deref()).unwrap_or(email.from.as_str());
        let receiver = parsed.and_then(|p| p.receiver_email.as_deref()).unwrap_or(email.to.as_str());
        let received_at = email.received_at.unwrap_or_else(Utc::now);
        let mut conn = self.pool.acquire().await?;
        let record = transfers::insert_transfer_record(
            None,
            &code,
            Some(sender),
            Some(receiver),
            received_at,
            &snapshot,
            parsed_json.as_deref(),
            VerificationStatus::Failed,
            notes,
            &mut conn,
        )
        .await?;
        warn!("🗃️ Unmatched transfer email recorded as transfer record {}. {notes}", record.id);
        Ok(record)
    }

    async fn fetch_transfer_record(&self, id: i64) -> Result<Option<TransferRecord>, EscrowDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let record = transfers::fetch_transfer_record_by_id(id, &mut conn).await?;
        Ok(record)
    }

    async fn fetch_transfer_records(&self, unmatched_only: bool) -> Result<Vec<TransferRecord>, EscrowDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let records = transfers::fetch_transfer_records(unmatched_only, &mut conn).await?;
        Ok(records)
    }

    async fn close(&mut self) -> Result<(), EscrowDatabaseError> {
        self.pool.close().await;
        Ok(())
    }
}
