use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Listing, NewListing, TransferCode},
    traits::EscrowDatabaseError,
};

pub async fn insert_listing(listing: NewListing, conn: &mut SqliteConnection) -> Result<Listing, EscrowDatabaseError> {
    let listing: Listing = sqlx::query_as(
        r#"
            INSERT INTO listings (
                title,
                event_name,
                venue,
                ticket_platform,
                transfer_code,
                escrow_email
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(listing.title)
    .bind(listing.event_name)
    .bind(listing.venue)
    .bind(listing.ticket_platform)
    .bind(listing.transfer_code)
    .bind(listing.escrow_email)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Listing \"{}\" inserted with id {}", listing.title, listing.id);
    Ok(listing)
}

pub async fn fetch_listing_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Listing>, sqlx::Error> {
    let listing = sqlx::query_as("SELECT * FROM listings WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(listing)
}

/// Finds the oldest *pending* listing carrying the given transfer code. Already-verified listings are excluded so
/// that a replayed email cannot re-verify, and the `ORDER BY` keeps the result deterministic if a code was ever
/// issued twice.
pub async fn fetch_pending_listing_by_code(
    code: &TransferCode,
    conn: &mut SqliteConnection,
) -> Result<Option<Listing>, sqlx::Error> {
    let listing = sqlx::query_as(
        "SELECT * FROM listings WHERE transfer_code = $1 AND verification_status = 'PENDING' ORDER BY created_at \
         LIMIT 1",
    )
    .bind(code.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(listing)
}

/// Marks the listing as verified and replaces its ticket-details blob. Not atomic on its own; the reconciler
/// embeds this in the same transaction as the audit-record insert.
pub async fn mark_listing_verified(
    id: i64,
    ticket_details: &str,
    conn: &mut SqliteConnection,
) -> Result<Listing, EscrowDatabaseError> {
    let listing: Option<Listing> = sqlx::query_as(
        r#"
            UPDATE listings
            SET verification_status = 'VERIFIED', ticket_details = $2
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(ticket_details)
    .fetch_optional(conn)
    .await?;
    listing.ok_or(EscrowDatabaseError::ListingNotFound(id))
}
