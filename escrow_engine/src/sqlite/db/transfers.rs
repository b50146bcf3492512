use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{TransferCode, TransferRecord, VerificationStatus},
    traits::EscrowDatabaseError,
};

#[allow(clippy::too_many_arguments)]
pub async fn insert_transfer_record(
    listing_id: Option<i64>,
    code: &TransferCode,
    sender_email: Option<&str>,
    receiver_email: Option<&str>,
    received_at: DateTime<Utc>,
    email_snapshot: &str,
    parsed_data: Option<&str>,
    status: VerificationStatus,
    notes: &str,
    conn: &mut SqliteConnection,
) -> Result<TransferRecord, EscrowDatabaseError> {
    let record: TransferRecord = sqlx::query_as(
        r#"
            INSERT INTO transfer_records (
                listing_id,
                transfer_code,
                sender_email,
                receiver_email,
                received_at,
                email_snapshot,
                parsed_data,
                verification_status,
                verification_notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(listing_id)
    .bind(code.as_str())
    .bind(sender_email)
    .bind(receiver_email)
    .bind(received_at)
    .bind(email_snapshot)
    .bind(parsed_data)
    .bind(status)
    .bind(notes)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Transfer record {} written for code {code} ({status})", record.id);
    Ok(record)
}

pub async fn fetch_transfer_record_by_id(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<TransferRecord>, sqlx::Error> {
    let record = sqlx::query_as("SELECT * FROM transfer_records WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(record)
}

/// Newest first. `unmatched_only` restricts to records with no associated listing, which is the manual-review
/// queue.
pub async fn fetch_transfer_records(
    unmatched_only: bool,
    conn: &mut SqliteConnection,
) -> Result<Vec<TransferRecord>, sqlx::Error> {
    let query = if unmatched_only {
        "SELECT * FROM transfer_records WHERE listing_id IS NULL ORDER BY created_at DESC, id DESC"
    } else {
        "SELECT * FROM transfer_records ORDER BY created_at DESC, id DESC"
    };
    let records = sqlx::query_as(query).fetch_all(conn).await?;
    Ok(records)
}
