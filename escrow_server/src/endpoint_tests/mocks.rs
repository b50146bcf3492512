use chrono::Utc;
use escrow_engine::{
    db_types::{
        InboundEmail,
        Listing,
        NewListing,
        Platform,
        TransferCode,
        TransferRecord,
        VerificationStatus,
    },
    parsers::ParsedTransfer,
    traits::{EscrowDatabase, EscrowDatabaseError},
};
use mockall::mock;

mock! {
    pub EscrowDb {}
    impl EscrowDatabase for EscrowDb {
        fn url(&self) -> &str;
        async fn insert_listing(&self, listing: NewListing) -> Result<Listing, EscrowDatabaseError>;
        async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, EscrowDatabaseError>;
        async fn fetch_listing_by_transfer_code(&self, code: &TransferCode) -> Result<Option<Listing>, EscrowDatabaseError>;
        async fn verify_transfer(&self, listing: &Listing, email: &InboundEmail, parsed: &ParsedTransfer) -> Result<(Listing, TransferRecord), EscrowDatabaseError>;
        async fn record_unverified_transfer<'a>(&self, email: &InboundEmail, parsed: Option<&'a ParsedTransfer>, code: Option<TransferCode>, notes: &str) -> Result<TransferRecord, EscrowDatabaseError>;
        async fn fetch_transfer_record(&self, id: i64) -> Result<Option<TransferRecord>, EscrowDatabaseError>;
        async fn fetch_transfer_records(&self, unmatched_only: bool) -> Result<Vec<TransferRecord>, EscrowDatabaseError>;
        async fn close(&mut self) -> Result<(), EscrowDatabaseError>;
    }
}

pub fn pending_listing(id: i64, code: &str) -> Listing {
    Listing {
        id,
        title: "Eras Tour x2".to_string(),
        event_name: Some("Taylor Swift - The Eras Tour".to_string()),
        venue: Some("SoFi Stadium".to_string()),
        ticket_platform: Platform::Ticketmaster,
        transfer_code: Some(TransferCode(code.to_string())),
        escrow_email: "escrow+ticketmaster@escrowtickets.com".to_string(),
        verification_status: VerificationStatus::Pending,
        ticket_details: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn verified_listing(id: i64, code: &str) -> Listing {
    Listing { verification_status: VerificationStatus::Verified, ..pending_listing(id, code) }
}

pub fn transfer_record(id: i64, listing_id: Option<i64>, code: &str, status: VerificationStatus) -> TransferRecord {
    TransferRecord {
        id,
        listing_id,
        transfer_code: TransferCode(code.to_string()),
        sender_email: Some("taylor.fan@gmail.com".to_string()),
        receiver_email: Some("escrow+ticketmaster@escrowtickets.com".to_string()),
        received_at: Utc::now(),
        email_snapshot: "{}".to_string(),
        parsed_data: None,
        verification_status: status,
        verification_notes: String::new(),
        created_at: Utc::now(),
    }
}
