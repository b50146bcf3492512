use crate::db_types::{Listing, TransferRecord};

/// Fired when an inbound transfer email has been matched to a listing and the listing marked verified.
#[derive(Debug, Clone)]
pub struct TransferVerifiedEvent {
    pub listing: Listing,
    pub record: TransferRecord,
}

impl TransferVerifiedEvent {
    pub fn new(listing: Listing, record: TransferRecord) -> Self {
        Self { listing, record }
    }
}
