//! Interface contracts for the verification engine's database *backends*.
//!
//! A backend tracks two things: the listings awaiting a transfer confirmation, and the append-only audit trail of
//! every email the reconciler has processed. [`EscrowDatabase`] is the full contract; the SQLite implementation
//! lives in [`crate::sqlite`], and the server's endpoint tests substitute a mock.

mod escrow_database;

pub use escrow_database::{EscrowDatabase, EscrowDatabaseError};
