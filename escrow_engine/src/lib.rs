//! Ticket Escrow Engine
//!
//! The core logic of the ticket-marketplace escrow service: sellers list tickets, transfer them to a
//! platform-specific escrow inbox, and the engine reconciles the resulting confirmation emails against the
//! listings that are waiting for them.
//!
//! The library is divided into three main sections:
//! 1. The email-parsing pipeline ([`mod@parsers`]): stateless extractors, per-platform parsers, platform
//!    detection and the dispatch table that ties them together.
//! 2. Storage ([`mod@traits`] and the SQLite backend): listings awaiting verification plus the append-only audit
//!    trail of every processed email. You should never need to touch the database directly; go through the
//!    [`TransferFlowApi`].
//! 3. The reconciler ([`TransferFlowApi`]): parse, match, verify, in one place, emitting a
//!    [`events::TransferVerifiedEvent`] whenever a listing is verified.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod parsers;
pub mod traits;

mod transfer_flow_api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{db, SqliteDatabase};
pub use transfer_flow_api::{TransferFlowApi, VerificationOutcome};
