//! # Ticket Escrow Server
//! This module hosts the HTTP surface of the escrow verification pipeline. It is responsible for:
//! Listening for incoming webhook requests from the inbound email relay.
//! Parsing the request body (JSON or multipart form) into an inbound email.
//! Handing the email to the verification engine and reporting the outcome.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/email/webhook`: The webhook route for receiving transfer-confirmation emails from the relay.
//! * `/email/parse`: An operator route that parses an email (or a canned sample) without touching the database.
//! * `/email/transfers`: The audit trail, with an `unmatched` filter for the manual-review queue.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod routes;
pub mod samples;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
