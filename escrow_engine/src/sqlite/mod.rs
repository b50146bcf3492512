//! SQLite backend for the escrow verification engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
