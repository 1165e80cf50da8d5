//! # helpdesk_core
//!
//! Core domain logic for Helpdesk.

pub mod chats;
pub mod db;
pub mod migrate;
pub mod models;
pub mod users;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
