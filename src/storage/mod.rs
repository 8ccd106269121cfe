//! Storage Layer - SQLite-backed persistence
//!
//! - schema: the registry of record types and their CREATE TABLE statements
//! - query: single-field equality selections and update change sets
//! - session: one transaction per store operation

pub mod query;
pub mod schema;
pub mod session;

pub use query::{Changes, Select};
pub use schema::Registry;
pub use session::Session;
