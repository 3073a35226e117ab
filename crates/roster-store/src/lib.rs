//! Roster Store - metadata-driven Postgres persistence for user records
//!
//! Provides:
//! - Declarative table/column metadata with a statically-registered lookup
//! - SQL fragment generation over that metadata (column lists, bound
//!   parameters, update assignments) with exclusion and absent-field
//!   filtering
//! - Row-to-record mapping driven by the same column designations
//! - The per-entity record store: create, fetch, delete, cursor-based
//!   listing, approximate counting, and the version-guarded name upsert
//! - Environment-based connection configuration and pool assembly

pub mod config;
pub mod db;
pub mod meta;
pub mod query;
pub mod records;
pub mod row;
pub mod schema;
pub mod users;

pub use config::DbConfig;
pub use records::{Email, Item, ListEntry, Name};
pub use users::{PgUserStore, UserStore};
