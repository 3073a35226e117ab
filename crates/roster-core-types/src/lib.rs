//! Core types shared across Roster crates
//!
//! This crate provides the foundational identifier type used by the
//! storage, adapter, and HTTP layers:
//!
//! - **UserToken**: the externally visible 128-bit record identifier

pub mod token;

pub use token::UserToken;
