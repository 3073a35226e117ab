//! Roster API - entity adapter, DTOs, and the HTTP boundary
//!
//! Provides:
//! - The entity adapter composing record-store calls into domain users
//! - Externally visible DTO shapes
//! - The axum router mapping routes to adapter calls and outcomes to
//!   status codes

pub mod adapter;
pub mod dto;
pub mod handlers;

pub use adapter::UserAdapter;
pub use handlers::router;
