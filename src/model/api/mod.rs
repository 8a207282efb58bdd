//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - Field names are camelCase.
//! - Datetimes are serialised as timestamps.

pub mod auth;
pub mod ballot;
pub mod voting;
