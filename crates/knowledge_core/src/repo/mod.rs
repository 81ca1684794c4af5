//! Persistence implementations of the auth contracts.
//!
//! # Responsibility
//! - Isolate SQLite query details from session and API logic.
//!
//! # Invariants
//! - Stores only accept connections whose migrations are applied.

pub mod credential_repo;
