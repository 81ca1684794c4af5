//! Article editor core: asynchronous transforms and reconciliation.
//!
//! # Responsibility
//! - Define the transform collaborator seam and mock assistant (`transform`).
//! - Merge transform results with concurrent edits (`reconcile`).
//! - Gate and apply transforms one at a time (`coordinator`).
//!
//! # Invariants
//! - Execution is single-threaded and cooperative; the transform await is
//!   the only suspension point.

pub mod coordinator;
pub mod reconcile;
pub mod transform;
