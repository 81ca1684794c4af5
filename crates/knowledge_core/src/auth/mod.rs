//! Client-side session and navigation authorization.
//!
//! # Responsibility
//! - Store bearer credentials with a TTL (`store`).
//! - Read unverified claims for UI gating (`credential`, `session`).
//! - Turn required roles into allow/deny verdicts (`route`).
//!
//! # Invariants
//! - Claims decoded here gate navigation only. They are never used to
//!   authorize a server-side mutation; the backend re-checks every request.
//! - Every failure path fails closed.

pub mod credential;
pub mod route;
pub mod session;
pub mod store;
