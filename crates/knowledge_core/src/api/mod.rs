//! Backend API boundary.
//!
//! # Responsibility
//! - Decorate outbound requests with the bearer credential (`request`).
//! - Map inbound failure statuses and apply their credential side effects
//!   (`response`).
//! - Drive a pluggable transport (`client`).

pub mod client;
pub mod request;
pub mod response;
