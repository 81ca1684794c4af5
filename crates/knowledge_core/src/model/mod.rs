//! Domain data model for articles and the editor document.
//!
//! # Responsibility
//! - Define wire shapes exchanged with the backend (`article`).
//! - Define the editor-owned document (`document`).

pub mod article;
pub mod document;
