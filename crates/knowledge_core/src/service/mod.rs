//! Backend use-case services.
//!
//! # Responsibility
//! - Orchestrate API client calls into use-case level APIs.
//! - Keep screens decoupled from request shapes and status handling.

pub mod article_service;
pub mod auth_service;
