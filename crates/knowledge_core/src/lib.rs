//! Core logic for the knowledge-sharing client.
//! Session guarding, route authorization, the API boundary and the editor's
//! transform coordinator live here; rendering layers only call into it.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod routing;
pub mod service;

pub use api::client::{ApiClient, HttpTransport};
pub use api::request::ApiRequest;
pub use api::response::{ApiError, ApiResponse, ApiResult};
pub use auth::credential::{Claims, ClaimsError, Credential};
pub use auth::route::{decide, role_set, RouteAuthorizer, Verdict, ROLE_ADMIN, ROLE_USER};
pub use auth::session::{Session, SessionGuard};
pub use auth::store::{CredentialStore, MemoryCredentialStore, StoreError, StoreResult};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ClientConfig;
pub use editor::coordinator::{
    ActionCoordinator, ActionOutcome, CoordinatorError, CoordinatorState, SharedDocument,
};
pub use editor::reconcile::{merge, MergeResult};
pub use editor::transform::{ContentTransformer, MockTransformer, TransformKind};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::Document;
pub use repo::credential_repo::SqliteCredentialStore;
pub use routing::{Navigation, RouteTable};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
