//! Navigation authorization.
//!
//! # Responsibility
//! - Combine a required-role set with the current session into a verdict.
//!
//! # Invariants
//! - Verdicts are values; authorization never errors.
//! - An empty required-role set means "any authenticated session".
//! - Deny verdicts are terminal: callers redirect, nothing retries.

use crate::auth::session::{Session, SessionGuard};
use crate::auth::store::CredentialStore;
use crate::clock::Clock;
use log::debug;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Role strings issued by the backend.
pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";

/// Outcome of one navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    DenyUnauthenticated,
    DenyForbidden,
}

impl Verdict {
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }

    /// Converts a deny verdict into its error form.
    pub fn into_result(self) -> Result<(), AuthorizationDenied> {
        match self {
            Self::Allow => Ok(()),
            Self::DenyUnauthenticated => Err(AuthorizationDenied::Unauthenticated),
            Self::DenyForbidden => Err(AuthorizationDenied::Forbidden),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::DenyUnauthenticated => "deny_unauthenticated",
            Self::DenyForbidden => "deny_forbidden",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationDenied {
    Unauthenticated,
    Forbidden,
}

impl Display for AuthorizationDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authorization denied: not authenticated"),
            Self::Forbidden => write!(f, "authorization denied: missing required role"),
        }
    }
}

impl Error for AuthorizationDenied {}

/// Decision table over an already evaluated session.
pub fn decide(session: &Session, required_roles: &BTreeSet<String>) -> Verdict {
    let Session::Valid { roles, .. } = session else {
        return Verdict::DenyUnauthenticated;
    };
    if required_roles.is_empty() {
        return Verdict::Allow;
    }
    if roles.is_disjoint(required_roles) {
        Verdict::DenyForbidden
    } else {
        Verdict::Allow
    }
}

/// Builds a role set from string literals.
pub fn role_set<I, R>(roles: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = R>,
    R: Into<String>,
{
    roles.into_iter().map(Into::into).collect()
}

/// Authorizer bound to a session guard.
pub struct RouteAuthorizer<S: CredentialStore, C: Clock> {
    guard: SessionGuard<S, C>,
}

impl<S: CredentialStore, C: Clock> RouteAuthorizer<S, C> {
    pub fn new(guard: SessionGuard<S, C>) -> Self {
        Self { guard }
    }

    pub fn guard(&self) -> &SessionGuard<S, C> {
        &self.guard
    }

    /// Evaluates the session once and applies the decision table.
    pub fn authorize(&self, required_roles: &BTreeSet<String>) -> Verdict {
        let verdict = decide(&self.guard.session(), required_roles);
        debug!(
            "event=route_authorize module=auth status=ok verdict={} required_roles={}",
            verdict.as_str(),
            required_roles.len()
        );
        verdict
    }
}
