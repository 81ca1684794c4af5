//! Session guard over stored credentials.
//!
//! # Responsibility
//! - Answer "is there a credential", "is it expired" and "which roles" for
//!   UI navigation gating.
//! - Derive a `Session` value fresh on every query; nothing is cached.
//!
//! # Invariants
//! - Guard queries never error and never panic.
//! - Decoding or storage failures fail closed: expired, no roles.
//! - One decision reads the store once (`SessionGuard::session`).

use crate::auth::credential::{Claims, Credential};
use crate::auth::store::CredentialStore;
use crate::clock::Clock;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Session state derived from the credential store at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Absent,
    /// Expired, missing `exp`, or undecodable.
    Expired,
    Valid {
        subject: Option<String>,
        roles: BTreeSet<String>,
    },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn roles(&self) -> BTreeSet<String> {
        match self {
            Self::Valid { roles, .. } => roles.clone(),
            Self::Absent | Self::Expired => BTreeSet::new(),
        }
    }

    /// Converts to the roles of a valid session or the reason there is none.
    pub fn into_roles(self) -> Result<BTreeSet<String>, SessionError> {
        match self {
            Self::Valid { roles, .. } => Ok(roles),
            Self::Absent => Err(SessionError::CredentialMissing),
            Self::Expired => Err(SessionError::CredentialExpired),
        }
    }
}

/// Why no valid session exists.
///
/// Malformed credentials are reported as `CredentialExpired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    CredentialMissing,
    CredentialExpired,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CredentialMissing => write!(f, "no credential is stored"),
            Self::CredentialExpired => write!(f, "stored credential is expired or unreadable"),
        }
    }
}

impl Error for SessionError {}

/// Read-only view over a credential store and a clock.
pub struct SessionGuard<S: CredentialStore, C: Clock> {
    store: S,
    clock: C,
}

impl<S: CredentialStore, C: Clock> SessionGuard<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `true` iff the store currently holds a non-empty primary credential.
    pub fn has_credential(&self) -> bool {
        self.read_credential().is_some()
    }

    /// `true` when absent, undecodable, missing `exp`, or `exp <= now`.
    pub fn is_expired(&self) -> bool {
        match self.read_credential() {
            Some(credential) => match decode(&credential) {
                Some(claims) => claims.is_expired_at(self.clock.now_secs()),
                None => true,
            },
            None => true,
        }
    }

    /// Decoded roles, or empty when absent or undecodable.
    pub fn roles(&self) -> BTreeSet<String> {
        self.read_credential()
            .and_then(|credential| decode(&credential))
            .map(|claims| claims.roles)
            .unwrap_or_default()
    }

    /// Evaluates the session once: one store read, one decode.
    pub fn session(&self) -> Session {
        let Some(credential) = self.read_credential() else {
            return Session::Absent;
        };
        let Some(claims) = decode(&credential) else {
            return Session::Expired;
        };
        if claims.is_expired_at(self.clock.now_secs()) {
            return Session::Expired;
        }
        Session::Valid {
            subject: claims.subject,
            roles: claims.roles,
        }
    }

    fn read_credential(&self) -> Option<Credential> {
        match self.store.get() {
            Ok(credential) => credential.filter(|value| !value.is_empty()),
            Err(err) => {
                warn!(
                    "event=session_read module=auth status=error error_code=store_read_failed error={err}"
                );
                None
            }
        }
    }
}

fn decode(credential: &Credential) -> Option<Claims> {
    match credential.decode_claims() {
        Ok(claims) => Some(claims),
        Err(err) => {
            debug!(
                "event=claims_decode module=auth status=error error_code={}",
                err.code()
            );
            None
        }
    }
}
