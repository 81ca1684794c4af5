//! Credential storage contracts and in-memory implementation.
//!
//! # Responsibility
//! - Hold the primary bearer credential and the optional refresh credential.
//! - Delegate expiry to a TTL recorded at write time.
//!
//! # Invariants
//! - Reads never return an entry whose TTL has elapsed.
//! - `clear` removes primary and refresh together; no reader observes one
//!   removed and the other still present.
//! - Stores perform no claim validation.

use crate::auth::credential::Credential;
use crate::clock::Clock;
use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "credential store failure: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Which of the two stored credentials an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSlot {
    Primary,
    Refresh,
}

impl CredentialSlot {
    /// Stable storage key, matching the cookie names used by the web client.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "jwtToken",
            Self::Refresh => "refreshJwtToken",
        }
    }
}

/// TTL-backed credential storage shared by every screen.
pub trait CredentialStore {
    fn get_slot(&self, slot: CredentialSlot) -> StoreResult<Option<Credential>>;
    fn set_slot(&self, slot: CredentialSlot, credential: Credential, ttl: Duration)
        -> StoreResult<()>;
    /// Installs a new primary and (optional) refresh credential atomically;
    /// a missing refresh removes any previous one.
    fn replace_pair(
        &self,
        primary: Credential,
        refresh: Option<Credential>,
        ttl: Duration,
    ) -> StoreResult<()>;
    /// Removes both slots atomically.
    fn clear(&self) -> StoreResult<()>;

    fn get(&self) -> StoreResult<Option<Credential>> {
        self.get_slot(CredentialSlot::Primary)
    }

    fn set(&self, credential: Credential, ttl: Duration) -> StoreResult<()> {
        self.set_slot(CredentialSlot::Primary, credential, ttl)
    }

    fn get_refresh(&self) -> StoreResult<Option<Credential>> {
        self.get_slot(CredentialSlot::Refresh)
    }

    fn set_refresh(&self, credential: Credential, ttl: Duration) -> StoreResult<()> {
        self.set_slot(CredentialSlot::Refresh, credential, ttl)
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for &S {
    fn get_slot(&self, slot: CredentialSlot) -> StoreResult<Option<Credential>> {
        (**self).get_slot(slot)
    }

    fn set_slot(
        &self,
        slot: CredentialSlot,
        credential: Credential,
        ttl: Duration,
    ) -> StoreResult<()> {
        (**self).set_slot(slot, credential, ttl)
    }

    fn replace_pair(
        &self,
        primary: Credential,
        refresh: Option<Credential>,
        ttl: Duration,
    ) -> StoreResult<()> {
        (**self).replace_pair(primary, refresh, ttl)
    }

    fn clear(&self) -> StoreResult<()> {
        (**self).clear()
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for Arc<S> {
    fn get_slot(&self, slot: CredentialSlot) -> StoreResult<Option<Credential>> {
        (**self).get_slot(slot)
    }

    fn set_slot(
        &self,
        slot: CredentialSlot,
        credential: Credential,
        ttl: Duration,
    ) -> StoreResult<()> {
        (**self).set_slot(slot, credential, ttl)
    }

    fn replace_pair(
        &self,
        primary: Credential,
        refresh: Option<Credential>,
        ttl: Duration,
    ) -> StoreResult<()> {
        (**self).replace_pair(primary, refresh, ttl)
    }

    fn clear(&self) -> StoreResult<()> {
        (**self).clear()
    }
}

/// Expiry instant for an entry written at `now_ms` with `ttl`.
pub(crate) fn expiry_ms(now_ms: i64, ttl: Duration) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_add(ttl_ms)
}

#[derive(Debug, Clone)]
struct StoredEntry {
    credential: Credential,
    expires_at_ms: i64,
}

#[derive(Debug, Default)]
struct StoredPair {
    primary: Option<StoredEntry>,
    refresh: Option<StoredEntry>,
}

impl StoredPair {
    fn slot_mut(&mut self, slot: CredentialSlot) -> &mut Option<StoredEntry> {
        match slot {
            CredentialSlot::Primary => &mut self.primary,
            CredentialSlot::Refresh => &mut self.refresh,
        }
    }

    fn slot(&self, slot: CredentialSlot) -> Option<&StoredEntry> {
        match slot {
            CredentialSlot::Primary => self.primary.as_ref(),
            CredentialSlot::Refresh => self.refresh.as_ref(),
        }
    }
}

/// Process-local credential store.
///
/// Both slots live behind one lock, so `clear` is a single critical section.
#[derive(Debug)]
pub struct MemoryCredentialStore<C: Clock> {
    pair: Mutex<StoredPair>,
    clock: C,
}

impl<C: Clock> MemoryCredentialStore<C> {
    pub fn new(clock: C) -> Self {
        Self {
            pair: Mutex::new(StoredPair::default()),
            clock,
        }
    }
}

impl<C: Clock> CredentialStore for MemoryCredentialStore<C> {
    fn get_slot(&self, slot: CredentialSlot) -> StoreResult<Option<Credential>> {
        let now_ms = self.clock.now_ms();
        let pair = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(pair
            .slot(slot)
            .filter(|entry| entry.expires_at_ms > now_ms)
            .map(|entry| entry.credential.clone()))
    }

    fn set_slot(
        &self,
        slot: CredentialSlot,
        credential: Credential,
        ttl: Duration,
    ) -> StoreResult<()> {
        let expires_at_ms = expiry_ms(self.clock.now_ms(), ttl);
        let mut pair = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        *pair.slot_mut(slot) = Some(StoredEntry {
            credential,
            expires_at_ms,
        });
        Ok(())
    }

    fn replace_pair(
        &self,
        primary: Credential,
        refresh: Option<Credential>,
        ttl: Duration,
    ) -> StoreResult<()> {
        let expires_at_ms = expiry_ms(self.clock.now_ms(), ttl);
        let mut pair = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        *pair = StoredPair {
            primary: Some(StoredEntry {
                credential: primary,
                expires_at_ms,
            }),
            refresh: refresh.map(|credential| StoredEntry {
                credential,
                expires_at_ms,
            }),
        };
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut pair = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        *pair = StoredPair::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialSlot, CredentialStore, MemoryCredentialStore};
    use crate::auth::credential::Credential;
    use crate::clock::ManualClock;
    use std::time::Duration;

    #[test]
    fn entries_expire_with_ttl() {
        let clock = ManualClock::at_secs(1_000);
        let store = MemoryCredentialStore::new(clock.clone());
        store
            .set(Credential::new("a.b.c"), Duration::from_secs(60))
            .expect("set");

        clock.advance(Duration::from_secs(59));
        assert!(store.get().expect("get").is_some());
        clock.advance(Duration::from_secs(1));
        assert!(store.get().expect("get").is_none());
    }

    #[test]
    fn clear_removes_primary_and_refresh() {
        let store = MemoryCredentialStore::new(ManualClock::at_secs(0));
        store
            .set(Credential::new("p.p.p"), Duration::from_secs(60))
            .expect("set primary");
        store
            .set_refresh(Credential::new("r.r.r"), Duration::from_secs(60))
            .expect("set refresh");

        store.clear().expect("clear");
        assert!(store.get().expect("get").is_none());
        assert!(store.get_refresh().expect("get refresh").is_none());
    }

    #[test]
    fn replace_pair_drops_stale_refresh() {
        let store = MemoryCredentialStore::new(ManualClock::at_secs(0));
        store
            .set_refresh(Credential::new("old.r.r"), Duration::from_secs(60))
            .expect("set refresh");
        store
            .replace_pair(Credential::new("new.p.p"), None, Duration::from_secs(60))
            .expect("replace pair");
        assert_eq!(
            store.get().expect("get").map(|value| value.as_str().to_string()),
            Some("new.p.p".to_string())
        );
        assert!(store.get_refresh().expect("get refresh").is_none());
    }

    #[test]
    fn slots_are_independent_for_writes() {
        let store = MemoryCredentialStore::new(ManualClock::at_secs(0));
        store
            .set_refresh(Credential::new("r.r.r"), Duration::from_secs(60))
            .expect("set refresh");
        assert!(store.get().expect("get").is_none());
        assert_eq!(
            store
                .get_slot(CredentialSlot::Refresh)
                .expect("get refresh")
                .map(|value| value.as_str().to_string()),
            Some("r.r.r".to_string())
        );
        assert_eq!(CredentialSlot::Primary.as_str(), "jwtToken");
    }
}
