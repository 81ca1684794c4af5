//! SQLite-backed credential store.
//!
//! # Responsibility
//! - Persist the primary and refresh credentials with their TTL so they
//!   survive a client restart (the cookie jar equivalent).
//!
//! # Invariants
//! - Expired rows read as absent; they are pruned on the next write.
//! - `clear` deletes both rows in one transaction.
//! - Credential values never appear in log lines.

use crate::auth::credential::Credential;
use crate::auth::store::{expiry_ms, CredentialSlot, CredentialStore, StoreError, StoreResult};
use crate::clock::Clock;
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::time::Duration;

/// Credential store over a migrated SQLite connection.
pub struct SqliteCredentialStore<'conn, C: Clock> {
    conn: &'conn Connection,
    clock: C,
}

impl<'conn, C: Clock> SqliteCredentialStore<'conn, C> {
    /// Wraps a connection opened through `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `SchemaNotReady` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection, clock: C) -> StoreResult<Self> {
        let version = current_user_version(conn)?;
        if version < latest_version() {
            return Err(StoreError::Db(DbError::SchemaNotReady {
                db_version: version,
            }));
        }
        Ok(Self { conn, clock })
    }

    fn prune_expired(&self, now_ms: i64) -> StoreResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM credentials WHERE expires_at_ms <= ?1;",
            params![now_ms],
        )?;
        if removed > 0 {
            debug!("event=credential_prune module=store status=ok removed={removed}");
        }
        Ok(removed)
    }
}

impl<C: Clock> CredentialStore for SqliteCredentialStore<'_, C> {
    fn get_slot(&self, slot: CredentialSlot) -> StoreResult<Option<Credential>> {
        let now_ms = self.clock.now_ms();
        let value = self
            .conn
            .query_row(
                "SELECT value FROM credentials WHERE name = ?1 AND expires_at_ms > ?2;",
                params![slot.as_str(), now_ms],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value.map(Credential::new))
    }

    fn set_slot(
        &self,
        slot: CredentialSlot,
        credential: Credential,
        ttl: Duration,
    ) -> StoreResult<()> {
        let now_ms = self.clock.now_ms();
        self.prune_expired(now_ms)?;
        self.conn.execute(
            "INSERT INTO credentials (name, value, expires_at_ms, written_at_ms)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                expires_at_ms = excluded.expires_at_ms,
                written_at_ms = excluded.written_at_ms;",
            params![
                slot.as_str(),
                credential.as_str(),
                expiry_ms(now_ms, ttl),
                now_ms
            ],
        )?;
        info!(
            "event=credential_set module=store status=ok slot={} ttl_secs={}",
            slot.as_str(),
            ttl.as_secs()
        );
        Ok(())
    }

    fn replace_pair(
        &self,
        primary: Credential,
        refresh: Option<Credential>,
        ttl: Duration,
    ) -> StoreResult<()> {
        let now_ms = self.clock.now_ms();
        let expires_at_ms = expiry_ms(now_ms, ttl);
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM credentials;", [])?;
        tx.execute(
            "INSERT INTO credentials (name, value, expires_at_ms, written_at_ms)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                CredentialSlot::Primary.as_str(),
                primary.as_str(),
                expires_at_ms,
                now_ms
            ],
        )?;
        if let Some(refresh) = &refresh {
            tx.execute(
                "INSERT INTO credentials (name, value, expires_at_ms, written_at_ms)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    CredentialSlot::Refresh.as_str(),
                    refresh.as_str(),
                    expires_at_ms,
                    now_ms
                ],
            )?;
        }
        tx.commit()?;
        info!(
            "event=credential_replace module=store status=ok has_refresh={} ttl_secs={}",
            refresh.is_some(),
            ttl.as_secs()
        );
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM credentials WHERE name IN (?1, ?2);",
            params![
                CredentialSlot::Primary.as_str(),
                CredentialSlot::Refresh.as_str()
            ],
        )?;
        tx.commit()?;
        info!("event=credential_clear module=store status=ok removed={removed}");
        Ok(())
    }
}
