//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! Subsystems call store functions — they never execute SQL directly.
//!
//! Row-level helpers live in the submodules and take a plain
//! `&Connection`, so the same helper runs standalone for reads and
//! inside a `Transaction` (which derefs to `Connection`) for writes.
//! Every multi-step mutation goes through [`ExchangeStore::immediate_tx`],
//! which takes the SQLite write lock up front and commits or rolls back
//! as a whole.

pub(crate) mod ledger;
pub(crate) mod report;
pub(crate) mod response;
pub(crate) mod survey;
pub(crate) mod user;

use crate::error::ExchangeResult;
use rusqlite::{Connection, Transaction, TransactionBehavior};

pub struct ExchangeStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl ExchangeStore {
    pub fn open(path: &str) -> ExchangeResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // This pragma returns the resulting mode as a row, so it goes
        // through query_row rather than execute. Real files come back
        // "wal"; in-memory databases report "memory".
        conn.query_row("PRAGMA journal_mode=WAL;", [], |row| {
            row.get::<_, String>(0)
        })?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        // Bound lock waits; expiry surfaces as the retryable Busy error.
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ExchangeResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Open a second connection to the same database.
    /// For in-memory databases this returns a fresh, isolated database.
    pub fn reopen(&self) -> ExchangeResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order. Idempotent.
    pub fn migrate(&self) -> ExchangeResult<()> {
        self.conn
            .execute_batch(include_str!("../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../migrations/002_reports.sql"))?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction. Commits on Ok,
    /// rolls back on Err — no partial side effects leave this function.
    pub fn immediate_tx<T>(
        &mut self,
        f: impl FnOnce(&Transaction) -> ExchangeResult<T>,
    ) -> ExchangeResult<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}
