//! Ledger store — the append-only audit log of every balance change.
//!
//! RULE: Entries are immutable facts. Nothing edits or removes them;
//! the sum of a user's deltas plus their seed balance must always equal
//! their current balance (the reconciliation invariant).

use crate::clock::Clock;
use crate::error::{ExchangeError, ExchangeResult};
use crate::ident::IdGen;
use crate::store;
use crate::types::{Page, PageRequest, Points, UserId};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    /// Points held back from an owner's balance when a survey publishes.
    EscrowDebit,
    /// Points paid to a respondent when their response is approved.
    RewardCredit,
}

impl LedgerReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EscrowDebit => "escrow_debit",
            Self::RewardCredit => "reward_credit",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ()> {
        match value {
            "escrow_debit" => Ok(Self::EscrowDebit),
            "reward_credit" => Ok(Self::RewardCredit),
            _ => Err(()),
        }
    }
}

/// Listing filter: positive deltas, negative deltas, or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerFilter {
    All,
    Earn,
    Spend,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Log position, assigned by the store on insert. Orders the log.
    pub seq: Option<i64>,
    pub entry_id: String,
    pub user_id: UserId,
    pub delta: Points,
    pub reason: LedgerReason,
    pub created_at: DateTime<Utc>,
}

/// Append one entry for `user_id`. Always succeeds once invoked — balance
/// sufficiency is the balance guard's job, not the ledger's.
pub fn append(
    tx: &Connection,
    clock: &dyn Clock,
    ids: &dyn IdGen,
    user_id: &str,
    delta: Points,
    reason: LedgerReason,
) -> ExchangeResult<LedgerEntry> {
    let mut entry = LedgerEntry {
        seq: None,
        entry_id: ids.next_id(),
        user_id: user_id.to_string(),
        delta,
        reason,
        created_at: clock.now(),
    };
    let seq = store::ledger::insert_entry(tx, &entry)?;
    entry.seq = Some(seq);
    log::debug!(
        "ledger append: user={user_id} delta={delta} reason={}",
        reason.as_str()
    );
    Ok(entry)
}

/// Page through a user's entries, newest first. Restartable: the same
/// request always returns the same slice of the (append-only) log.
pub fn list(
    conn: &Connection,
    user_id: &str,
    filter: LedgerFilter,
    page: PageRequest,
) -> ExchangeResult<Page<LedgerEntry>> {
    let items = store::ledger::entries_for_user(conn, user_id, filter, page.offset(), page.limit())?;
    let total = store::ledger::count_for_user(conn, user_id, filter)?;
    Ok(Page::new(items, page, total))
}

/// Audit snapshot of one user's books.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub user_id: UserId,
    pub balance: Points,
    pub seed_balance: Points,
    pub ledger_sum: Points,
}

impl Reconciliation {
    /// True when balance == seed_balance + sum of ledger deltas.
    pub fn consistent(&self) -> bool {
        self.balance == self.seed_balance + self.ledger_sum
    }
}

pub fn reconcile(conn: &Connection, user_id: &str) -> ExchangeResult<Reconciliation> {
    let user = store::user::get_user(conn, user_id)?
        .ok_or_else(|| ExchangeError::not_found("user", user_id))?;
    let ledger_sum = store::ledger::sum_for_user(conn, user_id)?;
    Ok(Reconciliation {
        user_id: user.user_id,
        balance: user.balance,
        seed_balance: user.seed_balance,
        ledger_sum,
    })
}
