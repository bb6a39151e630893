//! Balance guard — the only writer of user point balances.
//!
//! RULE: No other module touches `users.balance`. Every mutation runs
//! inside the caller's immediate transaction and appends its ledger entry
//! in the same unit of work, so the balance and the log cannot drift.
//! SQLite's single-writer transactions serialize concurrent debits and
//! credits; the `CHECK (balance >= 0)` constraint is the backstop.

use crate::clock::Clock;
use crate::error::{ExchangeError, ExchangeResult};
use crate::ident::IdGen;
use crate::ledger_subsystem::{self, LedgerEntry, LedgerReason};
use crate::store;
use crate::types::{Points, UserId};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub nickname: String,
    pub balance: Points,
    /// Initial grant, recorded so the books reconcile from day one.
    pub seed_balance: Points,
    pub activity_score: Points,
    pub credit_score: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub nickname: String,
    pub balance: Points,
    pub activity_score: Points,
    pub credit_score: i64,
    pub has_honor: bool,
}

impl UserRecord {
    pub fn summary(&self, honor_threshold: i64) -> UserSummary {
        UserSummary {
            user_id: self.user_id.clone(),
            nickname: self.nickname.clone(),
            balance: self.balance,
            activity_score: self.activity_score,
            credit_score: self.credit_score,
            has_honor: self.credit_score >= honor_threshold,
        }
    }
}

/// Take `amount` points from `user_id`, appending the matching negative
/// ledger entry. Fails with `InsufficientBalance` and no side effects when
/// the balance cannot cover it.
pub fn debit(
    tx: &Connection,
    clock: &dyn Clock,
    ids: &dyn IdGen,
    user_id: &str,
    amount: Points,
    reason: LedgerReason,
) -> ExchangeResult<LedgerEntry> {
    if amount <= 0 {
        return Err(ExchangeError::validation(format!(
            "debit amount must be positive, got {amount}"
        )));
    }
    let available = store::user::balance_of(tx, user_id)?
        .ok_or_else(|| ExchangeError::not_found("user", user_id))?;
    if available < amount {
        return Err(ExchangeError::InsufficientBalance {
            required: amount,
            available,
        });
    }
    store::user::apply_balance_delta(tx, user_id, -amount)?;
    ledger_subsystem::append(tx, clock, ids, user_id, -amount, reason)
}

/// Give `amount` points to `user_id`, appending the matching positive
/// ledger entry. Reward credits also raise the activity score by the same
/// amount; all three writes belong to the caller's transaction.
pub fn credit(
    tx: &Connection,
    clock: &dyn Clock,
    ids: &dyn IdGen,
    user_id: &str,
    amount: Points,
    reason: LedgerReason,
) -> ExchangeResult<LedgerEntry> {
    if amount <= 0 {
        return Err(ExchangeError::validation(format!(
            "credit amount must be positive, got {amount}"
        )));
    }
    if !store::user::user_exists(tx, user_id)? {
        return Err(ExchangeError::not_found("user", user_id));
    }
    store::user::apply_balance_delta(tx, user_id, amount)?;
    if reason == LedgerReason::RewardCredit {
        store::user::bump_activity_score(tx, user_id, amount)?;
    }
    ledger_subsystem::append(tx, clock, ids, user_id, amount, reason)
}
