use crate::balance_subsystem::UserRecord;
use crate::error::ExchangeResult;
use crate::types::Points;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        user_id: row.get(0)?,
        nickname: row.get(1)?,
        balance: row.get(2)?,
        seed_balance: row.get(3)?,
        activity_score: row.get(4)?,
        credit_score: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const USER_COLUMNS: &str =
    "user_id, nickname, balance, seed_balance, activity_score, credit_score, created_at";

pub(crate) fn insert_user(conn: &Connection, user: &UserRecord) -> ExchangeResult<()> {
    conn.execute(
        "INSERT INTO users (user_id, nickname, balance, seed_balance, activity_score, credit_score, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.user_id,
            user.nickname,
            user.balance,
            user.seed_balance,
            user.activity_score,
            user.credit_score,
            user.created_at,
        ],
    )?;
    Ok(())
}

pub(crate) fn get_user(conn: &Connection, user_id: &str) -> ExchangeResult<Option<UserRecord>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            params![user_id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub(crate) fn balance_of(conn: &Connection, user_id: &str) -> ExchangeResult<Option<Points>> {
    let balance = conn
        .query_row(
            "SELECT balance FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(balance)
}

pub(crate) fn user_exists(conn: &Connection, user_id: &str) -> ExchangeResult<bool> {
    Ok(balance_of(conn, user_id)?.is_some())
}

/// Apply a signed delta to a user's balance. The CHECK constraint on the
/// column rejects any write that would take the balance negative.
pub(crate) fn apply_balance_delta(
    conn: &Connection,
    user_id: &str,
    delta: Points,
) -> ExchangeResult<usize> {
    let changed = conn.execute(
        "UPDATE users SET balance = balance + ?1 WHERE user_id = ?2",
        params![delta, user_id],
    )?;
    Ok(changed)
}

pub(crate) fn bump_activity_score(
    conn: &Connection,
    user_id: &str,
    amount: Points,
) -> ExchangeResult<()> {
    conn.execute(
        "UPDATE users SET activity_score = activity_score + ?1 WHERE user_id = ?2",
        params![amount, user_id],
    )?;
    Ok(())
}
