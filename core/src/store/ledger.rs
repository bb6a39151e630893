use crate::error::ExchangeResult;
use crate::ledger_subsystem::{LedgerEntry, LedgerFilter, LedgerReason};
use crate::types::Points;
use rusqlite::{params, Connection, Row};

const LEDGER_COLUMNS: &str = "seq, entry_id, user_id, delta, reason, created_at";

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    let reason: String = row.get(4)?;
    Ok(LedgerEntry {
        seq: Some(row.get(0)?),
        entry_id: row.get(1)?,
        user_id: row.get(2)?,
        delta: row.get(3)?,
        reason: LedgerReason::parse(&reason).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown ledger reason '{reason}'").into(),
            )
        })?,
        created_at: row.get(5)?,
    })
}

/// Append one entry and return its log position. Insert-only: nothing in
/// the schema or this module updates or deletes ledger rows.
pub(crate) fn insert_entry(conn: &Connection, entry: &LedgerEntry) -> ExchangeResult<i64> {
    conn.execute(
        "INSERT INTO points_ledger (entry_id, user_id, delta, reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.entry_id,
            entry.user_id,
            entry.delta,
            entry.reason.as_str(),
            entry.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn filter_clause(filter: LedgerFilter) -> &'static str {
    match filter {
        LedgerFilter::All => "",
        LedgerFilter::Earn => " AND delta > 0",
        LedgerFilter::Spend => " AND delta < 0",
    }
}

pub(crate) fn entries_for_user(
    conn: &Connection,
    user_id: &str,
    filter: LedgerFilter,
    offset: i64,
    limit: i64,
) -> ExchangeResult<Vec<LedgerEntry>> {
    let sql = format!(
        "SELECT {LEDGER_COLUMNS} FROM points_ledger WHERE user_id = ?1{}
         ORDER BY seq DESC LIMIT ?2 OFFSET ?3",
        filter_clause(filter)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, limit, offset], row_to_entry)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub(crate) fn count_for_user(
    conn: &Connection,
    user_id: &str,
    filter: LedgerFilter,
) -> ExchangeResult<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM points_ledger WHERE user_id = ?1{}",
        filter_clause(filter)
    );
    let total = conn.query_row(&sql, params![user_id], |row| row.get(0))?;
    Ok(total)
}

pub(crate) fn sum_for_user(conn: &Connection, user_id: &str) -> ExchangeResult<Points> {
    let sum = conn.query_row(
        "SELECT COALESCE(SUM(delta), 0) FROM points_ledger WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(sum)
}
