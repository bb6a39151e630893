use crate::error::{ExchangeError, ExchangeResult};
use crate::response_subsystem::{ResponseRecord, ResponseStatus};
use crate::types::Points;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};

const RESPONSE_COLUMNS: &str = "response_id, survey_id, user_id, duration_seconds, status, \
                                points_awarded, created_at";

fn row_to_response(row: &Row<'_>) -> rusqlite::Result<ResponseRecord> {
    let status: String = row.get(4)?;
    Ok(ResponseRecord {
        response_id: row.get(0)?,
        survey_id: row.get(1)?,
        user_id: row.get(2)?,
        duration_seconds: row.get(3)?,
        status: ResponseStatus::parse(&status).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown response status '{status}'").into(),
            )
        })?,
        points_awarded: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a new response row. The UNIQUE (survey_id, user_id) constraint
/// rejects duplicate fills at this point; the violation surfaces as
/// `Conflict` through the error mapping.
pub(crate) fn insert_response(conn: &Connection, response: &ResponseRecord) -> ExchangeResult<()> {
    conn.execute(
        "INSERT INTO responses (response_id, survey_id, user_id, duration_seconds,
                                status, points_awarded, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            response.response_id,
            response.survey_id,
            response.user_id,
            response.duration_seconds,
            response.status.as_str(),
            response.points_awarded,
            response.created_at,
        ],
    )?;
    Ok(())
}

pub(crate) fn get_response(
    conn: &Connection,
    response_id: &str,
) -> ExchangeResult<Option<ResponseRecord>> {
    let response = conn
        .query_row(
            &format!("SELECT {RESPONSE_COLUMNS} FROM responses WHERE response_id = ?1"),
            params![response_id],
            row_to_response,
        )
        .optional()?;
    Ok(response)
}

/// Move a submitted response to its terminal state. The status predicate
/// keeps the transition single-shot even if two reviewers race: the loser
/// matches zero rows.
pub(crate) fn finalize_response(
    conn: &Connection,
    response_id: &str,
    terminal: ResponseStatus,
    points_awarded: Points,
) -> ExchangeResult<()> {
    let changed = conn.execute(
        "UPDATE responses SET status = ?1, points_awarded = ?2
         WHERE response_id = ?3 AND status = 'submitted'",
        params![terminal.as_str(), points_awarded, response_id],
    )?;
    if changed == 0 {
        return Err(ExchangeError::invalid_state(format!(
            "response '{response_id}' already reviewed"
        )));
    }
    Ok(())
}

fn user_clauses(user_id: &str, status: Option<ResponseStatus>) -> (String, Vec<Box<dyn ToSql>>) {
    let mut sql = String::from(" WHERE user_id = ?");
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];
    if let Some(status) = status {
        sql.push_str(" AND status = ?");
        args.push(Box::new(status.as_str().to_string()));
    }
    (sql, args)
}

pub(crate) fn list_responses_for_user(
    conn: &Connection,
    user_id: &str,
    status: Option<ResponseStatus>,
    offset: i64,
    limit: i64,
) -> ExchangeResult<Vec<ResponseRecord>> {
    let (clauses, mut args) = user_clauses(user_id, status);
    let sql = format!(
        "SELECT {RESPONSE_COLUMNS} FROM responses{clauses} ORDER BY rowid DESC LIMIT ? OFFSET ?"
    );
    args.push(Box::new(limit));
    args.push(Box::new(offset));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params_from_iter(args.iter().map(|a| a.as_ref())),
        row_to_response,
    )?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub(crate) fn count_responses_for_user(
    conn: &Connection,
    user_id: &str,
    status: Option<ResponseStatus>,
) -> ExchangeResult<i64> {
    let (clauses, args) = user_clauses(user_id, status);
    let sql = format!("SELECT COUNT(*) FROM responses{clauses}");
    let total = conn.query_row(
        &sql,
        params_from_iter(args.iter().map(|a| a.as_ref())),
        |row| row.get(0),
    )?;
    Ok(total)
}
