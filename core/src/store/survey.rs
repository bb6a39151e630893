use crate::error::{ExchangeError, ExchangeResult};
use crate::survey_subsystem::{SurveyQuery, SurveyRecord, SurveyStatus};
use crate::types::Points;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};

const SURVEY_COLUMNS: &str = "survey_id, owner_id, title, description, reward_points, \
                              estimated_minutes, deadline, status, created_at";

fn row_to_survey(row: &Row<'_>) -> rusqlite::Result<SurveyRecord> {
    let status: String = row.get(7)?;
    Ok(SurveyRecord {
        survey_id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        reward_points: row.get(4)?,
        estimated_minutes: row.get(5)?,
        deadline: row.get(6)?,
        status: SurveyStatus::parse(&status).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                format!("unknown survey status '{status}'").into(),
            )
        })?,
        created_at: row.get(8)?,
    })
}

pub(crate) fn insert_survey(conn: &Connection, survey: &SurveyRecord) -> ExchangeResult<()> {
    conn.execute(
        "INSERT INTO surveys (survey_id, owner_id, title, description, reward_points,
                              estimated_minutes, deadline, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            survey.survey_id,
            survey.owner_id,
            survey.title,
            survey.description,
            survey.reward_points,
            survey.estimated_minutes,
            survey.deadline,
            survey.status.as_str(),
            survey.created_at,
        ],
    )?;
    Ok(())
}

pub(crate) fn get_survey(
    conn: &Connection,
    survey_id: &str,
) -> ExchangeResult<Option<SurveyRecord>> {
    let survey = conn
        .query_row(
            &format!("SELECT {SURVEY_COLUMNS} FROM surveys WHERE survey_id = ?1"),
            params![survey_id],
            row_to_survey,
        )
        .optional()?;
    Ok(survey)
}

/// Flip a draft to published and fix its reward in the same statement.
/// The status predicate makes the transition single-shot at the store
/// level: a second publish matches zero rows.
pub(crate) fn mark_published(
    conn: &Connection,
    survey_id: &str,
    reward_points: Points,
) -> ExchangeResult<()> {
    let changed = conn.execute(
        "UPDATE surveys SET status = 'published', reward_points = ?1
         WHERE survey_id = ?2 AND status = 'draft'",
        params![reward_points, survey_id],
    )?;
    if changed == 0 {
        return Err(ExchangeError::invalid_state(format!(
            "survey '{survey_id}' is not a draft"
        )));
    }
    Ok(())
}

pub(crate) fn mark_closed(conn: &Connection, survey_id: &str) -> ExchangeResult<()> {
    let changed = conn.execute(
        "UPDATE surveys SET status = 'closed'
         WHERE survey_id = ?1 AND status IN ('draft', 'published')",
        params![survey_id],
    )?;
    if changed == 0 {
        return Err(ExchangeError::invalid_state(format!(
            "survey '{survey_id}' is already closed"
        )));
    }
    Ok(())
}

fn query_clauses(query: &SurveyQuery) -> (String, Vec<Box<dyn ToSql>>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(status) = query.status {
        sql.push_str(" AND status = ?");
        args.push(Box::new(status.as_str().to_string()));
    }
    if let Some(owner_id) = &query.owner_id {
        sql.push_str(" AND owner_id = ?");
        args.push(Box::new(owner_id.clone()));
    }
    if let Some(min_points) = query.min_reward_points {
        sql.push_str(" AND reward_points >= ?");
        args.push(Box::new(min_points));
    }
    if let Some(max_minutes) = query.max_estimated_minutes {
        sql.push_str(" AND estimated_minutes IS NOT NULL AND estimated_minutes <= ?");
        args.push(Box::new(max_minutes));
    }
    (sql, args)
}

pub(crate) fn list_surveys(
    conn: &Connection,
    query: &SurveyQuery,
    offset: i64,
    limit: i64,
) -> ExchangeResult<Vec<SurveyRecord>> {
    let (clauses, mut args) = query_clauses(query);
    // Newest first: rowid reflects insertion order.
    let sql =
        format!("SELECT {SURVEY_COLUMNS} FROM surveys{clauses} ORDER BY rowid DESC LIMIT ? OFFSET ?");
    args.push(Box::new(limit));
    args.push(Box::new(offset));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params_from_iter(args.iter().map(|a| a.as_ref())),
        row_to_survey,
    )?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub(crate) fn count_surveys(conn: &Connection, query: &SurveyQuery) -> ExchangeResult<i64> {
    let (clauses, args) = query_clauses(query);
    let sql = format!("SELECT COUNT(*) FROM surveys{clauses}");
    let total = conn.query_row(
        &sql,
        params_from_iter(args.iter().map(|a| a.as_ref())),
        |row| row.get(0),
    )?;
    Ok(total)
}
