use crate::error::ExchangeResult;
use crate::report_subsystem::ReportRecord;
use rusqlite::{params, Connection};

pub(crate) fn insert_report(conn: &Connection, report: &ReportRecord) -> ExchangeResult<()> {
    conn.execute(
        "INSERT INTO reports (report_id, reporter_id, target_type, target_id, reason, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            report.report_id,
            report.reporter_id,
            report.target.type_str(),
            report.target.id(),
            report.reason,
            report.status,
            report.created_at,
        ],
    )?;
    Ok(())
}

pub(crate) fn survey_exists(conn: &Connection, survey_id: &str) -> ExchangeResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM surveys WHERE survey_id = ?1",
        params![survey_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
