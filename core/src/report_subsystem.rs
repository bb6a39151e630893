//! Abuse reports against surveys or users. Insert-only; triage is
//! someone else's problem.

use crate::clock::Clock;
use crate::error::{ExchangeError, ExchangeResult};
use crate::ident::IdGen;
use crate::store;
use crate::types::{ReportId, SurveyId, UserId};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "target_type", content = "target_id", rename_all = "snake_case")]
pub enum ReportTarget {
    Survey(SurveyId),
    User(UserId),
}

impl ReportTarget {
    pub fn type_str(&self) -> &'static str {
        match self {
            Self::Survey(_) => "survey",
            Self::User(_) => "user",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Survey(id) | Self::User(id) => id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRecord {
    pub report_id: ReportId,
    pub reporter_id: UserId,
    pub target: ReportTarget,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub fn file(
    tx: &Connection,
    clock: &dyn Clock,
    ids: &dyn IdGen,
    reporter_id: &str,
    target: ReportTarget,
    reason: &str,
) -> ExchangeResult<ReportRecord> {
    if reason.trim().is_empty() {
        return Err(ExchangeError::validation("reason required"));
    }
    if !store::user::user_exists(tx, reporter_id)? {
        return Err(ExchangeError::not_found("user", reporter_id));
    }
    let target_exists = match &target {
        ReportTarget::Survey(id) => store::report::survey_exists(tx, id)?,
        ReportTarget::User(id) => store::user::user_exists(tx, id)?,
    };
    if !target_exists {
        return Err(ExchangeError::not_found(
            target.type_str(),
            target.id().to_string(),
        ));
    }
    let report = ReportRecord {
        report_id: ids.next_id(),
        reporter_id: reporter_id.to_string(),
        target,
        reason: reason.trim().to_string(),
        status: "open".to_string(),
        created_at: clock.now(),
    };
    store::report::insert_report(tx, &report)?;
    Ok(report)
}
