//! Response lifecycle — submitted -> approved | rejected, both terminal.
//!
//! This module only creates responses. The terminal transition belongs to
//! the review coordinator, so nothing can approve a fill while skipping
//! the owner check.

use crate::clock::Clock;
use crate::error::{ExchangeError, ExchangeResult};
use crate::ident::IdGen;
use crate::store;
use crate::survey_subsystem::SurveyStatus;
use crate::types::{Points, ResponseId, SurveyId, UserId};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Submitted,
    Approved,
    Rejected,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ()> {
        match value {
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(()),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseRecord {
    pub response_id: ResponseId,
    pub survey_id: SurveyId,
    pub user_id: UserId,
    pub duration_seconds: Option<i64>,
    pub status: ResponseStatus,
    /// 0 until (and unless) the response is approved.
    pub points_awarded: Points,
    pub created_at: DateTime<Utc>,
}

/// Record one user's fill of one survey.
///
/// The duplicate guard is the UNIQUE (survey_id, user_id) constraint: the
/// insert itself decides the race, and the violation comes back as
/// `Conflict`. There is deliberately no existence pre-check.
pub fn submit(
    tx: &Connection,
    clock: &dyn Clock,
    ids: &dyn IdGen,
    survey_id: &str,
    respondent_id: &str,
    duration_seconds: Option<i64>,
) -> ExchangeResult<ResponseRecord> {
    let survey = store::survey::get_survey(tx, survey_id)?
        .ok_or_else(|| ExchangeError::not_found("survey", survey_id))?;
    if survey.status != SurveyStatus::Published {
        return Err(ExchangeError::invalid_state(format!(
            "survey '{survey_id}' is not published"
        )));
    }
    if survey.owner_id == respondent_id {
        return Err(ExchangeError::forbidden("cannot fill your own survey"));
    }
    if !store::user::user_exists(tx, respondent_id)? {
        return Err(ExchangeError::not_found("user", respondent_id));
    }
    let response = ResponseRecord {
        response_id: ids.next_id(),
        survey_id: survey_id.to_string(),
        user_id: respondent_id.to_string(),
        duration_seconds,
        status: ResponseStatus::Submitted,
        points_awarded: 0,
        created_at: clock.now(),
    };
    match store::response::insert_response(tx, &response) {
        Err(ExchangeError::Conflict { .. }) => Err(ExchangeError::conflict(format!(
            "user '{respondent_id}' already filled survey '{survey_id}'"
        ))),
        Err(other) => Err(other),
        Ok(()) => {
            log::debug!("response submitted: survey={survey_id} user={respondent_id}");
            Ok(response)
        }
    }
}
