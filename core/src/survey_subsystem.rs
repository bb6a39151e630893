//! Survey lifecycle — draft -> published -> closed, forward only.
//!
//! Publishing escrows the survey's entire reward budget from the owner's
//! balance in one debit. Closing is terminal and touches no balances:
//! unused escrow is not refunded (known gap, kept as current behavior).

use crate::balance_subsystem;
use crate::clock::Clock;
use crate::error::{ExchangeError, ExchangeResult};
use crate::ident::IdGen;
use crate::ledger_subsystem::LedgerReason;
use crate::store;
use crate::types::{Points, SurveyId, UserId};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    Draft,
    Published,
    Closed,
}

impl SurveyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ()> {
        match value {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "closed" => Ok(Self::Closed),
            _ => Err(()),
        }
    }

    /// The full transition table. Anything not listed here is rejected.
    pub fn can_become(self, next: SurveyStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Published) | (Self::Draft, Self::Closed) | (Self::Published, Self::Closed)
        )
    }
}

/// Caller-supplied fields for a new survey.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyDraft {
    pub title: String,
    pub description: Option<String>,
    pub reward_points: Points,
    pub estimated_minutes: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyRecord {
    pub survey_id: SurveyId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    /// Escrowed budget. Immutable once status reaches `Published`.
    pub reward_points: Points,
    pub estimated_minutes: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: SurveyStatus,
    pub created_at: DateTime<Utc>,
}

/// Listing filters for the survey hall.
#[derive(Debug, Clone, Default)]
pub struct SurveyQuery {
    pub status: Option<SurveyStatus>,
    pub owner_id: Option<UserId>,
    pub min_reward_points: Option<Points>,
    pub max_estimated_minutes: Option<i64>,
}

/// Create a survey in `draft` state. No balance effect.
pub fn create(
    tx: &Connection,
    clock: &dyn Clock,
    ids: &dyn IdGen,
    owner_id: &str,
    draft: SurveyDraft,
) -> ExchangeResult<SurveyRecord> {
    if draft.title.trim().is_empty() {
        return Err(ExchangeError::validation("title required"));
    }
    if draft.reward_points < 0 {
        return Err(ExchangeError::validation("reward_points must be >= 0"));
    }
    if !store::user::user_exists(tx, owner_id)? {
        return Err(ExchangeError::not_found("user", owner_id));
    }
    let survey = SurveyRecord {
        survey_id: ids.next_id(),
        owner_id: owner_id.to_string(),
        title: draft.title,
        description: draft.description,
        reward_points: draft.reward_points,
        estimated_minutes: draft.estimated_minutes,
        deadline: draft.deadline,
        status: SurveyStatus::Draft,
        created_at: clock.now(),
    };
    store::survey::insert_survey(tx, &survey)?;
    Ok(survey)
}

/// Publish a draft: fix `reward_points` and escrow it from the owner in
/// the same transaction. On `InsufficientBalance` the survey stays a
/// draft and nothing is debited or logged.
pub fn publish(
    tx: &Connection,
    clock: &dyn Clock,
    ids: &dyn IdGen,
    survey_id: &str,
    caller_id: &str,
    reward_points: Points,
) -> ExchangeResult<SurveyRecord> {
    if reward_points < 0 {
        return Err(ExchangeError::validation("reward_points must be >= 0"));
    }
    let survey = store::survey::get_survey(tx, survey_id)?
        .ok_or_else(|| ExchangeError::not_found("survey", survey_id))?;
    if survey.owner_id != caller_id {
        return Err(ExchangeError::forbidden("not survey owner"));
    }
    if !survey.status.can_become(SurveyStatus::Published) {
        return Err(ExchangeError::invalid_state(format!(
            "cannot publish survey in state '{}'",
            survey.status.as_str()
        )));
    }
    // Escrow the whole budget up front. No per-response debit later.
    // Zero-reward surveys publish without a ledger entry.
    if reward_points > 0 {
        balance_subsystem::debit(
            tx,
            clock,
            ids,
            &survey.owner_id,
            reward_points,
            LedgerReason::EscrowDebit,
        )?;
    }
    store::survey::mark_published(tx, survey_id, reward_points)?;
    log::info!("survey published: id={survey_id} owner={caller_id} reward={reward_points}");
    Ok(SurveyRecord {
        reward_points,
        status: SurveyStatus::Published,
        ..survey
    })
}

/// Close a survey. Terminal; no refund of unused escrow.
pub fn close(tx: &Connection, survey_id: &str, caller_id: &str) -> ExchangeResult<SurveyRecord> {
    let survey = store::survey::get_survey(tx, survey_id)?
        .ok_or_else(|| ExchangeError::not_found("survey", survey_id))?;
    if survey.owner_id != caller_id {
        return Err(ExchangeError::forbidden("not survey owner"));
    }
    if !survey.status.can_become(SurveyStatus::Closed) {
        return Err(ExchangeError::invalid_state(format!(
            "survey '{survey_id}' is already closed"
        )));
    }
    store::survey::mark_closed(tx, survey_id)?;
    log::info!("survey closed: id={survey_id}");
    Ok(SurveyRecord {
        status: SurveyStatus::Closed,
        ..survey
    })
}
