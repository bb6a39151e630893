//! Review coordinator — ties a response's outcome to the ledger.
//!
//! A response is reviewed exactly once. On approval the respondent's
//! credit and the terminal status land in the same transaction, so a
//! crash can never leave a credited-but-unmarked (or the reverse) state.

use crate::balance_subsystem;
use crate::clock::Clock;
use crate::error::{ExchangeError, ExchangeResult};
use crate::ident::IdGen;
use crate::ledger_subsystem::LedgerReason;
use crate::response_subsystem::ResponseStatus;
use crate::store;
use crate::types::{Points, ResponseId};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn terminal_status(self) -> ResponseStatus {
        match self {
            Self::Approved => ResponseStatus::Approved,
            Self::Rejected => ResponseStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub response_id: ResponseId,
    pub status: ResponseStatus,
    pub points_awarded: Points,
}

pub fn review(
    tx: &Connection,
    clock: &dyn Clock,
    ids: &dyn IdGen,
    response_id: &str,
    reviewer_id: &str,
    decision: ReviewDecision,
) -> ExchangeResult<ReviewOutcome> {
    let response = store::response::get_response(tx, response_id)?
        .ok_or_else(|| ExchangeError::not_found("response", response_id))?;
    let survey = store::survey::get_survey(tx, &response.survey_id)?
        .ok_or_else(|| ExchangeError::not_found("survey", response.survey_id.clone()))?;
    if survey.owner_id != reviewer_id {
        return Err(ExchangeError::forbidden("not survey owner"));
    }
    if response.status != ResponseStatus::Submitted {
        return Err(ExchangeError::invalid_state(format!(
            "response '{response_id}' already reviewed"
        )));
    }

    let points_awarded = match decision {
        ReviewDecision::Approved => {
            if survey.reward_points > 0 {
                balance_subsystem::credit(
                    tx,
                    clock,
                    ids,
                    &response.user_id,
                    survey.reward_points,
                    LedgerReason::RewardCredit,
                )?;
            }
            survey.reward_points
        }
        ReviewDecision::Rejected => 0,
    };

    let terminal = decision.terminal_status();
    store::response::finalize_response(tx, response_id, terminal, points_awarded)?;
    log::info!(
        "response reviewed: id={response_id} decision={} points={points_awarded}",
        terminal.as_str()
    );
    Ok(ReviewOutcome {
        response_id: response_id.to_string(),
        status: terminal,
        points_awarded,
    })
}
