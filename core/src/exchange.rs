//! The exchange facade — the core's public surface.
//!
//! Owns the store, the injected clock and id generator, and the config.
//! Every mutating operation here runs inside one immediate transaction:
//! a typed error means zero side effects reached the database.
//!
//! Concurrent callers each hold their own `Exchange` (own connection via
//! `reopen`); correctness comes from the store's transactional
//! guarantees, not from in-process locks.

use crate::balance_subsystem::{UserRecord, UserSummary};
use crate::clock::{Clock, ManualClock, SystemClock};
use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, ExchangeResult};
use crate::ident::{IdGen, SequentialIds, UuidIds};
use crate::ledger_subsystem::{self, LedgerEntry, LedgerFilter, Reconciliation};
use crate::report_subsystem::{self, ReportRecord, ReportTarget};
use crate::response_subsystem::{self, ResponseRecord, ResponseStatus};
use crate::review_subsystem::{self, ReviewDecision, ReviewOutcome};
use crate::store::{self, ExchangeStore};
use crate::survey_subsystem::{self, SurveyDraft, SurveyQuery, SurveyRecord};
use crate::types::{Page, PageRequest, Points};
use serde::Serialize;

pub struct Exchange {
    store: ExchangeStore,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGen>,
    config: ExchangeConfig,
}

/// A ledger page together with the account summary the caller renders
/// next to it.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerPage {
    pub entries: Page<LedgerEntry>,
    pub user: UserSummary,
}

impl Exchange {
    /// Open (or create) the exchange database at `path` with production
    /// collaborators.
    pub fn open(path: &str) -> ExchangeResult<Self> {
        let store = ExchangeStore::open(path)?;
        Self::new(store, Box::new(SystemClock), Box::new(UuidIds), ExchangeConfig::default())
    }

    /// In-memory exchange (used in tests).
    pub fn in_memory() -> ExchangeResult<Self> {
        let store = ExchangeStore::in_memory()?;
        Self::new(store, Box::new(SystemClock), Box::new(UuidIds), ExchangeConfig::default())
    }

    /// Wire a facade from explicit parts. Runs migrations (idempotent).
    pub fn new(
        store: ExchangeStore,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGen>,
        config: ExchangeConfig,
    ) -> ExchangeResult<Self> {
        store.migrate()?;
        Ok(Self {
            store,
            clock,
            ids,
            config,
        })
    }

    /// Fully deterministic wiring for tests: in-memory store, manual
    /// clock, sequential ids.
    pub fn build_test() -> ExchangeResult<Self> {
        Self::new(
            ExchangeStore::in_memory()?,
            Box::new(ManualClock::default_epoch()),
            Box::new(SequentialIds::new("id")),
            ExchangeConfig::default(),
        )
    }

    /// A second handle onto the same database (file-backed stores only;
    /// in-memory stores get a fresh database). Production collaborators.
    pub fn reopen(&self) -> ExchangeResult<Self> {
        Self::new(
            self.store.reopen()?,
            Box::new(SystemClock),
            Box::new(UuidIds),
            self.config.clone(),
        )
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    fn page(&self, request: PageRequest) -> PageRequest {
        request.clamped(self.config.max_page_size)
    }

    // ── Users ──────────────────────────────────────────────────

    /// Create an account seeded from config (balance, credit score).
    /// The seed is recorded so the ledger reconciles from day one.
    pub fn register_user(&mut self, nickname: &str) -> ExchangeResult<UserRecord> {
        if nickname.trim().is_empty() {
            return Err(ExchangeError::validation("nickname required"));
        }
        let config = self.config.clone();
        let clock = self.clock.as_ref();
        let ids = self.ids.as_ref();
        self.store.immediate_tx(|tx| {
            let user = UserRecord {
                user_id: ids.next_id(),
                nickname: nickname.trim().to_string(),
                balance: config.seed_balance,
                seed_balance: config.seed_balance,
                activity_score: 0,
                credit_score: config.seed_credit_score,
                created_at: clock.now(),
            };
            store::user::insert_user(tx, &user)?;
            Ok(user)
        })
    }

    pub fn user_summary(&self, user_id: &str) -> ExchangeResult<UserSummary> {
        let user = store::user::get_user(self.store.conn(), user_id)?
            .ok_or_else(|| ExchangeError::not_found("user", user_id))?;
        Ok(user.summary(self.config.honor_threshold))
    }

    // ── Surveys ────────────────────────────────────────────────

    /// Stage a draft. No balance effect until publish.
    pub fn create_survey(
        &mut self,
        owner_id: &str,
        draft: SurveyDraft,
    ) -> ExchangeResult<SurveyRecord> {
        let clock = self.clock.as_ref();
        let ids = self.ids.as_ref();
        self.store
            .immediate_tx(|tx| survey_subsystem::create(tx, clock, ids, owner_id, draft))
    }

    /// Publish a staged draft, escrowing `reward_points` from the owner.
    pub fn publish_survey(
        &mut self,
        survey_id: &str,
        caller_id: &str,
        reward_points: Points,
    ) -> ExchangeResult<SurveyRecord> {
        let clock = self.clock.as_ref();
        let ids = self.ids.as_ref();
        self.store.immediate_tx(|tx| {
            survey_subsystem::publish(tx, clock, ids, survey_id, caller_id, reward_points)
        })
    }

    /// Create and publish in one transaction: either the survey exists
    /// published with its escrow debited, or nothing happened at all.
    pub fn create_and_publish_survey(
        &mut self,
        owner_id: &str,
        draft: SurveyDraft,
    ) -> ExchangeResult<SurveyRecord> {
        let clock = self.clock.as_ref();
        let ids = self.ids.as_ref();
        self.store.immediate_tx(|tx| {
            let reward_points = draft.reward_points;
            let survey = survey_subsystem::create(tx, clock, ids, owner_id, draft)?;
            survey_subsystem::publish(tx, clock, ids, &survey.survey_id, owner_id, reward_points)
        })
    }

    pub fn close_survey(
        &mut self,
        survey_id: &str,
        caller_id: &str,
    ) -> ExchangeResult<SurveyRecord> {
        self.store
            .immediate_tx(|tx| survey_subsystem::close(tx, survey_id, caller_id))
    }

    pub fn survey(&self, survey_id: &str) -> ExchangeResult<SurveyRecord> {
        store::survey::get_survey(self.store.conn(), survey_id)?
            .ok_or_else(|| ExchangeError::not_found("survey", survey_id))
    }

    /// Newest-first survey listing with hall filters.
    pub fn list_surveys(
        &self,
        query: &SurveyQuery,
        page: PageRequest,
    ) -> ExchangeResult<Page<SurveyRecord>> {
        let page = self.page(page);
        let conn = self.store.conn();
        let items = store::survey::list_surveys(conn, query, page.offset(), page.limit())?;
        let total = store::survey::count_surveys(conn, query)?;
        Ok(Page::new(items, page, total))
    }

    // ── Responses ──────────────────────────────────────────────

    pub fn submit_response(
        &mut self,
        survey_id: &str,
        respondent_id: &str,
        duration_seconds: Option<i64>,
    ) -> ExchangeResult<ResponseRecord> {
        let clock = self.clock.as_ref();
        let ids = self.ids.as_ref();
        self.store.immediate_tx(|tx| {
            response_subsystem::submit(tx, clock, ids, survey_id, respondent_id, duration_seconds)
        })
    }

    pub fn review_response(
        &mut self,
        response_id: &str,
        reviewer_id: &str,
        decision: ReviewDecision,
    ) -> ExchangeResult<ReviewOutcome> {
        let clock = self.clock.as_ref();
        let ids = self.ids.as_ref();
        self.store.immediate_tx(|tx| {
            review_subsystem::review(tx, clock, ids, response_id, reviewer_id, decision)
        })
    }

    pub fn response(&self, response_id: &str) -> ExchangeResult<ResponseRecord> {
        store::response::get_response(self.store.conn(), response_id)?
            .ok_or_else(|| ExchangeError::not_found("response", response_id))
    }

    /// A user's own fills, newest first, optionally filtered by status.
    pub fn my_responses(
        &self,
        user_id: &str,
        status: Option<ResponseStatus>,
        page: PageRequest,
    ) -> ExchangeResult<Page<ResponseRecord>> {
        let page = self.page(page);
        let conn = self.store.conn();
        let items =
            store::response::list_responses_for_user(conn, user_id, status, page.offset(), page.limit())?;
        let total = store::response::count_responses_for_user(conn, user_id, status)?;
        Ok(Page::new(items, page, total))
    }

    // ── Ledger ─────────────────────────────────────────────────

    pub fn ledger(
        &self,
        user_id: &str,
        filter: LedgerFilter,
        page: PageRequest,
    ) -> ExchangeResult<LedgerPage> {
        let user = self.user_summary(user_id)?;
        let page = self.page(page);
        let entries = ledger_subsystem::list(self.store.conn(), user_id, filter, page)?;
        Ok(LedgerPage {
            entries,
            user,
        })
    }

    /// Audit helper: compare a user's balance with seed + ledger sum.
    pub fn reconcile_user(&self, user_id: &str) -> ExchangeResult<Reconciliation> {
        ledger_subsystem::reconcile(self.store.conn(), user_id)
    }

    // ── Reports ────────────────────────────────────────────────

    pub fn file_report(
        &mut self,
        reporter_id: &str,
        target: ReportTarget,
        reason: &str,
    ) -> ExchangeResult<ReportRecord> {
        let clock = self.clock.as_ref();
        let ids = self.ids.as_ref();
        self.store
            .immediate_tx(|tx| report_subsystem::file(tx, clock, ids, reporter_id, target, reason))
    }
}
