//! exchange-core — the survey-exchange points and response core.
//!
//! Users publish surveys (escrowing the reward budget up front), others
//! fill them once each, owners review fills, and an append-only points
//! ledger records every balance change. Entry point: [`exchange::Exchange`].

pub mod balance_subsystem;
pub mod clock;
pub mod config;
pub mod error;
pub mod exchange;
pub mod ident;
pub mod ledger_subsystem;
pub mod report_subsystem;
pub mod response_subsystem;
pub mod review_subsystem;
pub mod store;
pub mod survey_subsystem;
pub mod types;
