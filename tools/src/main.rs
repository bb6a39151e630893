//! exchange-cli: headless driver for the survey-exchange core.
//!
//! Usage:
//!   exchange-cli --db exchange.db register <nickname>
//!   exchange-cli --db exchange.db publish <owner_id> <title> <reward_points>
//!   exchange-cli --db exchange.db close <survey_id> <caller_id>
//!   exchange-cli --db exchange.db submit <survey_id> <user_id> [duration_seconds]
//!   exchange-cli --db exchange.db review <response_id> <reviewer_id> <approved|rejected>
//!   exchange-cli --db exchange.db ledger <user_id> [all|earn|spend]
//!   exchange-cli --db exchange.db surveys [draft|published|closed]
//!   exchange-cli --db exchange.db demo

use anyhow::{bail, Context, Result};
use exchange_core::config::ExchangeConfig;
use exchange_core::exchange::Exchange;
use exchange_core::ledger_subsystem::LedgerFilter;
use exchange_core::review_subsystem::ReviewDecision;
use exchange_core::survey_subsystem::{SurveyDraft, SurveyQuery, SurveyStatus};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let config = match flag_value(&args, "--config") {
        Some(path) => ExchangeConfig::load(path)?,
        None => ExchangeConfig::default(),
    };

    let mut positional = args
        .iter()
        .skip(1)
        .filter(|a| !a.starts_with("--"))
        .cloned()
        .collect::<Vec<_>>();
    // Drop flag values that slipped into the positional list.
    for flag in ["--db", "--config"] {
        if let Some(value) = flag_value(&args, flag) {
            if let Some(pos) = positional.iter().position(|p| p == value) {
                positional.remove(pos);
            }
        }
    }
    if positional.is_empty() {
        bail!("no command given; see the header of this binary for usage");
    }

    log::debug!("opening exchange database at {db}");
    let store = exchange_core::store::ExchangeStore::open(db)?;
    let mut exchange = Exchange::new(
        store,
        Box::new(exchange_core::clock::SystemClock),
        Box::new(exchange_core::ident::UuidIds),
        config,
    )?;

    let command = positional[0].as_str();
    let rest = &positional[1..];
    match command {
        "register" => {
            let nickname = arg(rest, 0, "nickname")?;
            let user = exchange.register_user(nickname)?;
            print_json(&user)?;
        }
        "publish" => {
            let owner_id = arg(rest, 0, "owner_id")?;
            let title = arg(rest, 1, "title")?;
            let reward_points = arg(rest, 2, "reward_points")?.parse()?;
            let survey = exchange.create_and_publish_survey(
                owner_id,
                SurveyDraft {
                    title: title.to_string(),
                    reward_points,
                    ..Default::default()
                },
            )?;
            print_json(&survey)?;
        }
        "close" => {
            let survey_id = arg(rest, 0, "survey_id")?;
            let caller_id = arg(rest, 1, "caller_id")?;
            let survey = exchange.close_survey(survey_id, caller_id)?;
            print_json(&survey)?;
        }
        "submit" => {
            let survey_id = arg(rest, 0, "survey_id")?;
            let user_id = arg(rest, 1, "user_id")?;
            let duration = rest.get(2).map(|d| d.parse::<i64>()).transpose()?;
            let response = exchange.submit_response(survey_id, user_id, duration)?;
            print_json(&response)?;
        }
        "review" => {
            let response_id = arg(rest, 0, "response_id")?;
            let reviewer_id = arg(rest, 1, "reviewer_id")?;
            let decision = match arg(rest, 2, "decision")? {
                "approved" => ReviewDecision::Approved,
                "rejected" => ReviewDecision::Rejected,
                other => bail!("decision must be approved or rejected, got '{other}'"),
            };
            let outcome = exchange.review_response(response_id, reviewer_id, decision)?;
            print_json(&outcome)?;
        }
        "ledger" => {
            let user_id = arg(rest, 0, "user_id")?;
            let filter = match rest.get(1).map(String::as_str) {
                None | Some("all") => LedgerFilter::All,
                Some("earn") => LedgerFilter::Earn,
                Some("spend") => LedgerFilter::Spend,
                Some(other) => bail!("filter must be all, earn or spend, got '{other}'"),
            };
            let page = exchange.ledger(user_id, filter, exchange.config().default_page())?;
            print_json(&page)?;
        }
        "surveys" => {
            let status = rest
                .first()
                .map(|s| {
                    SurveyStatus::parse(s)
                        .map_err(|_| anyhow::anyhow!("unknown survey status '{s}'"))
                })
                .transpose()?;
            let query = SurveyQuery {
                status,
                ..Default::default()
            };
            let page = exchange.list_surveys(&query, exchange.config().default_page())?;
            print_json(&page)?;
        }
        "demo" => run_demo(&mut exchange)?,
        other => bail!("unknown command '{other}'"),
    }

    Ok(())
}

/// Scripted end-to-end pass: publish, fill, approve, reconcile.
fn run_demo(exchange: &mut Exchange) -> Result<()> {
    let owner = exchange.register_user("owner")?;
    let filler = exchange.register_user("filler")?;
    println!(
        "registered owner={} (balance {}) filler={} (balance {})",
        owner.user_id, owner.balance, filler.user_id, filler.balance
    );

    let survey = exchange.create_and_publish_survey(
        &owner.user_id,
        SurveyDraft {
            title: "Campus commute habits".to_string(),
            reward_points: 15,
            estimated_minutes: Some(5),
            ..Default::default()
        },
    )?;
    println!(
        "published survey={} reward={} owner balance now {}",
        survey.survey_id,
        survey.reward_points,
        exchange.user_summary(&owner.user_id)?.balance
    );

    let response = exchange.submit_response(&survey.survey_id, &filler.user_id, Some(240))?;
    let outcome =
        exchange.review_response(&response.response_id, &owner.user_id, ReviewDecision::Approved)?;
    println!(
        "approved response={} points_awarded={}",
        outcome.response_id, outcome.points_awarded
    );

    for user in [&owner.user_id, &filler.user_id] {
        let r = exchange.reconcile_user(user)?;
        println!(
            "reconcile {}: balance={} seed={} ledger_sum={} consistent={}",
            user,
            r.balance,
            r.seed_balance,
            r.ledger_sum,
            r.consistent()
        );
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn arg<'a>(rest: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    rest.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{name}>"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
