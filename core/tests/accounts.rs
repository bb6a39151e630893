//! Account registration and reporting tests.

use exchange_core::clock::ManualClock;
use exchange_core::config::ExchangeConfig;
use exchange_core::error::ExchangeError;
use exchange_core::exchange::Exchange;
use exchange_core::ident::SequentialIds;
use exchange_core::report_subsystem::ReportTarget;
use exchange_core::store::ExchangeStore;
use exchange_core::survey_subsystem::SurveyDraft;

#[test]
fn registration_seeds_balance_and_credit() {
    let mut exchange = Exchange::build_test().unwrap();
    let user = exchange.register_user("newcomer").unwrap();
    assert_eq!(user.balance, 20);
    assert_eq!(user.seed_balance, 20);
    assert_eq!(user.credit_score, 80);
    assert_eq!(user.activity_score, 0);

    // A fresh account reconciles trivially: empty ledger, balance == seed.
    let r = exchange.reconcile_user(&user.user_id).unwrap();
    assert!(r.consistent());
    assert_eq!(r.ledger_sum, 0);
}

#[test]
fn registration_rejects_blank_nickname() {
    let mut exchange = Exchange::build_test().unwrap();
    let err = exchange.register_user("  ").unwrap_err();
    assert!(matches!(err, ExchangeError::Validation { .. }));
}

#[test]
fn honor_flag_follows_configured_threshold() {
    let config = ExchangeConfig {
        seed_credit_score: 90,
        ..Default::default()
    };
    let mut exchange = Exchange::new(
        ExchangeStore::in_memory().unwrap(),
        Box::new(ManualClock::default_epoch()),
        Box::new(SequentialIds::new("id")),
        config,
    )
    .unwrap();
    let user = exchange.register_user("honored").unwrap();
    assert!(exchange.user_summary(&user.user_id).unwrap().has_honor);
}

#[test]
fn unknown_user_lookup_is_not_found() {
    let exchange = Exchange::build_test().unwrap();
    let err = exchange.user_summary("ghost").unwrap_err();
    assert!(matches!(err, ExchangeError::NotFound { entity: "user", .. }));
}

#[test]
fn reports_require_existing_targets() {
    let mut exchange = Exchange::build_test().unwrap();
    let reporter = exchange.register_user("reporter").unwrap();
    let owner = exchange.register_user("owner").unwrap();
    let survey = exchange
        .create_and_publish_survey(
            &owner.user_id,
            SurveyDraft {
                title: "Suspicious".to_string(),
                reward_points: 1,
                ..Default::default()
            },
        )
        .unwrap();

    let report = exchange
        .file_report(
            &reporter.user_id,
            ReportTarget::Survey(survey.survey_id.clone()),
            "spam link",
        )
        .unwrap();
    assert_eq!(report.status, "open");

    let err = exchange
        .file_report(
            &reporter.user_id,
            ReportTarget::Survey("no-such-survey".to_string()),
            "spam",
        )
        .unwrap_err();
    assert!(matches!(err, ExchangeError::NotFound { entity: "survey", .. }));

    let err = exchange
        .file_report(
            &reporter.user_id,
            ReportTarget::User(owner.user_id.clone()),
            "   ",
        )
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Validation { .. }));
}
