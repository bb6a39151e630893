//! Response submission tests — the duplicate-fill and self-fill guards.

use exchange_core::error::ExchangeError;
use exchange_core::exchange::Exchange;
use exchange_core::response_subsystem::ResponseStatus;
use exchange_core::survey_subsystem::SurveyDraft;

fn published_survey(exchange: &mut Exchange, owner_id: &str, reward: i64) -> String {
    exchange
        .create_and_publish_survey(
            owner_id,
            SurveyDraft {
                title: "Survey".to_string(),
                reward_points: reward,
                ..Default::default()
            },
        )
        .unwrap()
        .survey_id
}

/// A submit creates a pending response; a second submit by the same
/// user on the same survey returns Conflict.
#[test]
fn one_response_per_user_and_survey() {
    let mut exchange = Exchange::build_test().unwrap();
    let owner = exchange.register_user("owner").unwrap();
    let filler = exchange.register_user("filler").unwrap();
    let survey_id = published_survey(&mut exchange, &owner.user_id, 15);

    let response = exchange
        .submit_response(&survey_id, &filler.user_id, Some(240))
        .unwrap();
    assert_eq!(response.status, ResponseStatus::Submitted);
    assert_eq!(response.points_awarded, 0);
    assert_eq!(response.duration_seconds, Some(240));

    let err = exchange
        .submit_response(&survey_id, &filler.user_id, None)
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Conflict { .. }));

    let mine = exchange
        .my_responses(&filler.user_id, None, exchange.config().default_page())
        .unwrap();
    assert_eq!(mine.total, 1);
}

/// Filling your own survey is Forbidden and creates nothing.
#[test]
fn owner_cannot_fill_own_survey() {
    let mut exchange = Exchange::build_test().unwrap();
    let owner = exchange.register_user("owner").unwrap();
    let survey_id = published_survey(&mut exchange, &owner.user_id, 5);

    let err = exchange
        .submit_response(&survey_id, &owner.user_id, None)
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Forbidden { .. }));

    let mine = exchange
        .my_responses(&owner.user_id, None, exchange.config().default_page())
        .unwrap();
    assert_eq!(mine.total, 0);
}

#[test]
fn submit_requires_published_survey() {
    let mut exchange = Exchange::build_test().unwrap();
    let owner = exchange.register_user("owner").unwrap();
    let filler = exchange.register_user("filler").unwrap();

    let survey = exchange
        .create_survey(
            &owner.user_id,
            SurveyDraft {
                title: "Draft only".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    let err = exchange
        .submit_response(&survey.survey_id, &filler.user_id, None)
        .unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidState { .. }));

    let published = published_survey(&mut exchange, &owner.user_id, 5);
    exchange.close_survey(&published, &owner.user_id).unwrap();
    let err = exchange
        .submit_response(&published, &filler.user_id, None)
        .unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidState { .. }));
}

#[test]
fn submit_to_missing_survey_is_not_found() {
    let mut exchange = Exchange::build_test().unwrap();
    let filler = exchange.register_user("filler").unwrap();

    let err = exchange
        .submit_response("no-such-survey", &filler.user_id, None)
        .unwrap_err();
    assert!(matches!(err, ExchangeError::NotFound { entity: "survey", .. }));
}

/// Different users may each fill the same survey once.
#[test]
fn distinct_users_fill_independently() {
    let mut exchange = Exchange::build_test().unwrap();
    let owner = exchange.register_user("owner").unwrap();
    let a = exchange.register_user("a").unwrap();
    let b = exchange.register_user("b").unwrap();
    let survey_id = published_survey(&mut exchange, &owner.user_id, 5);

    exchange.submit_response(&survey_id, &a.user_id, None).unwrap();
    exchange.submit_response(&survey_id, &b.user_id, None).unwrap();

    // And one user may fill two different surveys.
    let second = published_survey(&mut exchange, &owner.user_id, 5);
    exchange.submit_response(&second, &a.user_id, None).unwrap();

    let mine = exchange
        .my_responses(&a.user_id, None, exchange.config().default_page())
        .unwrap();
    assert_eq!(mine.total, 2);
}

/// my_responses lists newest first and honors the status filter.
#[test]
fn my_responses_filters_by_status() {
    let mut exchange = Exchange::build_test().unwrap();
    let owner = exchange.register_user("owner").unwrap();
    let filler = exchange.register_user("filler").unwrap();

    let first = published_survey(&mut exchange, &owner.user_id, 2);
    let second = published_survey(&mut exchange, &owner.user_id, 2);
    let r1 = exchange.submit_response(&first, &filler.user_id, None).unwrap();
    let r2 = exchange.submit_response(&second, &filler.user_id, None).unwrap();

    exchange
        .review_response(
            &r1.response_id,
            &owner.user_id,
            exchange_core::review_subsystem::ReviewDecision::Rejected,
        )
        .unwrap();

    let all = exchange
        .my_responses(&filler.user_id, None, exchange.config().default_page())
        .unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.items[0].response_id, r2.response_id, "newest first");

    let pending = exchange
        .my_responses(
            &filler.user_id,
            Some(ResponseStatus::Submitted),
            exchange.config().default_page(),
        )
        .unwrap();
    assert_eq!(pending.total, 1);
    assert_eq!(pending.items[0].response_id, r2.response_id);
}
