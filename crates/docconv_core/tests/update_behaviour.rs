use std::sync::Once;

use docconv_core::{update, ConversionState, Effect, JobState, Msg, Outcome, Phase, PollPolicy};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docconv_logging::initialize_for_tests);
}

fn accepted(policy: PollPolicy) -> ConversionState {
    let (state, effects) = update(ConversionState::new(policy), Msg::SubmitRequested);
    assert_eq!(effects, vec![Effect::Submit]);
    assert_eq!(state.phase(), Phase::Submitting);

    let (state, effects) = update(
        state,
        Msg::Accepted {
            uuid: "abc".to_string(),
        },
    );
    assert_eq!(state.phase(), Phase::Polling);
    assert_eq!(state.uuid(), Some("abc"));
    assert_eq!(
        effects,
        vec![Effect::WaitThenPoll {
            uuid: "abc".to_string(),
            attempt: 1,
        }]
    );
    state
}

/// Feeds `states` until a `Finish` effect shows up; returns it with the poll count.
fn drive(mut state: ConversionState, states: Vec<JobState>) -> (ConversionState, Option<Outcome>) {
    for job_state in states {
        let (next, effects) = update(state, Msg::StatusReceived(job_state));
        state = next;
        if let Some(Effect::Finish(outcome)) = effects.last() {
            return (state, Some(*outcome));
        }
    }
    (state, None)
}

#[test]
fn processing_then_processed_succeeds_after_n_plus_one_polls() {
    init_logging();
    let state = accepted(PollPolicy::default());
    let mut script = vec![JobState::Processing; 4];
    script.push(JobState::Processed);
    script.push(JobState::Processed);

    let (state, outcome) = drive(state, script);
    assert_eq!(outcome, Some(Outcome::Succeeded));
    assert_eq!(state.polls(), 5);
    assert_eq!(state.phase(), Phase::Succeeded);
}

#[test]
fn error_on_first_poll_fails_immediately() {
    init_logging();
    let state = accepted(PollPolicy::default());
    let (state, effects) = update(state, Msg::StatusReceived(JobState::Error));
    assert_eq!(effects, vec![Effect::Finish(Outcome::Failed)]);
    assert_eq!(state.polls(), 1);
}

#[test]
fn timeout_fires_on_poll_after_the_limit() {
    init_logging();
    let policy = PollPolicy {
        conversion_timeout: Some(5),
        callback_registered: false,
    };
    let state = accepted(policy);

    let (state, outcome) = drive(state, vec![JobState::Processing; 10]);
    assert_eq!(outcome, Some(Outcome::TimedOut { limit_secs: 5 }));
    assert_eq!(state.polls(), 6);
    assert_eq!(state.phase(), Phase::TimedOut);
}

#[test]
fn unknown_state_keeps_polling_with_increasing_attempts() {
    init_logging();
    let state = accepted(PollPolicy::default());
    let (state, effects) = update(state, Msg::StatusReceived(JobState::parse(None)));
    assert_eq!(
        effects,
        vec![Effect::WaitThenPoll {
            uuid: "abc".to_string(),
            attempt: 2,
        }]
    );
    let (_, effects) = update(
        state,
        Msg::StatusReceived(JobState::parse(Some("queued"))),
    );
    assert_eq!(
        effects,
        vec![Effect::WaitThenPoll {
            uuid: "abc".to_string(),
            attempt: 3,
        }]
    );
}

#[test]
fn callback_ends_loop_after_first_poll() {
    init_logging();
    let policy = PollPolicy {
        conversion_timeout: None,
        callback_registered: true,
    };
    let (state, outcome) = drive(accepted(policy), vec![JobState::Processing]);
    assert_eq!(outcome, Some(Outcome::Succeeded));
    assert_eq!(state.polls(), 1);
}

#[test]
fn callback_does_not_mask_error() {
    init_logging();
    let policy = PollPolicy {
        conversion_timeout: None,
        callback_registered: true,
    };
    let (_, outcome) = drive(accepted(policy), vec![JobState::Error]);
    assert_eq!(outcome, Some(Outcome::Failed));
}

#[test]
fn cancel_while_polling_is_terminal() {
    init_logging();
    let state = accepted(PollPolicy::default());
    let (state, effects) = update(state, Msg::CancelRequested);
    assert_eq!(state.phase(), Phase::Cancelled);
    assert_eq!(effects, vec![Effect::Finish(Outcome::Cancelled)]);
}

#[test]
fn job_state_parsing() {
    assert_eq!(JobState::parse(Some("processing")), JobState::Processing);
    assert_eq!(JobState::parse(Some("processed")), JobState::Processed);
    assert_eq!(JobState::parse(Some("error")), JobState::Error);
    assert_eq!(
        JobState::parse(Some("PROCESSED")),
        JobState::Unknown(Some("PROCESSED".to_string()))
    );
    assert_eq!(JobState::parse(None), JobState::Unknown(None));
}
