use crate::{ConversionState, Effect, JobState, Msg, Outcome, Phase};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase leave the state untouched and
/// produce no effects; a terminal phase is never left again.
pub fn update(mut state: ConversionState, msg: Msg) -> (ConversionState, Vec<Effect>) {
    if state.phase().is_terminal() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::SubmitRequested => {
            if state.phase() == Phase::Idle {
                state.set_phase(Phase::Submitting);
                vec![Effect::Submit]
            } else {
                Vec::new()
            }
        }
        Msg::Accepted { uuid } => {
            if state.phase() == Phase::Submitting {
                state.accept(uuid.clone());
                vec![Effect::WaitThenPoll { uuid, attempt: 1 }]
            } else {
                Vec::new()
            }
        }
        Msg::StatusReceived(job_state) => {
            if state.phase() == Phase::Polling {
                on_status(&mut state, job_state)
            } else {
                Vec::new()
            }
        }
        Msg::CancelRequested => {
            state.set_phase(Phase::Cancelled);
            vec![Effect::Finish(Outcome::Cancelled)]
        }
    };

    (state, effects)
}

fn on_status(state: &mut ConversionState, job_state: JobState) -> Vec<Effect> {
    let polls = state.record_poll();
    let policy = state.policy();

    // Error wins over everything, including a registered callback.
    if job_state == JobState::Error {
        state.set_phase(Phase::Failed);
        return vec![Effect::Finish(Outcome::Failed)];
    }

    // Either condition ends the loop; neither takes priority.
    if job_state == JobState::Processed || policy.callback_registered {
        state.set_phase(Phase::Succeeded);
        return vec![Effect::Finish(Outcome::Succeeded)];
    }

    if let Some(limit_secs) = policy.conversion_timeout {
        if polls > limit_secs {
            state.set_phase(Phase::TimedOut);
            return vec![Effect::Finish(Outcome::TimedOut { limit_secs })];
        }
    }

    match state.uuid() {
        Some(uuid) => vec![Effect::WaitThenPoll {
            uuid: uuid.to_string(),
            attempt: polls + 1,
        }],
        None => Vec::new(),
    }
}
