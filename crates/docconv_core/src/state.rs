/// Job state as reported by the service in the `state` field of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Processing,
    Processed,
    Error,
    /// Field absent or a value this client does not know.
    Unknown(Option<String>),
}

impl JobState {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("processing") => JobState::Processing,
            Some("processed") => JobState::Processed,
            Some("error") => JobState::Error,
            other => JobState::Unknown(other.map(ToOwned::to_owned)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Succeeded | Phase::Failed | Phase::TimedOut | Phase::Cancelled
        )
    }
}

/// Per-job polling rules, fixed when the job starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollPolicy {
    /// Maximum number of polls past the first, i.e. whole seconds at the
    /// one-second cadence. `None` polls until a terminal state.
    pub conversion_timeout: Option<u32>,
    /// The request registered a `callbackUrl`; the first non-error poll ends
    /// the loop.
    pub callback_registered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversionState {
    phase: Phase,
    uuid: Option<String>,
    polls: u32,
    policy: PollPolicy,
}

impl ConversionState {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// Number of status responses received so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn accept(&mut self, uuid: String) {
        self.uuid = Some(uuid);
        self.phase = Phase::Polling;
    }

    pub(crate) fn record_poll(&mut self) -> u32 {
        self.polls += 1;
        self.polls
    }
}
