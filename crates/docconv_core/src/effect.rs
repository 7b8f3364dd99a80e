#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the validated request to the service.
    Submit,
    /// Sleep one poll interval, then ask for the status of `uuid`.
    WaitThenPoll { uuid: String, attempt: u32 },
    /// The lifecycle reached a terminal phase.
    Finish(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    TimedOut { limit_secs: u32 },
    Cancelled,
}
