use crate::JobState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Caller handed over a validated request.
    SubmitRequested,
    /// The service accepted the submission and issued a job id.
    Accepted { uuid: String },
    /// A status poll returned this job state.
    StatusReceived(JobState),
    /// Host asked to stop waiting for the job.
    CancelRequested,
}
