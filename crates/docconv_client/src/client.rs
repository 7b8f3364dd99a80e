use std::collections::VecDeque;
use std::sync::Arc;

use docconv_core::{update, ConversionState, Effect, Msg, Outcome, PollPolicy};
use docconv_logging::{client_debug, client_info, client_warn};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::form::{encode_form, FORM_CONTENT_TYPE};
use crate::multipart::MultipartBody;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::{
    ClientConfig, ClientError, ConversionRequest, ConversionStatus, Credentials, JobHandle,
    Submission, SubmissionPayload, TransportError, TransportErrorKind,
};

#[derive(Debug, Deserialize)]
struct SubmissionReceipt {
    uuid: Option<String>,
}

/// Drives conversions against one endpoint.
///
/// Holds no per-job state, so one client (or its clones) can run any number
/// of conversions concurrently.
#[derive(Clone)]
pub struct ConversionClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl ConversionClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.request_timeout())
            .map_err(|err| ClientError::connectivity("error building http client", err))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Submit, then poll once per interval until the job is processed, fails,
    /// or runs out of time.
    pub async fn convert(&self, request: ConversionRequest) -> Result<ConversionStatus, ClientError> {
        self.convert_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`Self::convert`]; cancelling `cancel` during the wait between
    /// polls ends the call with [`ClientError::Cancelled`].
    pub async fn convert_with_cancel(
        &self,
        request: ConversionRequest,
        cancel: &CancellationToken,
    ) -> Result<ConversionStatus, ClientError> {
        let endpoint = self.validated_endpoint()?;
        let submission = request.into_submission()?;
        let policy = PollPolicy {
            conversion_timeout: self.config.conversion_timeout(),
            callback_registered: submission.callback_registered,
        };

        let (mut state, effects) = update(ConversionState::new(policy), Msg::SubmitRequested);
        let mut pending: VecDeque<Effect> = effects.into();
        let mut job: Option<JobHandle> = None;
        let mut last_status: Option<ConversionStatus> = None;

        while let Some(effect) = pending.pop_front() {
            let msg = match effect {
                Effect::Submit => {
                    let handle = self.submit_validated(&endpoint, &submission).await?;
                    let uuid = handle.uuid().to_string();
                    job = Some(handle);
                    Msg::Accepted { uuid }
                }
                Effect::WaitThenPoll { uuid, attempt } => {
                    let handle = job.as_ref().ok_or(ClientError::Stalled(state.phase()))?;
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Msg::CancelRequested,
                        _ = tokio::time::sleep(self.config.poll_interval()) => {
                            let status = self
                                .poll_status(handle, submission.credentials.as_ref())
                                .await?;
                            let job_state = status.state();
                            client_debug!("poll job={} attempt={} state={:?}", uuid, attempt, job_state);
                            last_status = Some(status);
                            Msg::StatusReceived(job_state)
                        }
                    }
                }
                Effect::Finish(outcome) => {
                    let uuid = job.as_ref().map(JobHandle::uuid).unwrap_or_default();
                    return conclude(outcome, uuid, state.polls(), last_status);
                }
            };

            let (next, effects) = update(state, msg);
            state = next;
            pending.extend(effects);
        }

        Err(ClientError::Stalled(state.phase()))
    }

    /// Validate and send `request`, returning the id the service assigned.
    pub async fn submit(&self, request: ConversionRequest) -> Result<JobHandle, ClientError> {
        let endpoint = self.validated_endpoint()?;
        let submission = request.into_submission()?;
        self.submit_validated(&endpoint, &submission).await
    }

    /// One status request for `job`.
    pub async fn poll_status(
        &self,
        job: &JobHandle,
        credentials: Option<&Credentials>,
    ) -> Result<ConversionStatus, ClientError> {
        let mut url = Url::parse(job.endpoint()).map_err(|err| {
            ClientError::Configuration(format!("invalid endpoint '{}': {err}", job.endpoint()))
        })?;
        url.query_pairs_mut().append_pair("uuid", job.uuid());

        let request = HttpRequest::get(url.as_str()).with_credentials(credentials);
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| ClientError::connectivity("connection issues whilst polling status", err))?;

        if response.status != 200 {
            return Err(ClientError::StatusCheck {
                status: response.status,
                body: response.text(),
            });
        }

        ConversionStatus::from_json(&response.body).map_err(|err| ClientError::StatusCheck {
            status: response.status,
            body: format!("unreadable status body ({err}): {}", response.text()),
        })
    }

    async fn submit_validated(
        &self,
        endpoint: &str,
        submission: &Submission,
    ) -> Result<JobHandle, ClientError> {
        let request = match &submission.payload {
            SubmissionPayload::Upload { file, fields } => {
                let file_name = file
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .ok_or_else(|| {
                        ClientError::Configuration(format!("not a file path: {}", file.display()))
                    })?;
                let bytes = tokio::fs::read(file).await.map_err(|err| {
                    ClientError::connectivity(
                        "error creating request for file conversion",
                        TransportError::new(
                            TransportErrorKind::Io,
                            format!("{}: {err}", file.display()),
                        ),
                    )
                })?;
                let body = MultipartBody::build(fields, &file_name, &bytes);
                HttpRequest::post(endpoint, body.content_type(), body.into_bytes())
            }
            SubmissionPayload::Download { fields } => {
                HttpRequest::post(endpoint, FORM_CONTENT_TYPE, encode_form(fields).into_bytes())
            }
        }
        .with_credentials(submission.credentials.as_ref());

        client_info!(
            "submitting {} request to {} body_len={}",
            submission.payload.kind(),
            endpoint,
            request.body.as_ref().map_or(0, Vec::len)
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| ClientError::connectivity("error connecting to service", err))?;

        let body = response.text();
        if response.status != 200 {
            return Err(ClientError::Submission {
                status: response.status,
                body,
            });
        }

        let uuid = serde_json::from_str::<SubmissionReceipt>(&body)
            .ok()
            .and_then(|receipt| receipt.uuid)
            .filter(|uuid| !uuid.is_empty());
        match uuid {
            Some(uuid) => {
                client_info!("job accepted uuid={}", uuid);
                Ok(JobHandle::new(uuid, endpoint))
            }
            None => Err(ClientError::MissingUuid { body }),
        }
    }

    fn validated_endpoint(&self) -> Result<String, ClientError> {
        let endpoint = self.config.endpoint().trim();
        if endpoint.is_empty() {
            return Err(ClientError::Configuration("missing endpoint".into()));
        }
        Url::parse(endpoint).map_err(|err| {
            ClientError::Configuration(format!("invalid endpoint '{endpoint}': {err}"))
        })?;
        Ok(endpoint.to_string())
    }
}

fn conclude(
    outcome: Outcome,
    uuid: &str,
    polls: u32,
    last_status: Option<ConversionStatus>,
) -> Result<ConversionStatus, ClientError> {
    match (outcome, last_status) {
        (Outcome::Succeeded, Some(status)) => {
            client_info!("job {} finished after {} polls state={:?}", uuid, polls, status.state());
            Ok(status)
        }
        (Outcome::Failed, Some(status)) => {
            client_warn!("job {} reported an error after {} polls", uuid, polls);
            Err(ClientError::ConversionFailed {
                status_body: status.to_string(),
            })
        }
        (Outcome::TimedOut { limit_secs }, _) => {
            client_warn!("job {} timed out after {} polls", uuid, polls);
            Err(ClientError::ConversionTimeout {
                seconds: limit_secs,
            })
        }
        (Outcome::Cancelled, _) => {
            client_info!("job {} cancelled after {} polls", uuid, polls);
            Err(ClientError::Cancelled {
                uuid: uuid.to_string(),
            })
        }
        (Outcome::Succeeded | Outcome::Failed, None) => {
            Err(ClientError::Stalled(docconv_core::Phase::Polling))
        }
    }
}
