use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use base64::engine::general_purpose;
use base64::Engine;

use crate::ClientError;

const INPUT: &str = "input";
const FILE: &str = "file";
const URL: &str = "url";
const TOKEN: &str = "token";
const CALLBACK_URL: &str = "callbackUrl";
const USERNAME: &str = "username";
const PASSWORD: &str = "password";

/// How the service obtains the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// The client uploads a local file.
    Upload,
    /// The service fetches the document from a URL.
    Download,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Upload => "upload",
            InputKind::Download => "download",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "upload" => Some(InputKind::Upload),
            "download" => Some(InputKind::Download),
            _ => None,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP Basic credentials. Never sent as form fields.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Both halves must be non-empty for the header to be sent.
    pub fn is_usable(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", general_purpose::STANDARD.encode(raw.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters for one conversion, keyed by their wire name.
///
/// Besides the recognised keys, any service-specific option is passed
/// through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionRequest {
    params: BTreeMap<String, String>,
}

impl ConversionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request converting the local file at `path`.
    pub fn upload(path: impl Into<String>) -> Self {
        Self::new()
            .with_param(INPUT, InputKind::Upload.as_str())
            .with_param(FILE, path)
    }

    /// Request converting the document the service downloads from `url`.
    pub fn download(url: impl Into<String>) -> Self {
        Self::new()
            .with_param(INPUT, InputKind::Download.as_str())
            .with_param(URL, url)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_param(TOKEN, token)
    }

    pub fn with_callback_url(self, callback_url: impl Into<String>) -> Self {
        self.with_param(CALLBACK_URL, callback_url)
    }

    pub fn with_credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_param(USERNAME, username).with_param(PASSWORD, password)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Validate the parameters and split them into what goes on the wire and
    /// what becomes headers.
    pub fn into_submission(mut self) -> Result<Submission, ClientError> {
        if self.params.is_empty() {
            return Err(ClientError::Configuration("missing parameters".into()));
        }

        let username = self.params.remove(USERNAME);
        let password = self.params.remove(PASSWORD);
        let credentials = match (username, password) {
            (Some(username), Some(password)) => {
                Some(Credentials::new(username, password)).filter(Credentials::is_usable)
            }
            _ => None,
        };

        let kind = match self.params.get(INPUT) {
            None => return Err(ClientError::Configuration("missing input".into())),
            Some(raw) => InputKind::parse(raw).ok_or_else(|| {
                ClientError::Configuration(format!(
                    "unknown input '{raw}', expected 'upload' or 'download'"
                ))
            })?,
        };
        let callback_registered = self.params.contains_key(CALLBACK_URL);

        let payload = match kind {
            InputKind::Upload => {
                let file = self
                    .params
                    .remove(FILE)
                    .filter(|path| !path.is_empty())
                    .ok_or_else(|| ClientError::Configuration("missing file".into()))?;
                SubmissionPayload::Upload {
                    file: PathBuf::from(file),
                    fields: self.params,
                }
            }
            InputKind::Download => {
                let has_url = self.params.get(URL).is_some_and(|url| !url.is_empty());
                if !has_url {
                    return Err(ClientError::Configuration("missing url".into()));
                }
                SubmissionPayload::Download {
                    fields: self.params,
                }
            }
        };

        Ok(Submission {
            payload,
            credentials,
            callback_registered,
        })
    }
}

impl<K, V> FromIterator<(K, V)> for ConversionRequest
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// What is sent to the service, chosen once during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPayload {
    /// Multipart upload: `file` becomes the binary part, `fields` text parts.
    Upload {
        file: PathBuf,
        fields: BTreeMap<String, String>,
    },
    /// URL-encoded form; `fields` still carries `url`.
    Download { fields: BTreeMap<String, String> },
}

impl SubmissionPayload {
    pub fn kind(&self) -> InputKind {
        match self {
            SubmissionPayload::Upload { .. } => InputKind::Upload,
            SubmissionPayload::Download { .. } => InputKind::Download,
        }
    }
}

/// A validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub payload: SubmissionPayload,
    pub credentials: Option<Credentials>,
    pub callback_registered: bool,
}
