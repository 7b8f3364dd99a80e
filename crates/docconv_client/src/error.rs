use std::fmt;

use docconv_core::Phase;
use thiserror::Error;

/// Every way a conversion can end without a result.
///
/// None of these are retried by the client; retry policy belongs to the
/// caller.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("error uploading file: server returned {status}: {body}")]
    Submission { status: u16, body: String },
    #[error("error uploading file: server response has no uuid: {body}")]
    MissingUuid { body: String },
    #[error("error checking conversion status: server returned {status} - {body}")]
    StatusCheck { status: u16, body: String },
    #[error("conversion failed: {status_body}")]
    ConversionFailed { status_body: String },
    #[error("file took longer than {seconds} seconds to convert")]
    ConversionTimeout { seconds: u32 },
    #[error("{context}: {source}")]
    Connectivity {
        context: String,
        #[source]
        source: TransportError,
    },
    #[error("error downloading conversion output: {message}")]
    Download {
        message: String,
        #[source]
        source: Option<TransportError>,
    },
    #[error("conversion cancelled while waiting for job {uuid}")]
    Cancelled { uuid: String },
    #[error("conversion stopped without a result in phase {0:?}")]
    Stalled(Phase),
}

impl ClientError {
    pub(crate) fn connectivity(context: impl Into<String>, source: TransportError) -> Self {
        ClientError::Connectivity {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn download(message: impl Into<String>) -> Self {
        ClientError::Download {
            message: message.into(),
            source: None,
        }
    }

    /// Raw server body attached to the error, when there is one.
    pub fn server_body(&self) -> Option<&str> {
        match self {
            ClientError::Submission { body, .. }
            | ClientError::MissingUuid { body }
            | ClientError::StatusCheck { body, .. } => Some(body),
            ClientError::ConversionFailed { status_body } => Some(status_body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    InvalidUrl,
    InvalidHeader,
    HttpStatus(u16),
    Timeout,
    Network,
    Io,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::InvalidUrl => write!(f, "invalid url"),
            TransportErrorKind::InvalidHeader => write!(f, "invalid header"),
            TransportErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Network => write!(f, "network error"),
            TransportErrorKind::Io => write!(f, "io error"),
        }
    }
}
