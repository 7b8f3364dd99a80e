//! Client for asynchronous document-conversion microservices: submit a file
//! or URL, poll until the job settles, then fetch the resulting archive.
mod client;
mod config;
mod download;
mod error;
mod filename;
mod form;
mod multipart;
mod request;
mod status;
mod transport;

pub use client::ConversionClient;
pub use config::{ClientConfig, Product, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use docconv_core::{JobState, Phase};
pub use download::{ensure_output_dir, resolve_output_path, DownloadOptions, DownloadSummary};
pub use error::{ClientError, TransportError, TransportErrorKind};
pub use filename::archive_file_name;
pub use form::{encode_form, FORM_CONTENT_TYPE};
pub use multipart::{file_content_type, MultipartBody};
pub use request::{ConversionRequest, Credentials, InputKind, Submission, SubmissionPayload};
pub use status::{ConversionStatus, JobHandle};
pub use tokio_util::sync::CancellationToken;
pub use transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, DOWNLOAD_BUFFER_BYTES,
};
