use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::{Credentials, TransportError, TransportErrorKind};

/// Write buffer used while streaming a download to disk.
pub const DOWNLOAD_BUFFER_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// POST with `Content-Type` and `Content-Length` already set.
    pub fn post(url: impl Into<String>, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![
                ("Content-Type".to_string(), content_type.into()),
                ("Content-Length".to_string(), body.len().to_string()),
            ],
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds `Authorization: Basic ..` when the credentials are usable.
    pub fn with_credentials(self, credentials: Option<&Credentials>) -> Self {
        match credentials.filter(|c| c.is_usable()) {
            Some(credentials) => self.with_header("Authorization", credentials.authorization()),
            None => self,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status code plus body; on non-2xx the body is the server's error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One HTTP exchange per call, no retries.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Stream the response body into `target`, returning the bytes written.
    ///
    /// A failure part way leaves whatever was written in place.
    async fn download_to(&self, request: HttpRequest, target: &Path) -> Result<u64, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// `timeout` bounds connecting and each read.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|err| TransportError::new(TransportErrorKind::Network, err.to_string()))?;
        Ok(Self { client })
    }

    fn build(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|err| TransportError::new(TransportErrorKind::InvalidUrl, err.to_string()))?;

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                TransportError::new(TransportErrorKind::InvalidHeader, err.to_string())
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                TransportError::new(TransportErrorKind::InvalidHeader, err.to_string())
            })?;
            headers.insert(name, value);
        }

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let builder = self.client.request(method, url).headers(headers);
        Ok(match request.body {
            Some(body) => builder.body(body),
            None => builder,
        })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self.build(request)?.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(HttpResponse { status, body })
    }

    async fn download_to(&self, request: HttpRequest, target: &Path) -> Result<u64, TransportError> {
        let response = self.build(request)?.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(TransportError::new(
                TransportErrorKind::HttpStatus(status.as_u16()),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        let file = tokio::fs::File::create(target).await.map_err(map_io_error)?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_BUFFER_BYTES, file);
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            writer.write_all(&chunk).await.map_err(map_io_error)?;
            written += chunk.len() as u64;
        }
        writer.flush().await.map_err(map_io_error)?;

        Ok(written)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(TransportErrorKind::Timeout, err.to_string());
    }
    TransportError::new(TransportErrorKind::Network, err.to_string())
}

fn map_io_error(err: std::io::Error) -> TransportError {
    TransportError::new(TransportErrorKind::Io, err.to_string())
}
