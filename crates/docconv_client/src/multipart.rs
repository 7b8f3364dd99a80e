use std::collections::BTreeMap;
use std::path::Path;

use uuid::Uuid;

const CRLF: &str = "\r\n";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A complete `multipart/form-data` request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    /// Text part per field, then one binary part named `file`.
    pub fn build(fields: &BTreeMap<String, String>, file_name: &str, file_bytes: &[u8]) -> Self {
        Self::with_boundary(new_boundary(), fields, file_name, file_bytes)
    }

    pub(crate) fn with_boundary(
        boundary: String,
        fields: &BTreeMap<String, String>,
        file_name: &str,
        file_bytes: &[u8],
    ) -> Self {
        let mut bytes = Vec::with_capacity(file_bytes.len() + 256 * (fields.len() + 1));

        for (key, value) in fields {
            let head = format!(
                "--{boundary}{CRLF}\
                 Content-Disposition: form-data; name=\"{}\"{CRLF}\
                 Content-Type: text/plain; charset=UTF-8{CRLF}{CRLF}",
                escape_quoted(key)
            );
            bytes.extend_from_slice(head.as_bytes());
            bytes.extend_from_slice(value.as_bytes());
            bytes.extend_from_slice(CRLF.as_bytes());
        }

        let head = format!(
            "--{boundary}{CRLF}\
             Content-Disposition: form-data; name=\"file\"; filename=\"{}\"{CRLF}\
             Content-Type: {}{CRLF}{CRLF}",
            escape_quoted(file_name),
            file_content_type(file_name)
        );
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(file_bytes);
        bytes.extend_from_slice(CRLF.as_bytes());
        bytes.extend_from_slice(format!("--{boundary}--{CRLF}").as_bytes());

        Self { boundary, bytes }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// `application/<ext>` from the file extension, octet-stream without one.
pub fn file_content_type(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!("application/{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

fn new_boundary() -> String {
    format!("docconv-{}", Uuid::new_v4().simple())
}

// Header parameter values are quoted; keep them on one line.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
