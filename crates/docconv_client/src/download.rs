use std::path::{Path, PathBuf};

use docconv_logging::{client_info, client_warn};

use crate::filename::archive_file_name;
use crate::transport::HttpRequest;
use crate::{ClientError, ConversionClient, ConversionStatus, Credentials};

/// Where and how to store a finished conversion.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub output_dir: PathBuf,
    /// Base name for the archive; derived from `downloadUrl` when `None`.
    pub file_name: Option<String>,
    pub credentials: Option<Credentials>,
}

impl DownloadOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub path: PathBuf,
    pub bytes_written: u64,
}

/// Target path for the archive of `status` under `options`.
pub fn resolve_output_path(
    status: &ConversionStatus,
    options: &DownloadOptions,
) -> Result<PathBuf, ClientError> {
    let download_url = status
        .download_url()
        .ok_or_else(|| ClientError::download("no URL to download from provided"))?;
    let name = archive_file_name(options.file_name.as_deref(), download_url).ok_or_else(|| {
        ClientError::download(format!("cannot derive a file name from '{download_url}'"))
    })?;
    Ok(options.output_dir.join(name))
}

/// Ensure output directory exists; create if missing.
pub async fn ensure_output_dir(dir: &Path) -> Result<(), ClientError> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ClientError::download(format!(
            "output path is not a directory: {}",
            dir.display()
        ))),
        Err(_) => tokio::fs::create_dir_all(dir).await.map_err(|err| {
            ClientError::download(format!("cannot create {}: {err}", dir.display()))
        }),
    }
}

impl ConversionClient {
    /// Stream the archive named by `status["downloadUrl"]` to disk.
    ///
    /// Partial files are left behind on failure.
    pub async fn download_results(
        &self,
        status: &ConversionStatus,
        options: &DownloadOptions,
    ) -> Result<DownloadSummary, ClientError> {
        let path = resolve_output_path(status, options)?;
        ensure_output_dir(&options.output_dir).await?;

        let download_url = status.download_url().unwrap_or_default();
        let request = HttpRequest::get(download_url).with_credentials(options.credentials.as_ref());

        client_info!("downloading {} to {}", download_url, path.display());
        match self.transport().download_to(request, &path).await {
            Ok(bytes_written) => {
                client_info!("downloaded {} bytes to {}", bytes_written, path.display());
                Ok(DownloadSummary {
                    path,
                    bytes_written,
                })
            }
            Err(err) => {
                client_warn!("download to {} failed: {}", path.display(), err);
                Err(ClientError::Download {
                    message: err.to_string(),
                    source: Some(err),
                })
            }
        }
    }
}
