use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::SetupConfig;
use crate::core::error::{SetupError, SetupResult};
use crate::core::events::{DownloadProgress, EventSink};
use crate::core::http::check_status;

/// A single file to fetch into a directory.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub destination_dir: PathBuf,
    pub source_url: String,
    /// Final name on disk; the URL's last path segment when unset.
    pub file_name: Option<String>,
}

impl DownloadRequest {
    pub fn new(destination_dir: impl Into<PathBuf>, source_url: impl Into<String>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
            source_url: source_url.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn target_file_name(&self) -> String {
        if let Some(name) = &self.file_name {
            return name.clone();
        }
        let from_url = reqwest::Url::parse(&self.source_url)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|segments| segments.last().map(str::to_string))
            })
            .unwrap_or_else(|| {
                self.source_url
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });
        if from_url.is_empty() {
            "download".to_string()
        } else {
            from_url
        }
    }

    pub fn final_path(&self) -> PathBuf {
        self.destination_dir.join(self.target_file_name())
    }
}

/// A committed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedDownload {
    pub path: PathBuf,
    pub bytes: u64,
    /// Hex SHA-256 of the streamed bytes.
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed(CompletedDownload),
    Failed { message: String },
}

/// Streaming downloader with retry and atomic commit.
///
/// The file at the final path is either absent or complete: bytes land in a
/// uniquely named temp file next to it and are renamed into place only after
/// the length checks pass.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Downloader {
    pub fn new(client: Client, config: &SetupConfig) -> Self {
        Self {
            client,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay,
        }
    }

    /// Download and report: failures go to `events` as a single error message.
    pub async fn download(&self, request: &DownloadRequest, events: &EventSink) -> DownloadOutcome {
        match self.fetch(request, events).await {
            Ok(done) => DownloadOutcome::Completed(done),
            Err(err) => {
                let message = format!("Download failed: {err}");
                events.error(message.clone());
                DownloadOutcome::Failed { message }
            }
        }
    }

    /// Download with retries, returning the last error instead of reporting it.
    ///
    /// Progress is still streamed to `events`. Once every attempt has failed the
    /// final path is removed; a non-2xx status fails at once and leaves it alone.
    pub async fn fetch(
        &self,
        request: &DownloadRequest,
        events: &EventSink,
    ) -> SetupResult<CompletedDownload> {
        let dir = &request.destination_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| SetupError::io(dir, source))?;

        let final_path = request.final_path();
        let mut attempt = 0_u32;

        loop {
            attempt += 1;
            debug!(
                "Download attempt {}/{}: {}",
                attempt, self.max_attempts, request.source_url
            );

            let err = match self
                .attempt(request, &final_path, events)
                .await
            {
                Ok(done) => {
                    info!(
                        "Downloaded {} -> {:?} ({} bytes, sha256 {})",
                        request.source_url, done.path, done.bytes, done.sha256
                    );
                    return Ok(done);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                warn!("Download of {} failed: {}", request.source_url, err);
                return Err(err);
            }

            if attempt >= self.max_attempts {
                warn!(
                    "Download of {} failed after {} attempts: {}",
                    request.source_url, attempt, err
                );
                // A failed download never leaves an artifact at the final path.
                match tokio::fs::remove_file(&final_path).await {
                    Ok(()) => debug!("Removed stale {:?}", final_path),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!("Could not remove {:?}: {}", final_path, e),
                }
                return Err(err);
            }

            let backoff = retry_delay(attempt - 1, self.retry_delay);
            warn!(
                "Download attempt {}/{} of {} failed ({}), retrying in {:?}",
                attempt, self.max_attempts, request.source_url, err, backoff
            );
            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }
        }
    }

    async fn attempt(
        &self,
        request: &DownloadRequest,
        final_path: &Path,
        events: &EventSink,
    ) -> SetupResult<CompletedDownload> {
        let response = self.client.get(&request.source_url).send().await?;
        let response = check_status(response, &request.source_url)?;

        let content_length = response.content_length();
        let temp_path = request.destination_dir.join(format!(
            "{}.tmp.{}",
            request.target_file_name(),
            Uuid::new_v4()
        ));

        let result = transfer(
            response,
            &temp_path,
            final_path,
            content_length,
            events,
        )
        .await;

        if result.is_err() {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        result
    }
}

async fn transfer(
    response: reqwest::Response,
    temp_path: &Path,
    final_path: &Path,
    content_length: Option<u64>,
    events: &EventSink,
) -> SetupResult<CompletedDownload> {
    let (bytes, sha256) = write_body(response, temp_path, content_length, events).await?;

    if let Some(expected) = content_length.filter(|len| *len > 0) {
        if bytes != expected {
            return Err(SetupError::IncompleteTransfer {
                received: bytes,
                expected,
            });
        }
    }

    commit(temp_path, final_path, bytes).await?;
    Ok(CompletedDownload {
        path: final_path.to_path_buf(),
        bytes,
        sha256,
    })
}

async fn write_body(
    response: reqwest::Response,
    temp_path: &Path,
    content_length: Option<u64>,
    events: &EventSink,
) -> SetupResult<(u64, String)> {
    let mut file = tokio::fs::File::create(temp_path)
        .await
        .map_err(|source| SetupError::io(temp_path, source))?;

    let mut hasher = Sha256::new();
    let mut received = 0_u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            // The connection closed before the declared length arrived.
            Err(err) => match content_length.filter(|expected| received < *expected) {
                Some(expected) => {
                    debug!("Body ended after {} bytes: {}", received, err);
                    return Err(SetupError::IncompleteTransfer { received, expected });
                }
                None => return Err(err.into()),
            },
        };
        file.write_all(&chunk)
            .await
            .map_err(|source| SetupError::io(temp_path, source))?;
        hasher.update(&chunk);
        received = received.saturating_add(chunk.len() as u64);
        events.progress(DownloadProgress::from_bytes(received, content_length));
    }

    file.flush()
        .await
        .map_err(|source| SetupError::io(temp_path, source))?;
    file.sync_all()
        .await
        .map_err(|source| SetupError::io(temp_path, source))?;
    // Handle dropped before the rename, required on Windows.
    drop(file);

    Ok((received, hex::encode(hasher.finalize())))
}

async fn commit(
    temp_path: &Path,
    final_path: &Path,
    expected_bytes: u64,
) -> SetupResult<()> {
    if tokio::fs::try_exists(final_path).await.unwrap_or(false) {
        tokio::fs::remove_file(final_path)
            .await
            .map_err(|source| SetupError::Finalization {
                path: final_path.to_path_buf(),
                reason: format!("Failed to remove existing file: {source}"),
            })?;
    }

    tokio::fs::rename(temp_path, final_path)
        .await
        .map_err(|source| SetupError::Finalization {
            path: final_path.to_path_buf(),
            reason: format!("Failed to finalize downloaded file: {source}"),
        })?;

    let written = tokio::fs::metadata(final_path)
        .await
        .map(|meta| meta.len())
        .map_err(|source| SetupError::Finalization {
            path: final_path.to_path_buf(),
            reason: format!("Cannot stat finalized file: {source}"),
        })?;
    if written != expected_bytes {
        return Err(SetupError::Finalization {
            path: final_path.to_path_buf(),
            reason: format!(
                "File verification failed after write: {written}/{expected_bytes} bytes"
            ),
        });
    }
    Ok(())
}

/// Backoff before retry number `retry_count` (0-indexed): `base * 2^retry_count`.
pub fn retry_delay(retry_count: u32, base: Duration) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(retry_count))
}
