//! Core downloader implementation with fetch logic.
//!
//! Every transfer is staged in `<filename>.part` next to its final path.
//! An attempt asks the server for the total size with a HEAD request, then
//! requests the bytes after whatever is already staged and appends them.
//! The staging file is renamed onto the final path only once its size
//! matches the announced total. Failed attempts keep the staged bytes so
//! the next attempt resumes where the previous one stopped.
//!
//! ```rust,no_run
//! use zipmirror::downloader::DownloaderBuilder;
//! use zipmirror::download::Download;
//! use std::convert::TryFrom;
//!
//! # async fn example() -> Result<(), zipmirror::Error> {
//! let downloader = DownloaderBuilder::new().directory("downloads".into()).build()?;
//! let download = Download::try_from("https://example.com/file1.zip")?;
//!
//! let summary = downloader.download(&download).await;
//! println!("{}: {:?}", summary.download().filename, summary.status());
//! # Ok(())
//! # }
//! ```

use super::config::{DownloaderConfig, CHUNK_SIZE};
use crate::download::{Download, Status, Summary};
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig};
use crate::progress::ProgressDisplay;
use crate::utils::{content_range, parse_content_range_start, parse_content_range_total, response_total};

use futures::StreamExt;
use indicatif::ProgressBar;
use reqwest::{
    header::{HeaderMap, RANGE},
    Response, StatusCode,
};
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::{
    fs,
    fs::OpenOptions,
    io::{AsyncWrite, AsyncWriteExt, BufWriter},
};
use tracing::{debug, info, warn};

/// How a successful transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Bytes were fetched and the file promoted. `resumed_from` is the
    /// staged offset the final request started at, 0 for a fresh transfer.
    Completed { size: u64, resumed_from: u64 },
    /// The staging file already held every byte and was promoted without a
    /// transfer.
    AlreadyComplete { size: u64 },
}

impl Transfer {
    /// Size of the promoted file.
    pub fn size(&self) -> u64 {
        match self {
            Transfer::Completed { size, .. } | Transfer::AlreadyComplete { size } => *size,
        }
    }
}

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main() -> Result<(), zipmirror::Error> {
/// use zipmirror::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::hidden().build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
    client: ClientWithMiddleware,
    progress: ProgressDisplay,
}

impl Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    ///
    /// The client gets no middleware retries: [`Downloader::fetch`] retries
    /// whole attempts itself so that every retry resumes from the staged
    /// bytes.
    pub(crate) fn new(config: DownloaderConfig) -> Result<Self> {
        let client = create_http_client(HttpClientConfig {
            retries: 0,
            timeout: config.timeout,
            proxy: None,
            headers: config.headers.clone(),
        })?;
        let progress = ProgressDisplay::new(config.style_options.clone());

        Ok(Self {
            config,
            client,
            progress,
        })
    }

    /// Gets the directory where files will be downloaded.
    pub fn directory(&self) -> &PathBuf {
        &self.config.directory
    }

    /// Gets the maximum number of attempts per download.
    pub fn retries(&self) -> u32 {
        self.config.retries
    }

    /// Gets the connect and read timeout.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Gets the custom headers.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.config.headers.as_ref()
    }

    /// Gets the progress display the transfers are drawn on.
    pub fn progress(&self) -> &ProgressDisplay {
        &self.progress
    }

    /// Final path of a download.
    pub fn output_path(&self, download: &Download) -> PathBuf {
        self.config.directory.join(&download.filename)
    }

    /// Staging path of a download.
    pub fn staging_path(&self, download: &Download) -> PathBuf {
        self.config.directory.join(download.staging_filename())
    }

    /// Downloads a file and folds the outcome into a [`Summary`].
    ///
    /// The `on_complete` callback, if any, is invoked with the summary.
    pub async fn download(&self, download: &Download) -> Summary {
        let summary = match self.fetch(download).await {
            Ok(Transfer::Completed { size, resumed_from }) => {
                Summary::new(download.clone(), size, resumed_from).with_status(Status::Success)
            }
            Ok(Transfer::AlreadyComplete { size }) => {
                Summary::new(download.clone(), size, size).with_status(Status::AlreadyComplete)
            }
            Err(e) => Summary::new(download.clone(), 0, 0).fail(e),
        };

        if let Some(ref callback) = self.config.on_complete {
            callback(&summary);
        }

        summary
    }

    /// Downloads a file, retrying failed attempts with exponential backoff.
    ///
    /// Returns the error of the last attempt once the attempt budget is
    /// spent, or as soon as an error cannot be fixed by retrying.
    pub async fn fetch(&self, download: &Download) -> Result<Transfer> {
        fs::create_dir_all(&self.config.directory).await?;

        let max_attempts = self.config.retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(download).await {
                Ok(transfer) => return Ok(transfer),
                Err(e) if attempt >= max_attempts || !e.is_retryable() => {
                    debug!(
                        "Giving up on {} after {} attempt(s): {}",
                        download.filename, attempt, e
                    );
                    return Err(e);
                }
                Err(e) => {
                    let wait = self.config.backoff_delay(attempt);
                    self.progress.suspend(|| {
                        warn!(
                            "Error downloading {} ({}), retrying in {:?}...",
                            download.filename, e, wait
                        )
                    });
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Performs a single transfer attempt.
    async fn attempt(&self, download: &Download) -> Result<Transfer> {
        let staging = self.staging_path(download);
        let output = self.output_path(download);
        let staged = staged_len(&staging).await?;

        let head = tokio::time::timeout(self.config.timeout, download.content_length(&self.client));
        let expected = match head.await {
            Ok(Ok(len)) => len,
            Ok(Err(e)) => {
                debug!("HEAD {} failed, total size unknown: {}", download.url, e);
                None
            }
            Err(_) => {
                debug!(
                    "HEAD {} timed out after {:?}, total size unknown",
                    download.url, self.config.timeout
                );
                None
            }
        };

        if let (Some(staged), Some(total)) = (staged, expected) {
            if staged >= total {
                debug!(
                    "Staged {} bytes of {} for {}, nothing left to fetch",
                    staged, total, download.filename
                );
                promote(&staging, &output).await?;
                return Ok(Transfer::AlreadyComplete { size: staged });
            }
        }

        let offset = staged.unwrap_or(0);
        debug!("Fetching {} from offset {}", &download.url, offset);
        let mut req = self.client.get(download.url.clone());
        if offset > 0 {
            req = req.header(RANGE, format!("bytes={}-", offset));
        }

        let res = tokio::time::timeout(self.config.timeout, req.send())
            .await
            .map_err(|_| Error::Timeout(self.config.timeout))??;

        if res.status() == StatusCode::RANGE_NOT_SATISFIABLE && offset > 0 {
            let total = content_range(res.headers()).and_then(parse_content_range_total);
            if total == Some(offset) {
                promote(&staging, &output).await?;
                return Ok(Transfer::AlreadyComplete { size: offset });
            }
            discard(&staging).await;
            return Err(Error::RangeNotSatisfiable { offset, total });
        }

        let res = res.error_for_status()?;

        let start = if res.status() == StatusCode::PARTIAL_CONTENT {
            let received = content_range(res.headers()).and_then(parse_content_range_start);
            if received != Some(offset) {
                discard(&staging).await;
                return Err(Error::RangeMismatch {
                    requested: offset,
                    received,
                });
            }
            offset
        } else {
            if offset > 0 {
                warn!(
                    "{} ignored the range request, restarting {} from byte 0",
                    download.url, download.filename
                );
            }
            0
        };

        let total = expected.or_else(|| response_total(&res, start));

        debug!("Opening staging file {:?} at offset {}", &staging, start);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(start > 0)
            .truncate(start == 0)
            .open(&staging)
            .await?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

        let pb = self
            .progress
            .create_child_progress(&download.filename, total, start);

        let streamed = self.stream_body(res, &mut writer, &pb).await;
        // Keep whatever arrived so the next attempt can resume from it.
        let flushed = writer.flush().await;
        let result = match (streamed, flushed) {
            (Ok(received), Ok(())) => Ok(received),
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(Error::from(e)),
        };
        let received = match result {
            Ok(received) => received,
            Err(e) => {
                self.progress.abandon_child(pb);
                return Err(e);
            }
        };
        debug!("Received {} bytes for {}", received, download.filename);

        let size = fs::metadata(&staging).await?.len();
        if let Some(expected) = total {
            if size != expected {
                self.progress.abandon_child(pb);
                if size > expected {
                    discard(&staging).await;
                }
                return Err(Error::SizeMismatch {
                    expected,
                    actual: size,
                });
            }
        }

        self.progress.finish_child(pb);
        promote(&staging, &output).await?;
        info!("Downloaded {} ({} bytes)", download.filename, size);

        Ok(Transfer::Completed {
            size,
            resumed_from: start,
        })
    }

    /// Streams the response body into `writer`, one chunk at a time.
    ///
    /// Each chunk has to arrive within the configured timeout.
    async fn stream_body<W>(&self, res: Response, writer: &mut W, pb: &ProgressBar) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut received = 0u64;
        let mut stream = res.bytes_stream();
        while let Some(item) = tokio::time::timeout(self.config.timeout, stream.next())
            .await
            .map_err(|_| Error::Timeout(self.config.timeout))?
        {
            let chunk = item?;
            writer.write_all(&chunk).await?;
            received += chunk.len() as u64;
            pb.inc(chunk.len() as u64);
        }
        Ok(received)
    }
}

/// Size of the staging file, `None` if there is none.
async fn staged_len(staging: &Path) -> Result<Option<u64>> {
    match fs::metadata(staging).await {
        Ok(m) => Ok(Some(m.len())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Atomically move a complete staging file onto its final path.
async fn promote(staging: &Path, output: &Path) -> Result<()> {
    debug!("Promoting {:?} to {:?}", staging, output);
    fs::rename(staging, output).await?;
    Ok(())
}

/// Remove a staging file that can no longer be resumed.
async fn discard(staging: &Path) {
    if let Err(e) = fs::remove_file(staging).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove staging file {:?}: {}", staging, e);
        }
    }
}
