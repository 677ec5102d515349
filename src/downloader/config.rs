//! Configuration structures and defaults for the downloader.

use crate::download::Summary;
use crate::http::DEFAULT_TIMEOUT;
use crate::StyleOptions;

use reqwest::header::HeaderMap;
use std::env::current_dir;
use std::sync::Arc;
use std::time::Duration;

/// Callback type for download completion events
pub type DownloadCallback = Box<dyn Fn(&Summary) + Send + Sync>;

/// Size of the write buffer the response body is streamed through.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Configuration structure for the downloader
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Directory where to store the downloaded files.
    pub directory: std::path::PathBuf,
    /// Maximum number of attempts per file, the first one included.
    pub retries: u32,
    /// Connect timeout, and the longest wait for the next body chunk.
    pub timeout: Duration,
    /// Backoff base; attempt `n` is followed by a pause of `backoff * 2^n`.
    pub backoff: Duration,
    /// Downloader style options.
    pub style_options: StyleOptions,
    /// Custom HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Callback for when each download completes.
    pub on_complete: Option<Arc<DownloadCallback>>,
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("directory", &self.directory)
            .field("retries", &self.retries)
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .field("style_options", &self.style_options)
            .field("headers", &self.headers)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            directory: current_dir().unwrap_or_default(),
            retries: 3,
            timeout: DEFAULT_TIMEOUT,
            backoff: Duration::from_secs(1),
            style_options: StyleOptions::default(),
            headers: None,
            on_complete: None,
        }
    }
}

impl DownloaderConfig {
    /// Pause before the attempt following attempt number `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}
