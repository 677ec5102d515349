//! Mirror orchestration.
//!
//! A [`Mirror`] scans the index page once, then takes each archive link in
//! page order through download and extraction. Every archive is handled on
//! its own: a failure is reported in that archive's [`ArchiveReport`] and
//! the run moves on to the next link. Only a failure to read the index page
//! ends the run early.
//!
//! ```rust,no_run
//! use reqwest::Url;
//! use zipmirror::mirror::MirrorBuilder;
//!
//! # async fn example() -> Result<(), zipmirror::Error> {
//! let base = Url::parse("https://archive.example/download/Collection/").unwrap();
//! let mirror = MirrorBuilder::new(base, "./downloads".into())
//!     .skip_existing(true)
//!     .on_event(|event| println!("{}", event))
//!     .build()?;
//!
//! let reports = mirror.run().await?;
//! println!("{} archive(s) processed", reports.len());
//! # Ok(())
//! # }
//! ```

use crate::archive::extract_archive;
use crate::download::{Download, Status};
use crate::downloader::{Downloader, DownloaderBuilder};
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig};
use crate::index;

use indicatif::HumanBytes;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Callback type for pipeline events.
pub type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

/// Behaviour switches for a mirror run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Don't download archives already present at their final path.
    pub skip_existing: bool,
    /// Remove and re-create extraction folders that already exist.
    pub force_reextract: bool,
}

/// What happened to one step of an archive's pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Done,
    Skipped(String),
    Failed(String),
}

/// Per-archive record of a mirror run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Archive URL as discovered on the index page.
    pub url: Url,
    /// Local file name, `None` when the URL yields no usable name.
    pub filename: Option<String>,
    pub download: Step,
    pub extraction: Step,
}

impl ArchiveReport {
    /// `true` if any step of this archive failed.
    pub fn failed(&self) -> bool {
        matches!(self.download, Step::Failed(_)) || matches!(self.extraction, Step::Failed(_))
    }
}

/// Progress of a mirror run, reported to the `on_event` callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Scanning(Url),
    IndexFailed { url: Url, reason: String },
    Found(usize),
    NoArchives,
    InvalidFilename { url: Url, reason: String },
    SkippedDownload { filename: String },
    Downloaded { filename: String, size: u64, already_complete: bool },
    DownloadFailed { filename: String, reason: String },
    AlreadyExtracted { folder: String },
    Cleaning { folder: PathBuf },
    Extracting { filename: String, folder: String },
    Extracted { folder: PathBuf, files: usize },
    ExtractionFailed { filename: String, reason: String },
}

impl Event {
    /// Whether the event reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Event::IndexFailed { .. }
                | Event::InvalidFilename { .. }
                | Event::DownloadFailed { .. }
                | Event::ExtractionFailed { .. }
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Scanning(url) => write!(f, "[+] Scanning index: {}", url),
            Event::IndexFailed { url, reason } => {
                write!(f, "[ERROR] Failed to read directory {}: {}", url, reason)
            }
            Event::Found(count) => write!(f, "[+] Found {} zip files.", count),
            Event::NoArchives => write!(f, "[!] No .zip files found."),
            Event::InvalidFilename { url, reason } => write!(f, "[ERROR] {} ({})", reason, url),
            Event::SkippedDownload { filename } => {
                write!(f, "- Skipped (already exists): {}", filename)
            }
            Event::Downloaded {
                filename,
                size,
                already_complete: true,
            } => write!(f, "✓ {} already complete ({}).", filename, HumanBytes(*size)),
            Event::Downloaded { filename, size, .. } => {
                write!(f, "✓ {} downloaded ({}).", filename, HumanBytes(*size))
            }
            Event::DownloadFailed { filename, reason } => {
                write!(f, "[ERROR] Download failed for {}: {}", filename, reason)
            }
            Event::AlreadyExtracted { folder } => write!(f, "- Already extracted: {}", folder),
            Event::Cleaning { folder } => write!(f, "- Cleaning folder: {}", folder.display()),
            Event::Extracting { filename, folder } => {
                write!(f, "* Extracting: {} -> {}", filename, folder)
            }
            Event::Extracted { folder, files } => {
                write!(f, "✓ Extracted: {} ({} files)", folder.display(), files)
            }
            Event::ExtractionFailed { filename, reason } => {
                write!(f, "[ERROR] Extraction failed for {}: {}", filename, reason)
            }
        }
    }
}

/// A builder used to create a [`Mirror`].
pub struct MirrorBuilder {
    base_url: Url,
    destination: PathBuf,
    options: MirrorOptions,
    downloader: DownloaderBuilder,
    http: HttpClientConfig,
    on_event: Option<Arc<EventCallback>>,
}

impl MirrorBuilder {
    /// Mirror the archives linked from `base_url` into `destination`.
    pub fn new(base_url: Url, destination: PathBuf) -> Self {
        Self {
            base_url,
            destination,
            options: MirrorOptions::default(),
            downloader: DownloaderBuilder::new(),
            http: HttpClientConfig::default(),
            on_event: None,
        }
    }

    pub fn skip_existing(mut self, skip_existing: bool) -> Self {
        self.options.skip_existing = skip_existing;
        self
    }

    pub fn force_reextract(mut self, force_reextract: bool) -> Self {
        self.options.force_reextract = force_reextract;
        self
    }

    /// Set the downloader configuration. Its directory is replaced by the
    /// mirror destination.
    pub fn downloader(mut self, downloader: DownloaderBuilder) -> Self {
        self.downloader = downloader;
        self
    }

    /// Set the HTTP configuration used to fetch the index page. Its timeout
    /// bounds the whole page fetch.
    pub fn index_client(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// Set callback for every pipeline event.
    ///
    /// The progress bars are hidden while the callback runs, so it may
    /// print freely.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Create the [`Mirror`] with the specified options.
    pub fn build(self) -> Result<Mirror> {
        let downloader = self
            .downloader
            .directory(self.destination.clone())
            .build()?;
        let index_timeout = self.http.timeout;
        let client = create_http_client(self.http)?;

        Ok(Mirror {
            base_url: self.base_url,
            destination: self.destination,
            options: self.options,
            downloader,
            client,
            index_timeout,
            on_event: self.on_event,
        })
    }
}

/// Drives discovery, download and extraction for one index page.
pub struct Mirror {
    base_url: Url,
    destination: PathBuf,
    options: MirrorOptions,
    downloader: Downloader,
    client: ClientWithMiddleware,
    index_timeout: Duration,
    on_event: Option<Arc<EventCallback>>,
}

impl fmt::Debug for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirror")
            .field("base_url", &self.base_url)
            .field("destination", &self.destination)
            .field("options", &self.options)
            .field("downloader", &self.downloader)
            .finish()
    }
}

impl Mirror {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn options(&self) -> MirrorOptions {
        self.options
    }

    /// Scan the index page and process every archive it links to.
    ///
    /// Fails only if the destination root cannot be created or the index
    /// page cannot be fetched; in both cases nothing is downloaded. Per
    /// archive failures are returned in the reports.
    pub async fn run(&self) -> Result<Vec<ArchiveReport>> {
        fs::create_dir_all(&self.destination).await?;

        self.emit(Event::Scanning(self.base_url.clone()));
        let discovered = index::discover(&self.client, &self.base_url, self.index_timeout).await;
        let links = match discovered {
            Ok(links) => links,
            Err(e) => {
                self.emit(Event::IndexFailed {
                    url: self.base_url.clone(),
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        if links.is_empty() {
            self.emit(Event::NoArchives);
            return Ok(Vec::new());
        }
        self.emit(Event::Found(links.len()));

        let progress = self.downloader.progress();
        progress.set_total(links.len());

        let mut reports = Vec::with_capacity(links.len());
        for url in links {
            reports.push(self.process(url).await);
            progress.increment_main();
        }
        progress.finish();

        Ok(reports)
    }

    /// Download and extract a single archive.
    pub async fn process(&self, url: Url) -> ArchiveReport {
        let download = match Download::try_from(&url) {
            Ok(download) => download,
            Err(e) => {
                let reason = e.to_string();
                self.emit(Event::InvalidFilename {
                    url: url.clone(),
                    reason: reason.clone(),
                });
                return ArchiveReport {
                    url,
                    filename: None,
                    download: Step::Failed(reason),
                    extraction: Step::Skipped("no usable filename".into()),
                };
            }
        };
        let filename = download.filename.clone();
        let archive_path = self.downloader.output_path(&download);

        let download_step = if self.options.skip_existing && exists(&archive_path).await {
            self.emit(Event::SkippedDownload {
                filename: filename.clone(),
            });
            Step::Skipped("already exists".into())
        } else {
            let summary = self.downloader.download(&download).await;
            match summary.status() {
                Status::Fail(reason) => {
                    self.emit(Event::DownloadFailed {
                        filename: filename.clone(),
                        reason: reason.clone(),
                    });
                    return ArchiveReport {
                        url,
                        filename: Some(filename),
                        download: Step::Failed(reason.clone()),
                        extraction: Step::Skipped("download failed".into()),
                    };
                }
                status => {
                    self.emit(Event::Downloaded {
                        filename: filename.clone(),
                        size: summary.size(),
                        already_complete: *status == Status::AlreadyComplete,
                    });
                    Step::Done
                }
            }
        };

        let extraction = self.extract(&download, archive_path).await;

        ArchiveReport {
            url,
            filename: Some(filename),
            download: download_step,
            extraction,
        }
    }

    /// Extraction half of the pipeline.
    async fn extract(&self, download: &Download, archive_path: PathBuf) -> Step {
        let folder_name = download.folder_name();
        let folder = self.destination.join(&folder_name);

        if exists(&folder).await {
            if !self.options.force_reextract {
                self.emit(Event::AlreadyExtracted {
                    folder: folder_name,
                });
                return Step::Skipped("already extracted".into());
            }
            self.emit(Event::Cleaning {
                folder: folder.clone(),
            });
            remove_tree(folder.clone()).await;
        }

        self.emit(Event::Extracting {
            filename: download.filename.clone(),
            folder: folder_name,
        });
        match extract_archive(archive_path, folder.clone()).await {
            Ok(extracted) => {
                self.emit(Event::Extracted {
                    folder,
                    files: extracted.files,
                });
                Step::Done
            }
            Err(e) => {
                let reason = e.to_string();
                self.emit(Event::ExtractionFailed {
                    filename: download.filename.clone(),
                    reason: reason.clone(),
                });
                Step::Failed(reason)
            }
        }
    }

    fn emit(&self, event: Event) {
        if event.is_error() {
            warn!("{}", event);
        } else {
            debug!("{}", event);
        }
        if let Some(ref callback) = self.on_event {
            self.downloader.progress().suspend(|| callback(&event));
        }
    }
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Remove a directory tree, carrying on past entries that cannot be
/// removed.
async fn remove_tree(root: PathBuf) {
    let result = tokio::task::spawn_blocking(move || {
        let mut failures = 0usize;
        for entry in WalkDir::new(&root).contents_first(true) {
            let removed = match entry {
                Ok(entry) if entry.file_type().is_dir() => std::fs::remove_dir(entry.path()),
                Ok(entry) => std::fs::remove_file(entry.path()),
                Err(e) => Err(e.into()),
            };
            if let Err(e) = removed {
                debug!("Ignoring removal error under {:?}: {}", root, e);
                failures += 1;
            }
        }
        failures
    })
    .await;

    match result {
        Ok(0) => {}
        Ok(failures) => warn!("{} entries could not be removed", failures),
        Err(e) => warn!("{}", Error::Internal(format!("cleanup task failed: {}", e))),
    }
}
