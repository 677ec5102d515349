//! Zipmirror mirrors a web directory of `.zip` archives to a local folder
//! and unpacks each archive next to it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use reqwest::Url;
//! use zipmirror::{Error, MirrorBuilder};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let base = Url::parse("https://archive.example/download/Collection/").unwrap();
//! let mirror = MirrorBuilder::new(base, "output".into())
//!     .skip_existing(true)
//!     .build()?;
//! for report in mirror.run().await? {
//!     if report.failed() {
//!         eprintln!("{} failed", report.url);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`index`] - Fetching the index page and extracting archive links
//! - [`download`] - The `Download` target, file name cleaning and summaries
//! - [`downloader`] - Resumable downloads with retries through `.part` staging files
//! - [`archive`] - Validated ZIP extraction
//! - [`mirror`] - The per-archive pipeline tying the others together
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client functionality
//! - [`progress`] - Progress bar styling and display management
//! - [`utils`] - Shared utility functions
//! - [`logging`] - Tracing subscriber setup for the binary

pub mod archive;
pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod index;
pub mod logging;
pub mod mirror;
pub mod progress;
pub mod utils;

pub use archive::{extract_archive, Extracted, ZipExtractor};
pub use download::{Download, Status, Summary};
pub use downloader::{Downloader, DownloaderBuilder};
pub use error::{Error, Result};
pub use http::{create_http_client, HttpClientConfig};
pub use index::{discover, ZipLinks};
pub use mirror::{ArchiveReport, Event, Mirror, MirrorBuilder, MirrorOptions, Step};
pub use progress::{ProgressBarOpts, StyleOptions};
