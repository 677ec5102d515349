//! Downloader module containing the resumable downloader, its builder and
//! configuration.
//!
//! - `downloader` - Core Downloader struct with the staged, retried transfer
//! - `builder` - DownloaderBuilder for flexible configuration
//! - `config` - Configuration structures and callback types
//!
//! ```rust,no_run
//! use zipmirror::downloader::{DownloaderBuilder, Transfer};
//! use zipmirror::download::Download;
//! use std::convert::TryFrom;
//!
//! # async fn example() -> Result<(), zipmirror::Error> {
//! let downloader = DownloaderBuilder::new().retries(3).build()?;
//! let download = Download::try_from("https://example.com/file1.zip")?;
//!
//! match downloader.fetch(&download).await? {
//!     Transfer::Completed { size, resumed_from } => {
//!         println!("fetched {} bytes, resumed at {}", size, resumed_from)
//!     }
//!     Transfer::AlreadyComplete { size } => println!("already had {} bytes", size),
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;

pub use builder::DownloaderBuilder;
pub use config::{DownloadCallback, DownloaderConfig, CHUNK_SIZE};
pub use downloader::{Downloader, Transfer};
