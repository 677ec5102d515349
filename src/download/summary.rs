//! Download summary functionality.
//!
//! A [`Summary`] records how a transfer ended. Its [`Status`] is the
//! tri-state outcome of the resumable downloader: the file was transferred
//! (possibly resuming a staged partial file), the staged file was already
//! complete, or the transfer failed.
//!
//! ```rust
//! use zipmirror::download::{Download, Status, Summary};
//! use std::convert::TryFrom;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let download = Download::try_from("https://example.com/file.zip")?;
//! let summary = Summary::new(download, 2048, 1024).with_status(Status::Success);
//!
//! assert!(summary.status().is_done());
//! assert!(summary.resumed());
//! # Ok(())
//! # }
//! ```

use super::download::Download;

/// Download status enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Download not yet started
    NotStarted,
    /// Bytes were transferred and the file was promoted
    Success,
    /// The staged file already held every byte and was promoted as is
    AlreadyComplete,
    /// Download failed with error message
    Fail(String),
}

impl Status {
    /// `true` when the file is in place at its final path.
    pub fn is_done(&self) -> bool {
        matches!(self, Status::Success | Status::AlreadyComplete)
    }
}

/// Represents a [`Download`] summary.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Downloaded item.
    download: Download,
    /// Size of the file on disk in bytes.
    size: u64,
    /// Offset the transfer resumed from, 0 for a fresh transfer.
    resumed_from: u64,
    /// Status.
    status: Status,
}

impl Summary {
    /// Create a new [`Download`] [`Summary`].
    pub fn new(download: Download, size: u64, resumed_from: u64) -> Self {
        Self {
            download,
            size,
            resumed_from,
            status: Status::NotStarted,
        }
    }

    /// Attach a status to a download summary.
    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    /// Get the summary's download.
    pub fn download(&self) -> &Download {
        &self.download
    }

    /// Get the summary's size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Offset the transfer resumed from.
    pub fn resumed_from(&self) -> u64 {
        self.resumed_from
    }

    /// Whether the transfer continued a staged partial file.
    pub fn resumed(&self) -> bool {
        self.resumed_from > 0
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn fail(self, msg: impl std::fmt::Display) -> Self {
        Self {
            status: Status::Fail(format!("{}", msg)),
            ..self
        }
    }
}
