//! Download targets and transfer summaries.
//!
//! - [`download`] - The [`Download`] target and file name cleaning
//! - [`summary`] - Transfer outcome tracking

pub mod download;
pub mod summary;

pub use download::{check_folder_name, sanitize_filename, Download, STAGING_SUFFIX};
pub use summary::{Status, Summary};
