//! Archive extraction functionality.
//!
//! - [`zip`] - Validated extraction of local ZIP archives

pub mod zip;

pub use self::zip::{extract_archive, is_unsafe_entry, validate, Extracted, Validation, ZipExtractor};
