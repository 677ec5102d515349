//! Index page scanning.
//!
//! - [`links`] - Fetching the directory page and extracting `.zip` links

pub mod links;

pub use links::{discover, fetch_index, is_zip_url, ZipLinks};
