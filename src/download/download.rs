//! Download targets.
//!
//! A [`Download`] pairs an archive URL with the local filename derived from
//! it. The filename is the URL's last path segment, percent-decoded and
//! stripped of characters that are invalid on common filesystems.
//!
//! ```rust
//! use zipmirror::download::Download;
//! use std::convert::TryFrom;
//!
//! let download = Download::try_from("https://example.com/roms/Game%20One%3F.zip")?;
//! assert_eq!(download.filename, "Game One.zip");
//! assert_eq!(download.staging_filename(), "Game One.zip.part");
//! assert_eq!(download.folder_name(), "Game One");
//! # Ok::<(), zipmirror::Error>(())
//! ```

use crate::error::Error;
use crate::utils::header_content_length;

use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::convert::TryFrom;
use std::path::Path;

/// Characters rejected by at least one common filesystem.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Suffix appended to the filename while a transfer is incomplete.
pub const STAGING_SUFFIX: &str = ".part";

/// Represents a file to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// URL of the file to download.
    pub url: Url,
    /// File name used to save the file on disk.
    pub filename: String,
}

impl Download {
    /// Creates a new [`Download`] with an explicit file name.
    ///
    /// [`Download::try_from`] derives and cleans the name from the URL
    /// instead.
    pub fn new(url: &Url, filename: &str) -> Self {
        Self {
            url: url.clone(),
            filename: String::from(filename),
        }
    }

    /// Name of the staging file the transfer writes to.
    pub fn staging_filename(&self) -> String {
        format!("{}{}", self.filename, STAGING_SUFFIX)
    }

    /// Name of the folder the archive is unpacked into: the file name
    /// without its extension.
    pub fn folder_name(&self) -> String {
        Path::new(&self.filename)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.clone())
    }

    /// Retrieve the size announced by a HEAD request.
    ///
    /// Returns `None` if the server answers with a non-success status or if
    /// the "content-length" header is missing or not an u64.
    pub async fn content_length(
        &self,
        client: &ClientWithMiddleware,
    ) -> Result<Option<u64>, reqwest_middleware::Error> {
        let res = client.head(self.url.clone()).send().await?;
        if !res.status().is_success() {
            return Ok(None);
        }
        Ok(header_content_length(res.headers()))
    }
}

/// Clean a decoded file name so it can be used on disk.
///
/// Removes `< > : " / \ | ? *` and control characters, then trims
/// surrounding whitespace. Fails when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Result<String, Error> {
    let cleaned: String = name
        .chars()
        .filter(|c| !INVALID_CHARS.contains(c) && !c.is_control())
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => Err(Error::InvalidFilename(name.to_string())),
        _ => Ok(cleaned.to_string()),
    }
}

/// Check that `filename` minus its extension names a folder of its own
/// next to the file.
///
/// Rejects stems that resolve to the directory itself or its parent, as
/// with `..zip` or `...zip`, and names without an extension, whose folder
/// would collide with the file.
pub fn check_folder_name(filename: &str) -> Result<(), Error> {
    let stem = Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    match stem.as_str() {
        "" | "." | ".." => Err(Error::InvalidFilename(filename.to_string())),
        _ if stem == filename || stem.contains(['/', '\\']) => {
            Err(Error::InvalidFilename(filename.to_string()))
        }
        _ => Ok(()),
    }
}

impl TryFrom<&Url> for Download {
    type Error = crate::error::Error;

    fn try_from(value: &Url) -> Result<Self, Self::Error> {
        let segment = value
            .path_segments()
            .ok_or_else(|| {
                Error::InvalidUrl(format!(
                    "The url \"{}\" does not contain a valid path",
                    value
                ))
            })?
            .next_back()
            .ok_or_else(|| {
                Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", value))
            })?;

        let decoded = urlencoding::decode_binary(segment.as_bytes());
        let filename = sanitize_filename(&String::from_utf8_lossy(&decoded))?;
        check_folder_name(&filename)?;

        Ok(Download {
            url: value.clone(),
            filename,
        })
    }
}

impl TryFrom<&str> for Download {
    type Error = crate::error::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Url::parse(value)
            .map_err(|e| {
                Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e))
            })
            .and_then(|u| Download::try_from(&u))
    }
}
