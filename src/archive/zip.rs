//! ZIP file extraction implementation.
//!
//! Archives come from an untrusted server. Before anything is written the
//! stored path of every entry is checked, and a single absolute path or
//! `..` segment rejects the whole archive. Only then are entries expanded
//! below the target directory.

use crate::error::{Error, Result};

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

/// Outcome of checking an archive's entry paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Every entry stays inside the target directory.
    Safe,
    /// Entries that would escape the target directory, in archive order.
    Rejected(Vec<String>),
}

/// What an extraction wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extracted {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// Whether a stored entry path is absolute or climbs out with `..`.
///
/// Both `/` and `\` count as separators, and a drive prefix such as `C:`
/// counts as absolute, whatever platform we run on.
pub fn is_unsafe_entry(name: &str) -> bool {
    let normalized = name.replace('\\', "/");
    let bytes = normalized.as_bytes();

    if normalized.starts_with('/') || Path::new(name).is_absolute() {
        return true;
    }
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return true;
    }
    normalized.split('/').any(|segment| segment == "..")
}

/// Check the stored path of every entry without reading any entry data.
///
/// An entry is rejected when its name is unsafe or when the zip crate
/// cannot map it below the target, e.g. a name holding a NUL byte.
pub fn validate<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Validation> {
    let mut rejected = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if is_unsafe_entry(entry.name()) || entry.enclosed_name().is_none() {
            rejected.push(entry.name().to_string());
        }
    }

    if rejected.is_empty() {
        Ok(Validation::Safe)
    } else {
        Ok(Validation::Rejected(rejected))
    }
}

/// Extractor for local ZIP archives.
pub struct ZipExtractor;

impl ZipExtractor {
    /// Extract `archive_path` into `target`, creating it if absent.
    ///
    /// Fails with [`Error::UnsafeArchive`] before touching the filesystem if
    /// any entry path is unsafe. A write failure midway leaves the entries
    /// written so far in place.
    pub fn extract(archive_path: &Path, target: &Path) -> Result<Extracted> {
        debug!(?archive_path, ?target, "attempting ZIP extraction");

        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        if let Validation::Rejected(entries) = validate(&mut archive)? {
            return Err(Error::UnsafeArchive {
                archive: archive_path.to_path_buf(),
                entries,
            });
        }

        fs::create_dir_all(target)?;

        let mut extracted = Extracted::default();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let relative = match entry.enclosed_name() {
                Some(path) => path.to_path_buf(),
                None => {
                    return Err(Error::UnsafeArchive {
                        archive: archive_path.to_path_buf(),
                        entries: vec![entry.name().to_string()],
                    })
                }
            };
            let out_path = target.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
                extracted.directories += 1;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&out_path)?;
            extracted.bytes += io::copy(&mut entry, &mut outfile)?;
            extracted.files += 1;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o777))?;
                }
            }
        }

        info!(
            ?archive_path,
            files = extracted.files,
            directories = extracted.directories,
            "ZIP extraction successful"
        );
        Ok(extracted)
    }
}

/// Run [`ZipExtractor::extract`] on the blocking thread pool.
pub async fn extract_archive(archive_path: PathBuf, target: PathBuf) -> Result<Extracted> {
    tokio::task::spawn_blocking(move || ZipExtractor::extract(&archive_path, &target))
        .await
        .map_err(|e| Error::Internal(format!("extraction task failed: {}", e)))?
}
