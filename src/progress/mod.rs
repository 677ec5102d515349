//! Progress module containing progress bar functionality.
//!
//! - `style` - Progress bar styling options and templates
//! - `display` - Progress bar display management and coordination
//!
//! ```rust
//! use zipmirror::downloader::DownloaderBuilder;
//! use zipmirror::progress::StyleOptions;
//!
//! # fn example() -> Result<(), zipmirror::Error> {
//! let downloader = DownloaderBuilder::new()
//!     .style_options(StyleOptions::hidden())
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub(crate) mod display;
pub(crate) mod style;

pub use display::{ProgressDisplay, REFRESH_RATE};
pub use style::{ProgressBarOpts, StyleOptions};
