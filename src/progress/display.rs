//! Progress bar display management and coordination.
//!
//! [`ProgressDisplay`] owns the `MultiProgress` the main bar and the
//! per-transfer child bars are drawn on. Drawing is rate-limited to twice
//! per second.
//!
//! ```rust,no_run
//! use zipmirror::progress::{ProgressDisplay, StyleOptions};
//!
//! let display = ProgressDisplay::new(StyleOptions::default());
//! display.set_total(3);
//!
//! let pb = display.create_child_progress("game.zip", Some(1024), 512);
//! pb.inc(512);
//! display.finish_child(pb);
//! display.increment_main();
//! display.finish();
//! ```

use crate::progress::StyleOptions;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::sync::Arc;

/// Redraws per second.
pub const REFRESH_RATE: u8 = 2;

/// Progress display manager that coordinates multiple progress bars.
#[derive(Clone)]
pub struct ProgressDisplay {
    /// The multi-progress instance for coordinating multiple progress bars.
    multi: Arc<MultiProgress>,
    /// The main progress bar for overall progress.
    main: Arc<ProgressBar>,
    /// Style options for progress bars.
    style_options: StyleOptions,
}

impl std::fmt::Debug for ProgressDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressDisplay")
            .field("style_options", &self.style_options)
            .finish()
    }
}

impl ProgressDisplay {
    /// Create a new progress display manager.
    ///
    /// The main bar starts with a length of zero; call
    /// [`ProgressDisplay::set_total`] once the number of archives is known.
    pub fn new(style_options: StyleOptions) -> Self {
        let multi = match style_options.is_enabled() {
            true => Arc::new(MultiProgress::with_draw_target(
                ProgressDrawTarget::stdout_with_hz(REFRESH_RATE),
            )),
            false => Arc::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden())),
        };

        let main = if style_options.main().enabled {
            Arc::new(multi.add(style_options.main().to_progress_bar(Some(0))))
        } else {
            // Create a completely hidden progress bar that's not added to MultiProgress
            Arc::new(ProgressBar::hidden())
        };

        Self {
            multi,
            main,
            style_options,
        }
    }

    /// Get the main progress bar.
    pub fn main(&self) -> Arc<ProgressBar> {
        self.main.clone()
    }

    /// Set the number of archives the main bar counts towards.
    pub fn set_total(&self, total: usize) {
        self.main.set_length(total as u64);
        self.main.tick();
    }

    /// Create a child progress bar for a single transfer.
    ///
    /// # Arguments
    /// * `name` - File name shown next to the bar
    /// * `size` - Total size, `None` when unknown
    /// * `position` - Starting position (for resume functionality)
    pub fn create_child_progress(&self, name: &str, size: Option<u64>, position: u64) -> ProgressBar {
        let pb = self
            .style_options
            .child()
            .to_progress_bar(size)
            .with_position(position)
            .with_message(name.to_string());
        self.multi.add(pb)
    }

    /// Increment the main progress bar by one.
    pub fn increment_main(&self) {
        self.main.inc(1);
    }

    /// Run `f` with the bars hidden, so it can print to the terminal.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.multi.suspend(f)
    }

    /// Finish the progress display, clearing or keeping the main bar based
    /// on configuration.
    pub fn finish(&self) {
        if self.style_options.main().clear {
            self.main.finish_and_clear();
        } else {
            self.main.finish();
        }
    }

    /// Finish a child progress bar based on configuration.
    pub fn finish_child(&self, pb: ProgressBar) {
        if self.style_options.child().clear {
            pb.finish_and_clear();
        } else {
            pb.finish();
        }
        self.multi.remove(&pb);
    }

    /// Abandon a child progress bar after a failed transfer.
    pub fn abandon_child(&self, pb: ProgressBar) {
        pb.finish_and_clear();
        self.multi.remove(&pb);
    }
}
