//! Progress reporting for the batch run

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over folder tasks, one tick per completed folder.
///
/// Constructed disabled for quiet runs and for machine-driven contexts so
/// callers never have to branch around it.
pub struct BatchProgress {
    bar: Option<ProgressBar>,
}

impl BatchProgress {
    /// Create a progress bar over `total` folders
    pub fn new(total: u64, enabled: bool) -> Self {
        if !enabled {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} folders ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar: Some(bar) }
    }

    /// Record a completed folder and show its name
    pub fn folder_done(&self, name: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(name.to_string());
            bar.inc(1);
        }
    }

    /// Finish the bar
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
