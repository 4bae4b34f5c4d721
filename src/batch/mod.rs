//! Batch driver: fan chapter folders out over a fixed-size worker pool

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use console::style;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::convert::{ConvertEngine, FolderOutcome};
use crate::error::{PagebindError, Result};

pub mod progress;

pub use progress::*;

/// Batch runner dispatching one Folder Task per chapter subdirectory.
///
/// Worker count is a fixed configuration value computed once at
/// construction; tasks acquire a semaphore permit before doing any work, so
/// at most `workers` conversions are in flight at a time.
pub struct BatchRunner {
    engine: Arc<ConvertEngine>,
    workers: usize,
    show_progress: bool,
}

impl BatchRunner {
    /// Create a runner with default options and the given pool size
    /// (None = half the CPU cores, minimum 1)
    pub fn new(workers: Option<usize>) -> Self {
        Self {
            engine: Arc::new(ConvertEngine::new()),
            workers: workers.unwrap_or_else(default_workers),
            show_progress: true,
        }
    }

    /// Create a runner from a full configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            engine: Arc::new(ConvertEngine::with_options(config.conversion.clone())),
            workers: config.batch.workers.unwrap_or_else(default_workers),
            show_progress: config.batch.progress,
        }
    }

    /// Disable the progress bar (quiet mode)
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// The fixed pool size this runner dispatches with
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Convert every chapter subdirectory of `input_root`, writing one PDF
    /// per folder into `output_dir`.
    ///
    /// The input root must exist; the output directory is created if absent.
    /// Results are collected in task-submission order regardless of
    /// completion order. A failure inside one task (e.g. the PDF write) is
    /// recorded as that folder's outcome and does not disturb its siblings.
    pub async fn run(&self, input_root: &Path, output_dir: &Path) -> Result<BatchReport> {
        let started = Instant::now();

        if !input_root.is_dir() {
            return Err(PagebindError::input_root_missing(input_root.to_path_buf()));
        }

        tokio::fs::create_dir_all(output_dir).await?;

        let folders = discover_chapter_folders(input_root)?;
        info!(
            "Dispatching {} folder tasks across {} workers",
            folders.len(),
            self.workers
        );

        let progress = Arc::new(BatchProgress::new(
            folders.len() as u64,
            self.show_progress,
        ));
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = Vec::with_capacity(folders.len());

        for folder in folders {
            let engine = Arc::clone(&self.engine);
            let semaphore = Arc::clone(&semaphore);
            let progress = Arc::clone(&progress);
            let output_dir = output_dir.to_path_buf();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();

                let outcome = match engine.convert_folder(&folder, &output_dir).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        debug!("Folder task {:?} failed: {}", folder, e);
                        FolderOutcome::failed(folder_display_name(&folder), &e)
                    }
                };

                progress.folder_done(&outcome.folder);
                outcome
            }));
        }

        // join_all yields results in submission order, not completion order
        let joined = join_all(tasks).await;
        progress.finish();

        let mut outcomes = Vec::with_capacity(joined.len());
        for task in joined {
            outcomes
                .push(task.map_err(|e| PagebindError::parallel(format!("Task join error: {}", e)))?);
        }

        Ok(BatchReport {
            outcomes,
            elapsed: started.elapsed(),
            output_dir: output_dir.to_path_buf(),
        })
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Half the available cores, at least one worker
fn default_workers() -> usize {
    (num_cpus::get() / 2).max(1)
}

/// Immediate subdirectories of the input root, in filesystem order
fn discover_chapter_folders(input_root: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();

    for entry in WalkDir::new(input_root).min_depth(1).max_depth(1) {
        let entry = entry
            .map_err(|e| PagebindError::system(format!("Failed to scan {:?}: {}", input_root, e)))?;
        if entry.file_type().is_dir() {
            folders.push(entry.into_path());
        }
    }

    Ok(folders)
}

fn folder_display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Aggregated result of one batch run
#[derive(Debug)]
pub struct BatchReport {
    /// Per-folder outcomes, in task-submission order
    pub outcomes: Vec<FolderOutcome>,
    /// Wall-clock time for the whole batch
    pub elapsed: Duration,
    /// Directory the PDFs were written to
    pub output_dir: PathBuf,
}

impl BatchReport {
    /// Count of folders that produced a PDF
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.wrote_pdf()).count()
    }

    /// Count of folders whose task failed outright
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, crate::convert::FolderStatus::Failed { .. }))
            .count()
    }

    /// Print the per-folder status lines, total elapsed milliseconds, and
    /// the output directory path
    pub fn print_summary(&self) {
        println!();
        println!("{}", style("--- Summary ---").bold());
        for outcome in &self.outcomes {
            println!("{}", outcome.status_line());
        }
        println!();
        println!("Total time: {} ms", self.elapsed.as_millis());
        println!("Output directory: {}", self.output_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::FolderStatus;
    use image::RgbImage;
    use tempfile::TempDir;

    fn write_page(dir: &Path, name: &str, value: u8) {
        let img = RgbImage::from_pixel(4, 6, image::Rgb([value, value, value]));
        img.save(dir.join(name)).unwrap();
    }

    fn outcome_for<'a>(report: &'a BatchReport, folder: &str) -> &'a FolderOutcome {
        report
            .outcomes
            .iter()
            .find(|o| o.folder == folder)
            .unwrap_or_else(|| panic!("no outcome for {}", folder))
    }

    #[tokio::test]
    async fn test_missing_input_root_fails_before_creating_output() {
        let workspace = TempDir::new().unwrap();
        let input_root = workspace.path().join("does-not-exist");
        let output_dir = workspace.path().join("does-not-exist_pdf");

        let result = BatchRunner::new(Some(2))
            .quiet()
            .run(&input_root, &output_dir)
            .await;

        assert!(matches!(
            result,
            Err(PagebindError::InputRootMissing { .. })
        ));
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn test_empty_input_root_produces_empty_report() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let report = BatchRunner::new(Some(2))
            .quiet()
            .run(input.path(), output.path())
            .await
            .unwrap();

        assert!(report.outcomes.is_empty());
        assert_eq!(report.converted(), 0);
        assert!(output.path().exists());
    }

    #[tokio::test]
    async fn test_end_to_end_batch_over_two_chapters() {
        let input = TempDir::new().unwrap();
        let ch1 = input.path().join("ch1");
        let ch2 = input.path().join("ch2");
        std::fs::create_dir(&ch1).unwrap();
        std::fs::create_dir(&ch2).unwrap();
        write_page(&ch1, "1.jpg", 30);
        write_page(&ch1, "2.jpg", 90);

        let output = TempDir::new().unwrap();
        let report = BatchRunner::new(Some(2))
            .quiet()
            .run(input.path(), output.path())
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.converted(), 1);

        assert_eq!(
            outcome_for(&report, "ch1").status_line(),
            "ch1: 2 images -> PDF"
        );
        assert_eq!(
            outcome_for(&report, "ch2").status_line(),
            "ch2: no images"
        );

        assert!(output.path().join("ch1.pdf").exists());
        assert!(!output.path().join("ch2.pdf").exists());
    }

    #[tokio::test]
    async fn test_batch_is_idempotent_over_unchanged_input() {
        let input = TempDir::new().unwrap();
        let ch1 = input.path().join("ch1");
        std::fs::create_dir(&ch1).unwrap();
        write_page(&ch1, "1.png", 10);

        let output = TempDir::new().unwrap();
        let runner = BatchRunner::new(Some(1)).quiet();

        let first = runner.run(input.path(), output.path()).await.unwrap();
        let second = runner.run(input.path(), output.path()).await.unwrap();

        assert_eq!(first.outcomes.len(), second.outcomes.len());
        assert_eq!(
            first.outcomes[0].status_line(),
            second.outcomes[0].status_line()
        );
        assert!(output.path().join("ch1.pdf").exists());
    }

    #[tokio::test]
    async fn test_write_failure_is_isolated_to_its_folder() {
        let input = TempDir::new().unwrap();
        let ch1 = input.path().join("ch1");
        let ch2 = input.path().join("ch2");
        std::fs::create_dir(&ch1).unwrap();
        std::fs::create_dir(&ch2).unwrap();
        write_page(&ch1, "1.png", 10);
        write_page(&ch2, "1.png", 20);

        let output = TempDir::new().unwrap();
        // Occupy ch1's output path with a directory so the write must fail
        std::fs::create_dir(output.path().join("ch1.pdf")).unwrap();

        let report = BatchRunner::new(Some(2))
            .quiet()
            .run(input.path(), output.path())
            .await
            .unwrap();

        assert!(matches!(
            outcome_for(&report, "ch1").status,
            FolderStatus::Failed { .. }
        ));
        assert_eq!(
            outcome_for(&report, "ch2").status_line(),
            "ch2: 1 images -> PDF"
        );
        assert!(output.path().join("ch2.pdf").exists());
        assert_eq!(report.failed(), 1);
        assert_eq!(report.converted(), 1);
    }

    #[tokio::test]
    async fn test_files_in_the_root_are_not_tasks() {
        let input = TempDir::new().unwrap();
        write_page(input.path(), "stray.jpg", 5);
        let ch1 = input.path().join("ch1");
        std::fs::create_dir(&ch1).unwrap();
        write_page(&ch1, "1.jpg", 15);

        let output = TempDir::new().unwrap();
        let report = BatchRunner::new(Some(1))
            .quiet()
            .run(input.path(), output.path())
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].folder, "ch1");
    }

    #[test]
    fn test_default_worker_count_is_at_least_one() {
        assert!(default_workers() >= 1);
        assert!(default_workers() <= num_cpus::get());
    }
}
