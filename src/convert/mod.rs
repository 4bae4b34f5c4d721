//! Per-folder conversion: page images in, one PDF document out

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tokio::fs;
use tracing::{debug, warn};

use crate::config::ConversionConfig;
use crate::error::{PagebindError, Result};

pub mod pages;
pub mod pdf;

pub use pages::*;
pub use pdf::*;

/// File size above which pages are decoded through a memory map
const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Conversion engine executing one Folder Task at a time.
///
/// A Folder Task lists the page images of a chapter folder, decodes them in
/// reading order, and assembles the survivors into a single multi-page PDF
/// named after the folder.
pub struct ConvertEngine {
    options: ConversionConfig,
}

impl ConvertEngine {
    /// Create an engine with default conversion options
    pub fn new() -> Self {
        Self {
            options: ConversionConfig::default(),
        }
    }

    /// Create an engine with custom conversion options
    pub fn with_options(options: ConversionConfig) -> Self {
        Self { options }
    }

    /// Convert one chapter folder into `output_dir/<folder_name>.pdf`.
    ///
    /// Individual pages that fail to decode are logged and skipped; the
    /// output file is only written when at least one page decoded. The
    /// returned outcome carries the exact per-folder status line.
    pub async fn convert_folder(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<FolderOutcome> {
        let folder = folder_name(input_dir);
        debug!("Converting folder {:?}", input_dir);

        let mut files = pages::list_pages(input_dir)?;
        if files.is_empty() {
            return Ok(FolderOutcome::new(folder, FolderStatus::NoImages));
        }

        pages::sort_pages(&mut files);
        let matched = files.len();

        let mut decoded = Vec::with_capacity(matched);
        for file in &files {
            match self.load_page(file).await {
                Ok(page) => decoded.push(page),
                Err(e) => warn!("Skipping page {:?}: {}", file, e.user_message()),
            }
        }

        if decoded.is_empty() {
            return Ok(FolderOutcome::new(folder, FolderStatus::NoValidImages));
        }

        let written = decoded.len();
        let output = output_dir.join(format!("{}.pdf", folder));
        let assembler = PdfAssembler::new(self.options.dpi);

        let title = folder.clone();
        let output_path = output.clone();
        tokio::task::spawn_blocking(move || {
            assembler.write_pdf(&title, &decoded, &output_path)
        })
        .await
        .map_err(|e| PagebindError::system(format!("Task join error: {}", e)))??;

        Ok(FolderOutcome::new(
            folder,
            FolderStatus::Converted {
                matched,
                written,
                output,
            },
        ))
    }

    /// Load one page file and normalize it to 8-bit RGB
    async fn load_page(&self, path: &Path) -> Result<DynamicImage> {
        let metadata = fs::metadata(path).await?;
        let file_size = metadata.len();

        if file_size > self.options.max_file_size {
            return Err(PagebindError::file_too_large(
                file_size,
                self.options.max_file_size,
                path.to_path_buf(),
            ));
        }

        let image = if file_size > MMAP_THRESHOLD {
            self.decode_mmap(path).await?
        } else {
            self.decode_standard(path).await?
        };

        debug!(
            "Loaded page {:?} ({}x{}, {:.2}MB)",
            path,
            image.width(),
            image.height(),
            file_size as f64 / 1024.0 / 1024.0
        );

        // PDF pages are always written from a fixed 3-channel representation
        Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
    }

    /// Decode using standard file I/O
    async fn decode_standard(&self, path: &Path) -> Result<DynamicImage> {
        let data = fs::read(path).await?;

        let image = tokio::task::spawn_blocking({
            let path = path.to_path_buf();
            move || -> Result<DynamicImage> {
                image::load_from_memory(&data)
                    .map_err(|e| PagebindError::page_decode(path, e.to_string()))
            }
        })
        .await
        .map_err(|e| PagebindError::system(format!("Task join error: {}", e)))??;

        Ok(image)
    }

    /// Decode through a memory map (for large files)
    async fn decode_mmap(&self, path: &Path) -> Result<DynamicImage> {
        use memmap2::MmapOptions;
        use std::fs::File;

        debug!("Using memory mapping for large page: {:?}", path);

        let file = File::open(path)?;
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        let image = tokio::task::spawn_blocking({
            let path = path.to_path_buf();
            move || -> Result<DynamicImage> {
                image::load_from_memory(&mmap)
                    .map_err(|e| PagebindError::page_decode(path, e.to_string()))
            }
        })
        .await
        .map_err(|e| PagebindError::system(format!("Task join error: {}", e)))??;

        Ok(image)
    }
}

impl Default for ConvertEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of converting one chapter folder
#[derive(Debug, Clone)]
pub struct FolderOutcome {
    /// Folder name, used as the output file stem and in the status line
    pub folder: String,
    /// Terminal status of the task
    pub status: FolderStatus,
}

/// Terminal status of a Folder Task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderStatus {
    /// No files matched the recognized page extensions
    NoImages,
    /// Files matched, but none of them decoded
    NoValidImages,
    /// A PDF was written
    Converted {
        /// Count of extension-matched files; this is what the status line
        /// reports even when some pages were skipped
        matched: usize,
        /// Count of pages actually written
        written: usize,
        /// Path of the written document
        output: PathBuf,
    },
    /// The task itself failed (e.g. the PDF could not be written)
    Failed { message: String },
}

impl FolderOutcome {
    /// Create an outcome for a folder
    pub fn new(folder: String, status: FolderStatus) -> Self {
        Self { folder, status }
    }

    /// Create a failed outcome from a task-level error
    pub fn failed(folder: String, error: &PagebindError) -> Self {
        Self {
            folder,
            status: FolderStatus::Failed {
                message: error.user_message(),
            },
        }
    }

    /// Whether this outcome produced an output document
    pub fn wrote_pdf(&self) -> bool {
        matches!(self.status, FolderStatus::Converted { .. })
    }

    /// The one-line per-folder status for the batch report
    pub fn status_line(&self) -> String {
        match &self.status {
            FolderStatus::NoImages => format!("{}: no images", self.folder),
            FolderStatus::NoValidImages => format!("{}: no valid images", self.folder),
            FolderStatus::Converted { matched, .. } => {
                format!("{}: {} images -> PDF", self.folder, matched)
            }
            FolderStatus::Failed { message } => {
                format!("{}: PDF write failed: {}", self.folder, message)
            }
        }
    }
}

/// Derive the display/output name of a chapter folder from its path
fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
