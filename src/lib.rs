//! Pagebind - Batch Page-Image to PDF Binder
//!
//! Converts folders of sequentially numbered page images into per-folder
//! PDF documents, parallelized across folders with a fixed-size worker
//! pool. Designed for archiving scanned chapters, comics, and other
//! page-per-file image trees.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagebind::BatchRunner;
//! use std::path::Path;
//!
//! # async fn run() -> pagebind::Result<()> {
//! let runner = BatchRunner::new(None); // half the CPU cores
//! let report = runner
//!     .run(Path::new("readoshino.com"), Path::new("readoshino.com_pdf"))
//!     .await?;
//!
//! report.print_summary();
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;

// Re-export commonly used types
pub use batch::{BatchReport, BatchRunner};
pub use config::{BatchConfig, Config, ConversionConfig};
pub use convert::{ConvertEngine, FolderOutcome, FolderStatus};
pub use error::{PagebindError, Result};

use tracing::{info, warn};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the Pagebind library with default settings
///
/// This sets up logging and validates system requirements. Should be
/// called once at program start.
pub fn init() -> Result<()> {
    // Initialize tracing subscriber if not already set
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .finish(),
    )
    .is_ok()
    {
        info!("Pagebind v{} initialized", VERSION);
    }

    validate_system_requirements()?;

    Ok(())
}

/// Initialize with custom configuration
pub fn init_with_config(config: &Config) -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.level))
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        info!("Pagebind v{} initialized with custom config", VERSION);
    }

    validate_system_requirements()?;

    Ok(())
}

fn validate_system_requirements() -> Result<()> {
    use sysinfo::{System, SystemExt};

    let mut system = System::new_all();
    system.refresh_all();

    // Check available memory
    let available_memory = system.available_memory();
    const MIN_MEMORY_MB: u64 = 512; // 512MB minimum

    if available_memory < MIN_MEMORY_MB * 1024 * 1024 {
        warn!(
            "Low available memory: {}MB (recommended: >{}MB)",
            available_memory / (1024 * 1024),
            MIN_MEMORY_MB
        );
    }

    // Check CPU count
    let cpu_count = system.physical_core_count().unwrap_or(1);
    info!("Detected {} CPU cores", cpu_count);

    // Validate image library capabilities
    info!("Page format support:");
    info!("  JPEG: {}", image::ImageFormat::Jpeg.can_read());
    info!("  PNG: {}", image::ImageFormat::Png.can_read());
    info!("  WebP: {}", image::ImageFormat::WebP.can_read());

    Ok(())
}
