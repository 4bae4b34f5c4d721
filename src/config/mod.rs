//! Configuration management for Pagebind

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PagebindError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-folder conversion settings
    pub conversion: ConversionConfig,

    /// Batch scheduling settings
    pub batch: BatchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Per-folder conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Resolution used to derive PDF page dimensions from pixel dimensions
    pub dpi: f32,

    /// Maximum page file size to decode (in bytes)
    pub max_file_size: u64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            max_file_size: 500 * 1024 * 1024, // 500MB
        }
    }
}

/// Batch scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of concurrent folder tasks (None = half the CPU cores, min 1)
    pub workers: Option<usize>,

    /// Suffix appended to the input root to form the default output directory
    pub output_suffix: String,

    /// Enable the progress bar
    pub progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: None, // Auto-detect
            output_suffix: "_pdf".to_string(),
            progress: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (None = stdout)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            PagebindError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(PagebindError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| PagebindError::config(format!("TOML serialization failed: {}", e)))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| PagebindError::config(format!("YAML serialization failed: {}", e)))?,
            _ => {
                return Err(PagebindError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        std::fs::write(&path, content).map_err(|e| {
            PagebindError::config(format!(
                "Failed to write config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.batch.workers {
            if workers == 0 {
                return Err(PagebindError::config("Worker count must be greater than 0"));
            }
        }

        if self.batch.output_suffix.is_empty() {
            return Err(PagebindError::config(
                "Output suffix must not be empty (output would collide with the input root)",
            ));
        }

        if !(10.0..=1200.0).contains(&self.conversion.dpi) {
            return Err(PagebindError::config(format!(
                "DPI must be between 10 and 1200, got {}",
                self.conversion.dpi
            )));
        }

        if self.conversion.max_file_size == 0 {
            return Err(PagebindError::config(
                "Maximum file size must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Config) -> Self {
        if other.batch.workers.is_some() {
            self.batch.workers = other.batch.workers;
        }
        self.batch.output_suffix = other.batch.output_suffix;
        self.batch.progress = other.batch.progress;
        self.conversion = other.conversion;
        self.logging = other.logging;
        self
    }

    /// Default output directory for a given input root
    pub fn output_dir_for(&self, input_root: &Path) -> PathBuf {
        let mut name = input_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input_root.to_string_lossy().into_owned());
        name.push_str(&self.batch.output_suffix);
        input_root.with_file_name(name)
    }
}
