//! Error types and handling for Pagebind

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Pagebind operations
pub type Result<T> = std::result::Result<T, PagebindError>;

/// Main error type for Pagebind operations
#[derive(Debug, Error)]
pub enum PagebindError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image decoding errors
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Input root directory does not exist
    #[error("Input folder not found: {path:?}")]
    InputRootMissing { path: PathBuf },

    /// File format not supported
    #[error("Unsupported image format: {format} (file: {file:?})")]
    UnsupportedFormat {
        format: String,
        file: Option<PathBuf>,
    },

    /// A single page failed to decode
    #[error("Failed to decode page {file:?}: {message}")]
    PageDecode { file: PathBuf, message: String },

    /// PDF assembly or write failed
    #[error("Failed to write PDF {file:?}: {message}")]
    PdfWrite { file: PathBuf, message: String },

    /// File size too large
    #[error("File too large: {size} bytes (limit: {limit} bytes, file: {file:?})")]
    FileTooLarge { size: u64, limit: u64, file: PathBuf },

    /// Invalid parameters
    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    /// Parallel processing errors
    #[error("Parallel processing error: {message}")]
    ParallelError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),

    /// System resource errors
    #[error("System resource error: {message}")]
    SystemError { message: String },
}

impl PagebindError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new input-root-missing error
    pub fn input_root_missing(path: PathBuf) -> Self {
        Self::InputRootMissing { path }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S, file: Option<PathBuf>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
            file,
        }
    }

    /// Create a new page decode error
    pub fn page_decode<S: Into<String>>(file: PathBuf, message: S) -> Self {
        Self::PageDecode {
            file,
            message: message.into(),
        }
    }

    /// Create a new PDF write error
    pub fn pdf_write<S: Into<String>>(file: PathBuf, message: S) -> Self {
        Self::PdfWrite {
            file,
            message: message.into(),
        }
    }

    /// Create a new file too large error
    pub fn file_too_large(size: u64, limit: u64, file: PathBuf) -> Self {
        Self::FileTooLarge { size, limit, file }
    }

    /// Create a new invalid parameters error
    pub fn invalid_parameters<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a new parallel processing error
    pub fn parallel<S: Into<String>>(message: S) -> Self {
        Self::ParallelError {
            message: message.into(),
        }
    }

    /// Create a new system error
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::SystemError {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (the batch can continue)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // These errors affect a single page or folder; siblings continue
            Self::IoError(_)
            | Self::ImageError(_)
            | Self::UnsupportedFormat { .. }
            | Self::PageDecode { .. }
            | Self::PdfWrite { .. }
            | Self::FileTooLarge { .. } => true,

            // These errors should stop the whole run
            Self::ConfigError { .. }
            | Self::InputRootMissing { .. }
            | Self::InvalidParameters { .. }
            | Self::ParallelError { .. }
            | Self::SerdeError(_)
            | Self::SystemError { .. } => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::UnsupportedFormat { file, .. } => file.as_ref(),
            Self::PageDecode { file, .. }
            | Self::PdfWrite { file, .. }
            | Self::FileTooLarge { file, .. } => Some(file),
            Self::InputRootMissing { path } => Some(path),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("File system error: {}", e),
            Self::ImageError(e) => format!("Image decoding failed: {}", e),
            Self::InputRootMissing { path } => {
                format!(
                    "Input folder {:?} does not exist. Nothing to convert.",
                    path
                )
            }
            Self::UnsupportedFormat { format, .. } => {
                format!(
                    "Unsupported image format: {}. Supported formats: JPEG, PNG, WebP",
                    format
                )
            }
            Self::FileTooLarge { size, limit, .. } => {
                format!(
                    "File is too large ({:.2} MB). Maximum supported: {:.2} MB",
                    *size as f64 / 1024.0 / 1024.0,
                    *limit as f64 / 1024.0 / 1024.0
                )
            }
            other => other.to_string(),
        }
    }
}

// Convert serde errors to our error type
impl From<toml::de::Error> for PagebindError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for PagebindError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}
