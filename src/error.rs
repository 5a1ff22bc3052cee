//! Error types for sfm-undistort operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sfm-undistort operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting undistorted images.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Failed to load or parse an SfM dataset file.
    #[error("Dataset load failed: {path}: {reason}")]
    DatasetLoad {
        /// Path to the dataset file that failed to load.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to decode a source image file.
    #[error("Image load failed: {path}: {reason}")]
    ImageLoad {
        /// Path to the image that failed to decode.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to encode an image to disk.
    #[error("Image save failed: {path}: {reason}")]
    ImageSave {
        /// Destination path of the failed write.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to copy a source file to its destination.
    #[error("File copy failed: {src} -> {dst}: {reason}")]
    FileCopy {
        /// Source path.
        src: PathBuf,
        /// Destination path.
        dst: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to create the output directory.
    #[error("Output directory error: {path}: {reason}")]
    OutputDir {
        /// Output directory path.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
