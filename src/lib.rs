//! # sfm-undistort
//!
//! Export the images referenced by an SfM reconstruction into a flat output
//! directory, replacing lens-distorted images with geometrically undistorted
//! versions and copying distortion-free images verbatim.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sfm_undistort::{ExportConfig, Exporter, Sections, SfmData};
//!
//! let sfm = SfmData::load("sfm.json", Sections::views_and_intrinsics())?;
//! let summary = Exporter::new(ExportConfig::new("./undistorted")).run(&sfm)?;
//! assert!(summary.is_success());
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`camera`]: Pinhole intrinsics and lens distortion models
//! - [`sfm`]: Dataset model (views, intrinsics) and JSON persistence
//! - [`io`]: Image decode/encode/copy gateway
//! - [`undistort`]: Geometric undistortion remap
//! - [`export`]: Per-view decision engine and batch runner

pub mod camera;
pub mod error;
pub mod export;
pub mod io;
pub mod sfm;
pub mod undistort;

// Re-export commonly used types
pub use camera::{Distortion, Intrinsic};
pub use error::{Error, Result};
pub use export::{ExportConfig, ExportSummary, Exporter, ItemOutcome, ItemReport, Strategy};
pub use io::{FsImageIo, ImageIo};
pub use sfm::{IntrinsicId, Sections, SfmData, View, ViewId};
pub use undistort::{BLACK, undistort_image};
