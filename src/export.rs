//! Per-view export pipeline.
//!
//! For every view of a dataset the engine decides between two output
//! strategies: **remap** (decode, undistort, re-encode) when the view's
//! intrinsic is valid and carries distortion, or **copy** (byte-for-byte)
//! otherwise. Per-item failures never abort the batch; they are recorded in
//! the [`ExportSummary`] and surfaced as a single aggregate outcome.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::Rgb;
use rayon::prelude::*;

use crate::camera::Intrinsic;
use crate::error::{Error, Result};
use crate::io::{FsImageIo, ImageIo};
use crate::sfm::{SfmData, ViewId};
use crate::undistort::{BLACK, undistort_image};

/// Output strategy for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Decode the source, remove distortion, encode to the destination.
    Remap,
    /// Copy the source byte-for-byte.
    Copy,
}

impl Strategy {
    /// Decide the strategy from a resolved intrinsic.
    ///
    /// Remap requires an intrinsic that exists, is valid and carries
    /// non-zero distortion; everything else copies. Invalidity dominates the
    /// distortion flag, so an invalid-but-distorted intrinsic still copies.
    #[must_use]
    pub fn choose(intrinsic: Option<&Intrinsic>) -> Self {
        match intrinsic {
            Some(cam) if cam.is_valid() && cam.has_distortion() => Self::Remap,
            _ => Self::Copy,
        }
    }
}

/// Configuration for a batch export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory receiving the exported images. Created if absent.
    pub out_dir: PathBuf,

    /// Process views in parallel. Destinations are resolved before execution,
    /// so the parallel path produces the same files as the sequential one.
    pub parallel: bool,

    /// Fill value for border regions revealed by the undistortion.
    pub fill: Rgb<u8>,
}

impl ExportConfig {
    /// Create a configuration with sequential execution and black fill.
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            parallel: false,
            fill: BLACK,
        }
    }

    /// Enable or disable parallel execution.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the border fill value.
    #[must_use]
    pub fn with_fill(mut self, fill: Rgb<u8>) -> Self {
        self.fill = fill;
        self
    }
}

/// Transient unit of work: one view with its resolved intrinsic and paths.
struct ExportItem<'a> {
    view_id: ViewId,
    intrinsic: Option<&'a Intrinsic>,
    src: PathBuf,
    dst: PathBuf,
}

/// Terminal state of one export item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The source was decoded, undistorted and encoded.
    Remapped,
    /// The source was copied byte-for-byte.
    Copied,
    /// The item was abandoned; the batch continued.
    Failed(String),
}

impl ItemOutcome {
    /// Whether this item failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-view record in the batch summary.
#[derive(Debug, Clone)]
pub struct ItemReport {
    /// View this record belongs to.
    pub view_id: ViewId,
    /// Source image path.
    pub source: PathBuf,
    /// Destination path in the output directory.
    pub dest: PathBuf,
    /// Terminal outcome.
    pub outcome: ItemOutcome,
}

/// Aggregate result of a batch export.
///
/// Success is vacuous for an empty view set and lost as soon as any item
/// fails; it never reverts.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// One record per processed view, in view-id order.
    pub items: Vec<ItemReport>,
}

impl ExportSummary {
    /// Whether every item completed without failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.items.iter().all(|item| !item.outcome.is_failure())
    }

    /// Number of remapped items.
    #[must_use]
    pub fn remapped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Remapped))
    }

    /// Number of copied items.
    #[must_use]
    pub fn copied(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Copied))
    }

    /// Number of failed items.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ItemOutcome::is_failure)
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

/// Batch runner: iterates the dataset's views once and exports each.
pub struct Exporter<G = FsImageIo> {
    config: ExportConfig,
    io: G,
}

impl Exporter<FsImageIo> {
    /// Create an exporter backed by the real filesystem gateway.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self::with_io(config, FsImageIo)
    }
}

impl<G: ImageIo + Sync> Exporter<G> {
    /// Create an exporter with a custom I/O gateway.
    #[must_use]
    pub fn with_io(config: ExportConfig, io: G) -> Self {
        Self { config, io }
    }

    /// Export every view of the dataset.
    pub fn run(&self, sfm: &SfmData) -> Result<ExportSummary> {
        self.run_with_progress(sfm, &|_, _| {})
    }

    /// Export every view, reporting `(processed, total)` after each item.
    ///
    /// The only `Err` return is output-directory creation; per-item failures
    /// end up in the summary.
    pub fn run_with_progress(
        &self,
        sfm: &SfmData,
        progress: &(dyn Fn(usize, usize) + Sync),
    ) -> Result<ExportSummary> {
        std::fs::create_dir_all(&self.config.out_dir).map_err(|e| Error::OutputDir {
            path: self.config.out_dir.clone(),
            reason: e.to_string(),
        })?;

        let items = self.plan(sfm);
        let total = items.len();
        let done = AtomicUsize::new(0);

        let process = |item: ExportItem<'_>| {
            let outcome = self.execute(&item);
            let n = done.fetch_add(1, Ordering::SeqCst) + 1;
            progress(n, total);
            ItemReport {
                view_id: item.view_id,
                source: item.src,
                dest: item.dst,
                outcome,
            }
        };

        let items = if self.config.parallel {
            items.into_par_iter().map(process).collect()
        } else {
            items.into_iter().map(process).collect()
        };

        Ok(ExportSummary { items })
    }

    /// Build one export item per view with collision-free destinations.
    ///
    /// The source directory structure is flattened to basenames. When two
    /// views share a basename, every member of the colliding group gets its
    /// view id prepended, so no destination is silently overwritten and the
    /// naming does not depend on processing order.
    fn plan<'a>(&self, sfm: &'a SfmData) -> Vec<ExportItem<'a>> {
        let mut name_counts: HashMap<OsString, usize> = HashMap::new();
        for view in sfm.views.values() {
            *name_counts.entry(basename(&view.image_path)).or_default() += 1;
        }

        sfm.views
            .iter()
            .map(|(&view_id, view)| {
                let name = basename(&view.image_path);
                let file_name = if name_counts[&name] > 1 {
                    let mut unique = OsString::from(format!("{view_id}_"));
                    unique.push(&name);
                    unique
                } else {
                    name
                };
                ExportItem {
                    view_id,
                    intrinsic: sfm.intrinsic_for(view),
                    src: sfm.source_path(view),
                    dst: self.config.out_dir.join(file_name),
                }
            })
            .collect()
    }

    /// Run one item to its terminal state. Errors are caught here and never
    /// propagate past the batch runner.
    fn execute(&self, item: &ExportItem<'_>) -> ItemOutcome {
        let strategy = Strategy::choose(item.intrinsic);
        let result = match (strategy, item.intrinsic) {
            (Strategy::Remap, Some(cam)) => self.remap(item, cam),
            _ => self.io.copy(&item.src, &item.dst),
        };

        match result {
            Ok(()) => match strategy {
                Strategy::Remap => ItemOutcome::Remapped,
                Strategy::Copy => ItemOutcome::Copied,
            },
            Err(e) => ItemOutcome::Failed(e.to_string()),
        }
    }

    fn remap(&self, item: &ExportItem<'_>, cam: &Intrinsic) -> Result<()> {
        let src = self.io.decode(&item.src)?;
        let out = undistort_image(&src, cam, self.config.fill);
        self.io.encode(&item.dst, &out)
    }
}

fn basename(path: &std::path::Path) -> OsString {
    path.file_name()
        .map_or_else(|| path.as_os_str().to_owned(), ToOwned::to_owned)
}
