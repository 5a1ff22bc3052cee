//! SfM dataset model: views and their camera intrinsics.
//!
//! The dataset is persisted as a JSON document with a `root_path`, a `views`
//! map and an `intrinsics` map. Sections not requested by the caller are
//! dropped after parsing, and sections absent from the file are never
//! required — a reconstruction that only carries views still loads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::Intrinsic;
use crate::error::{Error, Result};

/// Identifier of a view within a dataset.
pub type ViewId = u32;

/// Identifier of an intrinsic within a dataset.
pub type IntrinsicId = u32;

/// One recorded camera capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Image path relative to the dataset root.
    pub image_path: PathBuf,

    /// Associated intrinsic, if any. `None` models a view whose camera was
    /// never calibrated.
    #[serde(default)]
    pub intrinsic_id: Option<IntrinsicId>,
}

/// Which dataset sections a load should populate.
#[derive(Debug, Clone, Copy)]
pub struct Sections {
    /// Populate the views map.
    pub views: bool,
    /// Populate the intrinsics map.
    pub intrinsics: bool,
}

impl Sections {
    /// Everything the export pipeline needs.
    #[must_use]
    pub fn views_and_intrinsics() -> Self {
        Self { views: true, intrinsics: true }
    }
}

/// A loaded SfM reconstruction, restricted to views and intrinsics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SfmData {
    /// Root directory the per-view image paths are relative to.
    #[serde(default)]
    pub root_path: PathBuf,

    /// Views keyed by identifier. Ordered so enumeration is deterministic.
    #[serde(default)]
    pub views: BTreeMap<ViewId, View>,

    /// Intrinsics keyed by identifier.
    #[serde(default)]
    pub intrinsics: BTreeMap<IntrinsicId, Intrinsic>,
}

impl SfmData {
    /// Load a dataset from a JSON file, keeping only the requested sections.
    ///
    /// Unknown sections in the file are ignored; requested sections missing
    /// from the file load as empty maps.
    pub fn load(path: impl AsRef<Path>, sections: Sections) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::DatasetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut data: SfmData =
            serde_json::from_str(&content).map_err(|e| Error::DatasetLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if !sections.views {
            data.views.clear();
        }
        if !sections.intrinsics {
            data.intrinsics.clear();
        }
        Ok(data)
    }

    /// Save the dataset to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Resolve the intrinsic associated with a view.
    ///
    /// Returns `None` when the view has no intrinsic id as well as when the
    /// id is not a key of the intrinsics map; both collapse to "no intrinsic"
    /// for the export decision.
    #[must_use]
    pub fn intrinsic_for(&self, view: &View) -> Option<&Intrinsic> {
        view.intrinsic_id.and_then(|id| self.intrinsics.get(&id))
    }

    /// Absolute path of a view's source image.
    #[must_use]
    pub fn source_path(&self, view: &View) -> PathBuf {
        self.root_path.join(&view.image_path)
    }

    /// Number of views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether the dataset has no views.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Distortion;

    const DATASET: &str = r#"{
        "root_path": "/data/scan",
        "views": {
            "0": { "image_path": "img/a.png", "intrinsic_id": 0 },
            "1": { "image_path": "img/b.png", "intrinsic_id": 7 },
            "2": { "image_path": "img/c.png" }
        },
        "intrinsics": {
            "0": {
                "width": 640, "height": 480,
                "focal_x": 500.0, "focal_y": 500.0,
                "ppx": 320.0, "ppy": 240.0,
                "distortion": { "model": "radial_k1", "k1": -0.2 }
            }
        },
        "structure": []
    }"#;

    fn parse(json: &str) -> SfmData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_views_and_intrinsics() {
        let data = parse(DATASET);
        assert_eq!(data.len(), 3);
        assert_eq!(data.intrinsics.len(), 1);
        assert_eq!(
            data.intrinsics[&0].distortion,
            Distortion::RadialK1 { k1: -0.2 }
        );
    }

    #[test]
    fn resolves_intrinsic_by_id() {
        let data = parse(DATASET);
        let view = &data.views[&0];
        assert!(data.intrinsic_for(view).is_some());
    }

    #[test]
    fn unknown_intrinsic_id_resolves_to_none() {
        let data = parse(DATASET);
        let view = &data.views[&1];
        assert_eq!(view.intrinsic_id, Some(7));
        assert!(data.intrinsic_for(view).is_none());
    }

    #[test]
    fn undefined_intrinsic_id_resolves_to_none() {
        let data = parse(DATASET);
        let view = &data.views[&2];
        assert_eq!(view.intrinsic_id, None);
        assert!(data.intrinsic_for(view).is_none());
    }

    #[test]
    fn source_path_joins_root() {
        let data = parse(DATASET);
        let view = &data.views[&0];
        assert_eq!(data.source_path(view), PathBuf::from("/data/scan/img/a.png"));
    }

    #[test]
    fn missing_sections_load_empty() {
        let data = parse(r#"{ "root_path": "/x" }"#);
        assert!(data.is_empty());
        assert!(data.intrinsics.is_empty());
    }

    #[test]
    fn load_restricts_to_requested_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sfm.json");
        std::fs::write(&path, DATASET).unwrap();

        let data =
            SfmData::load(&path, Sections { views: true, intrinsics: false }).unwrap();
        assert_eq!(data.len(), 3);
        assert!(data.intrinsics.is_empty());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SfmData::load("/nonexistent/sfm.json", Sections::views_and_intrinsics())
            .unwrap_err();
        assert!(matches!(err, Error::DatasetLoad { .. }));
    }

    #[test]
    fn load_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sfm.json");
        std::fs::write(&path, "not json").unwrap();

        let err = SfmData::load(&path, Sections::views_and_intrinsics()).unwrap_err();
        assert!(matches!(err, Error::DatasetLoad { .. }));
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sfm.json");

        let data = parse(DATASET);
        data.save(&path).unwrap();
        let back = SfmData::load(&path, Sections::views_and_intrinsics()).unwrap();
        assert_eq!(back.views, data.views);
        assert_eq!(back.intrinsics, data.intrinsics);
    }
}
