//! Pinhole camera intrinsics with optional lens distortion.
//!
//! An [`Intrinsic`] describes the camera model shared by one or more views of
//! an SfM dataset. The export pipeline only needs the *forward* distortion
//! direction: mapping an ideal (undistorted) pixel to the distorted source
//! pixel it should be sampled from.

use serde::{Deserialize, Serialize};

/// Lens distortion attached to a pinhole intrinsic.
///
/// Coefficients operate on normalized image coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Distortion {
    /// No distortion parameters.
    #[default]
    None,

    /// Single radial coefficient.
    RadialK1 {
        /// Second-order radial coefficient.
        k1: f64,
    },

    /// Three radial coefficients.
    RadialK3 {
        /// Second-order radial coefficient.
        k1: f64,
        /// Fourth-order radial coefficient.
        k2: f64,
        /// Sixth-order radial coefficient.
        k3: f64,
    },

    /// Radial plus tangential distortion (Brown-Conrady).
    BrownConrady {
        /// Second-order radial coefficient.
        k1: f64,
        /// Fourth-order radial coefficient.
        k2: f64,
        /// Sixth-order radial coefficient.
        k3: f64,
        /// First tangential coefficient.
        p1: f64,
        /// Second tangential coefficient.
        p2: f64,
    },
}

impl Distortion {
    /// Whether this model carries at least one non-zero coefficient.
    ///
    /// An all-zero model distorts nothing and is treated the same as
    /// [`Distortion::None`] by the export decision.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match *self {
            Self::None => false,
            Self::RadialK1 { k1 } => k1 != 0.0,
            Self::RadialK3 { k1, k2, k3 } => k1 != 0.0 || k2 != 0.0 || k3 != 0.0,
            Self::BrownConrady { k1, k2, k3, p1, p2 } => {
                k1 != 0.0 || k2 != 0.0 || k3 != 0.0 || p1 != 0.0 || p2 != 0.0
            }
        }
    }

    /// Apply distortion to normalized image coordinates.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        match *self {
            Self::None => (x, y),

            Self::RadialK1 { k1 } => {
                let r2 = x * x + y * y;
                let radial = 1.0 + k1 * r2;
                (x * radial, y * radial)
            }

            Self::RadialK3 { k1, k2, k3 } => {
                let r2 = x * x + y * y;
                let r4 = r2 * r2;
                let r6 = r4 * r2;
                let radial = 1.0 + k1 * r2 + k2 * r4 + k3 * r6;
                (x * radial, y * radial)
            }

            Self::BrownConrady { k1, k2, k3, p1, p2 } => {
                let r2 = x * x + y * y;
                let r4 = r2 * r2;
                let r6 = r4 * r2;
                let radial = 1.0 + k1 * r2 + k2 * r4 + k3 * r6;
                let xd = x * radial + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
                let yd = y * radial + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
                (xd, yd)
            }
        }
    }
}

/// Pinhole camera intrinsic shared by zero or more views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intrinsic {
    /// Sensor width in pixels.
    pub width: u32,

    /// Sensor height in pixels.
    pub height: u32,

    /// Focal length along x, in pixels.
    pub focal_x: f64,

    /// Focal length along y, in pixels.
    pub focal_y: f64,

    /// Principal point x, in pixels.
    pub ppx: f64,

    /// Principal point y, in pixels.
    pub ppy: f64,

    /// Lens distortion model.
    #[serde(default)]
    pub distortion: Distortion,
}

impl Intrinsic {
    /// Create a distortion-free pinhole intrinsic.
    #[must_use]
    pub fn pinhole(width: u32, height: u32, focal_x: f64, focal_y: f64, ppx: f64, ppy: f64) -> Self {
        Self {
            width,
            height,
            focal_x,
            focal_y,
            ppx,
            ppy,
            distortion: Distortion::None,
        }
    }

    /// Attach a distortion model.
    #[must_use]
    pub fn with_distortion(mut self, distortion: Distortion) -> Self {
        self.distortion = distortion;
        self
    }

    /// Whether the calibration is usable: positive dimensions and focal
    /// lengths. Invalid intrinsics are never passed to the remap.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.focal_x > 0.0 && self.focal_y > 0.0
    }

    /// Whether this intrinsic carries non-zero distortion.
    #[must_use]
    pub fn has_distortion(&self) -> bool {
        self.distortion.is_active()
    }

    /// Map an ideal (undistorted) pixel coordinate to the distorted source
    /// pixel it projects from.
    #[must_use]
    pub fn distort_pixel(&self, u: f64, v: f64) -> (f64, f64) {
        let x = (u - self.ppx) / self.focal_x;
        let y = (v - self.ppy) / self.focal_y;
        let (xd, yd) = self.distortion.apply(x, y);
        (self.focal_x * xd + self.ppx, self.focal_y * yd + self.ppy)
    }
}
