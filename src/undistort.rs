//! Geometric undistortion of images.
//!
//! The remap walks the *output* image: each ideal pixel is pushed through the
//! intrinsic's forward distortion to find the source location it was imaged
//! at, then sampled bilinearly. Output pixels whose source location falls
//! outside the image (border regions revealed by the correction) receive the
//! fill value.

use image::{Rgb, RgbImage};

use crate::camera::Intrinsic;

/// Neutral fill for revealed border regions.
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Remove lens distortion from an image.
///
/// The output has the source's pixel dimensions. The caller is expected to
/// pass a valid, distorted intrinsic; an identity distortion simply resamples
/// the image in place.
#[must_use]
pub fn undistort_image(src: &RgbImage, cam: &Intrinsic, fill: Rgb<u8>) -> RgbImage {
    let (width, height) = src.dimensions();
    let mut out = RgbImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let (su, sv) = cam.distort_pixel(f64::from(x), f64::from(y));
            let px = sample_bilinear(src, su, sv).unwrap_or(fill);
            out.put_pixel(x, y, px);
        }
    }

    out
}

/// Bilinear sample at a fractional pixel position, `None` outside the image.
fn sample_bilinear(img: &RgbImage, x: f64, y: f64) -> Option<Rgb<u8>> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    if x < 0.0 || y < 0.0 || x > f64::from(w - 1) || y > f64::from(h - 1) {
        return None;
    }

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - f64::from(x0);
    let fy = y - f64::from(y0);

    let p00 = img.get_pixel(x0, y0);
    let p10 = img.get_pixel(x1, y0);
    let p01 = img.get_pixel(x0, y1);
    let p11 = img.get_pixel(x1, y1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = f64::from(p00.0[c]) * (1.0 - fx) + f64::from(p10.0[c]) * fx;
        let bottom = f64::from(p01.0[c]) * (1.0 - fx) + f64::from(p11.0[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round() as u8;
    }
    Some(Rgb(out))
}
