//! Image I/O gateway.
//!
//! The export engine talks to the filesystem through [`ImageIo`] so the
//! decision logic can be tested against fakes without real codecs.

use std::path::Path;

use image::RgbImage;

use crate::error::{Error, Result};

/// Decode, encode and copy operations the export engine depends on.
pub trait ImageIo {
    /// Decode an image file into RGB8 pixels.
    fn decode(&self, path: &Path) -> Result<RgbImage>;

    /// Encode an image to the given path; the format follows the extension.
    fn encode(&self, path: &Path, img: &RgbImage) -> Result<()>;

    /// Copy a file byte-for-byte, preserving content and metadata exactly.
    fn copy(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// Filesystem-backed gateway using the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageIo;

impl ImageIo for FsImageIo {
    fn decode(&self, path: &Path) -> Result<RgbImage> {
        let img = image::open(path).map_err(|e| Error::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(img.to_rgb8())
    }

    fn encode(&self, path: &Path, img: &RgbImage) -> Result<()> {
        img.save(path).map_err(|e| Error::ImageSave {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn copy(&self, src: &Path, dst: &Path) -> Result<()> {
        std::fs::copy(src, dst).map_err(|e| Error::FileCopy {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn decode_encode_preserves_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");

        let img = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        FsImageIo.encode(&path, &img).unwrap();
        let back = FsImageIo.decode(&path).unwrap();
        assert_eq!(back.dimensions(), (8, 6));
        assert_eq!(back, img);
    }

    #[test]
    fn decode_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = FsImageIo.decode(&path).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }

    #[test]
    fn copy_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        std::fs::write(&src, b"\x00\x01raw bytes, not an image").unwrap();

        FsImageIo.copy(&src, &dst).unwrap();
        assert_eq!(std::fs::read(&src).unwrap(), std::fs::read(&dst).unwrap());
    }

    #[test]
    fn copy_reports_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsImageIo
            .copy(&dir.path().join("missing"), &dir.path().join("dst"))
            .unwrap_err();
        assert!(matches!(err, Error::FileCopy { .. }));
    }
}
