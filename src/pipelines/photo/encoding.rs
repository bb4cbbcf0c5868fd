// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! Preview frames are RGBA; JPEG has no alpha channel, so frames are
//! flattened to RGB before encoding. Encoding and disk I/O run on the
//! blocking pool.

use crate::backends::camera::types::CameraFrame;
use crate::constants::photo;
use crate::errors::PhotoError;
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Encoded image data ready for saving
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// JPEG photo encoder
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoEncoder {
    pub fn new() -> Self {
        Self {
            quality: photo::JPEG_QUALITY,
        }
    }

    /// Set JPEG quality (1-100)
    pub fn set_quality(&mut self, quality: u8) {
        self.quality = quality.clamp(1, 100);
    }

    /// Encode a frame asynchronously
    pub async fn encode(&self, frame: CameraFrame) -> Result<EncodedImage, PhotoError> {
        info!(width = frame.width, height = frame.height, "Starting encoding");

        let quality = self.quality;
        tokio::task::spawn_blocking(move || {
            let rgb = Self::to_rgb(&frame)?;
            let data = Self::encode_jpeg(&rgb, quality)?;
            debug!(size = data.len(), "Encoding complete");
            Ok(EncodedImage {
                data,
                width: rgb.width(),
                height: rgb.height(),
            })
        })
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("Encoding task error: {}", e)))?
    }

    /// Write encoded image data to `path`, creating parent directories
    pub async fn save(&self, encoded: EncodedImage, path: PathBuf) -> Result<PathBuf, PhotoError> {
        info!(path = %path.display(), "Saving photo");

        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &encoded.data)?;
            Ok::<_, PhotoError>(path)
        })
        .await
        .map_err(|e| PhotoError::SaveFailed(format!("Save task error: {}", e)))?
    }

    fn to_rgb(frame: &CameraFrame) -> Result<RgbImage, PhotoError> {
        let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.packed_rgba())
            .ok_or_else(|| {
                PhotoError::EncodingFailed(format!(
                    "frame buffer too small for {}x{}",
                    frame.width, frame.height
                ))
            })?;
        Ok(DynamicImage::ImageRgba8(rgba).to_rgb8())
    }

    fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, PhotoError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
        encoder.encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )?;

        Ok(buffer)
    }
}

/// Default location for a new capture: `<cache>/quickshot/captures/photo_<timestamp>.jpg`
pub fn default_capture_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    capture_dir().join(format!("photo_{}.jpg", timestamp))
}

/// Directory holding transient captures
pub fn capture_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("quickshot")
        .join(photo::CAPTURE_SUBDIR)
}

/// Last path segment, as shown to the host
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::FrameData;
    use std::sync::Arc;
    use std::time::Instant;

    fn gray_frame(width: u32, height: u32) -> CameraFrame {
        let data = vec![128u8; (width * height * 4) as usize];
        CameraFrame {
            width,
            height,
            data: FrameData::Copied(Arc::from(data.as_slice())),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    #[tokio::test]
    async fn test_encode_produces_jpeg() {
        let encoded = PhotoEncoder::new().encode(gray_frame(8, 4)).await.unwrap();
        assert_eq!((encoded.width, encoded.height), (8, 4));
        // JPEG SOI marker
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_short_buffer_is_encoding_failure() {
        let mut frame = gray_frame(2, 2);
        frame.height = 50;
        let result = PhotoEncoder::new().encode(frame).await;
        assert!(matches!(result, Err(PhotoError::EncodingFailed(_))));
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of(Path::new("/tmp/a.jpg")), "a.jpg");
        assert_eq!(file_name_of(Path::new("/")), "");
    }

    #[test]
    fn test_quality_is_clamped() {
        let mut encoder = PhotoEncoder::new();
        assert_eq!(encoder.quality, 92);
        encoder.set_quality(0);
        assert_eq!(encoder.quality, 1);
        encoder.set_quality(255);
        assert_eq!(encoder.quality, 100);
    }
}
