use crate::WrapError;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use std::sync::Arc;

/// A raster image that can be laid out inline with text, used as a
/// page-break marker, or tiled as a text/background pattern.
///
/// Images are immutable once loaded and cheap to clone.
#[derive(Clone, Debug)]
pub struct Image {
    pub image: Arc<RgbaImage>,
}

impl Image {
    pub fn new_from_disk<P: AsRef<Path>>(path: P) -> Result<Image, WrapError> {
        let path = path.as_ref();
        let is_tga = if let Some(ext) = path.extension() {
            ext.to_ascii_lowercase() == std::ffi::OsString::from("tga")
        } else {
            false
        };

        let data = std::fs::read(path)?;

        let format = if is_tga {
            image::ImageFormat::Tga
        } else {
            image::guess_format(&data)?
        };
        let image = image::load_from_memory_with_format(&data, format)?;
        Ok(Self::new_raster(image))
    }

    /// Decode an image held in memory, guessing its format
    pub fn from_bytes(data: &[u8]) -> Result<Image, WrapError> {
        let image = image::load_from_memory(data)?;
        Ok(Self::new_raster(image))
    }

    pub fn new_raster(image: DynamicImage) -> Image {
        Image {
            image: Arc::new(image.into_rgba8()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The image resized by `scale`. A scale of 0 or 1 means the original
    /// size and returns the shared pixels without copying.
    pub fn scaled(&self, scale: f32) -> Arc<RgbaImage> {
        if scale <= 0.0 || (scale - 1.0).abs() < f32::EPSILON {
            return Arc::clone(&self.image);
        }
        let w = ((self.width() as f32 * scale).round() as u32).max(1);
        let h = ((self.height() as f32 * scale).round() as u32).max(1);
        Arc::new(image::imageops::resize(
            self.image.as_ref(),
            w,
            h,
            FilterType::Triangle,
        ))
    }
}

impl From<RgbaImage> for Image {
    fn from(image: RgbaImage) -> Self {
        Image {
            image: Arc::new(image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_scale_shares_pixels() {
        let img = Image::from(RgbaImage::new(4, 2));
        assert!(Arc::ptr_eq(&img.scaled(1.0), &img.image));
        assert!(Arc::ptr_eq(&img.scaled(0.0), &img.image));
    }

    #[test]
    fn test_scale_resizes() {
        let img = Image::from(RgbaImage::new(4, 2));
        let half = img.scaled(0.5);
        assert_eq!((half.width(), half.height()), (2, 1));
    }
}
