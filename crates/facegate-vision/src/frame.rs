//! Frame representation.

use image::RgbImage;

/// One decoded video frame, owned RGB pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap a decoded RGB image.
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Create a frame filled with a single gray level. Used by the
    /// synthetic source and by tests.
    pub fn filled(width: u32, height: u32, luma: u8) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, image::Rgb([luma, luma, luma])),
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying image.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}
