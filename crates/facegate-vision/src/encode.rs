//! Face crop encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;

use facegate_models::BoundingBox;

use crate::error::VisionResult;
use crate::frame::Frame;

/// JPEG quality used for face crops.
const JPEG_QUALITY: u8 = 80;

/// Crop a face region out of `frame` and encode it as a base64 JPEG
/// data URL.
///
/// `bounding_box` must already be clamped to the frame bounds and
/// non-empty; the caller (the detection pipeline) owns clamping so it is
/// unit-testable without pixels.
pub fn encode_face(frame: &Frame, bounding_box: &BoundingBox) -> VisionResult<String> {
    let x = bounding_box.x as u32;
    let y = bounding_box.y as u32;
    let width = (bounding_box.width as u32).max(1);
    let height = (bounding_box.height as u32).max(1);

    let crop = image::imageops::crop_imm(frame.image(), x, y, width, height).to_image();

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    encoder.encode(crop.as_raw(), crop.width(), crop.height(), image::ColorType::Rgb8)?;

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)))
}
