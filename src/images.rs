//! Image inspection and aspect-ratio fitting shared by both builders.

use std::path::Path;

use crate::error::BuildError;

/// Intrinsic pixel dimensions of a raster image.
///
/// Fails when the path is missing, unreadable or not a decodable image;
/// callers apply the fallback policy for their format instead of aborting.
pub fn inspect(path: &Path) -> Result<(u32, u32), BuildError> {
    if !path.exists() {
        return Err(BuildError::image(path, "no such file"));
    }
    image::image_dimensions(path).map_err(|err| BuildError::image(path, err))
}

/// Scale to a fixed target width, preserving aspect ratio.
pub fn scale_to_width(width: u32, height: u32, target_w: f32) -> (f32, f32) {
    let ratio = target_w / width.max(1) as f32;
    (target_w, height as f32 * ratio)
}

/// Scale by the smaller of the width and height fit ratios, preserving aspect
/// ratio without cropping.
pub fn fit_within(width: u32, height: u32, max_w: f32, max_h: f32) -> (f32, f32) {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    let ratio = (max_w / w).min(max_h / h);
    (w * ratio, h * ratio)
}
