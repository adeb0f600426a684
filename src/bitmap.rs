use image::{GrayImage, Luma, Rgb, RgbImage};

/// Convert a canvas to a binary ink mask.
///
/// A pixel is ink (255) when some channel differs from `background` by
/// more than `threshold`, background (0) otherwise. Taking the largest
/// channel difference keeps saturated colours like pure blue visible to
/// the contour stage.
pub fn ink_mask(canvas: &RgbImage, background: Rgb<u8>, threshold: u8) -> GrayImage {
    let Rgb(bg) = background;
    imageproc::map::map_colors(canvas, |Rgb(px)| {
        let diff = px
            .iter()
            .zip(bg.iter())
            .map(|(&c, &b)| c.abs_diff(b))
            .max()
            .unwrap_or(0);
        if diff > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
