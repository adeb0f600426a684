use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use crate::geom::{self, Pixel};

/// An outermost ink boundary, in pixel coordinates.
#[derive(Debug, Clone)]
pub struct RawContour {
    /// Boundary pixels in traversal order (y=0 is the top of the image).
    pub points: Vec<Pixel>,
    /// Enclosed area (shoelace over the boundary pixels).
    pub area: f64,
    /// Closed boundary length.
    pub perimeter: f64,
}

impl RawContour {
    pub fn new(points: Vec<Pixel>) -> Self {
        let area = geom::area(&points);
        let perimeter = geom::closed_perimeter(&points);
        Self {
            points,
            area,
            perimeter,
        }
    }
}

/// Extract the external contours of a binary mask.
///
/// Holes and anything nested inside another region are skipped, and
/// contours enclosing less than `min_area` are dropped as noise.
pub fn extract_external(mask: &GrayImage, min_area: f64) -> Vec<RawContour> {
    let found = find_contours::<i32>(mask);
    let total = found.len();

    let result: Vec<RawContour> = found
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| RawContour::new(c.points))
        .filter(|c| c.area >= min_area)
        .collect();

    log::debug!("contours: {} found, {} external above area {}", total, result.len(), min_area);
    result
}
