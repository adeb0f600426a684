//! Shape recognition: freehand ink → idealized filled shapes.
//!
//! Pipeline, run on demand over the whole canvas:
//! 1. Threshold the canvas into an ink mask
//! 2. Extract external contours, dropping small ones as noise
//! 3. Approximate each contour with a polygon (tolerance ∝ perimeter)
//! 4. Classify by vertex count, aspect ratio and circularity
//! 5. Render every shape, filled, into a fresh raster

use std::f64::consts::PI;
use std::fmt;
use std::time::Instant;

use image::{Rgb, RgbImage};
use kurbo::Point;
use rayon::prelude::*;

use crate::bitmap;
use crate::config::RecognitionConfig;
use crate::contour::{self, RawContour};
use crate::geom::{self, BoundingBox, Pixel};
use crate::render;
use crate::simplify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Triangle,
    Square,
    Rectangle,
    Circle,
    Unidentified,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Square => "Square",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Unidentified => "Unidentified",
        };
        f.write_str(name)
    }
}

/// 4π·area / perimeter². 1.0 for a perfect circle.
///
/// `None` for a zero perimeter.
pub fn circularity(area: f64, perimeter: f64) -> Option<f64> {
    if perimeter <= 0.0 {
        return None;
    }
    Some(4.0 * PI * area / (perimeter * perimeter))
}

/// Classify an approximated contour.
///
/// `area` and `perimeter` are those of the original contour, not the
/// approximation. Returns `None` for degenerate (zero-perimeter) input.
pub fn classify(
    approx: &[Pixel],
    area: f64,
    perimeter: f64,
    config: &RecognitionConfig,
) -> Option<ShapeKind> {
    let circularity = circularity(area, perimeter)?;
    let kind = match approx.len() {
        3 => ShapeKind::Triangle,
        4 => {
            let ratio = BoundingBox::of(approx)?.aspect_ratio();
            if (config.square_aspect_min..=config.square_aspect_max).contains(&ratio) {
                ShapeKind::Square
            } else {
                ShapeKind::Rectangle
            }
        }
        n if n > 4 && circularity > config.circularity_threshold => ShapeKind::Circle,
        _ => ShapeKind::Unidentified,
    };
    Some(kind)
}

/// Geometry an idealized shape is rendered from.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Disk { center: Point, radius: f64 },
    Polygon(Vec<Pixel>),
}

/// One contour after classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedShape {
    pub kind: ShapeKind,
    /// Vertex count of the approximated polygon.
    pub vertices: usize,
    /// Area of the source contour.
    pub area: f64,
    pub outline: Outline,
}

impl RecognizedShape {
    fn render(&self, raster: &mut RgbImage, color: Rgb<u8>) {
        match &self.outline {
            Outline::Disk { center, radius } => {
                render::fill_disk(raster, *center, *radius, color);
            }
            Outline::Polygon(vertices) => {
                render::fill_polygon(raster, vertices, color);
            }
        }
    }
}

/// Approximate, classify and build the idealized outline of one contour.
pub(crate) fn idealize(contour: &RawContour, config: &RecognitionConfig) -> Option<RecognizedShape> {
    let epsilon = config.epsilon_fraction * contour.perimeter;
    let approx = simplify::approximate_closed(&contour.points, epsilon);
    let kind = classify(&approx, contour.area, contour.perimeter, config)?;

    let outline = match kind {
        ShapeKind::Circle => {
            let circle = geom::min_enclosing_circle(&contour.points)?;
            Outline::Disk {
                center: circle.center,
                radius: circle.radius,
            }
        }
        _ => Outline::Polygon(approx.clone()),
    };

    Some(RecognizedShape {
        kind,
        vertices: approx.len(),
        area: contour.area,
        outline,
    })
}

/// The output of a recognition pass.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Fresh raster holding only the idealized shapes.
    pub raster: RgbImage,
    pub shapes: Vec<RecognizedShape>,
}

impl Recognition {
    pub fn count(&self, kind: ShapeKind) -> usize {
        self.shapes.iter().filter(|s| s.kind == kind).count()
    }
}

/// Replace all ink on `canvas` with idealized shapes in `color`.
///
/// Ink is anything that stands out from `background`. Always completes;
/// a canvas without qualifying ink yields a raster of plain background.
pub fn recognize_and_idealize(
    canvas: &RgbImage,
    color: Rgb<u8>,
    background: Rgb<u8>,
    config: &RecognitionConfig,
) -> Recognition {
    let t_start = Instant::now();

    let mask = bitmap::ink_mask(canvas, background, config.ink_threshold);
    let contours = contour::extract_external(&mask, config.min_contour_area);

    // Contours are independent; only rendering needs to be sequential.
    let shapes: Vec<RecognizedShape> = contours
        .par_iter()
        .filter_map(|c| idealize(c, config))
        .collect();

    let (width, height) = canvas.dimensions();
    let mut raster = RgbImage::from_pixel(width, height, background);
    for shape in &shapes {
        shape.render(&mut raster, color);
    }

    let summary: Vec<String> = shapes
        .iter()
        .map(|s| format!("{} ({} vertices, area {:.0})", s.kind, s.vertices, s.area))
        .collect();
    log::info!(
        "recognized {} of {} contours in {}ms: [{}]",
        shapes.len(),
        contours.len(),
        t_start.elapsed().as_millis(),
        summary.join(", "),
    );

    Recognition { raster, shapes }
}
