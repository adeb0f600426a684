//! Rasterization of kurbo shapes into RGB images.
//!
//! Shapes are filled into a tiny-skia coverage mask without
//! anti-aliasing, then the colour is written wherever the mask is set,
//! so every pixel ends up either untouched or exactly `color`.
//! Integer pixel coordinates address pixel centres.

use image::{Rgb, RgbImage};
use kurbo::{BezPath, Circle, PathEl, Point, Shape};
use tiny_skia::{FillRule, LineCap, LineJoin, Mask, Stroke, Transform};

use crate::geom::Pixel;

/// Flattening tolerance for circles, in pixels.
const TOLERANCE: f64 = 0.1;

/// Convert a kurbo `BezPath` to a `tiny_skia::Path`, moving integer
/// coordinates onto pixel centres.
fn kurbo_to_tinyskia(bezpath: &BezPath) -> Option<tiny_skia::Path> {
    let t = |p: Point| ((p.x + 0.5) as f32, (p.y + 0.5) as f32);
    let mut pb = tiny_skia::PathBuilder::new();
    for el in bezpath.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                let (x, y) = t(p);
                pb.move_to(x, y);
            }
            PathEl::LineTo(p) => {
                let (x, y) = t(p);
                pb.line_to(x, y);
            }
            PathEl::QuadTo(c, p) => {
                let (cx, cy) = t(c);
                let (px, py) = t(p);
                pb.quad_to(cx, cy, px, py);
            }
            PathEl::CurveTo(c1, c2, p) => {
                let (c1x, c1y) = t(c1);
                let (c2x, c2y) = t(c2);
                let (px, py) = t(p);
                pb.cubic_to(c1x, c1y, c2x, c2y, px, py);
            }
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn to_point(p: Pixel) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

fn new_mask(image: &RgbImage) -> Option<Mask> {
    Mask::new(image.width(), image.height())
}

fn round_stroke(width: f64) -> Stroke {
    Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

fn fill_into(mask: &mut Mask, path: &tiny_skia::Path) {
    mask.fill_path(path, FillRule::Winding, false, Transform::identity());
}

/// Write `color` to every pixel covered by `mask`. Returns the number of
/// pixels written.
fn paint_mask(image: &mut RgbImage, mask: &Mask, color: Rgb<u8>) -> usize {
    let mut painted = 0;
    for (pixel, &coverage) in image.pixels_mut().zip(mask.data()) {
        if coverage > 0 {
            *pixel = color;
            painted += 1;
        }
    }
    painted
}

/// Fill a closed polygon, boundary pixels included.
///
/// Fewer than three vertices enclose nothing; those are drawn as a
/// 1 px polyline instead.
pub fn fill_polygon(image: &mut RgbImage, vertices: &[Pixel], color: Rgb<u8>) -> usize {
    if vertices.len() < 3 {
        return stroke_polyline(image, vertices, 1.0, color);
    }
    let mut path = BezPath::new();
    path.move_to(to_point(vertices[0]));
    for &v in &vertices[1..] {
        path.line_to(to_point(v));
    }
    path.close_path();

    let (Some(outline), Some(mut mask)) = (kurbo_to_tinyskia(&path), new_mask(image)) else {
        return 0;
    };
    fill_into(&mut mask, &outline);
    if let Some(edge) = outline.stroke(&round_stroke(1.0), 1.0) {
        fill_into(&mut mask, &edge);
    }
    paint_mask(image, &mask, color)
}

/// Fill a disk. A zero radius paints the single centre pixel.
pub fn fill_disk(image: &mut RgbImage, center: Point, radius: f64, color: Rgb<u8>) -> usize {
    if radius <= 0.0 {
        let (x, y) = (center.x.round(), center.y.round());
        if x >= 0.0 && y >= 0.0 && (x as u32) < image.width() && (y as u32) < image.height() {
            image.put_pixel(x as u32, y as u32, color);
            return 1;
        }
        return 0;
    }
    let path = Circle::new(center, radius).to_path(TOLERANCE);
    let (Some(disk), Some(mut mask)) = (kurbo_to_tinyskia(&path), new_mask(image)) else {
        return 0;
    };
    fill_into(&mut mask, &disk);
    paint_mask(image, &mask, color)
}

/// Straight segment of the given width with round caps.
pub fn stroke_segment(image: &mut RgbImage, from: Pixel, to: Pixel, width: f64, color: Rgb<u8>) -> usize {
    stroke_polyline(image, &[from, to], width, color)
}

/// Open polyline with round caps and joins. A single point (or a
/// zero-length run) becomes a dot of the stroke width.
pub fn stroke_polyline(image: &mut RgbImage, points: &[Pixel], width: f64, color: Rgb<u8>) -> usize {
    let Some(&first) = points.first() else {
        return 0;
    };
    if points.iter().all(|&p| p == first) {
        return fill_disk(image, to_point(first), width / 2.0, color);
    }
    let mut path = BezPath::new();
    path.move_to(to_point(first));
    for &p in &points[1..] {
        path.line_to(to_point(p));
    }
    let stroked = kurbo_to_tinyskia(&path).and_then(|p| p.stroke(&round_stroke(width), 1.0));
    let (Some(stroked), Some(mut mask)) = (stroked, new_mask(image)) else {
        return 0;
    };
    fill_into(&mut mask, &stroked);
    paint_mask(image, &mask, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn count(image: &RgbImage, color: Rgb<u8>) -> usize {
        image.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn polygon_includes_boundary_pixels() {
        let mut img = RgbImage::new(40, 40);
        let square = [
            Pixel::new(10, 10),
            Pixel::new(19, 10),
            Pixel::new(19, 19),
            Pixel::new(10, 19),
        ];
        fill_polygon(&mut img, &square, RED);
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(19, 19), RED);
        assert_eq!(*img.get_pixel(15, 15), RED);
        assert_eq!(*img.get_pixel(9, 15), BLACK);
        assert_eq!(*img.get_pixel(21, 15), BLACK);
        let n = count(&img, RED);
        assert!((100..=124).contains(&n), "10x10 square painted {} pixels", n);
    }

    #[test]
    fn disk_covers_radius() {
        let mut img = RgbImage::new(100, 100);
        fill_disk(&mut img, Point::new(50.0, 50.0), 20.0, RED);
        assert_eq!(*img.get_pixel(50, 50), RED);
        assert_eq!(*img.get_pixel(50, 69), RED);
        assert_eq!(*img.get_pixel(31, 50), RED);
        assert_eq!(*img.get_pixel(50, 71), BLACK);
        assert_eq!(*img.get_pixel(65, 65), BLACK);
        let n = count(&img, RED) as f64;
        let expected = std::f64::consts::PI * 400.0;
        assert!((n - expected).abs() < expected * 0.05, "disk area {}", n);
    }

    #[test]
    fn segment_has_width_and_round_caps() {
        let mut img = RgbImage::new(200, 200);
        stroke_segment(&mut img, Pixel::new(100, 100), Pixel::new(150, 100), 5.0, RED);
        for x in [100, 125, 150] {
            for y in 98..=102 {
                assert_eq!(*img.get_pixel(x, y), RED, "({}, {})", x, y);
            }
            assert_eq!(*img.get_pixel(x, 96), BLACK);
            assert_eq!(*img.get_pixel(x, 104), BLACK);
        }
        assert_eq!(*img.get_pixel(152, 100), RED);
        assert_eq!(*img.get_pixel(155, 100), BLACK);
    }

    #[test]
    fn zero_length_segment_is_a_dot() {
        let mut img = RgbImage::new(50, 50);
        let n = stroke_segment(&mut img, Pixel::new(20, 20), Pixel::new(20, 20), 5.0, RED);
        assert!(n > 0);
        assert_eq!(*img.get_pixel(20, 20), RED);
        assert_eq!(*img.get_pixel(20, 26), BLACK);
    }

    #[test]
    fn two_vertex_polygon_is_drawn_as_line() {
        let mut img = RgbImage::new(50, 50);
        let n = fill_polygon(&mut img, &[Pixel::new(5, 5), Pixel::new(40, 5)], RED);
        assert!(n >= 35);
        assert_eq!(*img.get_pixel(20, 5), RED);
        assert_eq!(*img.get_pixel(20, 8), BLACK);
    }

    #[test]
    fn shapes_are_clipped_to_the_image() {
        let mut img = RgbImage::new(20, 20);
        fill_disk(&mut img, Point::new(0.0, 0.0), 8.0, RED);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(fill_disk(&mut img, Point::new(-5.0, -5.0), 0.0, RED), 0);
    }
}
