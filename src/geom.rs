//! Shared geometry utilities for pixel polygons.

use kurbo::{Circle, Point};

/// A pixel position in image space (y grows downward).
pub type Pixel = imageproc::point::Point<i32>;

const CONTAINS_EPSILON: f64 = 1e-7;

/// Signed area via the shoelace formula. Positive = CCW in a y-up frame.
pub fn signed_area(points: &[Pixel]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            points[i].x as f64 * points[j].y as f64 - points[j].x as f64 * points[i].y as f64
        })
        .sum::<f64>()
        / 2.0
}

/// Unsigned enclosed area of a closed polygon.
pub fn area(points: &[Pixel]) -> f64 {
    signed_area(points).abs()
}

/// Length of a polygon, including the closing edge back to the first point.
pub fn closed_perimeter(points: &[Pixel]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| distance(points[i], points[(i + 1) % n]))
        .sum()
}

pub fn distance(a: Pixel, b: Pixel) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    dx.hypot(dy)
}

/// Integer bounding rectangle, counting pixels inclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn of(points: &[Pixel]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Smallest circle containing every point (Welzl, iterative form).
///
/// Returns `None` for an empty point set.
pub fn min_enclosing_circle(points: &[Pixel]) -> Option<Circle> {
    let pts: Vec<Point> = points
        .iter()
        .map(|p| Point::new(p.x as f64, p.y as f64))
        .collect();
    let first = *pts.first()?;

    let mut circle = Circle::new(first, 0.0);
    for i in 1..pts.len() {
        if contains(&circle, pts[i]) {
            continue;
        }
        circle = Circle::new(pts[i], 0.0);
        for j in 0..i {
            if contains(&circle, pts[j]) {
                continue;
            }
            circle = circle_from_two(pts[i], pts[j]);
            for k in 0..j {
                if !contains(&circle, pts[k]) {
                    circle = circle_from_three(pts[i], pts[j], pts[k]);
                }
            }
        }
    }
    Some(circle)
}

fn contains(circle: &Circle, p: Point) -> bool {
    circle.center.distance(p) <= circle.radius + CONTAINS_EPSILON
}

fn circle_from_two(a: Point, b: Point) -> Circle {
    Circle::new(a.midpoint(b), a.distance(b) / 2.0)
}

/// Circumcircle of three points. Collinear points fall back to the
/// circle spanning the farthest pair.
fn circle_from_three(a: Point, b: Point, c: Point) -> Circle {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        let candidates = [circle_from_two(a, b), circle_from_two(a, c), circle_from_two(b, c)];
        return candidates
            .into_iter()
            .fold(Circle::new(a, 0.0), |best, c| if c.radius > best.radius { c } else { best });
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = Point::new(ux, uy);
    Circle::new(center, center.distance(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(x: i32, y: i32) -> Pixel {
        Pixel::new(x, y)
    }

    #[test]
    fn square_area_and_perimeter() {
        let square = [px(0, 0), px(10, 0), px(10, 10), px(0, 10)];
        assert_eq!(area(&square), 100.0);
        assert_eq!(closed_perimeter(&square), 40.0);
    }

    #[test]
    fn degenerate_polygons_have_no_area() {
        assert_eq!(area(&[px(3, 4)]), 0.0);
        assert_eq!(area(&[px(0, 0), px(5, 5)]), 0.0);
        assert_eq!(closed_perimeter(&[px(3, 4)]), 0.0);
    }

    #[test]
    fn bounding_box_counts_pixels_inclusively() {
        let bb = BoundingBox::of(&[px(2, 3), px(11, 3), px(11, 7), px(2, 7)]).unwrap();
        assert_eq!(bb, BoundingBox { x: 2, y: 3, width: 10, height: 5 });
        assert!((bb.aspect_ratio() - 2.0).abs() < 1e-9);
        assert!(BoundingBox::of(&[]).is_none());
    }

    #[test]
    fn enclosing_circle_of_square_corners() {
        let c = min_enclosing_circle(&[px(0, 0), px(10, 0), px(10, 10), px(0, 10), px(5, 5)]).unwrap();
        assert!((c.center.x - 5.0).abs() < 1e-9 && (c.center.y - 5.0).abs() < 1e-9);
        assert!((c.radius - 50f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn enclosing_circle_contains_every_point() {
        let points: Vec<Pixel> = (0..40)
            .map(|i| {
                let t = i as f64 * 0.37;
                px((t.cos() * 30.0 + (i % 7) as f64) as i32, (t.sin() * 18.0) as i32)
            })
            .collect();
        let c = min_enclosing_circle(&points).unwrap();
        for p in &points {
            let d = c.center.distance(Point::new(p.x as f64, p.y as f64));
            assert!(d <= c.radius + 1e-6, "point {:?} outside circle {:?}", p, c);
        }
    }

    #[test]
    fn enclosing_circle_of_collinear_points() {
        let c = min_enclosing_circle(&[px(0, 0), px(4, 0), px(10, 0)]).unwrap();
        assert!((c.radius - 5.0).abs() < 1e-9);
        assert!(min_enclosing_circle(&[]).is_none());
    }
}
