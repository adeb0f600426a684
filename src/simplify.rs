//! Closed-polygon approximation (Douglas–Peucker).
//!
//! A closed contour has no natural endpoints, so it is split at the
//! point farthest from its first point and each half is simplified as
//! an open chain. Vertices that end up collinear across the seam are
//! removed afterwards.

use geo::{LineString, Simplify};

use crate::geom::{distance, Pixel};

/// Approximate a closed contour with `epsilon` as the maximum deviation.
pub fn approximate_closed(points: &[Pixel], epsilon: f64) -> Vec<Pixel> {
    if points.len() <= 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let first = points[0];
    let (far, far_dist) = points
        .iter()
        .enumerate()
        .map(|(i, &p)| (i, distance(first, p)))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    if far_dist == 0.0 {
        return vec![first];
    }

    let outbound = rdp_simplify(&points[..=far], epsilon);
    let mut back: Vec<Pixel> = points[far..].to_vec();
    back.push(first);
    let inbound = rdp_simplify(&back, epsilon);

    // outbound runs first..=far, inbound runs far..=first.
    let mut polygon = outbound;
    polygon.extend_from_slice(&inbound[1..inbound.len() - 1]);
    remove_collinear(&mut polygon, epsilon);
    polygon
}

/// Douglas–Peucker on an open chain; both endpoints are kept.
fn rdp_simplify(points: &[Pixel], epsilon: f64) -> Vec<Pixel> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    LineString::from(coords)
        .simplify(&epsilon)
        .into_inner()
        .into_iter()
        .map(|c| Pixel::new(c.x.round() as i32, c.y.round() as i32))
        .collect()
}

/// Drop vertices lying within `epsilon` of the chord between their
/// cyclic neighbours, until none remain or only a triangle is left.
fn remove_collinear(polygon: &mut Vec<Pixel>, epsilon: f64) {
    let mut i = 0;
    while polygon.len() > 3 && i < polygon.len() {
        let n = polygon.len();
        let prev = polygon[(i + n - 1) % n];
        let next = polygon[(i + 1) % n];
        if chord_distance(polygon[i], prev, next) <= epsilon {
            polygon.remove(i);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
}

/// Distance from `p` to the segment `a`-`b`.
fn chord_distance(p: Pixel, a: Pixel, b: Pixel) -> f64 {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return distance(p, a);
    }
    let t = (((p.x as f64 - ax) * dx + (p.y as f64 - ay) * dy) / len2).clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (p.x as f64 - cx).hypot(p.y as f64 - cy)
}
