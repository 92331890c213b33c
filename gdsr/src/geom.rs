//!
//! # Geometry Kernel
//!
//! Free functions over point-sequences, shared by [crate::Polygon], [crate::Path], and friends.
//!
//! Point-sequences passed here are treated as *closed* polygons.
//! Each accepts either explicitly closed input (first point repeated at the end)
//! or implicitly closed input, and treats the two identically.
//!

// Std-Lib
use std::f64::consts::PI;

// Local imports
use crate::point::{Point, EPSILON};

/// Iterate over the edges of the closed polygon formed by `points`
pub fn edges(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let closing = match (points.first(), points.last()) {
        (Some(first), Some(last)) if first != last => Some((*last, *first)),
        _ => None,
    };
    points
        .windows(2)
        .map(|w| (w[0], w[1]))
        .chain(closing)
}

/// Signed area via the shoelace formula. Positive for counter-clockwise point-orderings.
pub fn signed_area(points: &[Point]) -> f64 {
    edges(points).map(|(a, b)| a.cross(&b)).sum::<f64>() / 2.0
}
/// Enclosed area, always non-negative
pub fn area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}
/// Sum of edge lengths, including the closing edge
pub fn perimeter(points: &[Point]) -> f64 {
    edges(points).map(|(a, b)| a.distance_to(&b)).sum()
}

/// Distance from `pt` to the segment from `a` to `b`
pub fn distance_to_segment(pt: &Point, a: &Point, b: &Point) -> f64 {
    let ab = *b - *a;
    let len2 = ab.dot(&ab);
    if len2 == 0.0 {
        return pt.distance_to(a);
    }
    let t = ((*pt - *a).dot(&ab) / len2).clamp(0.0, 1.0);
    pt.distance_to(&(*a + ab * t))
}
/// Boolean indication of whether `pt` lies on the segment from `a` to `b`, within [EPSILON]
pub fn on_segment(pt: &Point, a: &Point, b: &Point) -> bool {
    distance_to_segment(pt, a, b) <= EPSILON
}
/// Boolean indication of whether `pt` lies on any edge of `points`
pub fn on_edge(points: &[Point], pt: &Point) -> bool {
    edges(points).any(|(a, b)| on_segment(pt, &a, &b))
}

/// Point-in-polygon test. Even-odd ray casting, with points on the boundary counted as inside.
pub fn contains(points: &[Point], pt: &Point) -> bool {
    if on_edge(points, pt) {
        return true;
    }
    let mut inside = false;
    for (a, b) in edges(points) {
        if (a.y > pt.y) != (b.y > pt.y) {
            let xcross = a.x + (pt.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if pt.x < xcross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Orientation of `c` relative to the directed line `a -> b`.
/// Positive for left-hand turns, negative for right, zero (within tolerance) for collinear.
fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    let val = (*b - *a).cross(&(*c - *a));
    let scale = a.distance_to(b) * a.distance_to(c);
    if val.abs() <= EPSILON * scale.max(1.0) {
        0.0
    } else {
        val
    }
}

/// Boolean indication of whether segments `p1-p2` and `q1-q2` cross or touch
pub fn segments_intersect(p1: &Point, p2: &Point, q1: &Point, q2: &Point) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return true;
    }
    on_segment(p1, q1, q2)
        || on_segment(p2, q1, q2)
        || on_segment(q1, p1, p2)
        || on_segment(q2, p1, p2)
}

/// Boolean indication of whether polygons `a` and `b` overlap or touch.
/// True if any vertex of either lies inside the other (edges inclusive), or if any pair of edges cross.
pub fn intersects(a: &[Point], b: &[Point]) -> bool {
    if a.iter().any(|p| contains(b, p)) || b.iter().any(|p| contains(a, p)) {
        return true;
    }
    edges(a).any(|(a1, a2)| edges(b).any(|(b1, b2)| segments_intersect(&a1, &a2, &b1, &b2)))
}

/// Strip a closing duplicate point, if present
fn open_ring(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}
/// Re-close an open ring, appending its first point
fn close_ring(mut pts: Vec<Point>) -> Vec<Point> {
    if let Some(first) = pts.first().copied() {
        if pts.last() != Some(&first) {
            pts.push(first);
        }
    }
    pts
}

/// Simplify the closed polygon `points`.
/// Removes repeated points and points collinear with their neighbors, cyclically.
/// Returns an explicitly closed point-list.
pub fn simplify(points: &[Point]) -> Vec<Point> {
    let mut pts = open_ring(points);
    // Consecutive duplicates, including the wrap-around pair
    pts.dedup_by(|a, b| a.is_close(b));
    while pts.len() > 1 && pts[0].is_close(&pts[pts.len() - 1]) {
        pts.pop();
    }
    // Collinear points. Repeat until none remain, as each removal may expose another.
    loop {
        let n = pts.len();
        if n < 3 {
            break;
        }
        let collinear = (0..n).find(|&i| {
            let prev = &pts[(i + n - 1) % n];
            let next = &pts[(i + 1) % n];
            orientation(prev, &pts[i], next) == 0.0
        });
        match collinear {
            Some(i) => {
                pts.remove(i);
            }
            None => break,
        }
    }
    close_ring(pts)
}

/// Canonical form of the closed polygon `points`.
/// Simplified, counter-clockwise, starting from its lexicographically-lowest point, and explicitly closed.
pub fn normalize(points: &[Point]) -> Vec<Point> {
    let mut pts = open_ring(&simplify(points));
    if signed_area(&pts) < 0.0 {
        pts.reverse();
    }
    let key = |p: &Point| p.round(9);
    let start = pts
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let (a, b) = (key(a), key(b));
            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    pts.rotate_left(start);
    close_ring(pts)
}

/// Boolean indication of whether `a` and `b` describe the same closed shape,
/// regardless of starting point, orientation, repeated points, or collinear points.
pub fn looks_like(a: &[Point], b: &[Point]) -> bool {
    let (na, nb) = (normalize(a), normalize(b));
    na.len() == nb.len() && na.iter().zip(nb.iter()).all(|(p, q)| p.is_close(q))
}

/// Vertices of a regular `n_sides` polygon, centered at `centre`.
/// Vertex `i` lies at angle `rotation + i * 360 / n_sides` degrees. Explicitly closed.
pub fn regular(centre: Point, radius: f64, n_sides: usize, rotation: f64) -> Vec<Point> {
    let pts = (0..n_sides)
        .map(|i| {
            let angle = (rotation + (i as f64) * 360.0 / (n_sides as f64)).to_radians();
            centre + Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    close_ring(pts)
}

/// Vertices of an ellipse, or elliptical arc.
///
/// A full 360-degree span produces `n_sides` vertices around the ellipse.
/// Partial spans produce `n_sides` segments along the arc, closed through `centre` into a pie-slice wedge.
/// Explicitly closed.
pub fn ellipse(
    centre: Point,
    h_radius: f64,
    v_radius: f64,
    initial_angle: f64,
    final_angle: f64,
    n_sides: usize,
) -> Vec<Point> {
    let span = final_angle - initial_angle;
    let full = (span.abs() - 360.0).abs() < EPSILON || span.abs() > 360.0;
    let at = |angle: f64| {
        let t = angle * PI / 180.0;
        centre + Point::new(h_radius * t.cos(), v_radius * t.sin())
    };
    let step = span / (n_sides as f64);
    let pts = if full {
        (0..n_sides)
            .map(|i| at(initial_angle + (i as f64) * step))
            .collect()
    } else {
        let mut pts: Vec<Point> = (0..=n_sides)
            .map(|i| at(initial_angle + (i as f64) * step))
            .collect();
        pts.push(centre);
        pts
    };
    close_ring(pts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(1., 1.),
            Point::new(0., 1.),
            Point::new(0., 0.),
        ]
    }

    #[test]
    fn areas() {
        let sq = square();
        assert_eq!(area(&sq), 1.0);
        assert_eq!(area(&sq[..4]), 1.0);
        assert_eq!(perimeter(&sq), 4.0);
        assert_eq!(perimeter(&sq[..4]), 4.0);
        let mut cw = sq.clone();
        cw.reverse();
        assert_eq!(signed_area(&cw), -1.0);
        assert_eq!(area(&cw), 1.0);
    }
    #[test]
    fn containment() {
        let sq = square();
        assert!(contains(&sq, &Point::new(0.5, 0.5)));
        assert!(contains(&sq, &Point::new(0., 0.5)));
        assert!(contains(&sq, &Point::new(1., 1.)));
        assert!(!contains(&sq, &Point::new(1.5, 0.5)));
        assert!(on_edge(&sq, &Point::new(0.5, 1.0)));
        assert!(!on_edge(&sq, &Point::new(0.5, 0.5)));
    }
    #[test]
    fn intersections() {
        let sq = square();
        let shifted: Vec<Point> = sq.iter().map(|p| *p + Point::new(0.5, 0.5)).collect();
        assert!(intersects(&sq, &shifted));
        let adjacent: Vec<Point> = sq.iter().map(|p| *p + Point::new(1.0, 0.0)).collect();
        assert!(intersects(&sq, &adjacent));
        let far: Vec<Point> = sq.iter().map(|p| *p + Point::new(3.0, 0.0)).collect();
        assert!(!intersects(&sq, &far));
        // A cross shape, with no vertices inside one another
        let wide = vec![
            Point::new(-1., 0.25),
            Point::new(2., 0.25),
            Point::new(2., 0.75),
            Point::new(-1., 0.75),
        ];
        let tall = vec![
            Point::new(0.25, -1.),
            Point::new(0.75, -1.),
            Point::new(0.75, 2.),
            Point::new(0.25, 2.),
        ];
        assert!(intersects(&wide, &tall));
    }
    #[test]
    fn simplification() {
        let pts = vec![
            Point::new(0., 0.),
            Point::new(0.5, 0.),
            Point::new(1., 0.),
            Point::new(1., 0.),
            Point::new(1., 1.),
            Point::new(0., 1.),
            Point::new(0., 0.5),
            Point::new(0., 0.),
        ];
        let simple = simplify(&pts);
        assert_eq!(simple.len(), 5);
        assert!(looks_like(&simple, &pts));
        assert!(looks_like(&simple, &square()));
    }
    #[test]
    fn normalization() {
        let pts = vec![
            Point::new(1., 1.),
            Point::new(1., 0.),
            Point::new(0., 0.),
            Point::new(0., 1.),
        ];
        assert_eq!(normalize(&pts), square());
        assert!(!looks_like(&pts, &pts[..3]));
    }
    #[test]
    fn regular_polygons() {
        let hex = regular(Point::origin(), 1.0, 6, 0.0);
        assert_eq!(hex.len(), 7);
        assert_eq!(hex.first(), hex.last());
        assert!(hex[1].is_close(&Point::new(0.5, 3f64.sqrt() / 2.0)));
    }
    #[test]
    fn ellipses() {
        let full = ellipse(Point::origin(), 2.0, 1.0, 0.0, 360.0, 400);
        assert_eq!(full.len(), 401);
        assert!((area(&full) - 2.0 * PI).abs() < 1e-3);
        let wedge = ellipse(Point::origin(), 1.0, 1.0, 0.0, 90.0, 90);
        assert_eq!(wedge.len(), 93);
        assert!(wedge.contains(&Point::origin()));
        assert!((area(&wedge) - PI / 4.0).abs() < 1e-3);
    }
}
