//!
//! # Paths
//!
//! Open centerlines with a width and end-cap style,
//! and their conversion to outline [Polygon]s.
//!

// Std-Lib
use std::f64::consts::PI;

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::element::{validate_data_type, validate_layer, ElementTrait};
use crate::error::{LayoutError, LayoutResult};
use crate::point::{Point, EPSILON};
use crate::polygon::Polygon;

/// Number of segments approximating each semicircular end of a [PathType::Round] path
const ROUND_CAP_SEGMENTS: usize = 32;

/// # Path End-Cap Styles
///
/// Numbered per the GDSII `PATHTYPE` record.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathType {
    /// Flush with the end points
    Square,
    /// Semicircular, centered on the end points
    Round,
    /// Square, extended by half the width past the end points
    Overlap,
    /// Square, extended by the path's begin and end extensions
    Extended,
}
impl PathType {
    /// GDSII `PATHTYPE` code
    pub fn code(&self) -> i16 {
        match self {
            Self::Square => 0,
            Self::Round => 1,
            Self::Overlap => 2,
            Self::Extended => 4,
        }
    }
    /// Create from a GDSII `PATHTYPE` code
    pub fn from_code(code: i16) -> LayoutResult<Self> {
        match code {
            0 => Ok(Self::Square),
            1 => Ok(Self::Round),
            2 => Ok(Self::Overlap),
            4 => Ok(Self::Extended),
            _ => LayoutError::invalid(format!("Invalid path type {}", code)),
        }
    }
}
impl Default for PathType {
    fn default() -> Self {
        Self::Square
    }
}

/// # Path
///
/// Open sequence of at least two [Point]s, drawn with `width`.
/// A missing or zero width marks a zero-width "hairline" path.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<Point>,
    layer: u8,
    data_type: u16,
    path_type: Option<PathType>,
    width: Option<f64>,
    begin_extension: Option<f64>,
    end_extension: Option<f64>,
}
impl Path {
    /// Create a new [Path]. Fails for fewer than two points, or an out-of-range layer or data-type.
    pub fn new(
        points: impl IntoIterator<Item = impl Into<Point>>,
        layer: i32,
        data_type: i32,
        path_type: Option<PathType>,
        width: Option<f64>,
    ) -> LayoutResult<Self> {
        let points: Vec<Point> = points.into_iter().map(Into::into).collect();
        if points.len() < 2 {
            return LayoutError::invalid(format!(
                "Path requires at least two points, got {}",
                points.len()
            ));
        }
        Ok(Self {
            points,
            layer: validate_layer(layer)?,
            data_type: validate_data_type(data_type)?,
            path_type,
            width,
            begin_extension: None,
            end_extension: None,
        })
    }
    /// Set the begin and end extensions, applied by [PathType::Extended] paths
    pub fn with_extensions(mut self, begin: Option<f64>, end: Option<f64>) -> Self {
        self.begin_extension = begin;
        self.end_extension = end;
        self
    }
    /// Our centerline points
    pub fn points(&self) -> &[Point] {
        &self.points
    }
    /// Layer number
    pub fn layer(&self) -> u8 {
        self.layer
    }
    /// Data-type number
    pub fn data_type(&self) -> u16 {
        self.data_type
    }
    /// End-cap style, if specified
    pub fn path_type(&self) -> Option<PathType> {
        self.path_type
    }
    /// Width, if specified
    pub fn width(&self) -> Option<f64> {
        self.width
    }
    /// Extension past the first point, for [PathType::Extended] paths
    pub fn begin_extension(&self) -> Option<f64> {
        self.begin_extension
    }
    /// Extension past the last point, for [PathType::Extended] paths
    pub fn end_extension(&self) -> Option<f64> {
        self.end_extension
    }
    /// Set the layer number. Fails if out of range.
    pub fn set_layer(&mut self, layer: i32) -> LayoutResult<&mut Self> {
        self.layer = validate_layer(layer)?;
        Ok(self)
    }
    /// Set the data-type number. Fails if out of range.
    pub fn set_data_type(&mut self, data_type: i32) -> LayoutResult<&mut Self> {
        self.data_type = validate_data_type(data_type)?;
        Ok(self)
    }
    /// Set the end-cap style
    pub fn set_path_type(&mut self, path_type: Option<PathType>) -> &mut Self {
        self.path_type = path_type;
        self
    }
    /// Set the width
    pub fn set_width(&mut self, width: Option<f64>) -> &mut Self {
        self.width = width;
        self
    }
    /// Boolean indication of whether we have no (or zero) width, and hence no area
    pub fn is_hairline(&self) -> bool {
        self.width.unwrap_or(0.).abs() / 2. < EPSILON
    }
    /// Sum of segment lengths along the centerline
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
    /// Distances by which the outline extends past the (first, last) points
    fn extensions(&self, half_width: f64) -> (f64, f64) {
        match self.path_type.unwrap_or_default() {
            PathType::Square | PathType::Round => (0., 0.),
            PathType::Overlap => (half_width, half_width),
            PathType::Extended => (
                self.begin_extension.unwrap_or(0.),
                self.end_extension.unwrap_or(0.),
            ),
        }
    }
    ///
    /// Outline [Polygon], on our layer and data-type.
    ///
    /// Offsets the centerline by half our width on either side, mitering interior corners,
    /// and applying our [PathType]'s treatment at each end.
    /// Hairline paths, with no or zero width, produce a zero-area outline which
    /// runs out along the centerline and back.
    ///
    pub fn outline(&self) -> Polygon {
        // Drop repeated points, which have no direction
        let mut pts = self.points.clone();
        pts.dedup_by(|a, b| a.is_close(b));

        if self.is_hairline() || pts.len() < 2 {
            let back: Vec<Point> = pts
                .iter()
                .rev()
                .skip(1)
                .take(pts.len().saturating_sub(2))
                .copied()
                .collect();
            pts.extend(back);
            return Polygon::from_parts(pts, self.layer, self.data_type);
        }
        let half = self.width.unwrap_or(0.).abs() / 2.;
        // Unit direction of each segment
        let dirs: Vec<Point> = pts
            .windows(2)
            .map(|w| {
                let d = w[1] - w[0];
                d * (1. / d.norm())
            })
            .collect();
        let normal = |d: &Point| Point::new(-d.y, d.x);
        let n = pts.len();

        // Apply the end extensions
        let (begin_ext, end_ext) = self.extensions(half);
        pts[0] = pts[0] - dirs[0] * begin_ext;
        pts[n - 1] = pts[n - 1] + dirs[n - 2] * end_ext;

        // Left-hand offset of each point. Interior points are mitered.
        let offsets: Vec<Point> = (0..n)
            .map(|i| {
                if i == 0 {
                    normal(&dirs[0]) * half
                } else if i == n - 1 {
                    normal(&dirs[n - 2]) * half
                } else {
                    let (n0, n1) = (normal(&dirs[i - 1]), normal(&dirs[i]));
                    let sum = n0 + n1;
                    let len = sum.norm();
                    if len < EPSILON {
                        // Reversing direction; no meaningful miter
                        n0 * half
                    } else {
                        let bisector = sum * (1. / len);
                        bisector * (half / bisector.dot(&n0))
                    }
                }
            })
            .collect();

        let mut outline: Vec<Point> = Vec::with_capacity(2 * n + 2 * ROUND_CAP_SEGMENTS);
        outline.extend(pts.iter().zip(offsets.iter()).map(|(p, o)| *p + *o));
        if self.path_type == Some(PathType::Round) {
            outline.extend(round_cap(pts[n - 1], offsets[n - 1]));
        }
        outline.extend(pts.iter().zip(offsets.iter()).rev().map(|(p, o)| *p - *o));
        if self.path_type == Some(PathType::Round) {
            outline.extend(round_cap(pts[0], -offsets[0]));
        }
        Polygon::from_parts(outline, self.layer, self.data_type)
    }
}
/// Interior points of a semicircular cap about `centre`,
/// sweeping clockwise from `centre + start` to `centre - start`.
fn round_cap(centre: Point, start: Point) -> impl Iterator<Item = Point> {
    let radius = start.norm();
    let angle0 = start.y.atan2(start.x);
    (1..ROUND_CAP_SEGMENTS).map(move |k| {
        let angle = angle0 - PI * (k as f64) / (ROUND_CAP_SEGMENTS as f64);
        centre + Point::new(radius * angle.cos(), radius * angle.sin())
    })
}
impl ElementTrait for Path {
    /// Bounding box of our outline
    fn bounding_box(&self) -> BoundBox {
        self.outline().points().bbox()
    }
    fn anchor(&self) -> Point {
        self.points.first().copied().unwrap_or_default()
    }
    fn translate(&mut self, delta: Point) {
        self.points.iter_mut().for_each(|p| *p += delta);
    }
    fn rotate_about(&mut self, angle: f64, centre: Point) {
        self.points
            .iter_mut()
            .for_each(|p| *p = p.rotate(angle, centre));
    }
    /// Scales points, width, and extensions
    fn scale_about(&mut self, factor: f64, centre: Point) {
        self.points
            .iter_mut()
            .for_each(|p| *p = p.scale(factor, centre));
        self.width = self.width.map(|w| w * factor.abs());
        self.begin_extension = self.begin_extension.map(|e| e * factor.abs());
        self.end_extension = self.end_extension.map(|e| e * factor.abs());
    }
    fn reflect_x(&mut self) {
        self.points.iter_mut().for_each(|p| *p = p.reflect_x());
    }
}
impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Path with {} point(s), starting at {} on layer {}, data type {}, {:?}, width {}",
            self.points.len(),
            self.anchor(),
            self.layer,
            self.data_type,
            self.path_type.unwrap_or_default(),
            self.width.unwrap_or(0.)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Movable;

    fn vertical(path_type: Option<PathType>) -> Path {
        Path::new([(0., 0.), (0., 1.)], 0, 0, path_type, Some(1.)).unwrap()
    }

    #[test]
    fn validation() {
        assert!(matches!(
            Path::new([(0., 0.)], 0, 0, None, None),
            Err(LayoutError::Validation(_))
        ));
        assert!(Path::new([(0., 0.), (1., 0.)], 256, 0, None, None).is_err());
        assert!(PathType::from_code(3).is_err());
        for pt in [
            PathType::Square,
            PathType::Round,
            PathType::Overlap,
            PathType::Extended,
        ] {
            assert_eq!(PathType::from_code(pt.code()).unwrap(), pt);
        }
    }
    #[test]
    fn length() -> LayoutResult<()> {
        let path = Path::new([(0., 0.), (1., 0.), (1., 1.)], 0, 0, None, Some(0.1))?;
        assert_eq!(path.length(), 2.0);
        Ok(())
    }
    #[test]
    fn square_outline() {
        let outline = vertical(None).outline();
        let expected =
            Polygon::new([(-0.5, 0.), (0.5, 0.), (0.5, 1.), (-0.5, 1.)], 0, 0).unwrap();
        assert!(outline.looks_like(&expected));
        let bbox = vertical(Some(PathType::Square)).bounding_box();
        assert_eq!(bbox.p0, Point::new(-0.5, 0.));
        assert_eq!(bbox.p1, Point::new(0.5, 1.));
    }
    #[test]
    fn overlap_outline() {
        let bbox = vertical(Some(PathType::Overlap)).bounding_box();
        assert_eq!(bbox.p0, Point::new(-0.5, -0.5));
        assert_eq!(bbox.p1, Point::new(0.5, 1.5));
    }
    #[test]
    fn extended_outline() {
        let path = vertical(Some(PathType::Extended)).with_extensions(Some(0.25), Some(2.));
        let bbox = path.bounding_box();
        assert_eq!(bbox.p0, Point::new(-0.5, -0.25));
        assert_eq!(bbox.p1, Point::new(0.5, 3.));
    }
    #[test]
    fn round_outline() {
        let outline = vertical(Some(PathType::Round)).outline();
        // Two points per side, plus each cap's interior points, plus closure
        assert_eq!(outline.points().len(), 4 + 2 * (ROUND_CAP_SEGMENTS - 1) + 1);
        let bbox = outline.bounding_box();
        assert!(bbox.p0.is_close(&Point::new(-0.5, -0.5)));
        assert!(bbox.p1.is_close(&Point::new(0.5, 1.5)));
        assert!(outline.contains((0., 1.45)));
        assert!(!outline.contains((0.45, 1.45)));
    }
    #[test]
    fn mitered_corners() -> LayoutResult<()> {
        let path = Path::new([(0., 0.), (2., 0.), (2., 2.)], 0, 0, None, Some(1.))?;
        let outline = path.outline();
        let expected = Polygon::new(
            [
                (0., 0.5),
                (1.5, 0.5),
                (1.5, 2.),
                (2.5, 2.),
                (2.5, -0.5),
                (0., -0.5),
            ],
            0,
            0,
        )?;
        assert!(outline.looks_like(&expected));
        assert!((outline.area() - 4.0).abs() < 1e-9);
        Ok(())
    }
    #[test]
    fn hairlines() -> LayoutResult<()> {
        let path = Path::new([(0., 0.), (1., 0.), (1., 1.)], 0, 0, None, None)?;
        assert!(path.is_hairline());
        let outline = path.outline();
        assert_eq!(outline.points().len(), 5);
        assert_eq!(outline.area(), 0.);
        let bbox = path.bounding_box();
        assert_eq!(bbox.p1, Point::new(1., 1.));

        let zero = Path::new([(0., 0.), (2., 0.)], 0, 0, Some(PathType::Square), Some(0.))?;
        assert!(zero.is_hairline());
        assert_eq!(zero.outline().area(), 0.);
        Ok(())
    }
    #[test]
    fn scaling() -> LayoutResult<()> {
        let mut path = vertical(None);
        path.scale(2., Point::origin());
        assert_eq!(path.width(), Some(2.));
        assert_eq!(path.points()[1], Point::new(0., 2.));
        Ok(())
    }
}
