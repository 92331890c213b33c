//!
//! # Polygons
//!

// Crates.io
use derive_builder::Builder;
use log::trace;
use serde::{Deserialize, Serialize};

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::element::{validate_data_type, validate_layer, ElementTrait};
use crate::error::{LayoutError, LayoutResult};
use crate::geom;
use crate::point::Point;

/// # Polygon
///
/// Closed n-sided polygon on a layer and data-type.
///
/// Always stored explicitly closed: construction appends the first point to the end
/// whenever the two differ.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
    layer: u8,
    data_type: u16,
}
impl Polygon {
    /// Create a new [Polygon]. Fails for an empty point-list or an out-of-range layer or data-type.
    pub fn new(
        points: impl IntoIterator<Item = impl Into<Point>>,
        layer: i32,
        data_type: i32,
    ) -> LayoutResult<Self> {
        let points: Vec<Point> = points.into_iter().map(Into::into).collect();
        if points.is_empty() {
            return LayoutError::invalid("Polygon requires at least one point");
        }
        let layer = validate_layer(layer)?;
        let data_type = validate_data_type(data_type)?;
        Ok(Self::from_parts(points, layer, data_type))
    }
    /// Create from pre-validated parts. Closes `points` if necessary.
    pub(crate) fn from_parts(mut points: Vec<Point>, layer: u8, data_type: u16) -> Self {
        if let (Some(first), Some(last)) = (points.first().copied(), points.last()) {
            if first != *last {
                trace!("Closing polygon at {}", first);
                points.push(first);
            }
        }
        Self {
            points,
            layer,
            data_type,
        }
    }
    /// Create a regular polygon with `n_sides` vertices at distance `radius` from `centre`.
    /// Vertex `i` lies at angle `rotation + i * 360 / n_sides` degrees.
    pub fn regular(
        centre: impl Into<Point>,
        radius: f64,
        n_sides: usize,
        rotation: f64,
        layer: i32,
        data_type: i32,
    ) -> LayoutResult<Self> {
        if n_sides < 3 {
            return LayoutError::invalid(format!(
                "Regular polygon requires at least 3 sides, got {}",
                n_sides
            ));
        }
        let points = geom::regular(centre.into(), radius, n_sides, rotation);
        Self::new(points, layer, data_type)
    }
    /// Create an elliptical polygon, or pie-slice wedge, per the parameters in `ellipse`
    pub fn ellipse(ellipse: &Ellipse) -> LayoutResult<Self> {
        if ellipse.n_sides < 1 {
            return LayoutError::invalid("Ellipse requires at least one side");
        }
        let points = geom::ellipse(
            ellipse.centre,
            ellipse.horizontal_radius,
            ellipse.vertical_radius.unwrap_or(ellipse.horizontal_radius),
            ellipse.initial_angle,
            ellipse.final_angle,
            ellipse.n_sides,
        );
        Self::new(points, ellipse.layer, ellipse.data_type)
    }
    /// Our points, explicitly closed
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
    /// Enclosed area
    pub fn area(&self) -> f64 {
        geom::area(&self.points)
    }
    /// Length of the closed boundary
    pub fn perimeter(&self) -> f64 {
        geom::perimeter(&self.points)
    }
    /// Boolean indication of whether `pt` is inside, with edges counted as inside
    pub fn contains(&self, pt: impl Into<Point>) -> bool {
        geom::contains(&self.points, &pt.into())
    }
    /// Boolean indication of whether every point in `pts` is inside
    pub fn contains_all(&self, pts: impl IntoIterator<Item = impl Into<Point>>) -> bool {
        pts.into_iter().all(|p| self.contains(p))
    }
    /// Boolean indication of whether any point in `pts` is inside
    pub fn contains_any(&self, pts: impl IntoIterator<Item = impl Into<Point>>) -> bool {
        pts.into_iter().any(|p| self.contains(p))
    }
    /// Boolean indication of whether `pt` lies on our boundary
    pub fn on_edge(&self, pt: impl Into<Point>) -> bool {
        geom::on_edge(&self.points, &pt.into())
    }
    /// Boolean indication of whether every point in `pts` lies on our boundary
    pub fn on_edge_all(&self, pts: impl IntoIterator<Item = impl Into<Point>>) -> bool {
        pts.into_iter().all(|p| self.on_edge(p))
    }
    /// Boolean indication of whether any point in `pts` lies on our boundary
    pub fn on_edge_any(&self, pts: impl IntoIterator<Item = impl Into<Point>>) -> bool {
        pts.into_iter().any(|p| self.on_edge(p))
    }
    /// Boolean indication of whether we overlap or touch `other`
    pub fn intersects(&self, other: &Polygon) -> bool {
        geom::intersects(&self.points, &other.points)
    }
    /// Remove repeated and collinear points
    pub fn simplify(&mut self) -> &mut Self {
        self.points = geom::simplify(&self.points);
        self
    }
    /// Convert to canonical form: simplified, counter-clockwise,
    /// and starting from the lexicographically-lowest point
    pub fn normalize(&mut self) -> &mut Self {
        self.points = geom::normalize(&self.points);
        self
    }
    /// Boolean indication of whether we describe the same shape as `other`,
    /// regardless of start-point, orientation, or redundant points.
    /// Layers and data-types are not compared.
    pub fn looks_like(&self, other: &Polygon) -> bool {
        geom::looks_like(&self.points, &other.points)
    }
}
impl ElementTrait for Polygon {
    fn bounding_box(&self) -> BoundBox {
        self.points.bbox()
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
    fn scale_about(&mut self, factor: f64, centre: Point) {
        self.points
            .iter_mut()
            .for_each(|p| *p = p.scale(factor, centre));
    }
    fn reflect_x(&mut self) {
        self.points.iter_mut().for_each(|p| *p = p.reflect_x());
    }
}
impl std::fmt::Display for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Polygon with {} point(s), starting at {} on layer {}, data type {}",
            self.points.len(),
            self.anchor(),
            self.layer,
            self.data_type
        )
    }
}

/// # Ellipse Parameters
///
/// Inputs to [Polygon::ellipse]. Built via [EllipseBuilder]:
///
/// ```
/// use gdsr::{EllipseBuilder, Polygon};
///
/// let params = EllipseBuilder::default()
///     .centre((0., 0.))
///     .horizontal_radius(2.)
///     .vertical_radius(1.)
///     .layer(1)
///     .build()
///     .unwrap();
/// let ellipse = Polygon::ellipse(&params).unwrap();
/// assert_eq!(ellipse.points().len(), 401);
/// ```
///
#[derive(Debug, Clone, Builder, PartialEq, Serialize, Deserialize)]
#[builder(pattern = "owned", setter(into))]
pub struct Ellipse {
    /// Centre point
    #[builder(default)]
    pub centre: Point,
    /// Horizontal radius
    pub horizontal_radius: f64,
    /// Vertical radius. Equal to `horizontal_radius` if not specified.
    #[builder(default, setter(strip_option))]
    pub vertical_radius: Option<f64>,
    /// Start angle, in degrees
    #[builder(default = "0.0")]
    pub initial_angle: f64,
    /// End angle, in degrees
    #[builder(default = "360.0")]
    pub final_angle: f64,
    /// Number of segments along the circumference or arc
    #[builder(default = "400")]
    pub n_sides: usize,
    #[builder(default)]
    pub layer: i32,
    #[builder(default)]
    pub data_type: i32,
}
