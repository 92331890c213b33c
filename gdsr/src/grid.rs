//!
//! # Placement Grids
//!

// Crates.io
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

// Local imports
use crate::point::Point;

///
/// # Placement Grid
///
/// Where, and how many times, a [crate::Reference] places its instance.
///
/// Placement `(col, row)` lands at `origin + T(col * spacing_x + row * spacing_y)`,
/// where `T` applies x-reflection, then magnification, then rotation, all about the origin.
/// Each placed copy is transformed by `T` as well.
///
/// ```
/// use gdsr::{GridBuilder, Point};
///
/// let grid = GridBuilder::default()
///     .columns(2usize)
///     .rows(3usize)
///     .spacing_x((10., 0.))
///     .spacing_y((0., 20.))
///     .build()
///     .unwrap();
/// assert_eq!(grid.positions().len(), 6);
/// assert_eq!(grid.positions()[5], Point::new(10., 40.));
/// ```
///
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", setter(into), build_fn(validate = "Self::validate"))]
pub struct Grid {
    /// Location of the first placement
    #[builder(default)]
    pub origin: Point,
    /// Number of columns
    #[builder(default = "1")]
    pub columns: usize,
    /// Number of rows
    #[builder(default = "1")]
    pub rows: usize,
    /// Step between columns
    #[builder(default)]
    pub spacing_x: Point,
    /// Step between rows
    #[builder(default)]
    pub spacing_y: Point,
    /// Magnification factor
    #[builder(default = "1.0")]
    pub magnification: f64,
    /// Rotation, in degrees counter-clockwise
    #[builder(default = "0.0")]
    pub angle: f64,
    /// Reflection about the x-axis, applied before rotation
    #[builder(default = "false")]
    pub x_reflection: bool,
}
impl GridBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.columns == Some(0) || self.rows == Some(0) {
            return Err("Grid requires at least one column and one row".into());
        }
        Ok(())
    }
}
impl Default for Grid {
    /// Single placement at the origin, without transformation
    fn default() -> Self {
        Self {
            origin: Point::origin(),
            columns: 1,
            rows: 1,
            spacing_x: Point::origin(),
            spacing_y: Point::origin(),
            magnification: 1.,
            angle: 0.,
            x_reflection: false,
        }
    }
}
impl Grid {
    /// Boolean indication of whether we are a single placement, with no spacing
    pub fn is_single(&self) -> bool {
        self.columns == 1
            && self.rows == 1
            && self.spacing_x == Point::origin()
            && self.spacing_y == Point::origin()
    }
    /// Apply our reflection, magnification, and rotation to `pt`, about the origin
    pub fn transform(&self, pt: Point) -> Point {
        let pt = if self.x_reflection { pt.reflect_x() } else { pt };
        (pt * self.magnification).rotate(self.angle, Point::origin())
    }
    /// Invert [Grid::transform]. Returns `None` for zero magnification.
    pub fn inverse_transform(&self, pt: Point) -> Option<Point> {
        if self.magnification == 0. {
            return None;
        }
        let pt = pt.rotate(-self.angle, Point::origin()) * (1. / self.magnification);
        Some(if self.x_reflection { pt.reflect_x() } else { pt })
    }
    /// Offset of placement `(col, row)` relative to our origin, before transformation
    pub fn offset(&self, col: usize, row: usize) -> Point {
        self.spacing_x * (col as f64) + self.spacing_y * (row as f64)
    }
    /// Placement locations, row-major: each row's columns in turn
    pub fn positions(&self) -> Vec<Point> {
        let mut rv = Vec::with_capacity(self.columns * self.rows);
        for row in 0..self.rows {
            for col in 0..self.columns {
                rv.push(self.origin + self.transform(self.offset(col, row)));
            }
        }
        rv
    }
    /// Move our origin to `target`
    pub fn move_to(&mut self, target: impl Into<Point>) -> &mut Self {
        self.origin = target.into();
        self
    }
    /// Shift our origin by `delta`
    pub fn move_by(&mut self, delta: impl Into<Point>) -> &mut Self {
        self.origin += delta.into();
        self
    }
    /// Rotate by `angle` degrees about `centre`.
    /// Moves the origin, and adds to our own rotation. Spacing is unchanged.
    pub fn rotate(&mut self, angle: f64, centre: impl Into<Point>) -> &mut Self {
        self.origin = self.origin.rotate(angle, centre);
        self.angle += angle;
        self
    }
    /// Scale by `factor` about `centre`.
    /// Moves the origin, and multiplies our own magnification. Spacing is unchanged.
    pub fn scale(&mut self, factor: f64, centre: impl Into<Point>) -> &mut Self {
        self.origin = self.origin.scale(factor, centre);
        self.magnification *= factor;
        self
    }
    /// Reflect about the x-axis.
    /// Reflects the origin, negates our rotation, and toggles our own reflection.
    pub fn reflect_x(&mut self) -> &mut Self {
        self.origin = self.origin.reflect_x();
        self.angle = -self.angle;
        self.x_reflection = !self.x_reflection;
        self
    }
}
impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Grid of {}x{} at {}, spacing {} by {}, magnification {}, angle {}, x-reflection {}",
            self.columns,
            self.rows,
            self.origin,
            self.spacing_x,
            self.spacing_y,
            self.magnification,
            self.angle,
            self.x_reflection
        )
    }
}
