//!
//! # Layout Elements
//!
//! The closed set of things a [crate::Cell] holds: [Polygon]s, [Path]s, [Text]s, and [Reference]s,
//! and the transformation traits shared between them.
//!

// Crates.io
use enum_dispatch::enum_dispatch;

// Local imports
use crate::bbox::BoundBox;
use crate::error::{LayoutError, LayoutResult};
use crate::{Path, Point, Polygon, Reference, Text};

/// Maximum GDSII layer number
pub const MAX_LAYER: i32 = 255;
/// Maximum GDSII data-type number
pub const MAX_DATA_TYPE: i32 = 65535;

/// Check `layer` is in GDSII's valid range
pub(crate) fn validate_layer(layer: i32) -> LayoutResult<u8> {
    u8::try_from(layer)
        .map_err(|_| LayoutError::Validation(format!("Layer {} outside 0-{}", layer, MAX_LAYER)))
}
/// Check `data_type` is in GDSII's valid range
pub(crate) fn validate_data_type(data_type: i32) -> LayoutResult<u16> {
    u16::try_from(data_type).map_err(|_| {
        LayoutError::Validation(format!(
            "Data type {} outside 0-{}",
            data_type, MAX_DATA_TYPE
        ))
    })
}

///
/// # Element Trait
///
/// Geometric operations common to every [Element] variant, dispatched by [enum_dispatch].
/// Each operates in place. The chaining forms live on [Movable].
///
#[enum_dispatch]
pub trait ElementTrait {
    /// Rectangular bounding box
    fn bounding_box(&self) -> BoundBox;
    /// Reference point, moved to the target of [Movable::move_to]
    fn anchor(&self) -> Point;
    /// Shift by `delta`
    fn translate(&mut self, delta: Point);
    /// Rotate by `angle` degrees counter-clockwise about `centre`
    fn rotate_about(&mut self, angle: f64, centre: Point);
    /// Scale by `factor` about `centre`
    fn scale_about(&mut self, factor: f64, centre: Point);
    /// Reflect about the x-axis
    fn reflect_x(&mut self);
}

///
/// # Movable
///
/// Chaining transformations, available on everything implementing [ElementTrait].
///
/// ```
/// use gdsr::{Movable, Point, Polygon};
///
/// let mut square = Polygon::new([(0., 0.), (1., 0.), (1., 1.), (0., 1.)], 0, 0).unwrap();
/// square.move_by((1., 1.)).rotate(90., (1., 1.)).scale(2., Point::origin());
/// assert!(square.points()[1].is_close(&Point::new(2., 4.)));
/// ```
///
pub trait Movable: ElementTrait + Sized {
    /// Move so that our [ElementTrait::anchor] lands at `target`
    fn move_to(&mut self, target: impl Into<Point>) -> &mut Self {
        let delta = target.into() - self.anchor();
        self.translate(delta);
        self
    }
    /// Shift by `delta`
    fn move_by(&mut self, delta: impl Into<Point>) -> &mut Self {
        self.translate(delta.into());
        self
    }
    /// Rotate by `angle` degrees counter-clockwise about `centre`
    fn rotate(&mut self, angle: f64, centre: impl Into<Point>) -> &mut Self {
        self.rotate_about(angle, centre.into());
        self
    }
    /// Scale by `factor` about `centre`
    fn scale(&mut self, factor: f64, centre: impl Into<Point>) -> &mut Self {
        self.scale_about(factor, centre.into());
        self
    }
}
impl<T: ElementTrait> Movable for T {}

///
/// # Element Enumeration
///
/// Polygons, paths, texts, and references, as stored in a [crate::Cell]
/// and produced by flattening.
///
#[enum_dispatch(ElementTrait)]
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Polygon(Polygon),
    Path(Path),
    Text(Text),
    Reference(Reference),
}
impl Element {
    /// Copy of this element. References share their placed [crate::Cell]s with the original.
    pub fn copy(&self) -> Element {
        self.clone()
    }
    /// Layer number
    pub fn layer(&self) -> Option<u8> {
        match self {
            Element::Polygon(p) => Some(p.layer()),
            Element::Path(p) => Some(p.layer()),
            Element::Text(t) => Some(t.layer()),
            Element::Reference(_) => None,
        }
    }
    /// Data-type number. Texts and references have none.
    pub fn data_type(&self) -> Option<u16> {
        match self {
            Element::Polygon(p) => Some(p.data_type()),
            Element::Path(p) => Some(p.data_type()),
            _ => None,
        }
    }
    /// Boolean indication of whether we pass `filter`, a (layer, data-type) pair.
    /// Texts match on layer alone. References never match.
    pub(crate) fn matches(&self, filter: (u8, u16)) -> bool {
        match self {
            Element::Text(t) => t.layer() == filter.0,
            Element::Reference(_) => false,
            _ => self.layer() == Some(filter.0) && self.data_type() == Some(filter.1),
        }
    }
}
impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Element::Polygon(x) => std::fmt::Display::fmt(x, f),
            Element::Path(x) => std::fmt::Display::fmt(x, f),
            Element::Text(x) => std::fmt::Display::fmt(x, f),
            Element::Reference(x) => std::fmt::Display::fmt(x, f),
        }
    }
}
