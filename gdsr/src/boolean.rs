//!
//! # Polygon Boolean Operations
//!
//! Union, intersection, difference, and symmetric difference over sets of
//! [Polygon]s and [Path]s, clipped via [geo]'s sweep-line [BooleanOps].
//!
//! The `&`, `|`, `-`, and `^` operators apply these to pairs of references,
//! producing polygons on the left operand's layer and data type:
//!
//! ```
//! use gdsr::Polygon;
//!
//! let a = Polygon::new([(0., 0.), (2., 0.), (2., 2.), (0., 2.)], 1, 0).unwrap();
//! let b = Polygon::new([(1., 1.), (3., 1.), (3., 3.), (1., 3.)], 2, 0).unwrap();
//! let overlap = &a & &b;
//! assert_eq!(overlap.len(), 1);
//! assert!((overlap[0].area() - 1.0).abs() < 1e-9);
//! assert_eq!(overlap[0].layer(), 1);
//! ```
//!

// Crates.io
use geo::{BooleanOps, Coord, LineString, MultiPolygon};
use log::trace;
use serde::{Deserialize, Serialize};

// Local imports
use crate::element::{validate_data_type, validate_layer, Element};
use crate::error::LayoutResult;
use crate::geom;
use crate::point::Point;
use crate::{Path, Polygon};

/// # Boolean Operation Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOperation {
    /// Intersection
    And,
    /// Union
    Or,
    /// Difference, first operand less second
    Difference,
    /// Symmetric difference
    Xor,
}

///
/// # Boolean Operand
///
/// Anything which resolves to a set of [Polygon]s.
/// [Path]s contribute their outline. [Element]s contribute their polygons and path-outlines,
/// with references flattened fully. Texts contribute nothing.
///
pub trait BooleanOperand {
    fn polygons(&self) -> LayoutResult<Vec<Polygon>>;
}
impl BooleanOperand for Polygon {
    fn polygons(&self) -> LayoutResult<Vec<Polygon>> {
        Ok(vec![self.clone()])
    }
}
impl BooleanOperand for Path {
    fn polygons(&self) -> LayoutResult<Vec<Polygon>> {
        Ok(self.outline_polygons())
    }
}
impl BooleanOperand for Element {
    fn polygons(&self) -> LayoutResult<Vec<Polygon>> {
        match self {
            Element::Polygon(p) => p.polygons(),
            Element::Path(p) => p.polygons(),
            Element::Text(_) => Ok(Vec::new()),
            Element::Reference(r) => r.flatten(None)?.as_slice().polygons(),
        }
    }
}
impl<T: BooleanOperand> BooleanOperand for [T] {
    fn polygons(&self) -> LayoutResult<Vec<Polygon>> {
        let mut rv = Vec::new();
        for item in self.iter() {
            rv.extend(item.polygons()?);
        }
        Ok(rv)
    }
}
impl<T: BooleanOperand> BooleanOperand for Vec<T> {
    fn polygons(&self) -> LayoutResult<Vec<Polygon>> {
        self.as_slice().polygons()
    }
}

///
/// Apply boolean `operation` to operand-sets `a` and `b`.
/// Each set is first merged into its union.
///
/// Results are placed on `layer` and `data_type`, which are validated.
/// Holes in results are connected to their enclosing outline by a zero-width cut,
/// as GDSII boundaries cannot express them directly.
///
pub fn boolean(
    a: &(impl BooleanOperand + ?Sized),
    b: &(impl BooleanOperand + ?Sized),
    operation: BooleanOperation,
    layer: i32,
    data_type: i32,
) -> LayoutResult<Vec<Polygon>> {
    let layer = validate_layer(layer)?;
    let data_type = validate_data_type(data_type)?;
    Ok(apply(&a.polygons()?, &b.polygons()?, operation, layer, data_type))
}

/// Apply `operation` to already-resolved polygon sets
fn apply(
    a: &[Polygon],
    b: &[Polygon],
    operation: BooleanOperation,
    layer: u8,
    data_type: u16,
) -> Vec<Polygon> {
    let a = merge(a);
    let b = merge(b);
    let result = match operation {
        BooleanOperation::And => a.intersection(&b),
        BooleanOperation::Or => a.union(&b),
        BooleanOperation::Difference => a.difference(&b),
        BooleanOperation::Xor => a.xor(&b),
    };
    trace!("{:?} produced {} polygon(s)", operation, result.0.len());
    result
        .into_iter()
        .filter_map(|poly| {
            let (exterior, interiors) = poly.into_inner();
            let outline = ring(&exterior)?;
            let holes: Vec<Vec<Point>> = interiors.iter().filter_map(ring).collect();
            let mut polygon = Polygon::from_parts(keyhole(outline, holes), layer, data_type);
            polygon.simplify();
            Some(polygon)
        })
        .collect()
}

/// Union of all of `polys`
fn merge(polys: &[Polygon]) -> MultiPolygon<f64> {
    polys
        .iter()
        .filter(|p| p.area() > 0.)
        .fold(MultiPolygon::new(Vec::new()), |acc, p| {
            let exterior: LineString<f64> = p
                .points()
                .iter()
                .map(|pt| Coord { x: pt.x, y: pt.y })
                .collect();
            acc.union(&MultiPolygon::new(vec![geo::Polygon::new(exterior, Vec::new())]))
        })
}

/// Open ring of points from a closed [LineString]. `None` for rings without area.
fn ring(line: &LineString<f64>) -> Option<Vec<Point>> {
    let mut pts: Vec<Point> = line.coords().map(|c| Point::new(c.x, c.y)).collect();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 || geom::area(&pts) == 0. {
        return None;
    }
    Some(pts)
}

///
/// Splice each of `holes` into `outline`, joining it at its left-most vertex
/// to the nearest outline vertex. Outline runs counter-clockwise, holes clockwise.
///
fn keyhole(mut outline: Vec<Point>, holes: Vec<Vec<Point>>) -> Vec<Point> {
    if geom::signed_area(&outline) < 0. {
        outline.reverse();
    }
    for mut hole in holes {
        if geom::signed_area(&hole) > 0. {
            hole.reverse();
        }
        let start = hole
            .iter()
            .enumerate()
            .min_by(|(_, p), (_, q)| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        hole.rotate_left(start);
        let join = hole[0];
        let idx = outline
            .iter()
            .enumerate()
            .min_by(|(_, p), (_, q)| p.distance_to(&join).total_cmp(&q.distance_to(&join)))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let anchor = outline[idx];
        let mut spliced = Vec::with_capacity(outline.len() + hole.len() + 2);
        spliced.extend_from_slice(&outline[..=idx]);
        spliced.extend(hole.iter().copied());
        spliced.push(join);
        spliced.push(anchor);
        spliced.extend_from_slice(&outline[idx + 1..]);
        outline = spliced;
    }
    outline
}

/// Implement the boolean operators for a pair of operand types
macro_rules! boolean_operators {
    (@op $trait:ident, $method:ident, $op:ident, $lhs:ty, $rhs:ty) => {
        impl std::ops::$trait<&$rhs> for &$lhs {
            type Output = Vec<Polygon>;
            fn $method(self, rhs: &$rhs) -> Vec<Polygon> {
                apply(
                    &self.outline_polygons(),
                    &rhs.outline_polygons(),
                    BooleanOperation::$op,
                    self.layer(),
                    self.data_type(),
                )
            }
        }
    };
    ($lhs:ty, $rhs:ty) => {
        boolean_operators!(@op BitAnd, bitand, And, $lhs, $rhs);
        boolean_operators!(@op BitOr, bitor, Or, $lhs, $rhs);
        boolean_operators!(@op Sub, sub, Difference, $lhs, $rhs);
        boolean_operators!(@op BitXor, bitxor, Xor, $lhs, $rhs);
    };
}
boolean_operators!(Polygon, Polygon);
boolean_operators!(Polygon, Path);
boolean_operators!(Path, Polygon);
boolean_operators!(Path, Path);

/// Infallible polygon resolution for the operator implementations
trait OutlinePolygons {
    fn outline_polygons(&self) -> Vec<Polygon>;
}
impl OutlinePolygons for Polygon {
    fn outline_polygons(&self) -> Vec<Polygon> {
        vec![self.clone()]
    }
}
impl OutlinePolygons for Path {
    /// Hairlines have no area, and contribute nothing
    fn outline_polygons(&self) -> Vec<Polygon> {
        if self.is_hairline() {
            return Vec::new();
        }
        vec![self.outline()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathType;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::new([(x0, y0), (x1, y0), (x1, y1), (x0, y1)], 1, 0).unwrap()
    }

    #[test]
    fn self_operations() {
        let p = rect(0., 0., 1., 1.);
        assert!((&p - &p).is_empty());
        assert!((&p ^ &p).is_empty());
        let union = &p | &p;
        assert_eq!(union.len(), 1);
        assert!(union[0].looks_like(&p));
        let intersection = &p & &p;
        assert_eq!(intersection.len(), 1);
        assert!(intersection[0].looks_like(&p));
    }
    #[test]
    fn disjoint_union() -> LayoutResult<()> {
        let a = vec![rect(0., 0., 1., 1.), rect(5., 5., 6., 6.)];
        let b = vec![rect(10., 10., 11., 11.)];
        let result = boolean(&a, &b, BooleanOperation::Or, 3, 4)?;
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|p| p.layer() == 3 && p.data_type() == 4));
        assert!(boolean(&a, &b, BooleanOperation::And, 3, 4)?.is_empty());
        assert!(boolean(&a, &b, BooleanOperation::Or, 256, 0).is_err());
        Ok(())
    }
    #[test]
    fn difference_with_hole() -> LayoutResult<()> {
        let outer = rect(0., 0., 4., 4.);
        let inner = rect(1., 1., 2., 2.);
        let result = &outer - &inner;
        assert_eq!(result.len(), 1);
        assert!((result[0].area() - 15.).abs() < 1e-9);
        assert!(!result[0].contains((1.5, 1.5)) || result[0].on_edge((1.5, 1.5)));
        assert!(result[0].contains((3., 3.)));
        Ok(())
    }
    #[test]
    fn paths_merge() -> LayoutResult<()> {
        let a = Path::new([(0., 0.), (0., 1.)], 1, 0, Some(PathType::Square), Some(1.))?;
        let b = Path::new([(0., 1.), (0., 2.)], 1, 0, Some(PathType::Square), Some(1.))?;
        let result = &a | &b;
        assert_eq!(result.len(), 1);
        assert!(result[0].looks_like(&rect(-0.5, 0., 0.5, 2.)));
        Ok(())
    }
    #[test]
    fn hairlines_have_no_area() -> LayoutResult<()> {
        let hairline = Path::new([(0., 0.), (1., 0.), (1., 1.)], 1, 0, None, None)?;
        let square = rect(10., 10., 11., 11.);
        let union = &hairline | &square;
        assert_eq!(union.len(), 1);
        assert!(union[0].looks_like(&square));
        assert!((&hairline & &rect(0., 0., 1., 1.)).is_empty());
        assert!(boolean(&hairline, &square, BooleanOperation::Difference, 1, 0)?.is_empty());
        Ok(())
    }
    #[test]
    fn mixed_elements() -> LayoutResult<()> {
        let elems: Vec<Element> = vec![
            rect(0., 0., 1., 1.).into(),
            crate::Text::new("label", (0., 0.), 1)?.into(),
        ];
        let result = boolean(&elems, &rect(0.5, 0., 1.5, 1.), BooleanOperation::Xor, 1, 0)?;
        let total: f64 = result.iter().map(|p| p.area()).sum();
        assert!((total - 1.).abs() < 1e-9);
        Ok(())
    }
}
