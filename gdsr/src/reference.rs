//!
//! # References
//!
//! Placements of [Cell]s, [Element]s, or other [Reference]s on a [Grid],
//! and their expansion ("flattening") into placed copies.
//!

// Std-Lib
use std::collections::HashSet;

// Crates.io
use log::warn;

// Workspace
use gdsrutils::Ptr;

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::cell::Cell;
use crate::element::{Element, ElementTrait};
use crate::error::{LayoutError, LayoutResult};
use crate::grid::Grid;
use crate::point::Point;
use crate::{Path, Polygon, Text};

///
/// # Reference Instance
///
/// The thing a [Reference] places.
/// Cells are held by shared [Ptr], so that edits to a cell are visible through all its references.
///
#[derive(Debug, Clone)]
pub enum Instance {
    Cell(Ptr<Cell>),
    Element(Box<Element>),
    Reference(Box<Reference>),
}
impl Instance {
    /// Direct and nested placements of [Cell]s.
    /// Cells placed by those cells are not included.
    pub fn cells(&self) -> Vec<Ptr<Cell>> {
        match self {
            Instance::Cell(ptr) => vec![ptr.clone()],
            Instance::Element(e) => match e.as_ref() {
                Element::Reference(r) => r.instance.cells(),
                _ => Vec::new(),
            },
            Instance::Reference(r) => r.instance.cells(),
        }
    }
}
impl Instance {
    /// Compare by value, including the contents of referenced cells.
    /// A pair of cells met again while already under comparison counts as equal.
    pub(crate) fn eq_tracked(
        &self,
        other: &Self,
        visited: &mut HashSet<(Ptr<Cell>, Ptr<Cell>)>,
    ) -> bool {
        match (self, other) {
            (Instance::Cell(a), Instance::Cell(b)) => {
                if a.ptr_eq(b) || !visited.insert((a.clone(), b.clone())) {
                    return true;
                }
                let (a, b) = (a.read_or_recover(), b.read_or_recover());
                a.eq_tracked(&b, visited)
            }
            (Instance::Element(a), Instance::Element(b)) => match (a.as_ref(), b.as_ref()) {
                (Element::Reference(a), Element::Reference(b)) => a.eq_tracked(b, visited),
                (a, b) => a == b,
            },
            (Instance::Reference(a), Instance::Reference(b)) => a.eq_tracked(b, visited),
            _ => false,
        }
    }
}
impl PartialEq for Instance {
    /// Instances compare by value, including the contents of referenced cells
    fn eq(&self, other: &Self) -> bool {
        self.eq_tracked(other, &mut HashSet::new())
    }
}
impl From<Ptr<Cell>> for Instance {
    fn from(ptr: Ptr<Cell>) -> Self {
        Self::Cell(ptr)
    }
}
impl From<&Ptr<Cell>> for Instance {
    fn from(ptr: &Ptr<Cell>) -> Self {
        Self::Cell(ptr.clone())
    }
}
impl From<Cell> for Instance {
    fn from(cell: Cell) -> Self {
        Self::Cell(Ptr::new(cell))
    }
}
impl From<Element> for Instance {
    fn from(e: Element) -> Self {
        Self::Element(Box::new(e))
    }
}
impl From<Polygon> for Instance {
    fn from(e: Polygon) -> Self {
        Element::from(e).into()
    }
}
impl From<Path> for Instance {
    fn from(e: Path) -> Self {
        Element::from(e).into()
    }
}
impl From<Text> for Instance {
    fn from(e: Text) -> Self {
        Element::from(e).into()
    }
}
impl From<Reference> for Instance {
    fn from(r: Reference) -> Self {
        Self::Reference(Box::new(r))
    }
}

///
/// # Reference
///
/// Places its [Instance] at each position of its [Grid].
///
#[derive(Debug, Clone)]
pub struct Reference {
    pub instance: Instance,
    pub grid: Grid,
}
impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.eq_tracked(other, &mut HashSet::new())
    }
}
impl Reference {
    pub(crate) fn eq_tracked(
        &self,
        other: &Self,
        visited: &mut HashSet<(Ptr<Cell>, Ptr<Cell>)>,
    ) -> bool {
        self.grid == other.grid && self.instance.eq_tracked(&other.instance, visited)
    }
    /// Create a single, untransformed placement of `instance` at the origin
    pub fn new(instance: impl Into<Instance>) -> Self {
        Self {
            instance: instance.into(),
            grid: Grid::default(),
        }
    }
    /// Set our [Grid]
    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.grid = grid;
        self
    }
    ///
    /// Expand into placed copies of our instance, recursing `depth` levels into nested references.
    /// A `depth` of `None` flattens fully. A `depth` of zero returns ourselves, unmodified.
    ///
    /// Fails if a chain of references places a [Cell] inside itself.
    ///
    pub fn flatten(&self, depth: Option<usize>) -> LayoutResult<Vec<Element>> {
        let mut ancestors = Vec::new();
        self.flatten_inner(depth, &mut ancestors)
    }
    /// Recursive implementation of [Reference::flatten].
    /// `ancestors` holds each [Cell] being expanded, outermost first.
    pub(crate) fn flatten_inner(
        &self,
        depth: Option<usize>,
        ancestors: &mut Vec<Ptr<Cell>>,
    ) -> LayoutResult<Vec<Element>> {
        if depth == Some(0) {
            return Ok(vec![Element::Reference(self.clone())]);
        }
        // Collect the instance's elements, untransformed
        let (contents, cell) = match &self.instance {
            Instance::Cell(ptr) => {
                if ancestors.contains(ptr) {
                    return Err(cycle_error(ptr));
                }
                let cell = match ptr.try_read_or_recover() {
                    Some(cell) => cell,
                    // Write-locked, presumably by a caller in our own call-stack, mid-flatten
                    None => return Err(cycle_error(ptr)),
                };
                (cell.elements(), Some(ptr.clone()))
            }
            Instance::Element(e) => (vec![e.as_ref().clone()], None),
            Instance::Reference(r) => (vec![Element::Reference(r.as_ref().clone())], None),
        };
        if let Some(ptr) = &cell {
            ancestors.push(ptr.clone());
        }
        let next_depth = depth.map(|d| d - 1);
        let mut rv = Vec::with_capacity(contents.len() * self.grid.columns * self.grid.rows);
        for position in self.grid.positions() {
            for elem in contents.iter() {
                let mut elem = elem.clone();
                self.place(&mut elem, position);
                match elem {
                    Element::Reference(r) if next_depth != Some(0) => {
                        rv.extend(r.flatten_inner(next_depth, ancestors)?);
                    }
                    _ => rv.push(elem),
                }
            }
        }
        if cell.is_some() {
            ancestors.pop();
        }
        Ok(rv)
    }
    /// Apply our grid's transformation to `elem`, and move it to `position`
    fn place(&self, elem: &mut Element, position: Point) {
        if self.grid.x_reflection {
            elem.reflect_x();
        }
        elem.scale_about(self.grid.magnification, Point::origin());
        elem.rotate_about(self.grid.angle, Point::origin());
        elem.translate(position);
    }
    /// [Cell]s placed by our instance, including through nested references
    pub fn cells(&self) -> Vec<Ptr<Cell>> {
        self.instance.cells()
    }
}
/// Create a [LayoutError::Cycle] naming the cell behind `ptr`, if it can be read
fn cycle_error(ptr: &Ptr<Cell>) -> LayoutError {
    let name = match ptr.try_read_or_recover() {
        Some(cell) => cell.name().to_string(),
        None => String::from("<locked>"),
    };
    LayoutError::Cycle(name)
}
impl Reference {
    /// Bounding box of our fully-flattened contents.
    /// Fails with [LayoutError::Cycle] on cyclic references.
    pub fn try_bounding_box(&self) -> LayoutResult<BoundBox> {
        Ok(self
            .flatten(None)?
            .iter()
            .fold(BoundBox::empty(), |bbox, e| e.bounding_box().union(&bbox)))
    }
}
impl ElementTrait for Reference {
    ///
    /// Bounding box of our fully-flattened contents.
    ///
    /// The [ElementTrait] signature is infallible, so a reference which cannot be flattened,
    /// e.g. one which places a cell inside itself, reports an *empty* box and logs a warning.
    /// Use [Reference::try_bounding_box] or [Cell::bounding_box] to receive the error instead.
    ///
    fn bounding_box(&self) -> BoundBox {
        match self.try_bounding_box() {
            Ok(bbox) => bbox,
            Err(e) => {
                warn!("Cannot compute bounding box of reference: {}", e);
                BoundBox::empty()
            }
        }
    }
    fn anchor(&self) -> Point {
        self.grid.origin
    }
    fn translate(&mut self, delta: Point) {
        self.grid.move_by(delta);
    }
    fn rotate_about(&mut self, angle: f64, centre: Point) {
        self.grid.rotate(angle, centre);
    }
    fn scale_about(&mut self, factor: f64, centre: Point) {
        self.grid.scale(factor, centre);
    }
    fn reflect_x(&mut self) {
        self.grid.reflect_x();
    }
}
impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let target = match &self.instance {
            Instance::Cell(ptr) => match ptr.try_read_or_recover() {
                Some(cell) => format!("cell `{}`", cell.name()),
                None => String::from("a locked cell"),
            },
            Instance::Element(e) => format!("{}", e),
            Instance::Reference(r) => format!("({})", r),
        };
        write!(f, "Reference to {} on {}", target, self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Movable;

    fn square() -> Polygon {
        Polygon::new([(0., 0.), (1., 0.), (1., 1.), (0., 1.)], 1, 0).unwrap()
    }

    #[test]
    fn flatten_depth_zero_is_a_no_op() -> LayoutResult<()> {
        let r = Reference::new(square());
        let flat = r.flatten(Some(0))?;
        assert_eq!(flat, vec![Element::Reference(r)]);
        Ok(())
    }
    #[test]
    fn flatten_cardinality() -> LayoutResult<()> {
        let grid = Grid {
            columns: 3,
            rows: 2,
            spacing_x: Point::new(2., 0.),
            spacing_y: Point::new(0., 2.),
            ..Default::default()
        };
        let mut cell = Cell::new("c");
        cell.add(square()).add(square());
        let r = Reference::new(cell).with_grid(grid.clone());
        assert_eq!(r.flatten(None)?.len(), 3 * 2 * 2);

        // Nested: a 3x2 grid of 3x2 grids
        let outer = Reference::new(r.clone()).with_grid(grid);
        assert_eq!(outer.flatten(None)?.len(), 6 * 6 * 2);
        // One level expands only the outer grid
        let one = outer.flatten(Some(1))?;
        assert_eq!(one.len(), 6);
        assert!(one.iter().all(|e| matches!(e, Element::Reference(_))));
        Ok(())
    }
    #[test]
    fn flattened_placement() -> LayoutResult<()> {
        let grid = Grid {
            origin: Point::new(10., 0.),
            columns: 2,
            spacing_x: Point::new(5., 0.),
            angle: 90.,
            magnification: 2.,
            ..Default::default()
        };
        let flat = Reference::new(square()).with_grid(grid).flatten(None)?;
        let expected0 = Polygon::new([(10., 0.), (10., 2.), (8., 2.), (8., 0.)], 1, 0)?;
        let expected1 = Polygon::new([(10., 10.), (10., 12.), (8., 12.), (8., 10.)], 1, 0)?;
        match (&flat[0], &flat[1]) {
            (Element::Polygon(a), Element::Polygon(b)) => {
                assert!(a.looks_like(&expected0));
                assert!(b.looks_like(&expected1));
            }
            _ => panic!("Expected two polygons"),
        }
        Ok(())
    }
    #[test]
    fn reflected_placement() -> LayoutResult<()> {
        let grid = Grid {
            x_reflection: true,
            ..Default::default()
        };
        let text = Text::new("t", (1., 1.), 0)?;
        let flat = Reference::new(text).with_grid(grid).flatten(None)?;
        match &flat[0] {
            Element::Text(t) => {
                assert_eq!(t.origin(), Point::new(1., -1.));
                assert!(t.x_reflection());
            }
            _ => panic!("Expected a text"),
        }
        Ok(())
    }
    #[test]
    fn rotations_sum() {
        let mut r = Reference::new(square());
        r.rotate(30., Point::origin()).rotate(60., Point::origin());
        assert_eq!(r.grid.angle, 90.);
        r.scale(2., Point::origin()).scale(1.5, Point::origin());
        assert_eq!(r.grid.magnification, 3.);
    }
    #[test]
    fn cycles_fail() {
        let a = Ptr::new(Cell::new("a"));
        let b = Ptr::new(Cell::new("b"));
        a.write_or_recover().add(Reference::new(&b));
        b.write_or_recover().add(Reference::new(&a));
        let r = Reference::new(&a);
        assert!(matches!(r.flatten(None), Err(LayoutError::Cycle(_))));
        // A bounded depth stops short of the cycle
        assert_eq!(r.flatten(Some(1)).unwrap().len(), 1);
        assert!(r.bounding_box().is_empty());
        assert!(matches!(r.try_bounding_box(), Err(LayoutError::Cycle(_))));
    }
    #[test]
    fn bounding_box() {
        let r = Reference::new(square()).with_grid(Grid {
            columns: 2,
            spacing_x: Point::new(3., 0.),
            ..Default::default()
        });
        let bbox = r.bounding_box();
        assert_eq!(bbox.p0, Point::new(0., 0.));
        assert_eq!(bbox.p1, Point::new(4., 1.));
    }
    #[test]
    fn equality_by_value() {
        let mut c1 = Cell::new("c");
        c1.add(square());
        let c2 = c1.clone();
        assert_eq!(Reference::new(c1), Reference::new(c2));
        assert_ne!(Reference::new(square()), Reference::new(Cell::new("c")));
    }
    #[test]
    fn equality_of_cyclic_cells() {
        // Two distinct, identical, self-placing cells
        let a = Ptr::new(Cell::new("loop"));
        a.write_or_recover().add(Reference::new(&a));
        let b = Ptr::new(Cell::new("loop"));
        b.write_or_recover().add(Reference::new(&b));
        assert_eq!(Reference::new(&a), Reference::new(&b));
        assert!(*a.read_or_recover() == *b.read_or_recover());

        // Same cycle, differing contents
        let c = Ptr::new(Cell::new("loop"));
        c.write_or_recover().add(Reference::new(&c)).add(square());
        assert_ne!(Reference::new(&a), Reference::new(&c));
        // Reached through an element instance
        assert_eq!(
            Reference::new(Reference::new(&a)),
            Reference::new(Reference::new(&b))
        );
    }
}
