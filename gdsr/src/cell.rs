//!
//! # Cells
//!

// Std-Lib
use std::collections::{HashMap, HashSet};

// Workspace
use gdsrutils::Ptr;

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::config::GdsOptions;
use crate::element::{Element, ElementTrait};
use crate::error::{LayoutError, LayoutResult};
use crate::library::Library;
use crate::point::Point;
use crate::reference::{Instance, Reference};
use crate::{Path, Polygon, Text};

///
/// # Cell
///
/// Named collection of [Polygon]s, [Path]s, [Text]s, and [Reference]s,
/// each kept in insertion order.
///
/// Contents are read through slice accessors, and modified through
/// [Cell::add], [Cell::remove], [Cell::flatten], and the whole-cell transformations.
///
#[derive(Debug, Clone, Default)]
pub struct Cell {
    name: String,
    polygons: Vec<Polygon>,
    paths: Vec<Path>,
    texts: Vec<Text>,
    references: Vec<Reference>,
}
impl Cell {
    /// Create a new, empty [Cell]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }
    pub fn texts(&self) -> &[Text] {
        &self.texts
    }
    pub fn references(&self) -> &[Reference] {
        &self.references
    }
    /// Add an [Element], appending it to the collection for its type
    pub fn add(&mut self, element: impl Into<Element>) -> &mut Self {
        match element.into() {
            Element::Polygon(e) => self.polygons.push(e),
            Element::Path(e) => self.paths.push(e),
            Element::Text(e) => self.texts.push(e),
            Element::Reference(e) => self.references.push(e),
        }
        self
    }
    /// Remove every element equal to `element`
    pub fn remove(&mut self, element: &Element) -> &mut Self {
        match element {
            Element::Polygon(e) => self.polygons.retain(|x| x != e),
            Element::Path(e) => self.paths.retain(|x| x != e),
            Element::Text(e) => self.texts.retain(|x| x != e),
            Element::Reference(e) => self.references.retain(|x| x != e),
        }
        self
    }
    /// Boolean indication of whether we contain an element equal to `element`
    pub fn contains(&self, element: &Element) -> bool {
        match element {
            Element::Polygon(e) => self.polygons.contains(e),
            Element::Path(e) => self.paths.contains(e),
            Element::Text(e) => self.texts.contains(e),
            Element::Reference(e) => self.references.contains(e),
        }
    }
    /// Boolean indication of whether we have no contents
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
            && self.paths.is_empty()
            && self.texts.is_empty()
            && self.references.is_empty()
    }
    /// Copies of all our elements: polygons, then paths, then texts, then references
    pub fn elements(&self) -> Vec<Element> {
        let mut rv = Vec::with_capacity(
            self.polygons.len() + self.paths.len() + self.texts.len() + self.references.len(),
        );
        rv.extend(self.polygons.iter().cloned().map(Element::from));
        rv.extend(self.paths.iter().cloned().map(Element::from));
        rv.extend(self.texts.iter().cloned().map(Element::from));
        rv.extend(self.references.iter().cloned().map(Element::from));
        rv
    }
    /// [Cell]s placed directly by our references
    pub fn dependencies(&self) -> Vec<Ptr<Cell>> {
        self.references.iter().flat_map(|r| r.cells()).collect()
    }
    ///
    /// Replace our references with their expansion, `depth` levels deep.
    /// `None` flattens fully, after which we hold no references.
    ///
    /// If `filter` is provided, only expanded elements on its (layer, data-type) are kept.
    /// Texts match on layer alone. Our own, pre-existing elements are always kept.
    ///
    /// Fails, without modification, if a chain of references places a cell inside itself.
    ///
    pub fn flatten(
        &mut self,
        filter: Option<(u8, u16)>,
        depth: Option<usize>,
    ) -> LayoutResult<&mut Self> {
        if depth == Some(0) {
            return Ok(self);
        }
        let mut expanded = Vec::new();
        for r in self.references.iter() {
            expanded.extend(r.flatten_inner(depth, &mut Vec::new())?);
        }
        self.references.clear();
        for elem in expanded {
            match elem {
                Element::Reference(r) => self.references.push(r),
                other => {
                    if filter.map_or(true, |f| other.matches(f)) {
                        self.add(other);
                    }
                }
            }
        }
        Ok(self)
    }
    /// The elements we would hold after [Cell::flatten], without modifying ourselves
    pub fn get_elements(
        &self,
        filter: Option<(u8, u16)>,
        depth: Option<usize>,
    ) -> LayoutResult<Vec<Element>> {
        let mut copy = self.clone();
        copy.flatten(filter, depth)?;
        Ok(copy.elements())
    }
    ///
    /// Copy this [Cell].
    ///
    /// Shallow copies share referenced cells with the original.
    /// Deep copies duplicate them, recursively, preserving any sharing among them.
    ///
    pub fn copy(&self, deep: bool) -> LayoutResult<Cell> {
        if !deep {
            return Ok(self.clone());
        }
        DeepCopier::default().copy_cell(self)
    }
    /// Bounding box of all contents, including flattened references.
    /// Fails with [LayoutError::Cycle] if any reference places a cell inside itself.
    pub fn bounding_box(&self) -> LayoutResult<BoundBox> {
        let mut bbox = BoundBox::empty();
        for e in self.polygons.iter() {
            bbox = e.bounding_box().union(&bbox);
        }
        for e in self.paths.iter() {
            bbox = e.bounding_box().union(&bbox);
        }
        for e in self.texts.iter() {
            bbox = e.bounding_box().union(&bbox);
        }
        for r in self.references.iter() {
            bbox = r.try_bounding_box()?.union(&bbox);
        }
        Ok(bbox)
    }
    /// Compare by value, skipping pairs of cells already under comparison in `visited`.
    /// Cell-graphs with cycles compare without recursing forever.
    pub(crate) fn eq_tracked(
        &self,
        other: &Cell,
        visited: &mut HashSet<(Ptr<Cell>, Ptr<Cell>)>,
    ) -> bool {
        self.name == other.name
            && self.polygons == other.polygons
            && self.paths == other.paths
            && self.texts == other.texts
            && self.references.len() == other.references.len()
            && self
                .references
                .iter()
                .zip(other.references.iter())
                .all(|(a, b)| a.eq_tracked(b, visited))
    }
    /// Apply `f` to every element, in place
    fn for_each_element(&mut self, f: impl Fn(&mut dyn ElementTrait)) {
        self.polygons.iter_mut().for_each(|e| f(e));
        self.paths.iter_mut().for_each(|e| f(e));
        self.texts.iter_mut().for_each(|e| f(e));
        self.references.iter_mut().for_each(|e| f(e));
    }
    /// Shift all contents by `delta`
    pub fn move_by(&mut self, delta: impl Into<Point>) -> &mut Self {
        let delta = delta.into();
        self.for_each_element(|e| e.translate(delta));
        self
    }
    /// Rotate all contents by `angle` degrees about `centre`
    pub fn rotate(&mut self, angle: f64, centre: impl Into<Point>) -> &mut Self {
        let centre = centre.into();
        self.for_each_element(|e| e.rotate_about(angle, centre));
        self
    }
    /// Scale all contents by `factor` about `centre`
    pub fn scale(&mut self, factor: f64, centre: impl Into<Point>) -> &mut Self {
        let centre = centre.into();
        self.for_each_element(|e| e.scale_about(factor, centre));
        self
    }
    /// Write to GDSII file `fname`, as the sole top-level cell of a library named per `options`
    pub fn to_gds(
        &self,
        fname: impl AsRef<std::path::Path>,
        options: &GdsOptions,
    ) -> LayoutResult<()> {
        let mut lib = Library::new(&options.library_name);
        lib.add(self.clone(), false)?;
        lib.to_gds(fname, options)
    }
}
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.eq_tracked(other, &mut HashSet::new())
    }
}
impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cell `{}` with {} polygon(s), {} path(s), {} text(s), and {} reference(s)",
            self.name,
            self.polygons.len(),
            self.paths.len(),
            self.texts.len(),
            self.references.len()
        )
    }
}

///
/// # Deep-Copy Helper
///
/// Duplicates cells and everything they reference.
/// Memoized by source pointer, so that cells shared in the source remain shared in the copy.
///
#[derive(Debug, Default)]
pub(crate) struct DeepCopier {
    /// Source pointer to copied pointer
    memo: HashMap<Ptr<Cell>, Ptr<Cell>>,
    /// Source pointers with a copy in progress
    pending: HashSet<Ptr<Cell>>,
}
impl DeepCopier {
    /// Copy the cell behind `ptr`, or return its existing copy
    pub(crate) fn copy_ptr(&mut self, ptr: &Ptr<Cell>) -> LayoutResult<Ptr<Cell>> {
        if let Some(copied) = self.memo.get(ptr) {
            return Ok(copied.clone());
        }
        if !self.pending.insert(ptr.clone()) {
            return Err(LayoutError::Cycle(ptr.read_or_recover().name.clone()));
        }
        let copied = {
            let cell = ptr
                .try_read_or_recover()
                .ok_or_else(|| LayoutError::Cycle(String::from("<locked>")))?;
            self.copy_cell(&cell)?
        };
        let copied = Ptr::new(copied);
        self.pending.remove(ptr);
        self.memo.insert(ptr.clone(), copied.clone());
        Ok(copied)
    }
    /// Copy `cell`, deep-copying everything it references
    pub(crate) fn copy_cell(&mut self, cell: &Cell) -> LayoutResult<Cell> {
        let references = cell
            .references
            .iter()
            .map(|r| self.copy_reference(r))
            .collect::<LayoutResult<Vec<_>>>()?;
        Ok(Cell {
            name: cell.name.clone(),
            polygons: cell.polygons.clone(),
            paths: cell.paths.clone(),
            texts: cell.texts.clone(),
            references,
        })
    }
    fn copy_reference(&mut self, r: &Reference) -> LayoutResult<Reference> {
        let instance = match &r.instance {
            Instance::Cell(ptr) => Instance::Cell(self.copy_ptr(ptr)?),
            Instance::Element(e) => match e.as_ref() {
                Element::Reference(inner) => {
                    Instance::Element(Box::new(Element::Reference(self.copy_reference(inner)?)))
                }
                other => Instance::Element(Box::new(other.clone())),
            },
            Instance::Reference(inner) => Instance::Reference(Box::new(self.copy_reference(inner)?)),
        };
        Ok(Reference {
            instance,
            grid: r.grid.clone(),
        })
    }
}
