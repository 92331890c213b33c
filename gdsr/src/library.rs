//!
//! # Libraries
//!

// Std-Lib
use std::collections::HashSet;
use std::ops::AddAssign;

// Crates.io
use log::debug;

// Workspace
use gdsrstream::GdsLibrary;
use gdsrutils::{Ptr, PtrList};

// Local imports
use crate::cell::{Cell, DeepCopier};
use crate::config::GdsOptions;
use crate::error::{LayoutError, LayoutResult};
use crate::gds::{GdsExporter, GdsImporter};

///
/// # Library
///
/// Named, ordered collection of uniquely-named [Cell]s.
///
/// Cells are shared via [Ptr]. References among them are by pointer,
/// so referenced cells need not be members of the library.
/// Any such non-member cells are discovered and written on export.
///
#[derive(Debug, Clone, Default)]
pub struct Library {
    /// Library Name
    pub name: String,
    cells: PtrList<Cell>,
}
impl Library {
    /// Create a new, empty [Library]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: PtrList::new(),
        }
    }
    ///
    /// Add a [Cell], returning its shared pointer.
    ///
    /// If a different cell of the same name is present, fails with [LayoutError::NameConflict],
    /// unless `replace` is set, in which case the new cell takes the old one's position.
    /// Adding a pointer which is already a member is a no-op.
    ///
    pub fn add(&mut self, cell: impl Into<Ptr<Cell>>, replace: bool) -> LayoutResult<Ptr<Cell>> {
        let cell = cell.into();
        let name = cell.read_or_recover().name().to_string();
        match self.cells.position_where(|c| c.name() == name) {
            Some(idx) if self.cells[idx].ptr_eq(&cell) => Ok(cell),
            Some(_) if !replace => Err(LayoutError::NameConflict(name)),
            Some(idx) => {
                debug!("Replacing cell `{}` in library `{}`", name, self.name);
                self.cells[idx] = cell.clone();
                Ok(cell)
            }
            None => Ok(self.cells.add_ptr(cell)),
        }
    }
    /// Remove the [Cell] named `name`, returning it if present
    pub fn remove(&mut self, name: &str) -> Option<Ptr<Cell>> {
        let idx = self.cells.position_where(|c| c.name() == name)?;
        Some(self.cells.remove(idx))
    }
    /// Boolean indication of whether a [Cell] named `name` is a member
    pub fn contains(&self, name: &str) -> bool {
        self.cells.position_where(|c| c.name() == name).is_some()
    }
    /// Get the [Cell] named `name`
    pub fn get(&self, name: &str) -> Option<Ptr<Cell>> {
        let idx = self.cells.position_where(|c| c.name() == name)?;
        Some(self.cells[idx].clone())
    }
    /// Iterator over our member [Cell]s, in insertion order
    pub fn cells(&self) -> impl Iterator<Item = &Ptr<Cell>> {
        self.cells.iter()
    }
    /// Number of member [Cell]s
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    ///
    /// Copy this [Library].
    ///
    /// Shallow copies share their cells with the original.
    /// Deep copies duplicate every cell, including referenced non-members.
    /// Cells shared in the original, e.g. a member which other members reference, remain shared.
    ///
    pub fn copy(&self, deep: bool) -> LayoutResult<Library> {
        if !deep {
            return Ok(self.clone());
        }
        let mut copier = DeepCopier::default();
        let cells = self
            .cells
            .iter()
            .map(|c| copier.copy_ptr(c))
            .collect::<LayoutResult<Vec<_>>>()?;
        Ok(Self {
            name: self.name.clone(),
            cells: cells.into(),
        })
    }
    /// Convert to an in-memory [GdsLibrary]
    pub fn to_gds_lib(&self, options: &GdsOptions) -> LayoutResult<GdsLibrary> {
        GdsExporter::export(self, options)
    }
    /// Write to GDSII file `fname`
    pub fn to_gds(&self, fname: impl AsRef<std::path::Path>, options: &GdsOptions) -> LayoutResult<()> {
        self.to_gds_lib(options)?.save(fname)?;
        Ok(())
    }
    /// Encode as GDSII bytes
    pub fn to_gds_bytes(&self, options: &GdsOptions) -> LayoutResult<Vec<u8>> {
        Ok(self.to_gds_lib(options)?.to_bytes()?)
    }
    /// Import from an in-memory [GdsLibrary], with coordinates in user-units of `options.user_unit`
    pub fn from_gds_lib(gdslib: &GdsLibrary, options: &GdsOptions) -> LayoutResult<Library> {
        GdsImporter::import(gdslib, options)
    }
    /// Read from GDSII file `fname`
    pub fn from_gds(fname: impl AsRef<std::path::Path>, options: &GdsOptions) -> LayoutResult<Library> {
        Self::from_gds_lib(&GdsLibrary::open(fname)?, options)
    }
    /// Decode from GDSII bytes
    pub fn from_gds_bytes(bytes: &[u8], options: &GdsOptions) -> LayoutResult<Library> {
        Self::from_gds_lib(&GdsLibrary::from_bytes(bytes)?, options)
    }
}
impl AddAssign<Cell> for Library {
    /// Add `cell`, replacing any same-named member
    fn add_assign(&mut self, cell: Cell) {
        *self += Ptr::new(cell);
    }
}
impl AddAssign<Ptr<Cell>> for Library {
    /// Add `cell`, replacing any same-named member
    fn add_assign(&mut self, cell: Ptr<Cell>) {
        // Infallible with `replace` set
        let _ = self.add(cell, true);
    }
}
impl PartialEq for Library {
    /// Equal names, and equal member cells by name, irrespective of order
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name || self.len() != other.len() {
            return false;
        }
        let names: HashSet<String> = self.cells().map(|c| c.read_or_recover().name().to_string()).collect();
        if names.len() != self.len() {
            return false;
        }
        self.cells().all(|c| {
            let name = c.read_or_recover().name().to_string();
            match other.get(&name) {
                Some(o) => c.ptr_eq(&o) || *c.read_or_recover() == *o.read_or_recover(),
                None => false,
            }
        })
    }
}
impl std::fmt::Display for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Library `{}` with {} cell(s)", self.name, self.len())
    }
}
