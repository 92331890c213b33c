//!
//! # Gdsr
//!
//! GDSII layout data model, geometry kernel, and stream conversion.
//!
//! Layout is organized as a [Library] of named [Cell]s.
//! Each cell holds [Polygon]s, [Path]s, [Text] labels, and [Reference]s.
//! References place a shared cell, a single element, or another reference
//! on a [Grid] of one or more positions, with reflection, magnification, and rotation.
//!
//! Geometry is in floating-point user units. Conversion to GDSII's
//! integer database units happens at the [Library::to_gds] and [Library::from_gds] boundaries,
//! per the [GdsOptions] provided.
//!
//! ```
//! use gdsr::{Cell, GdsOptions, Library, Polygon, Reference};
//!
//! let mut unit = Cell::new("unit");
//! unit.add(Polygon::new([(0., 0.), (1., 0.), (1., 1.), (0., 1.)], 1, 0).unwrap());
//!
//! let mut lib = Library::new("lib");
//! let unit = lib.add(unit, false).unwrap();
//! let mut top = Cell::new("top");
//! top.add(Reference::new(&unit));
//! lib.add(top, false).unwrap();
//!
//! let opts = GdsOptions::default();
//! let bytes = lib.to_gds_bytes(&opts).unwrap();
//! let lib2 = Library::from_gds_bytes(&bytes, &opts).unwrap();
//! assert_eq!(lib, lib2);
//! ```
//!

pub mod bbox;
pub mod boolean;
pub mod cell;
pub mod config;
pub mod element;
pub mod error;
pub mod gds;
pub mod geom;
pub mod grid;
pub mod library;
pub mod path;
pub mod point;
pub mod polygon;
pub mod reference;
pub mod text;

pub use bbox::{BoundBox, BoundBoxTrait};
pub use boolean::{boolean, BooleanOperand, BooleanOperation};
pub use cell::Cell;
pub use config::{GdsOptions, GdsOptionsBuilder};
pub use element::{Element, ElementTrait, Movable};
pub use error::{LayoutError, LayoutResult};
pub use gds::{GdsExporter, GdsImporter};
pub use grid::{Grid, GridBuilder};
pub use library::Library;
pub use path::{Path, PathType};
pub use point::Point;
pub use polygon::{Ellipse, EllipseBuilder, Polygon};
pub use reference::{Instance, Reference};
pub use text::{HorizontalPresentation, Text, VerticalPresentation};

// Re-export the stream-level crate
pub use gdsrstream;

#[cfg(test)]
mod tests;
