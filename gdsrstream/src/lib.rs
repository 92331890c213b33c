//!
//! # GDSII Stream-Format Parser & Writer
//!
//! Reading and writing of GDSII, the IC industry's de facto standard for layout data interchange.
//! Data is kept on GDSII's own terms: integer database-unit coordinates,
//! named structs, and element types named after their records.
//!
//! Layout data takes three forms:
//!
//! * A short tree. A [GdsLibrary] holds [GdsStruct]s, each of which holds [GdsElement]s:
//!   polygons ([GdsBoundary]), wires ([GdsPath]), labels ([GdsTextElem]),
//!   and instances of other structs ([GdsStructRef], [GdsArrayRef]).
//! * A flat sequence of [GdsRecord]s, marking the start, content, and end of each tree node.
//! * The binary stream: each record as a big-endian length, record-type, data-type, and payload.
//!
//! Decoding is strict. Records outside the supported subset,
//! such as nodes, boxes, and properties, fail with [GdsError::Unsupported].
//!
//! ## Usage
//!
//! ```
//! use gdsrstream::{GdsBoundary, GdsLibrary, GdsPoint, GdsStruct};
//!
//! let mut lib = GdsLibrary::new("mylib");
//! let mut cell = GdsStruct::new("mycell");
//! cell.elems.push(
//!     GdsBoundary {
//!         layer: 1,
//!         datatype: 0,
//!         xy: GdsPoint::vec(&[(0, 0), (0, 10), (10, 10), (10, 0), (0, 0)]),
//!     }
//!     .into(),
//! );
//! lib.structs.push(cell);
//!
//! let bytes = lib.to_bytes().unwrap();
//! let lib2 = GdsLibrary::from_bytes(&bytes).unwrap();
//! assert_eq!(lib, lib2);
//! ```
//!
//! Each node of the tree is also [serde]-serializable, to and from JSON, YAML, and TOML.
//!

pub mod data;
pub use data::*;

pub mod read;
pub use read::*;

pub mod write;
pub use write::*;

#[cfg(test)]
mod tests;
