//!
//! # GDSR Internal Utilities Crate
//!
//! Shared pointers, error helpers, serialization to and from files,
//! and dependency-ordering of graph-like layout data.
//!

pub mod ptr;
pub use ptr::*;

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod dep_order;
pub use dep_order::*;
