//!
//! # Error-Helper Utilities
//!
//! Tree-walking converters (GDSII importers and exporters, for example)
//! generally carry a stack of "where am I" context,
//! which is attached to any error they produce.
//! [ErrorHelper] captures that pattern, and [Unwrapper] applies it post-fix to [Option]s and [Result]s.
//!
//! ```rust
//! use gdsrutils::error::{ErrorHelper, Unwrapper};
//!
//! struct Walker {
//!     depth: usize,
//! }
//! impl ErrorHelper for Walker {
//!     type Error = String;
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("Error at depth {}: {}", self.depth, msg.into())
//!     }
//! }
//! impl Walker {
//!     fn walk(&self) -> Result<i32, String> {
//!         let x = Some(5).unwrapper(self, "missing x")?;
//!         let y: Result<i32, ()> = Ok(6);
//!         let y = y.unwrapper(self, "bad y")?;
//!         self.assert(x < y, "out of order")?;
//!         Ok(x + y)
//!     }
//! }
//! assert_eq!(Walker { depth: 0 }.walk(), Ok(11));
//! ```
//!

// Std-lib
use std::fmt;

///
/// # ErrorHelper
///
/// Implementers provide `err`, which builds their error type from a message,
/// typically decorated with some internal state.
/// The remaining methods are default-implemented atop it.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and fail if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix [ErrorHelper] handling for [Option]s and [Result]s.
/// Failures are routed to the helper's `fail` rather than panicking.
/// Any error payload of a failed [Result] is discarded in favor of `msg`.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}
impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<T, H::Error>
    where
        H: ErrorHelper,
    {
        helper.unwrap(self, msg)
    }
}
impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<T, H::Error>
    where
        H: ErrorHelper,
    {
        helper.unwrap(self.ok(), msg)
    }
}

/// # Error Context
///
/// Enumerated locations in a layout tree-walk.
/// Generally pushed and popped by converters and reported upon failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Library(String),
    Cell(String),
    Polygon,
    Path,
    Text,
    Reference(String),
    Array(String),
    Units,
}
impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library(name) => write!(f, "library `{}`", name),
            Self::Cell(name) => write!(f, "cell `{}`", name),
            Self::Reference(name) => write!(f, "reference to `{}`", name),
            Self::Array(name) => write!(f, "array of `{}`", name),
            other => write!(f, "{:?}", other),
        }
    }
}
