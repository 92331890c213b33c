//!
//! # Layout Result and Error Types
//!

// Workspace Imports
use gdsrstream::GdsError;
pub use gdsrutils::{self, ErrorContext};

/// # [LayoutError] Result Type
pub type LayoutResult<T> = Result<T, LayoutError>;

///
/// # Layout Error Enumeration
///
pub enum LayoutError {
    /// Invalid construction or input value, e.g. an empty point-list or out-of-range layer
    Validation(String),
    /// Arithmetic failure, e.g. division by zero
    Arithmetic(String),
    /// A [crate::Cell] name already present in a [crate::Library]
    NameConflict(String),
    /// A reference-chain which cycles back to an ancestor cell
    Cycle(String),
    /// Error Exporting to GDSII
    Export {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Error Importing from GDSII
    Import {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Cell names referenced by a GDSII stream, but never defined in it
    DanglingReferences(Vec<String>),
    /// Stream-level GDSII errors
    Gds(GdsError),
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
    /// # [gdsrutils::Ptr] Locking
    /// Caused by a panic while holding a lock.
    /// Generally a [std::sync::PoisonError], which is not forwardable due to lifetime constraints.
    PtrLock,
}
impl LayoutError {
    /// Create a [LayoutError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [LayoutError::Str] variant from anything String-convertible
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
    /// Create an error-variant [Result] of our [LayoutError::Validation] variant
    pub fn invalid<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::Validation(s.into()))
    }
}
impl std::fmt::Debug for LayoutError {
    /// Display a [LayoutError]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LayoutError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            LayoutError::Arithmetic(msg) => write!(f, "Arithmetic Error: {}", msg),
            LayoutError::NameConflict(name) => {
                write!(f, "Name Conflict: cell `{}` already exists", name)
            }
            LayoutError::Cycle(name) => write!(f, "Reference Cycle through cell `{}`", name),
            LayoutError::Export { message, stack } => {
                write!(f, "Export Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::Import { message, stack } => {
                write!(f, "Import Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::DanglingReferences(names) => {
                write!(f, "Undefined cells referenced: {}", names.join(", "))
            }
            LayoutError::Gds(err) => write!(f, "GDSII Error: {:?}", err),
            LayoutError::Boxed(err) => err.fmt(f),
            LayoutError::Str(err) => err.fmt(f),
            LayoutError::PtrLock => write!(f, "[std::sync::PoisonError]"),
        }
    }
}
impl std::fmt::Display for LayoutError {
    /// Display a [LayoutError]
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gds(e) => Some(e),
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<GdsError> for LayoutError {
    fn from(e: GdsError) -> Self {
        Self::Gds(e)
    }
}
impl From<String> for LayoutError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for LayoutError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<std::num::TryFromIntError> for LayoutError {
    fn from(e: std::num::TryFromIntError) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<std::io::Error> for LayoutError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<gdsrutils::ser::Error> for LayoutError {
    fn from(e: gdsrutils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl<T> From<std::sync::PoisonError<T>> for LayoutError {
    fn from(_e: std::sync::PoisonError<T>) -> Self {
        Self::PtrLock
    }
}
impl<T: std::error::Error + Send + Sync + 'static> From<Box<T>> for LayoutError {
    fn from(e: Box<T>) -> Self {
        Self::Boxed(e)
    }
}
