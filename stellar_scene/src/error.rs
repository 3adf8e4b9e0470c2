//! Error types for the Stellar scene core
//!
//! Per-frame work (transform propagation, culling, sorting, cascade fitting)
//! never fails: bad input degrades into a visually wrong frame. Errors are
//! reserved for structural edits a caller got wrong, such as moving a node
//! into its own subtree or addressing a Vob that no longer exists.

use std::fmt;

/// Result type for Stellar scene operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stellar scene errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A structural precondition was violated by the caller
    /// (cycle, root moved under a node, non-root moved to root position)
    InvalidArgument(String),

    /// A key that does not (or no longer) refers to a live Vob or node
    InvalidHandle(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::InvalidHandle(msg) => write!(f, "Invalid handle: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Build an `Error::InvalidArgument` and log it at ERROR severity.
///
/// ```ignore
/// return Err(engine_err!("stellar::NodeTree", "node {:?} is its own ancestor", key));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::stellar::Error::InvalidArgument(message)
    }};
}

/// Build an `Error::InvalidHandle` and log it at WARN severity.
#[macro_export]
macro_rules! engine_handle_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_warn!($source, "{}", message);
        $crate::stellar::Error::InvalidHandle(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
