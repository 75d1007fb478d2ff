//! Error handling types shared by every templex component.
//!
//! One error type serves the whole pipeline, from scanner configuration
//! through parse failures. Each error carries a machine-readable
//! [`ErrorKind`], a human-readable message, and optional source coordinates.
//!
//! Two families of errors flow through here and they are handled
//! differently by callers:
//!
//! - **data errors** ([`ErrorKind::Scan`], [`ErrorKind::Parse`],
//!   [`ErrorKind::Grammar`], [`ErrorKind::Io`]): the input was bad; report
//!   it to the user and stop the run.
//! - **configuration errors** (the duplicate/unknown/unresolved kinds,
//!   [`ErrorKind::GrammarCycle`], [`ErrorKind::OutOfRange`]): the calling
//!   code or the grammar it built is wrong; these indicate bugs and are
//!   returned eagerly so misuse fails at construction time, not mid-parse.
//!
//! # Examples
//!
//! ```rust
//! use templex_syntax::error::{error_at, Error, ErrorKind, Result};
//!
//! fn scan_step(line: usize, col: usize) -> Result<()> {
//!     error_at(ErrorKind::Scan, line, col, "no pass matched")
//! }
//!
//! let err = scan_step(3, 7).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::Scan);
//! assert_eq!(err.to_string(), "no pass matched at 3:7");
//! ```

use std::fmt;

/// Classification of templex failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No scanner pass matched the input at the current offset.
    Scan,
    /// No statement template matched the token stream, or a structural
    /// limit (nesting depth) was exceeded.
    Parse,
    /// A malformed grammar document (bad field combination, bad repeat).
    Grammar,
    /// A pass name was registered twice with `add_pass`.
    DuplicatePass,
    /// A pass name was removed without being registered.
    UnknownPass,
    /// A statement template id was added twice to one language.
    DuplicateTemplate,
    /// An identical requirement value was added twice to one template.
    DuplicateRequirement,
    /// A requirement references a statement template id the language does
    /// not define.
    UnresolvedReference,
    /// The grammar recursed into the same template at the same position
    /// without consuming any token.
    GrammarCycle,
    /// A cursor was advanced or restored past its valid range.
    OutOfRange,
    /// A file could not be read or written.
    Io,
}

impl ErrorKind {
    /// Heading used when rendering diagnostics for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Scan => "Scan error",
            ErrorKind::Parse => "Parse error",
            ErrorKind::Grammar => "Grammar error",
            ErrorKind::DuplicatePass => "Duplicate pass",
            ErrorKind::UnknownPass => "Unknown pass",
            ErrorKind::DuplicateTemplate => "Duplicate template",
            ErrorKind::DuplicateRequirement => "Duplicate requirement",
            ErrorKind::UnresolvedReference => "Unresolved reference",
            ErrorKind::GrammarCycle => "Grammar cycle",
            ErrorKind::OutOfRange => "Out of range",
            ErrorKind::Io => "IO error",
        }
    }
}

/// An error raised anywhere in the templex pipeline.
///
/// # Examples
///
/// ```rust
/// use templex_syntax::error::{Error, ErrorKind};
///
/// // Error without source location
/// let plain = Error::new(ErrorKind::UnknownPass, "no pass named \"strl\"");
///
/// // Error anchored to a source position
/// let located = Error::with_span(ErrorKind::Scan, "unexpected byte", 10, 5);
/// assert_eq!(located.to_string(), "unexpected byte at 10:5");
/// # let _ = plain;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// What class of failure this is.
    pub kind: ErrorKind,

    /// Human-readable message.
    pub msg: String,

    /// Line number in the source input (1-based), when known.
    pub line: Option<usize>,

    /// Column number in the source input (1-based), when known.
    pub col: Option<usize>,
}

impl Error {
    /// Creates an error without source location information.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            line: None,
            col: None,
        }
    }

    /// Creates an error anchored to a source position.
    pub fn with_span(kind: ErrorKind, msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            msg: msg.into(),
            line: Some(line),
            col: Some(col),
        }
    }

    /// Creates an error anchored to a line only (token positions carry no
    /// column).
    pub fn at_line(kind: ErrorKind, msg: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            msg: msg.into(),
            line: Some(line),
            col: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.col) {
            (Some(l), Some(c)) => write!(f, "{} at {}:{}", self.msg, l, c),
            (Some(l), None) => write!(f, "{} at line {}", self.msg, l),
            _ => write!(f, "{}", self.msg),
        }
    }
}

/// A specialized `Result` for templex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience function to create an error result.
pub fn error<T>(kind: ErrorKind, msg: impl Into<String>) -> Result<T> {
    Err(Error::new(kind, msg))
}

/// Convenience function to create an error result with a source position.
pub fn error_at<T>(kind: ErrorKind, line: usize, col: usize, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_span(kind, msg, line, col))
}
