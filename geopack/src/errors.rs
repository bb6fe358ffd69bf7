use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for GeoPackage operations
///
/// This enum represents all possible error types that can occur while working
/// with GeoPackage geometry data and feature indexes. Each error kind describes
/// a specific category of failure, enabling precise error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use geopack::errors::{GeoPackageError, ErrorKind, GeoPackageResult};
///
/// fn example() -> GeoPackageResult<()> {
///     Err(GeoPackageError::new("Invalid geometry magic", ErrorKind::MalformedGeometry))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Codec errors - raised while decoding or encoding geometry blobs
    /// Geometry blob failed header or payload validation
    MalformedGeometry,
    /// Error encoding or decoding well-known binary data
    EncodingError,

    // Store errors - raised by the persistence contract
    /// A mutation was attempted on a read-only store
    NotWritable,
    /// A required collaborator (backing table, projection, SRS) is unavailable
    MissingDependency,
    /// The requested row or table was not found
    NotFound,

    // Indexing errors - raised by the feature table index
    /// Generic indexing error
    IndexingError,
    /// Index rows survived a cascade delete or rebuild
    IndexInconsistency,

    // Operation errors
    /// The operation is not valid in the current context
    InvalidOperation,

    // IO errors - raised when an underlying store surfaces one
    /// Generic IO error
    IOError,

    // Generic/internal errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MalformedGeometry => write!(f, "Malformed geometry"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::NotWritable => write!(f, "Not writable"),
            ErrorKind::MissingDependency => write!(f, "Missing dependency"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::IndexingError => write!(f, "Indexing error"),
            ErrorKind::IndexInconsistency => write!(f, "Index inconsistency"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom GeoPackage error type.
///
/// `GeoPackageError` encapsulates error information including the error
/// message, kind, and optional cause. It supports error chaining and
/// backtraces for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use geopack::errors::{GeoPackageError, ErrorKind};
///
/// // Create a simple error
/// let err = GeoPackageError::new("Unsupported version", ErrorKind::MalformedGeometry);
///
/// // Create an error with a cause
/// let cause = GeoPackageError::new("IO failed", ErrorKind::IOError);
/// let err = GeoPackageError::new_with_cause("Index rebuild failed", ErrorKind::IndexingError, cause);
/// ```
///
/// # Type alias
///
/// The `GeoPackageResult<T>` type alias is equivalent to
/// `Result<T, GeoPackageError>` and is used throughout the codebase for
/// operations that can fail.
#[derive(Clone)]
pub struct GeoPackageError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<GeoPackageError>>,
    backtrace: Box<Backtrace>,
}

impl GeoPackageError {
    /// Creates a new `GeoPackageError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `GeoPackageError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        GeoPackageError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Box::new(Backtrace::new_unresolved()),
        }
    }

    /// Creates a new `GeoPackageError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `GeoPackageError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: GeoPackageError) -> Self {
        GeoPackageError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Box::new(Backtrace::new_unresolved()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&GeoPackageError> {
        self.cause.as_deref()
    }
}

impl Display for GeoPackageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for GeoPackageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = (*self.backtrace).clone();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, backtrace)
            }
        }
    }
}

impl Error for GeoPackageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for GeoPackage operations.
///
/// `GeoPackageResult<T>` is shorthand for `Result<T, GeoPackageError>`.
/// All fallible operations return this type.
pub type GeoPackageResult<T> = Result<T, GeoPackageError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for GeoPackageError {
    fn from(err: std::io::Error) -> Self {
        GeoPackageError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<std::string::FromUtf8Error> for GeoPackageError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        GeoPackageError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::fmt::Error> for GeoPackageError {
    fn from(err: std::fmt::Error) -> Self {
        GeoPackageError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<String> for GeoPackageError {
    fn from(msg: String) -> Self {
        GeoPackageError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for GeoPackageError {
    fn from(msg: &str) -> Self {
        GeoPackageError::new(msg, ErrorKind::InternalError)
    }
}
