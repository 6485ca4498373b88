//! The [`GSignalError`] `enum` definition and error messages.
//!
//! Errors fall into a few broad classes:
//!
//!  - *parse errors*, raised when interval text cannot be understood,
//!  - *argument errors*, raised before any I/O when an option is illegal for a source kind
//!    or structurally invalid,
//!  - *unsupported operation errors*, raised lazily when a native-only method is invoked on a
//!    source that cannot perform it,
//!  - *configuration errors*, raised when a source kind is not recognized.
//!
//! Everything else wraps errors from the underlying readers.
use crate::{options::OptionName, sources::SourceKind, Position};
use genomap::GenomeMapError;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// The [`GSignalError`] defines the standard set of errors that should
/// be passed to the user.
#[derive(Debug, Error)]
pub enum GSignalError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("TSV parsing error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Error from the underlying format reader: {0}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),

    // File parsing related errors
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("Float parsing error: {0}")]
    ParseFloatError(#[from] ParseFloatError),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Error encountered in genomap::GenomeMap")]
    GenomeMapError(#[from] GenomeMapError),

    // Interval specification errors
    #[error("Invalid interval specification '{0}': expected 'chrom:start-end' or 'chrom:start-end[strand]'")]
    InvalidIntervalSpec(String),
    #[error("Interval invalid: start ({0}) must not be greater than end ({1})")]
    InvalidInterval(Position, Position),
    #[error("Invalid strand '{0}': must be either '+' or '-'")]
    InvalidStrand(String),

    // Argument errors
    #[error("Argument '{option}' is not supported for {kind} sources")]
    UnsupportedArgument { option: OptionName, kind: SourceKind },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("use_score was requested, but a record has no score")]
    MissingScore,

    // Lazily raised
    #[error("Operation '{operation}' is not supported by {kind} sources")]
    UnsupportedOperation {
        operation: &'static str,
        kind: SourceKind,
    },

    // Configuration errors
    #[error("Unsupported source kind '{0}'; supported kinds are: {1}")]
    UnsupportedSourceKind(String, String),

    // Batch evaluation
    #[error("Could not build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Could not shape batch output: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl GSignalError {
    /// Whether this is an argument error, i.e. one raised by option validation.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            GSignalError::UnsupportedArgument { .. } | GSignalError::InvalidArgument(_)
        )
    }

    /// Whether this error came from parsing an interval specification.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            GSignalError::InvalidIntervalSpec(_)
                | GSignalError::InvalidInterval(..)
                | GSignalError::InvalidStrand(_)
        )
    }

    /// Box an error from an underlying reader (e.g. `noodles` or `bigtools`).
    pub fn adapter<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GSignalError::Adapter(Box::new(error))
    }
}
