//! Unified error handling for the pylon-analyzer library.
//!
//! Configuration misuse (bad radius, unknown corner) fails fast with a
//! descriptive error. Missing data (an empty track, a log with no GPS fix)
//! is never an error: it is a first-class result the caller must handle.

use std::fmt;

/// Unified error type for analysis operations.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A reference point name that is not part of the course.
    UnknownReferencePoint { name: String },
    /// A detection parameter outside its valid range.
    InvalidParameter {
        parameter: &'static str,
        message: String,
    },
    /// A course definition that cannot be used (e.g. no reference points).
    InvalidCourse { message: String },
    /// A record field could not be resolved during ingestion.
    FieldResolution {
        semantic: &'static str,
        candidates: Vec<String>,
    },
    /// A record carried a non-finite or out-of-range coordinate.
    InvalidCoordinates { index: usize, message: String },
    /// A source adapter failed to produce its stream.
    SourceError { message: String },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::UnknownReferencePoint { name } => {
                write!(f, "Unknown reference point '{}'", name)
            }
            AnalysisError::InvalidParameter { parameter, message } => {
                write!(f, "Invalid parameter '{}': {}", parameter, message)
            }
            AnalysisError::InvalidCourse { message } => {
                write!(f, "Invalid course: {}", message)
            }
            AnalysisError::FieldResolution {
                semantic,
                candidates,
            } => {
                write!(
                    f,
                    "No field found for '{}' (tried: {})",
                    semantic,
                    candidates.join(", ")
                )
            }
            AnalysisError::InvalidCoordinates { index, message } => {
                write!(f, "Invalid coordinates at record {}: {}", index, message)
            }
            AnalysisError::SourceError { message } => {
                write!(f, "Source error: {}", message)
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
