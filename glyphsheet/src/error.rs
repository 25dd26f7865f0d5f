//! Errors that abort a job.
//!
//! Numerical trouble inside the pipeline (unparsable paths, too few samples,
//! degenerate scales) is always recovered with a fallback value and never
//! shows up here.

use std::{fmt, io, path::PathBuf};

/// An error that aborts the pipeline for a job.
#[derive(Debug)]
pub enum Error {
    /// The tracer output had a different number of boxes and paths.
    MismatchedInput { bboxes: usize, paths: usize },
    /// Reading or writing job storage failed.
    Io { path: PathBuf, source: io::Error },
    /// A regeneration pass was requested but no cluster centers were stored.
    MissingCenters,
    /// The stored cluster centers could not be decoded.
    CorruptCenters(serde_json::Error),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::CorruptCenters(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchedInput { bboxes, paths } => write!(
                f,
                "tracer output is not index aligned: {bboxes} bounding boxes but {paths} paths"
            ),
            Self::Io { path, source } => write!(f, "job storage error at {path:?}: {source}"),
            Self::MissingCenters => write!(f, "no cluster centers were stored for this job"),
            Self::CorruptCenters(e) => write!(f, "stored cluster centers are corrupt: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::CorruptCenters(e) => Some(e),
            _ => None,
        }
    }
}
