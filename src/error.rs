//! Error types for contact probability analysis.
//!
//! Every variant is fatal for a run. The numeric core never produces
//! errors; these are raised by the readers, writers and input checks
//! around it.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Declared residue count disagrees with what the trajectory holds
    #[error("residue count mismatch in frame {frame}: expected {expected}, found {found}")]
    InputSizeMismatch {
        expected: usize,
        found: usize,
        frame: usize,
    },

    /// Precomputed Q values do not cover the trajectory one-to-one
    #[error("Q value count mismatch: trajectory has {frames} frames, Q file has {q_values} values")]
    FrameCountMismatch { frames: usize, q_values: usize },

    /// A backing file could not be opened, read or written
    #[error("cannot access {}: {source}", .path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {} at line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Contact that cannot be evaluated against the trajectory
    #[error("invalid contact #{index} ({focus}, {contact}): {reason}")]
    InvalidContact {
        index: usize,
        focus: usize,
        contact: usize,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported trajectory format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl AnalysisError {
    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::ResourceUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        AnalysisError::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_names_frame() {
        let err = AnalysisError::InputSizeMismatch {
            expected: 147,
            found: 163,
            frame: 4,
        };
        assert_eq!(
            err.to_string(),
            "residue count mismatch in frame 4: expected 147, found 163"
        );
    }

    #[test]
    fn test_resource_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AnalysisError::resource("traj.xtc", io);
        assert!(err.to_string().contains("traj.xtc"));
        assert!(err.source().is_some());
    }
}
