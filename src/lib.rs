pub mod analysis;
pub mod averaging;
pub mod config;
pub mod contacts;
pub mod error;
pub mod probability;
pub mod qvalue;
pub mod report;
pub mod structure;
pub mod trajectory;

#[cfg(feature = "python")]
pub mod python_bindings;

// Re-export commonly used types and functions
pub use analysis::{load_inputs, resolve_q_values, AnalysisInputs};
pub use averaging::{average_by_residue, ResidueAverage};
pub use config::{AnalysisConfig, DEFAULT_CUTOFF};
pub use contacts::{load_contacts, Contact};
pub use error::{AnalysisError, Result};
pub use probability::{compute_probabilities, ContactProbabilities, ContactRecord, InclusiveRange, QRange, TimeRange};
pub use qvalue::{compute_q_values, read_q_values, write_q_values};
pub use structure::{Coordinate, Frame};
pub use trajectory::{open_trajectory, PdbTrajectory, Trajectory, TrajectoryData, XtcTrajectory};
