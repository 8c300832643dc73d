//! Loading and wiring shared by the command line tool and the Python module.

use std::path::Path;

use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::contacts::{load_contacts, validate_contacts, Contact};
use crate::error::{AnalysisError, Result};
use crate::qvalue::{compute_q_values, read_q_values};
use crate::trajectory::{open_trajectory, TrajectoryData};

/// Trajectory and contact list, checked against each other
pub struct AnalysisInputs {
    pub trajectory: TrajectoryData,
    pub contacts: Vec<Contact>,
}

/// Load and check everything an analysis needs.
///
/// Fails before any computation when the configuration is invalid, a file
/// cannot be read, a frame has the wrong residue count or a contact cannot
/// be evaluated on the protein.
pub fn load_inputs(
    trajectory_path: &Path,
    contacts_path: &Path,
    config: &AnalysisConfig,
    max_frames: Option<usize>,
) -> Result<AnalysisInputs> {
    config.validate()?;

    let contacts = load_contacts(contacts_path)?;
    validate_contacts(&contacts, config.residue_count)?;

    let reader = open_trajectory(trajectory_path)?;
    debug!(path = %reader.path().display(), ?max_frames, "reading trajectory");
    let trajectory = reader.read_frames(config.residue_count, max_frames)?;

    info!(
        frames = trajectory.frame_count(),
        contacts = contacts.len(),
        residues = config.residue_count,
        "inputs loaded"
    );
    Ok(AnalysisInputs {
        trajectory,
        contacts,
    })
}

/// Q values for the loaded trajectory: read from `q_file` when given,
/// computed with the configured cutoff otherwise.
pub fn resolve_q_values(
    inputs: &AnalysisInputs,
    config: &AnalysisConfig,
    q_file: Option<&Path>,
) -> Result<Vec<usize>> {
    match q_file {
        Some(path) => {
            let q_values = read_q_values(path)?;
            if q_values.len() != inputs.trajectory.frame_count() {
                return Err(AnalysisError::FrameCountMismatch {
                    frames: inputs.trajectory.frame_count(),
                    q_values: q_values.len(),
                });
            }
            info!(path = %path.display(), "using precomputed Q values");
            Ok(q_values)
        }
        None => Ok(compute_q_values(
            &inputs.trajectory,
            &inputs.contacts,
            config.cutoff,
        )),
    }
}
