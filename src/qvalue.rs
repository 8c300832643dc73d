//! Per-frame Q values: the number of native contacts formed in a frame.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::contacts::Contact;
use crate::error::{AnalysisError, Result};
use crate::structure::{within_cutoff, Coordinate};
use crate::trajectory::TrajectoryData;

/// Q value of a single frame
pub fn frame_q_value(frame: &[Coordinate], contacts: &[Contact], cutoff: f64) -> usize {
    contacts
        .iter()
        .filter(|c| within_cutoff(frame, c.focus_residue, c.contact_residue, cutoff))
        .count()
}

/// Calculate the Q value of every frame.
///
/// A contact counts towards a frame's Q value when the distance between its
/// two residues is at most `cutoff`. The result holds one value per frame.
pub fn compute_q_values(trajectory: &TrajectoryData, contacts: &[Contact], cutoff: f64) -> Vec<usize> {
    let q_values: Vec<usize> = trajectory
        .frames()
        .iter()
        .map(|frame| frame_q_value(frame, contacts, cutoff))
        .collect();

    debug!(
        frames = q_values.len(),
        contacts = contacts.len(),
        cutoff,
        "computed Q values"
    );
    q_values
}

/// Write Q values to a file, one integer per line
pub fn write_q_values(path: impl AsRef<Path>, q_values: &[usize]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| AnalysisError::resource(path, e))?;
    let mut writer = BufWriter::new(file);

    for q in q_values {
        writeln!(writer, "{}", q).map_err(|e| AnalysisError::resource(path, e))?;
    }
    writer.flush().map_err(|e| AnalysisError::resource(path, e))?;

    Ok(())
}

/// Read a Q value file written by [`write_q_values`]; blank lines are skipped
pub fn read_q_values(path: impl AsRef<Path>) -> Result<Vec<usize>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| AnalysisError::resource(path, e))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            line.trim().parse::<usize>().map_err(|e| {
                AnalysisError::parse(path, idx + 1, format!("invalid Q value '{}': {}", line.trim(), e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three residues on the x axis; frame `k` stretches them by `k`.
    fn stretched_chain(frames: usize) -> TrajectoryData {
        let frames = (0..frames)
            .map(|k| {
                let step = 1.0 + k as f64;
                (0..3).map(|r| Coordinate::new(r as f64 * step, 0.0, 0.0)).collect()
            })
            .collect();
        TrajectoryData::new(3, frames).unwrap()
    }

    fn contacts() -> Vec<Contact> {
        vec![Contact::new(1, 2), Contact::new(2, 3), Contact::new(1, 3)]
    }

    #[test]
    fn test_q_values_per_frame() {
        // distances per frame k: (1+k), (1+k), 2(1+k)
        let q = compute_q_values(&stretched_chain(3), &contacts(), 2.0);
        assert_eq!(q, vec![3, 2, 0]);
    }

    #[test]
    fn test_q_values_monotonic_in_cutoff() {
        let trajectory = stretched_chain(5);
        let mut previous = vec![0; trajectory.frame_count()];
        for cutoff in [0.0, 0.5, 1.0, 2.0, 3.0, 6.0, 12.0] {
            let q = compute_q_values(&trajectory, &contacts(), cutoff);
            for (now, before) in q.iter().zip(&previous) {
                assert!(now >= before);
            }
            previous = q;
        }
        assert_eq!(previous, vec![3; 5]);
    }

    #[test]
    fn test_empty_inputs() {
        let no_frames = TrajectoryData::new(3, Vec::new()).unwrap();
        assert!(compute_q_values(&no_frames, &contacts(), 1.2).is_empty());
        assert_eq!(compute_q_values(&stretched_chain(4), &[], 1.2), vec![0; 4]);
    }

    #[test]
    fn test_q_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qFile");
        let q_values = vec![0, 426, 17, 3, 3, 301];

        write_q_values(&path, &q_values).unwrap();
        assert_eq!(read_q_values(&path).unwrap(), q_values);
    }

    #[test]
    fn test_q_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qFile");
        fs::write(&path, "4\n\n5\n-1\n").unwrap();
        match read_q_values(&path).unwrap_err() {
            AnalysisError::Parse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }
}
