use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::structure::{Coordinate, Frame};

/// All frames of a trajectory, held in memory.
///
/// Every frame carries exactly `residue_count` coordinates; this is checked
/// on construction so the analysis passes can index freely.
#[derive(Debug, Clone)]
pub struct TrajectoryData {
    residue_count: usize,
    frames: Vec<Frame>,
}

impl TrajectoryData {
    pub fn new(residue_count: usize, frames: Vec<Frame>) -> Result<Self> {
        if let Some((frame, coords)) = frames
            .iter()
            .enumerate()
            .find(|(_, coords)| coords.len() != residue_count)
        {
            return Err(AnalysisError::InputSizeMismatch {
                expected: residue_count,
                found: coords.len(),
                frame: frame + 1,
            });
        }

        Ok(Self {
            residue_count,
            frames,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn residue_count(&self) -> usize {
        self.residue_count
    }

    /// Coordinate of a residue in a frame, both indices 0-based
    pub fn coordinate(&self, frame: usize, residue: usize) -> Option<Coordinate> {
        self.frames.get(frame)?.get(residue).copied()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// Trait for reading trajectory files into memory
pub trait Trajectory {
    /// Read every frame (or the first `max_frames`) of the trajectory.
    ///
    /// # Arguments
    /// * `residue_count` - Number of residues each frame must contain
    /// * `max_frames` - Maximum number of frames to read (None for all frames)
    ///
    /// # Errors
    /// `InputSizeMismatch` when a frame holds a different number of residues,
    /// `ResourceUnavailable` when the file cannot be read.
    fn read_frames(&self, residue_count: usize, max_frames: Option<usize>) -> Result<TrajectoryData>;

    fn path(&self) -> &Path;
}

/// Pick a reader from the file extension
pub fn open_trajectory(path: impl AsRef<Path>) -> Result<Box<dyn Trajectory>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("xtc") => Ok(Box::new(XtcTrajectory::new(path))),
        Some("pdb") => Ok(Box::new(PdbTrajectory::new(path))),
        _ => Err(AnalysisError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn frame_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} frames ({percent}%) | ETA: {eta}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// GROMACS XTC trajectory where every atom stands for one residue
pub struct XtcTrajectory {
    file_path: PathBuf,
}

impl XtcTrajectory {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }
}

impl Trajectory for XtcTrajectory {
    fn read_frames(&self, residue_count: usize, max_frames: Option<usize>) -> Result<TrajectoryData> {
        let file = File::open(&self.file_path)
            .map_err(|e| AnalysisError::resource(&self.file_path, e))?;

        let mut reader = molly::XTCReader::new(file);
        let raw_frames = reader
            .read_all_frames()
            .map_err(|e| AnalysisError::resource(&self.file_path, e))?;

        let wanted = max_frames.map_or(raw_frames.len(), |max| max.min(raw_frames.len()));
        debug!(decoded = raw_frames.len(), wanted, "decoded XTC frames");

        let pb = frame_progress(wanted as u64);
        pb.set_message("Converting trajectory frames");

        let mut frames = Vec::with_capacity(wanted);
        for (idx, raw) in raw_frames.iter().take(wanted).enumerate() {
            let atoms = raw.positions.len() / 3;
            if atoms != residue_count {
                pb.abandon();
                return Err(AnalysisError::InputSizeMismatch {
                    expected: residue_count,
                    found: atoms,
                    frame: idx + 1,
                });
            }

            let frame: Frame = raw
                .positions
                .chunks_exact(3)
                .map(|xyz| Coordinate::new(xyz[0] as f64, xyz[1] as f64, xyz[2] as f64))
                .collect();
            frames.push(frame);
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(frames = frames.len(), residues = residue_count, path = %self.file_path.display(), "read XTC trajectory");
        TrajectoryData::new(residue_count, frames)
    }

    fn path(&self) -> &Path {
        &self.file_path
    }
}

fn parse_column<T>(line: &str, range: Range<usize>, name: &str, path: &Path, line_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = line.get(range).unwrap_or("").trim();
    raw.parse::<T>()
        .map_err(|e| AnalysisError::parse(path, line_no, format!("bad {} '{}': {}", name, raw, e)))
}

/// Multi-model PDB trajectory; only CA atoms are kept
pub struct PdbTrajectory {
    file_path: PathBuf,
}

impl PdbTrajectory {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    fn finish_model(
        &self,
        residues: &mut BTreeMap<i32, Coordinate>,
        residue_count: usize,
        frames: &mut Vec<Frame>,
    ) -> Result<()> {
        if residues.len() != residue_count {
            return Err(AnalysisError::InputSizeMismatch {
                expected: residue_count,
                found: residues.len(),
                frame: frames.len() + 1,
            });
        }
        frames.push(std::mem::take(residues).into_values().collect());
        Ok(())
    }
}

impl Trajectory for PdbTrajectory {
    fn read_frames(&self, residue_count: usize, max_frames: Option<usize>) -> Result<TrajectoryData> {
        let file = File::open(&self.file_path)
            .map_err(|e| AnalysisError::resource(&self.file_path, e))?;

        let reader = BufReader::new(file);
        let mut frames: Vec<Frame> = Vec::new();
        let mut current = BTreeMap::new();
        let mut in_model = false;

        let pb = ProgressBar::new_spinner();
        pb.set_message("Reading PDB models");

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|e| AnalysisError::resource(&self.file_path, e))?;

            if max_frames.map_or(false, |max| frames.len() >= max) {
                break;
            }

            if line.starts_with("MODEL") {
                if in_model && !current.is_empty() {
                    self.finish_model(&mut current, residue_count, &mut frames)?;
                    pb.inc(1);
                }
                current.clear();
                in_model = true;
            } else if line.starts_with("ATOM") && line.get(12..16).map(str::trim) == Some("CA") {
                // PDB columns: 23-26 residue number, 31-38 x, 39-46 y, 47-54 z
                if line.len() < 54 {
                    return Err(AnalysisError::parse(&self.file_path, idx + 1, "truncated ATOM record"));
                }

                let path = self.file_path.as_path();
                let residue_num: i32 = parse_column(&line, 22..26, "residue number", path, idx + 1)?;
                let coord = Coordinate::new(
                    parse_column(&line, 30..38, "x", path, idx + 1)?,
                    parse_column(&line, 38..46, "y", path, idx + 1)?,
                    parse_column(&line, 46..54, "z", path, idx + 1)?,
                );
                current.insert(residue_num, coord);
            } else if line.starts_with("ENDMDL") {
                self.finish_model(&mut current, residue_count, &mut frames)?;
                in_model = false;
                pb.inc(1);
            }
        }

        // Last model without ENDMDL, or a single structure without MODEL records
        if !current.is_empty() && max_frames.map_or(true, |max| frames.len() < max) {
            self.finish_model(&mut current, residue_count, &mut frames)?;
        }
        pb.finish_and_clear();

        info!(frames = frames.len(), residues = residue_count, path = %self.file_path.display(), "read PDB trajectory");
        TrajectoryData::new(residue_count, frames)
    }

    fn path(&self) -> &Path {
        &self.file_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ca_line(serial: usize, residue: usize, x: f64, y: f64, z: f64) -> String {
        format!(
            "ATOM  {:>5}  CA  ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
            serial, residue, x, y, z
        )
    }

    fn write_pdb(models: &[Vec<(f64, f64, f64)>]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdb").tempfile().unwrap();
        for (m, model) in models.iter().enumerate() {
            writeln!(file, "MODEL     {:>4}", m + 1).unwrap();
            for (r, (x, y, z)) in model.iter().enumerate() {
                writeln!(file, "{}", ca_line(r + 1, r + 1, *x, *y, *z)).unwrap();
                writeln!(
                    file,
                    "ATOM  {:>5}  CB  ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
                    r + 100,
                    r + 1,
                    9.0,
                    9.0,
                    9.0
                )
                .unwrap();
            }
            writeln!(file, "ENDMDL").unwrap();
        }
        file
    }

    #[test]
    fn test_trajectory_data_rejects_short_frame() {
        let frames = vec![
            vec![Coordinate::new(0.0, 0.0, 0.0); 3],
            vec![Coordinate::new(0.0, 0.0, 0.0); 2],
        ];
        match TrajectoryData::new(3, frames).unwrap_err() {
            AnalysisError::InputSizeMismatch { expected, found, frame } => {
                assert_eq!((expected, found, frame), (3, 2, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_coordinate_lookup() {
        let frames = vec![vec![Coordinate::new(1.0, 2.0, 3.0), Coordinate::new(4.0, 5.0, 6.0)]];
        let data = TrajectoryData::new(2, frames).unwrap();
        assert_eq!(data.frame_count(), 1);
        assert_eq!(data.coordinate(0, 1), Some(Coordinate::new(4.0, 5.0, 6.0)));
        assert_eq!(data.coordinate(1, 0), None);
        assert_eq!(data.coordinate(0, 2), None);
    }

    #[test]
    fn test_read_pdb_models() {
        let file = write_pdb(&[
            vec![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (2.0, 0.0, 0.0)],
            vec![(0.5, 0.0, 0.0), (1.5, 0.0, 0.0), (2.5, 0.0, 0.0)],
        ]);
        let data = PdbTrajectory::new(file.path()).read_frames(3, None).unwrap();
        assert_eq!(data.frame_count(), 2);
        assert_eq!(data.residue_count(), 3);
        assert_eq!(data.coordinate(1, 2), Some(Coordinate::new(2.5, 0.0, 0.0)));
    }

    #[test]
    fn test_read_pdb_max_frames() {
        let model = vec![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)];
        let file = write_pdb(&[model.clone(), model.clone(), model]);
        let data = PdbTrajectory::new(file.path()).read_frames(2, Some(2)).unwrap();
        assert_eq!(data.frame_count(), 2);
    }

    #[test]
    fn test_read_pdb_residue_mismatch() {
        let file = write_pdb(&[vec![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)]]);
        let err = PdbTrajectory::new(file.path()).read_frames(147, None).unwrap_err();
        assert!(matches!(err, AnalysisError::InputSizeMismatch { expected: 147, found: 2, .. }));
    }

    #[test]
    fn test_open_trajectory_by_extension() {
        assert!(open_trajectory("traj.xtc").is_ok());
        assert!(open_trajectory("traj.PDB").is_ok());
        assert!(matches!(
            open_trajectory("traj.dcd"),
            Err(AnalysisError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_xtc_is_resource_error() {
        let err = XtcTrajectory::new("/nonexistent/traj.xtc").read_frames(10, None).unwrap_err();
        assert!(matches!(err, AnalysisError::ResourceUnavailable { .. }));
    }
}
