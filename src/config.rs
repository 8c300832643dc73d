use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::probability::{QRange, TimeRange};

/// Contact cutoff used when none is given, in trajectory length units
pub const DEFAULT_CUTOFF: f64 = 1.2;

/// Parameters shared by every analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisConfig {
    /// Number of residues every trajectory frame must contain
    pub residue_count: usize,
    pub cutoff: f64,
    pub q_range: QRange,
    pub time_range: TimeRange,
}

impl AnalysisConfig {
    pub fn new(residue_count: usize) -> Self {
        Self {
            residue_count,
            cutoff: DEFAULT_CUTOFF,
            q_range: QRange::unbounded(),
            time_range: TimeRange::unbounded(),
        }
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_q_range(mut self, low: i64, high: i64) -> Self {
        self.q_range = QRange::new(low, high);
        self
    }

    pub fn with_time_range(mut self, low: i64, high: i64) -> Self {
        self.time_range = TimeRange::new(low, high);
        self
    }

    /// Reject parameters no analysis can run with.
    ///
    /// Empty Q or time ranges are accepted: they select no frame and give
    /// all-zero probabilities.
    pub fn validate(&self) -> Result<()> {
        if self.residue_count == 0 {
            return Err(AnalysisError::InvalidConfig(
                "residue count must be positive".to_string(),
            ));
        }
        if !self.cutoff.is_finite() || self.cutoff <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "cutoff must be a positive number, got {}",
                self.cutoff
            )));
        }
        Ok(())
    }
}
