//! Per-residue average of contact probabilities.
//!
//! Every contact is counted from both of its residues: the records are
//! doubled with their mirrors, ordered by focus residue and each run of equal
//! focus residues is averaged.

use serde::Serialize;
use tracing::{debug, warn};

use crate::probability::ContactRecord;

/// Average contact probability of one residue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueAverage {
    /// 1-based residue id
    pub residue_id: usize,
    /// `None` when the residue takes part in no contact
    pub average_probability: Option<f64>,
}

/// Original records followed by all of their mirrors
pub fn symmetrize(records: &[ContactRecord]) -> Vec<ContactRecord> {
    let mut symmetrized = Vec::with_capacity(records.len() * 2);
    symmetrized.extend(records.iter().cloned());
    symmetrized.extend(records.iter().map(ContactRecord::mirrored));
    symmetrized
}

/// Order records ascending by focus residue
pub fn sort_by_focus(records: &mut [ContactRecord]) {
    records.sort_by_key(|record| record.focus_residue);
}

/// Average the probabilities of all contacts each residue takes part in.
///
/// Returns `residue_count` entries, entry `k` describing residue `k + 1`.
/// Records naming a residue outside `1..=residue_count` are skipped.
pub fn average_by_residue(residue_count: usize, records: &[ContactRecord]) -> Vec<ResidueAverage> {
    let mut averages: Vec<ResidueAverage> = (1..=residue_count)
        .map(|residue_id| ResidueAverage {
            residue_id,
            average_probability: None,
        })
        .collect();

    let mut symmetrized = symmetrize(records);
    sort_by_focus(&mut symmetrized);

    for run in symmetrized.chunk_by(|a, b| a.focus_residue == b.focus_residue) {
        let focus = run[0].focus_residue;
        let total: f64 = run.iter().map(|record| record.probability).sum();
        let mean = total / run.len() as f64;

        match focus.checked_sub(1).and_then(|idx| averages.get_mut(idx)) {
            Some(entry) => entry.average_probability = Some(mean),
            None => warn!(focus, residue_count, "skipping contacts of residue outside the protein"),
        }
    }

    debug!(
        residues = residue_count,
        with_data = averages.iter().filter(|a| a.average_probability.is_some()).count(),
        "averaged contact probabilities"
    );
    averages
}
