//! Contact probabilities restricted to a Q value range and a time window.

use serde::Serialize;
use tracing::{info, warn};

use crate::contacts::Contact;
use crate::structure::within_cutoff;
use crate::trajectory::TrajectoryData;

/// Inclusive integer range; empty when `low > high`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InclusiveRange {
    pub low: i64,
    pub high: i64,
}

impl InclusiveRange {
    pub fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    /// Range that accepts any non-negative value
    pub fn unbounded() -> Self {
        Self::new(0, i64::MAX)
    }

    pub fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }
}

/// Frames are selected by 1-based position in the trajectory
pub type TimeRange = InclusiveRange;
/// Frames are selected by their Q value
pub type QRange = InclusiveRange;

fn frame_in_time_range(frame: usize, time_range: &TimeRange) -> bool {
    let frame = i64::try_from(frame).unwrap_or(i64::MAX);
    frame >= time_range.low.saturating_sub(1) && frame <= time_range.high.saturating_sub(1)
}

/// Occurrence count and probability of one contact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactRecord {
    pub focus_residue: usize,
    pub contact_residue: usize,
    pub total_occurrences: usize,
    pub probability: f64,
}

impl ContactRecord {
    fn empty(contact: &Contact) -> Self {
        Self {
            focus_residue: contact.focus_residue,
            contact_residue: contact.contact_residue,
            total_occurrences: 0,
            probability: 0.0,
        }
    }

    /// Same record seen from the contact residue's side
    pub fn mirrored(&self) -> Self {
        Self {
            focus_residue: self.contact_residue,
            contact_residue: self.focus_residue,
            ..self.clone()
        }
    }
}

/// Result of [`compute_probabilities`]
#[derive(Debug, Clone, Serialize)]
pub struct ContactProbabilities {
    /// One record per contact, in contact list order
    pub records: Vec<ContactRecord>,
    /// Number of frames that passed both filters
    pub frames_in_range: usize,
}

/// Probability of each contact being formed over the frames whose index lies
/// in `time_range` and whose Q value lies in `q_range`.
///
/// Distances are tested again here with `cutoff`, independently of how the Q
/// values were produced. Frames without a Q value are skipped. When no frame
/// passes the filters every probability is 0.
pub fn compute_probabilities(
    trajectory: &TrajectoryData,
    contacts: &[Contact],
    q_values: &[usize],
    time_range: TimeRange,
    q_range: QRange,
    cutoff: f64,
) -> ContactProbabilities {
    let mut records: Vec<ContactRecord> = contacts.iter().map(ContactRecord::empty).collect();
    let mut frames_in_range = 0usize;

    for (i, (frame, &q)) in trajectory.frames().iter().zip(q_values).enumerate() {
        if !frame_in_time_range(i, &time_range) {
            continue;
        }
        if !q_range.contains(i64::try_from(q).unwrap_or(i64::MAX)) {
            continue;
        }

        for (record, contact) in records.iter_mut().zip(contacts) {
            if within_cutoff(frame, contact.focus_residue, contact.contact_residue, cutoff) {
                record.total_occurrences += 1;
            }
        }
        frames_in_range += 1;
    }

    info!(frames_in_range, "Q Values In Range: {}", frames_in_range);

    if frames_in_range == 0 {
        warn!(
            ?time_range,
            ?q_range,
            "no frame passed the time and Q filters, all probabilities are 0"
        );
    } else {
        for record in &mut records {
            record.probability = record.total_occurrences as f64 / frames_in_range as f64;
        }
    }

    ContactProbabilities {
        records,
        frames_in_range,
    }
}
