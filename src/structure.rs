use serde::Serialize;

/// 3D coordinate vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate Euclidean distance to another coordinate
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Frame data: one coordinate per residue, indexed by residue number - 1
pub type Frame = Vec<Coordinate>;

/// Whether two residues of a frame lie within `cutoff` of each other.
///
/// Residue ids are 1-based. A residue missing from the frame never counts
/// as being in contact.
pub fn within_cutoff(frame: &[Coordinate], focus: usize, contact: usize, cutoff: f64) -> bool {
    let lookup = |residue: usize| residue.checked_sub(1).and_then(|idx| frame.get(idx));

    match (lookup(focus), lookup(contact)) {
        (Some(a), Some(b)) => a.distance_to(b) <= cutoff,
        _ => false,
    }
}
