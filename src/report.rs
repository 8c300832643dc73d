//! Plain-text reports, one record per line.

use std::io::{self, Write};

use crate::averaging::ResidueAverage;
use crate::probability::ContactRecord;

/// Header line carrying the number of frames that passed the filters
pub fn write_frames_in_range<W: Write>(out: &mut W, frames_in_range: usize) -> io::Result<()> {
    writeln!(out, "Q Values In Range: {}", frames_in_range)
}

/// `index focus contact probability occurrences`, index starting at 1
pub fn write_contact_report<W: Write>(out: &mut W, records: &[ContactRecord]) -> io::Result<()> {
    for (idx, record) in records.iter().enumerate() {
        writeln!(
            out,
            "{} {} {} {:.6} {}",
            idx + 1,
            record.focus_residue,
            record.contact_residue,
            record.probability,
            record.total_occurrences
        )?;
    }
    Ok(())
}

/// `residue average`, or `residue N/A` for residues without contacts
pub fn write_residue_report<W: Write>(out: &mut W, averages: &[ResidueAverage]) -> io::Result<()> {
    for average in averages {
        match average.average_probability {
            Some(probability) => writeln!(out, "{} {:.6}", average.residue_id, probability)?,
            None => writeln!(out, "{} N/A", average.residue_id)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_report_lines() {
        let records = vec![
            ContactRecord {
                focus_residue: 1,
                contact_residue: 29,
                total_occurrences: 3,
                probability: 0.75,
            },
            ContactRecord {
                focus_residue: 84,
                contact_residue: 88,
                total_occurrences: 0,
                probability: 0.0,
            },
        ];

        let mut out = Vec::new();
        write_frames_in_range(&mut out, 4).unwrap();
        write_contact_report(&mut out, &records).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Q Values In Range: 4\n1 1 29 0.750000 3\n2 84 88 0.000000 0\n"
        );
    }

    #[test]
    fn test_residue_report_marks_missing_data() {
        let averages = vec![
            ResidueAverage {
                residue_id: 1,
                average_probability: Some(1.0 / 3.0),
            },
            ResidueAverage {
                residue_id: 2,
                average_probability: None,
            },
        ];

        let mut out = Vec::new();
        write_residue_report(&mut out, &averages).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 0.333333\n2 N/A\n");
    }
}
