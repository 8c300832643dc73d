use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};

/// Native contact between two residues, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Contact {
    #[serde(rename = "i")]
    pub focus_residue: usize,
    #[serde(rename = "j")]
    pub contact_residue: usize,
}

impl Contact {
    pub fn new(focus_residue: usize, contact_residue: usize) -> Self {
        Self {
            focus_residue,
            contact_residue,
        }
    }
}

/// Load contacts, choosing the parser from the file extension.
///
/// `.csv` files go through [`load_contacts_from_csv`], anything else is
/// read as a SMOG contact file.
pub fn load_contacts(path: impl AsRef<Path>) -> Result<Vec<Contact>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let contacts = if is_csv {
        load_contacts_from_csv(path)?
    } else {
        load_contacts_from_smog(path)?
    };

    info!(count = contacts.len(), path = %path.display(), "loaded contacts");
    Ok(contacts)
}

/// Load contacts from CSV file with `i` and `j` columns
pub fn load_contacts_from_csv(csv_path: impl AsRef<Path>) -> Result<Vec<Contact>> {
    let csv_path = csv_path.as_ref();
    let mut reader = csv::Reader::from_path(csv_path)?;

    let mut contacts = Vec::new();
    for result in reader.deserialize() {
        let contact: Contact = result?;
        contacts.push(contact);
    }

    Ok(contacts)
}

/// Load contacts from a SMOG contact file.
///
/// Layout: the contact count and one ignored integer, then per contact
/// `chain_i residue_i chain_j residue_j`. Tokens are whitespace separated,
/// so line breaks carry no meaning.
pub fn load_contacts_from_smog(path: impl AsRef<Path>) -> Result<Vec<Contact>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| AnalysisError::resource(path, e))?;

    let mut tokens = text
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| line.split_whitespace().map(move |tok| (idx + 1, tok)));

    let mut next_int = |what: &str| -> Result<usize> {
        match tokens.next() {
            Some((line, tok)) => tok.parse::<usize>().map_err(|e| {
                AnalysisError::parse(path, line, format!("invalid {} '{}': {}", what, tok, e))
            }),
            None => Err(AnalysisError::parse(
                path,
                text.lines().count(),
                format!("unexpected end of file while reading {}", what),
            )),
        }
    };

    let declared = next_int("contact count")?;
    next_int("header value")?;
    debug!(declared, "reading SMOG contact records");

    let mut contacts = Vec::with_capacity(declared);
    for _ in 0..declared {
        next_int("chain")?;
        let focus = next_int("focus residue")?;
        next_int("chain")?;
        let contact = next_int("contact residue")?;
        contacts.push(Contact::new(focus, contact));
    }

    Ok(contacts)
}

/// Check that every contact can be evaluated on a `residue_count` protein.
///
/// Self-contacts are rejected: they would always be formed and would
/// double-weight their residue in the per-residue average. Duplicate pairs
/// are allowed and counted independently.
pub fn validate_contacts(contacts: &[Contact], residue_count: usize) -> Result<()> {
    for (index, contact) in contacts.iter().enumerate() {
        let invalid = |reason: String| AnalysisError::InvalidContact {
            index: index + 1,
            focus: contact.focus_residue,
            contact: contact.contact_residue,
            reason,
        };

        for residue in [contact.focus_residue, contact.contact_residue] {
            if residue == 0 || residue > residue_count {
                return Err(invalid(format!(
                    "residue {} outside 1..={}",
                    residue, residue_count
                )));
            }
        }

        if contact.focus_residue == contact.contact_residue {
            return Err(invalid("self-contact".to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_smog_contacts() {
        let file = temp_file(".contacts", "3 0\n1 1 1 29\n1 2 1 30\n1 84 1 88\n");
        let contacts = load_contacts(file.path()).unwrap();
        assert_eq!(contacts.len(), 3);
        assert_eq!(contacts[0], Contact::new(1, 29));
        assert_eq!(contacts[2], Contact::new(84, 88));
    }

    #[test]
    fn test_smog_ignores_trailing_records() {
        let file = temp_file(".contacts", "1 0\n1 5 1 9\n1 6 1 10\n");
        let contacts = load_contacts_from_smog(file.path()).unwrap();
        assert_eq!(contacts, vec![Contact::new(5, 9)]);
    }

    #[test]
    fn test_smog_truncated_file() {
        let file = temp_file(".contacts", "2 0\n1 5 1 9\n1 6\n");
        let err = load_contacts_from_smog(file.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_smog_bad_token_reports_line() {
        let file = temp_file(".contacts", "2 0\n1 5 1 9\n1 x 1 10\n");
        match load_contacts_from_smog(file.path()).unwrap_err() {
            AnalysisError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_csv_contacts_ignore_extra_columns() {
        let file = temp_file(".csv", "i,j,r,cluster\n1,4,0.8,0\n2,7,1.1,1\n");
        let contacts = load_contacts(file.path()).unwrap();
        assert_eq!(contacts, vec![Contact::new(1, 4), Contact::new(2, 7)]);
    }

    #[test]
    fn test_missing_file() {
        let err = load_contacts("/nonexistent/contacts.txt").unwrap_err();
        assert!(matches!(err, AnalysisError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_validate_contacts() {
        assert!(validate_contacts(&[Contact::new(1, 5)], 5).is_ok());
        assert!(validate_contacts(&[Contact::new(1, 6)], 5).is_err());
        assert!(validate_contacts(&[Contact::new(0, 2)], 5).is_err());
        assert!(validate_contacts(&[Contact::new(3, 3)], 5).is_err());
        assert!(validate_contacts(&[Contact::new(1, 2), Contact::new(1, 2)], 5).is_ok());
    }
}
