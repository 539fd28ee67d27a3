// Roster Loader - enrollment list (classlist.csv) into a set of identities

use crate::error::{AttendanceError, Result};
use crate::identity::Identity;
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

pub const LAST_NAME_COLUMN: &str = "Last Name";
pub const FIRST_NAME_COLUMN: &str = "First Name";

/// Load the roster at `path`.
///
/// A missing file is not an error: the run continues roster-less and every
/// attendee is reported as unenrolled.
pub fn load_roster(path: &Path) -> Result<HashSet<Identity>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No roster at {}, continuing without enrollment data", path.display());
            return Ok(HashSet::new());
        }
        Err(source) => {
            return Err(AttendanceError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    // decode() sniffs and strips a byte-order mark
    let (content, _, _) = encoding_rs::UTF_8.decode(&bytes);
    parse_roster(&content, path)
}

/// Parse comma-separated roster text. `origin` is only used in errors.
pub fn parse_roster(content: &str, origin: &Path) -> Result<HashSet<Identity>> {
    let csv_err = |source| AttendanceError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(csv_err)?.clone();
    let last_idx = column_index(&headers, LAST_NAME_COLUMN).ok_or_else(|| {
        AttendanceError::RosterColumnMissing {
            path: origin.to_path_buf(),
            column: LAST_NAME_COLUMN,
        }
    })?;
    let first_idx = column_index(&headers, FIRST_NAME_COLUMN).ok_or_else(|| {
        AttendanceError::RosterColumnMissing {
            path: origin.to_path_buf(),
            column: FIRST_NAME_COLUMN,
        }
    })?;

    let mut enrolled = HashSet::new();
    for (row_num, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        match (record.get(first_idx), record.get(last_idx)) {
            (Some(first), Some(last)) => {
                enrolled.insert(Identity::from_roster(first, last));
            }
            _ => warn!(
                "Roster {} line {} is missing a name column, skipped",
                origin.display(),
                row_num + 2
            ),
        }
    }

    debug!("Roster {}: {} students enrolled", origin.display(), enrolled.len());
    Ok(enrolled)
}

// Header matching is exact and case-sensitive; a repeated header resolves to
// its last occurrence.
fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, field)| *field == name)
        .map(|(index, _)| index)
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(first: &str, last: &str) -> Identity {
        Identity::from_roster(first, last)
    }

    #[test]
    fn test_parse_roster_any_column_order() {
        let csv = "Student ID,First Name,Email,Last Name\n\
                   1,John,j@x.edu,Smith\n\
                   2,Ana Maria,a@x.edu,de la Cruz\n";
        let roster = parse_roster(csv, Path::new("classlist.csv")).unwrap();

        assert_eq!(roster.len(), 2);
        assert!(roster.contains(&id("John", "Smith")));
        assert!(roster.contains(&Identity::from_full_name("ANAMARIA DELACRUZ")));
    }

    #[test]
    fn test_parse_roster_header_match_is_case_sensitive() {
        let csv = "last name,First Name\nSmith,John\n";
        let err = parse_roster(csv, Path::new("classlist.csv")).unwrap_err();

        match err {
            AttendanceError::RosterColumnMissing { column, .. } => {
                assert_eq!(column, LAST_NAME_COLUMN)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_roster_missing_first_name_column() {
        let csv = "Last Name,Given\nSmith,John\n";
        let err = parse_roster(csv, Path::new("classlist.csv")).unwrap_err();
        assert!(err.to_string().contains("First Name"));
    }

    #[test]
    fn test_parse_roster_short_row_skipped() {
        let csv = "Last Name,First Name\nSmith\nDoe,Jane\n";
        let roster = parse_roster(csv, Path::new("classlist.csv")).unwrap();

        assert_eq!(roster.len(), 1);
        assert!(roster.contains(&id("Jane", "Doe")));
    }

    #[test]
    fn test_parse_roster_repeated_header_uses_last_column() {
        let csv = "Last Name,First Name,Last Name\n\
                   Old,John,Smith\n";
        let roster = parse_roster(csv, Path::new("classlist.csv")).unwrap();

        assert_eq!(roster.len(), 1);
        assert!(roster.contains(&id("John", "Smith")));
        assert!(!roster.contains(&id("John", "Old")));
    }

    #[test]
    fn test_parse_roster_header_only() {
        let roster = parse_roster("Last Name,First Name\n", Path::new("c.csv")).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_load_roster_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let roster = load_roster(&dir.path().join("classlist.csv")).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_load_roster_strips_bom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("classlist.csv");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Last Name,First Name\r\nSmith,John\r\n");
        std::fs::write(&path, bytes).unwrap();

        let roster = load_roster(&path).unwrap();
        assert_eq!(roster.len(), 1);
        assert!(roster.contains(&id("John", "Smith")));
    }
}
