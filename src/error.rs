// Error taxonomy for the attendance pipeline
// Only the fatal cases live here; recoverable per-row problems are
// reported as `SessionWarning`s by the parser.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors produced while building an attendance report.
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// The directory holding the exports does not exist.
    #[error("The path {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The roster CSV could not be tokenised.
    #[error("Failed to parse CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The roster header row never declared one of the name columns.
    #[error("Roster {} has no \"{column}\" column", .path.display())]
    RosterColumnMissing {
        path: PathBuf,
        column: &'static str,
    },

    /// An attendance export yielded no usable rows, so it has no session date.
    #[error("No attendance rows could be read from {}", .0.display())]
    EmptySession(PathBuf),

    /// Listing the target directory failed part way.
    #[error("Failed to scan directory {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, AttendanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_directory_not_found() {
        let err = AttendanceError::DirectoryNotFound(PathBuf::from("/missing/class"));
        assert_eq!(err.to_string(), "The path /missing/class does not exist");
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AttendanceError::FileRead {
            path: PathBuf::from("/class/meetingAttendanceList.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("meetingAttendanceList.csv"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_display_roster_column_missing() {
        let err = AttendanceError::RosterColumnMissing {
            path: PathBuf::from("classlist.csv"),
            column: "First Name",
        };
        assert_eq!(
            err.to_string(),
            "Roster classlist.csv has no \"First Name\" column"
        );
    }

    #[test]
    fn test_error_display_empty_session() {
        let err = AttendanceError::EmptySession(PathBuf::from("meetingAttendanceReport.csv"));
        assert_eq!(
            err.to_string(),
            "No attendance rows could be read from meetingAttendanceReport.csv"
        );
    }
}
