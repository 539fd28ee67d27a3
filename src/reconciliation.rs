// Record Aggregator - sessions + roster into one AttendanceRecord
//
// Reconciles who was enrolled against who showed up:
//   attended = union of every session's attendees
//   absentees = enrolled - attended
// Sessions are ordered by date once here and never reordered downstream.

use crate::error::{AttendanceError, Result};
use crate::identity::Identity;
use crate::parser::{parse_session_file, Session, SessionWarning};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

// ============================================================================
// ATTENDANCE RECORD
// ============================================================================

/// Single source of truth for one run. Immutable once built.
#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    enrolled: HashSet<Identity>,
    attended: HashSet<Identity>,
    sessions: Vec<Session>,
}

impl AttendanceRecord {
    /// Merge already-parsed sessions with the roster.
    ///
    /// Sessions are sorted ascending by date with a stable sort, so two
    /// exports of the same day stay as two columns in encounter order.
    pub fn new(enrolled: HashSet<Identity>, mut sessions: Vec<Session>) -> Self {
        sessions.sort_by_key(|s| s.date);

        let attended = sessions
            .iter()
            .flat_map(|s| s.attendees.iter().cloned())
            .collect();

        AttendanceRecord {
            enrolled,
            attended,
            sessions,
        }
    }

    pub fn enrolled(&self) -> &HashSet<Identity> {
        &self.enrolled
    }

    /// Everyone seen in at least one session
    pub fn attended(&self) -> &HashSet<Identity> {
        &self.attended
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_dates(&self) -> Vec<NaiveDate> {
        self.sessions.iter().map(|s| s.date).collect()
    }

    pub fn is_enrolled(&self, identity: &Identity) -> bool {
        self.enrolled.contains(identity)
    }

    /// Enrolled students who never attended any session
    pub fn absentees(&self) -> impl Iterator<Item = &Identity> {
        self.enrolled.difference(&self.attended)
    }

    /// Attendees missing from the roster
    pub fn unenrolled_attendees(&self) -> impl Iterator<Item = &Identity> {
        self.attended.difference(&self.enrolled)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} sessions, {} attendees, {} enrolled ({} never attended, {} unenrolled)",
            self.session_count(),
            self.attended.len(),
            self.enrolled.len(),
            self.absentees().count(),
            self.unenrolled_attendees().count()
        )
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Record plus the diagnostics collected while parsing its exports.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub record: AttendanceRecord,
    pub warnings: Vec<SessionWarning>,
    pub skipped_rows: usize,
}

/// Parse every export and merge the results with the roster.
///
/// Files are parsed one after another. An unreadable export aborts the whole
/// aggregation; an export without usable rows is dropped with a warning.
pub fn aggregate(session_files: &[PathBuf], enrolled: HashSet<Identity>) -> Result<Aggregation> {
    let mut sessions = Vec::with_capacity(session_files.len());
    let mut warnings = Vec::new();
    let mut skipped_rows = 0;

    for path in session_files {
        let parsed = match parse_session_file(path) {
            Ok(parsed) => parsed,
            Err(AttendanceError::EmptySession(file)) => {
                debug!("{} has no usable rows", file.display());
                warnings.push(SessionWarning::EmptyExport { file });
                continue;
            }
            Err(err) => return Err(err),
        };
        debug!(
            "{} -> {} ({} attendees)",
            path.display(),
            parsed.session.iso_date(),
            parsed.session.attendees.len()
        );
        skipped_rows += parsed.skipped_rows;
        warnings.extend(parsed.warnings);
        sessions.push(parsed.session);
    }

    let record = AttendanceRecord::new(enrolled, sessions);
    info!("Reconciled {}", record.summary());

    Ok(Aggregation {
        record,
        warnings,
        skipped_rows,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttendanceError;
    use std::path::Path;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn who(names: &[&str]) -> HashSet<Identity> {
        names.iter().map(|n| Identity::from_full_name(n)).collect()
    }

    fn session(d: NaiveDate, names: &[&str]) -> Session {
        Session::new(d, who(names))
    }

    fn write_list_export(dir: &Path, name: &str, rows: &[(&str, &str)]) -> PathBuf {
        let mut text = String::from("Full Name\tUser Action\tTimestamp\n");
        for (person, stamp) in rows {
            text.push_str(&format!("{person}\tJoined\t{stamp}\n"));
        }
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_sessions_sorted_by_date() {
        let record = AttendanceRecord::new(
            HashSet::new(),
            vec![
                session(date(2021, 3, 22), &["A B"]),
                session(date(2020, 12, 1), &["C D"]),
                session(date(2021, 3, 8), &["A B"]),
            ],
        );

        let iso: Vec<String> = record.sessions().iter().map(|s| s.iso_date()).collect();
        let mut expected = iso.clone();
        expected.sort();
        assert_eq!(iso, expected);
        assert_eq!(iso, vec!["2020-12-01", "2021-03-08", "2021-03-22"]);
    }

    #[test]
    fn test_same_date_sessions_kept_in_encounter_order() {
        let d = date(2021, 3, 15);
        let record = AttendanceRecord::new(
            HashSet::new(),
            vec![
                session(date(2021, 3, 16), &["X Y"]),
                session(d, &["FIRST EXPORT"]),
                session(d, &["SECOND EXPORT"]),
            ],
        );

        assert_eq!(record.session_count(), 3);
        assert!(record.sessions()[0].attended(&Identity::from_full_name("first export")));
        assert!(record.sessions()[1].attended(&Identity::from_full_name("second export")));
        assert_eq!(record.session_dates(), vec![d, d, date(2021, 3, 16)]);
    }

    #[test]
    fn test_attended_is_union_of_sessions() {
        let record = AttendanceRecord::new(
            HashSet::new(),
            vec![
                session(date(2021, 1, 1), &["A B", "C D"]),
                session(date(2021, 1, 2), &["C D", "E F"]),
            ],
        );
        assert_eq!(record.attended(), &who(&["A B", "C D", "E F"]));
    }

    #[test]
    fn test_absentees_and_unenrolled() {
        let enrolled = [Identity::from_roster("John", "Smith"), Identity::from_roster("Ann", "Lee")]
            .into_iter()
            .collect();
        let record = AttendanceRecord::new(
            enrolled,
            vec![session(date(2021, 1, 1), &["John Smith", "Guest User"])],
        );

        let absentees: Vec<&Identity> = record.absentees().collect();
        assert_eq!(absentees, vec![&Identity::from_full_name("ANN LEE")]);

        let unenrolled: Vec<&Identity> = record.unenrolled_attendees().collect();
        assert_eq!(unenrolled, vec![&Identity::from_full_name("GUEST USER")]);
        assert!(record.is_enrolled(&Identity::from_full_name("john smith")));
        assert_eq!(
            record.summary(),
            "1 sessions, 2 attendees, 2 enrolled (1 never attended, 1 unenrolled)"
        );
    }

    #[test]
    fn test_aggregate_files_and_collect_warnings() {
        let dir = TempDir::new().unwrap();
        let later = write_list_export(
            dir.path(),
            "meetingAttendanceList(1).csv",
            &[("John Smith", "3/22/2021, 9:00:00 AM")],
        );
        let earlier = write_list_export(
            dir.path(),
            "meetingAttendanceList.csv",
            &[
                ("John Smith", "3/15/2021, 9:00:00 AM"),
                ("Jane Doe", "3/16/2021, 0:00:10 AM"),
            ],
        );

        let agg = aggregate(&[later, earlier], HashSet::new()).unwrap();

        assert_eq!(
            agg.record.session_dates(),
            vec![date(2021, 3, 15), date(2021, 3, 22)]
        );
        assert_eq!(agg.record.attended().len(), 2);
        assert_eq!(agg.warnings.len(), 1);
        assert!(matches!(agg.warnings[0], SessionWarning::InconsistentDate { .. }));
    }

    #[test]
    fn test_aggregate_propagates_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("meetingAttendanceGone.csv");

        let err = aggregate(&[missing], HashSet::new()).unwrap_err();
        assert!(matches!(err, AttendanceError::FileRead { .. }));
    }

    #[test]
    fn test_aggregate_skips_export_without_rows() {
        let dir = TempDir::new().unwrap();
        let good = write_list_export(
            dir.path(),
            "meetingAttendanceList.csv",
            &[("John Smith", "3/15/2021, 9:00:00 AM")],
        );
        let empty = write_list_export(dir.path(), "meetingAttendanceList(1).csv", &[]);

        let agg = aggregate(&[good, empty.clone()], HashSet::new()).unwrap();

        assert_eq!(agg.record.session_dates(), vec![date(2021, 3, 15)]);
        assert_eq!(agg.record.attended(), &who(&["John Smith"]));
        assert_eq!(agg.warnings, vec![SessionWarning::EmptyExport { file: empty }]);
    }

    #[test]
    fn test_aggregate_no_files() {
        let agg = aggregate(&[], who(&["A B"])).unwrap();
        assert_eq!(agg.record.session_count(), 0);
        assert_eq!(agg.record.absentees().count(), 1);
    }
}
