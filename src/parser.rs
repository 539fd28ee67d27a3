// Session Parser - one meeting attendance export into one Session
//
// Two export shapes exist for the same meeting data and nothing in the file
// name tells them apart, so the format is sniffed from the content.

use crate::error::{AttendanceError, Result};
use crate::identity::Identity;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Content marker that only appears in the "attendance report" export.
pub const REPORT_MARKER: &str = "Meeting Summary";

/// ExportFormat - which of the two attendance exports a file is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportFormat {
    /// Per-participant summary with a fixed preamble block
    AttendanceReport,
    /// Raw join/leave action log
    AttendanceList,
}

impl ExportFormat {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            ExportFormat::AttendanceReport => "attendance report",
            ExportFormat::AttendanceList => "attendance list",
        }
    }

    /// Column layout of the data rows
    pub fn layout(&self) -> &'static RowLayout {
        match self {
            ExportFormat::AttendanceReport => &REPORT_LAYOUT,
            ExportFormat::AttendanceList => &LIST_LAYOUT,
        }
    }
}

/// Where the data rows start and which fixed columns they carry.
#[derive(Debug)]
pub struct RowLayout {
    /// 1-based line of the first data row
    pub first_line: usize,
    pub columns: &'static [&'static str],
    pub name_column: usize,
    pub timestamp_column: usize,
}

static REPORT_LAYOUT: RowLayout = RowLayout {
    first_line: 9,
    columns: &[
        "Full Name",
        "Join Time",
        "Leave Time",
        "Duration",
        "Email",
        "Role",
        "Participant ID (UPN)",
    ],
    name_column: 0,
    timestamp_column: 1,
};

static LIST_LAYOUT: RowLayout = RowLayout {
    first_line: 2,
    columns: &["Full Name", "User Action", "Timestamp"],
    name_column: 0,
    timestamp_column: 2,
};

/// One meeting: its calendar date and everyone seen in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub date: NaiveDate,
    pub attendees: HashSet<Identity>,
}

impl Session {
    pub fn new(date: NaiveDate, attendees: HashSet<Identity>) -> Self {
        Session { date, attendees }
    }

    /// `YYYY-MM-DD`
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn attended(&self, identity: &Identity) -> bool {
        self.attendees.contains(identity)
    }
}

/// Recoverable problem found while reading one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionWarning {
    /// A row's date disagrees with the date fixed by the first row.
    /// The first date is kept and the attendee is still counted.
    InconsistentDate {
        file: PathBuf,
        line: usize,
        expected: NaiveDate,
        found: NaiveDate,
    },
    /// A row's timestamp had no usable date; the row was dropped.
    UnparseableDate {
        file: PathBuf,
        line: usize,
        value: String,
    },
    /// The export was readable but no row produced a session date; the
    /// file contributes no session.
    EmptyExport { file: PathBuf },
}

impl fmt::Display for SessionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionWarning::InconsistentDate {
                file,
                line,
                expected,
                found,
            } => write!(
                f,
                "Inconsistent session dates in {} (line {}: {} differs from {})",
                file.display(),
                line,
                found,
                expected
            ),
            SessionWarning::UnparseableDate { file, line, value } => write!(
                f,
                "Unreadable date in {} (line {}: {:?}), row skipped",
                file.display(),
                line,
                value
            ),
            SessionWarning::EmptyExport { file } => write!(
                f,
                "No attendance rows in {}, export ignored",
                file.display()
            ),
        }
    }
}

/// ParsedSession - output of ExportParser::parse()
#[derive(Debug, Clone)]
pub struct ParsedSession {
    pub session: Session,
    pub format: ExportFormat,
    pub source: PathBuf,
    pub warnings: Vec<SessionWarning>,
    /// Rows dropped because they did not fit the column layout
    pub skipped_rows: usize,
}

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// ExportParser - turns decoded export text into a single session
pub trait ExportParser: Send + Sync {
    /// Parse the full decoded content of one export.
    ///
    /// `origin` names the file in warnings and errors; nothing is read from it.
    fn parse(&self, content: &str, origin: &Path) -> Result<ParsedSession>;

    fn format(&self) -> ExportFormat;
}

/// Pick the format by looking for [`REPORT_MARKER`] anywhere in the content.
pub fn detect_format(content: &str) -> ExportFormat {
    if content.contains(REPORT_MARKER) {
        ExportFormat::AttendanceReport
    } else {
        ExportFormat::AttendanceList
    }
}

/// Factory: parser for a detected format
pub fn get_parser(format: ExportFormat) -> Box<dyn ExportParser> {
    match format {
        ExportFormat::AttendanceReport => Box::new(AttendanceReportParser::new()),
        ExportFormat::AttendanceList => Box::new(AttendanceListParser::new()),
    }
}

/// Read, decode, sniff and parse one export file.
pub fn parse_session_file(path: &Path) -> Result<ParsedSession> {
    let content = read_export(path)?;
    let format = detect_format(&content);
    debug!("{} detected as {}", path.display(), format.name());
    get_parser(format).parse(&content, path)
}

/// Read an export as text. Exports are UTF-16LE; a byte-order mark, when
/// present, overrides that default.
pub fn read_export(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| AttendanceError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, _, _) = encoding_rs::UTF_16LE.decode(&bytes);
    Ok(text.into_owned())
}

// ============================================================================
// PARSERS
// ============================================================================

/// "Meeting Summary" export: 8-line preamble, one row per participant
pub struct AttendanceReportParser;

impl AttendanceReportParser {
    pub fn new() -> Self {
        AttendanceReportParser
    }
}

impl Default for AttendanceReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportParser for AttendanceReportParser {
    fn parse(&self, content: &str, origin: &Path) -> Result<ParsedSession> {
        extract_session(content, origin, self.format())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::AttendanceReport
    }
}

/// Action-log export: header line, one row per join/leave action
pub struct AttendanceListParser;

impl AttendanceListParser {
    pub fn new() -> Self {
        AttendanceListParser
    }
}

impl Default for AttendanceListParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportParser for AttendanceListParser {
    fn parse(&self, content: &str, origin: &Path) -> Result<ParsedSession> {
        extract_session(content, origin, self.format())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::AttendanceList
    }
}

// ============================================================================
// ROW EXTRACTION
// ============================================================================

/// Running state while rows of one file are consumed in order.
struct SessionAccumulator<'a> {
    origin: &'a Path,
    date: Option<NaiveDate>,
    attendees: HashSet<Identity>,
    warnings: Vec<SessionWarning>,
}

impl<'a> SessionAccumulator<'a> {
    fn new(origin: &'a Path) -> Self {
        SessionAccumulator {
            origin,
            date: None,
            attendees: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// First-seen date wins; a differing date only produces a warning.
    fn observe(&mut self, line: usize, date: NaiveDate, attendee: Identity) {
        match self.date {
            None => self.date = Some(date),
            Some(expected) if expected != date => {
                self.warnings.push(SessionWarning::InconsistentDate {
                    file: self.origin.to_path_buf(),
                    line,
                    expected,
                    found: date,
                });
            }
            Some(_) => {}
        }
        self.attendees.insert(attendee);
    }

    fn unreadable_date(&mut self, line: usize, value: &str) {
        self.warnings.push(SessionWarning::UnparseableDate {
            file: self.origin.to_path_buf(),
            line,
            value: value.to_string(),
        });
    }
}

fn extract_session(content: &str, origin: &Path, format: ExportFormat) -> Result<ParsedSession> {
    let layout = format.layout();
    let body = skip_lines(content, layout.first_line - 1);

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut acc = SessionAccumulator::new(origin);
    let mut skipped_rows = 0;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!("{}: unreadable row skipped: {}", origin.display(), e);
                skipped_rows += 1;
                continue;
            }
        };

        let line = layout.first_line - 1
            + record.position().map(|p| p.line() as usize).unwrap_or(1);

        if record.len() != layout.columns.len() {
            debug!(
                "{} line {}: {} fields, expected {}, skipped",
                origin.display(),
                line,
                record.len(),
                layout.columns.len()
            );
            skipped_rows += 1;
            continue;
        }

        let name = &record[layout.name_column];
        let stamp = &record[layout.timestamp_column];
        match date_of_timestamp(stamp) {
            Some(date) => acc.observe(line, date, Identity::from_full_name(name)),
            None => acc.unreadable_date(line, stamp),
        }
    }

    let date = acc
        .date
        .ok_or_else(|| AttendanceError::EmptySession(origin.to_path_buf()))?;

    debug!(
        "{}: {} attendees on {}, {} rows skipped, {} warnings",
        origin.display(),
        acc.attendees.len(),
        date,
        skipped_rows,
        acc.warnings.len()
    );

    Ok(ParsedSession {
        session: Session::new(date, acc.attendees),
        format,
        source: origin.to_path_buf(),
        warnings: acc.warnings,
        skipped_rows,
    })
}

/// Drop the first `n` lines.
fn skip_lines(content: &str, n: usize) -> &str {
    if n == 0 {
        return content;
    }
    match content.match_indices('\n').nth(n - 1) {
        Some((idx, _)) => &content[idx + 1..],
        None => "",
    }
}

// Two-digit years are tried first: "%Y" would happily read "21" as year 21.
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// Date part of an export timestamp such as `3/15/2021, 9:58:34 AM`:
/// everything before the first comma. No comma means no date.
pub fn date_of_timestamp(stamp: &str) -> Option<NaiveDate> {
    let (date_part, _) = stamp.split_once(',')?;
    parse_date(date_part)
}

/// Parse a calendar date as written in the exports (US month-first) or ISO.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

// ============================================================================
// TESTS
// ============================================================================
