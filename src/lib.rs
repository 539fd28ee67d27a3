// amar - Analyze My Attendance Records
// Roster vs. meeting attendance reconciliation, exposed for the CLI and tests

pub mod config;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod parser;
pub mod reconciliation;
pub mod render;
pub mod report;
pub mod roster;

// Re-export commonly used types
pub use config::{Args, Config, OutputFormat, ROSTER_FILE_NAME};
pub use discovery::{find_attendance_files, ATTENDANCE_PREFIX};
pub use error::{AttendanceError, Result};
pub use identity::{normalize, Identity};
pub use parser::{
    detect_format, get_parser, parse_session_file, AttendanceListParser, AttendanceReportParser,
    ExportFormat, ExportParser, ParsedSession, Session, SessionWarning,
};
pub use reconciliation::{aggregate, Aggregation, AttendanceRecord};
pub use render::{render_json, render_text};
pub use report::{build_report, AttendanceReport, Band, Ratio, SortKey, StudentRow};
pub use roster::load_roster;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
