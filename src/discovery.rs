// Attendance export discovery inside the target directory

use crate::error::{AttendanceError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name prefix shared by every meeting attendance export.
pub const ATTENDANCE_PREFIX: &str = "meetingAttendance";

/// List the exports directly inside `dir` (no recursion), sorted by name.
pub fn find_attendance_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AttendanceError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| AttendanceError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        // Follows symlinks; a dangling link is not an export.
        let is_export = entry.path().is_file()
            && entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(ATTENDANCE_PREFIX))
                .unwrap_or(false);
        if is_export {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!("Found {} attendance exports in {}", files.len(), dir.display());
    Ok(files)
}
