// Report Builder - presence vectors, ratios, enrolled/unenrolled partition

use crate::identity::Identity;
use crate::reconciliation::AttendanceRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// RATIO & BAND
// ============================================================================

/// Sessions attended out of sessions held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ratio {
    pub present: usize,
    pub total: usize,
}

impl Ratio {
    pub fn new(present: usize, total: usize) -> Self {
        Ratio { present, total }
    }

    /// Fraction attended; a run with no sessions counts as 0.0
    pub fn value(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.present as f64 / self.total as f64
        }
    }

    pub fn band(&self) -> Band {
        Band::from_value(self.value())
    }

    /// Order by attended fraction
    pub fn cmp_value(&self, other: &Ratio) -> Ordering {
        self.value().total_cmp(&other.value())
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.present, self.total)
    }
}

/// Severity band of an attendance ratio.
///
/// Thresholds use strict `>`: exactly 0.95 is `Fair`, not `Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// above 0.95
    Good,
    /// above 0.66
    #[serde(rename = "ok")]
    Fair,
    /// above 0.33
    Poor,
    Critical,
}

impl Band {
    pub const GOOD_ABOVE: f64 = 0.95;
    pub const FAIR_ABOVE: f64 = 0.66;
    pub const POOR_ABOVE: f64 = 0.33;

    pub fn from_value(value: f64) -> Self {
        if value > Self::GOOD_ABOVE {
            Band::Good
        } else if value > Self::FAIR_ABOVE {
            Band::Fair
        } else if value > Self::POOR_ABOVE {
            Band::Poor
        } else {
            Band::Critical
        }
    }

    /// Same text the band serializes to.
    pub fn label(&self) -> &'static str {
        match self {
            Band::Good => "good",
            Band::Fair => "ok",
            Band::Poor => "poor",
            Band::Critical => "critical",
        }
    }
}

// ============================================================================
// ROWS
// ============================================================================

/// One student's line in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRow {
    pub identity: Identity,
    pub first: String,
    pub last: String,
    /// One entry per session, in session order
    pub presence: Vec<bool>,
    pub ratio: Ratio,
}

impl StudentRow {
    pub fn new(identity: Identity, presence: Vec<bool>) -> Self {
        let (first, last) = identity.display_parts();
        let (first, last) = (first.to_string(), last.to_string());
        let ratio = Ratio::new(presence.iter().filter(|p| **p).count(), presence.len());
        StudentRow {
            identity,
            first,
            last,
            presence,
            ratio,
        }
    }

    /// `P` for present, `A` for absent, one per session
    pub fn glyphs(&self) -> String {
        self.presence
            .iter()
            .map(|present| if *present { 'P' } else { 'A' })
            .collect()
    }

    /// Characters taken by the name in `LAST, FIRST`, excluding the separator
    pub fn name_width(&self) -> usize {
        self.first.chars().count() + self.last.chars().count()
    }
}

/// Row ordering for both tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Lowest attendance first, ties by last then first name
    #[default]
    Ratio,
    /// Alphabetical by last name, then first name
    #[value(name = "last")]
    LastName,
    /// Alphabetical by first name, then last name
    #[value(name = "first")]
    FirstName,
}

fn by_last_name(a: &StudentRow, b: &StudentRow) -> Ordering {
    a.last
        .cmp(&b.last)
        .then_with(|| a.first.cmp(&b.first))
        .then_with(|| a.identity.cmp(&b.identity))
}

fn by_first_name(a: &StudentRow, b: &StudentRow) -> Ordering {
    a.first
        .cmp(&b.first)
        .then_with(|| a.last.cmp(&b.last))
        .then_with(|| a.identity.cmp(&b.identity))
}

fn compare_rows(a: &StudentRow, b: &StudentRow, key: SortKey) -> Ordering {
    match key {
        SortKey::Ratio => a.ratio.cmp_value(&b.ratio).then_with(|| by_last_name(a, b)),
        SortKey::LastName => by_last_name(a, b),
        SortKey::FirstName => by_first_name(a, b),
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// Everything the renderers need: session columns and two sorted tables.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReport {
    pub sessions: Vec<NaiveDate>,
    pub enrolled: Vec<StudentRow>,
    pub unenrolled: Vec<StudentRow>,
}

impl AttendanceReport {
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &StudentRow> {
        self.enrolled.iter().chain(self.unenrolled.iter())
    }

    /// Widest name over both tables
    pub fn longest_name(&self) -> usize {
        self.rows().map(StudentRow::name_width).max().unwrap_or(0)
    }
}

/// Build both tables from the record.
///
/// Every attendee lands in exactly one table; every enrolled student lands in
/// the enrolled table, with an all-absent row if they never attended.
pub fn build_report(record: &AttendanceRecord, sort: SortKey) -> AttendanceReport {
    let total = record.session_count();
    let mut enrolled = Vec::new();
    let mut unenrolled = Vec::new();

    for identity in record.attended() {
        let presence = record
            .sessions()
            .iter()
            .map(|session| session.attended(identity))
            .collect();
        let row = StudentRow::new(identity.clone(), presence);

        if record.is_enrolled(identity) {
            enrolled.push(row);
        } else {
            unenrolled.push(row);
        }
    }

    enrolled.extend(
        record
            .absentees()
            .map(|identity| StudentRow::new(identity.clone(), vec![false; total])),
    );

    enrolled.sort_by(|a, b| compare_rows(a, b, sort));
    unenrolled.sort_by(|a, b| compare_rows(a, b, sort));

    AttendanceReport {
        sessions: record.session_dates(),
        enrolled,
        unenrolled,
    }
}

// ============================================================================
// TESTS
// ============================================================================
