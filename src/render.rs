// Terminal rendering of an AttendanceReport
//
// Layout per table:
//   <pad>MMA        month letter of each session
//   <pad>010        tens digit of the day
//   <pad>152        ones digit of the day
//   <pad>---
//   SMITH, JOHN : 2/3 PPA

use crate::report::{AttendanceReport, Band, StudentRow};
use std::io::{self, Write};

/// One letter per month; July is `Y` so it differs from June.
pub const MONTH_LETTERS: [char; 12] = ['J', 'F', 'M', 'A', 'M', 'J', 'Y', 'A', 'S', 'O', 'N', 'D'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Label,
    Band(Band),
    Present,
    Absent,
}

#[cfg(feature = "color")]
fn paint(text: &str, tone: Tone, color: bool) -> String {
    use crossterm::style::{style, Color, Stylize};

    if !color {
        return text.to_string();
    }
    let fg = match tone {
        Tone::Label => Color::DarkGrey,
        Tone::Band(Band::Good) => Color::Green,
        Tone::Band(Band::Fair) => Color::DarkYellow,
        Tone::Band(Band::Poor) => Color::DarkMagenta,
        Tone::Band(Band::Critical) => Color::DarkRed,
        Tone::Present => Color::Green,
        Tone::Absent => Color::Red,
    };
    style(text).with(fg).to_string()
}

#[cfg(not(feature = "color"))]
fn paint(text: &str, _tone: Tone, _color: bool) -> String {
    text.to_string()
}

/// Column geometry shared by every line of both tables.
struct Layout {
    longest_name: usize,
    ratio_width: usize,
}

impl Layout {
    fn for_report(report: &AttendanceReport) -> Self {
        let total = report.session_count();
        Layout {
            longest_name: report.longest_name(),
            ratio_width: format!("{total}/{total}").len(),
        }
    }

    /// Column where the glyphs start: `LAST, FIRST : ratio `
    fn glyph_column(&self) -> usize {
        self.longest_name + ", ".len() + " : ".len() + self.ratio_width + 1
    }
}

/// Render the plain-text report. `color` adds ANSI colours when the crate
/// is built with the `color` feature.
pub fn render_text<W: Write>(report: &AttendanceReport, out: &mut W, color: bool) -> io::Result<()> {
    let layout = Layout::for_report(report);

    writeln!(out, "{}", paint("Sessions:", Tone::Label, color))?;
    for date in &report.sessions {
        let iso = date.format("%Y-%m-%d").to_string();
        writeln!(out, "{}", paint(&iso, Tone::Label, color))?;
    }

    if !report.enrolled.is_empty() {
        writeln!(out)?;
        let label = format!("Enrolled Attendees ({}):", report.enrolled.len());
        writeln!(out, "{}", paint(&label, Tone::Label, color))?;
        write_table(out, report, &report.enrolled, &layout, color)?;
        writeln!(out)?;
        writeln!(out, "{}", paint("Unenrolled Attendees:", Tone::Label, color))?;
    }

    write_table(out, report, &report.unenrolled, &layout, color)
}

/// Render the report as pretty-printed JSON.
pub fn render_json<W: Write>(report: &AttendanceReport, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

fn write_table<W: Write>(
    out: &mut W,
    report: &AttendanceReport,
    rows: &[StudentRow],
    layout: &Layout,
    color: bool,
) -> io::Result<()> {
    let indent = " ".repeat(layout.glyph_column());
    for line in session_headings(report) {
        writeln!(out, "{indent}{line}")?;
    }
    for row in rows {
        write_row(out, row, layout, color)?;
    }
    Ok(())
}

/// Month letters, day tens, day ones, then a dash rule.
pub fn session_headings(report: &AttendanceReport) -> [String; 4] {
    use chrono::Datelike;

    let mut months = String::new();
    let mut tens = String::new();
    let mut ones = String::new();
    for date in &report.sessions {
        months.push(MONTH_LETTERS[date.month0() as usize]);
        tens.push(digit(date.day() / 10));
        ones.push(digit(date.day() % 10));
    }
    [months, tens, ones, "-".repeat(report.session_count())]
}

fn digit(n: u32) -> char {
    char::from_digit(n, 10).unwrap_or('?')
}

fn write_row<W: Write>(out: &mut W, row: &StudentRow, layout: &Layout, color: bool) -> io::Result<()> {
    let pad = " ".repeat(layout.longest_name.saturating_sub(row.name_width()));
    let ratio = format!("{:>width$}", row.ratio.to_string(), width = layout.ratio_width);
    let glyphs: String = row
        .presence
        .iter()
        .map(|present| {
            if *present {
                paint("P", Tone::Present, color)
            } else {
                paint("A", Tone::Absent, color)
            }
        })
        .collect();

    writeln!(
        out,
        "{pad}{}, {} : {} {}",
        row.last,
        row.first,
        paint(&ratio, Tone::Band(row.ratio.band()), color),
        glyphs
    )
}
