//! Tab-delimited label text format
//!
//! Each label takes two lines:
//!
//! ```text
//! <start>\t<end>\t<label>
//! \\t<start_frequency>\t<end_frequency>
//! ```
//!
//! The second line starts with a literal backslash marker. Times and
//! frequencies are written with 6 decimals.
//!
//! # Example
//!
//! ```
//! use usv_detect::labels::{text_format, Label};
//!
//! let text = text_format::format_detected_labels(&[Label::detected(0.5, 0.75, 0, 0)]);
//! assert_eq!(text, "0.500000\t0.750000\td\n\\\t0.000000\t0.000000\n");
//!
//! let parsed = text_format::parse_labels(&text, 1000.0)?;
//! assert_eq!(parsed[0].start_index, 500);
//! # Ok::<(), usv_detect::DetectionError>(())
//! ```

use std::fmt::Write as _;
use std::path::Path;

use super::{time_to_index, Label, DETECTED_LABEL};
use crate::error::DetectionError;

/// Marker opening the frequency line
const FREQUENCY_MARKER: &str = "\\";

fn push_label(out: &mut String, start: f64, end: f64, text: &str, f_start: f64, f_end: f64) {
    // writing to a String cannot fail
    let _ = writeln!(out, "{:.6}\t{:.6}\t{}", start, end, text);
    let _ = writeln!(out, "{}\t{:.6}\t{:.6}", FREQUENCY_MARKER, f_start, f_end);
}

/// Render labels with their own tags and frequencies
pub fn format_labels(labels: &[Label]) -> String {
    let mut out = String::new();
    for l in labels {
        push_label(
            &mut out,
            l.start_time,
            l.end_time,
            &l.label,
            l.start_frequency,
            l.end_frequency,
        );
    }
    out
}

/// Render labels as detector output: tag `d`, zero frequencies
pub fn format_detected_labels(labels: &[Label]) -> String {
    let mut out = String::new();
    for l in labels {
        push_label(&mut out, l.start_time, l.end_time, DETECTED_LABEL, 0.0, 0.0);
    }
    out
}

fn parse_number(field: &str, line_no: usize, what: &str) -> Result<f64, DetectionError> {
    match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DetectionError::MalformedLabelFile(format!(
            "line {}: invalid {} '{}'",
            line_no, what, field
        ))),
    }
}

/// Parse label text, deriving indices as `round(time·fs)`
///
/// Lines are paired `(2i-1, 2i)`; trailing blank lines are ignored. The
/// backslash marker on the frequency line is optional.
///
/// # Errors
///
/// `MalformedLabelFile` for an odd number of lines, a wrong column count, an
/// unparsable or non-finite number, or an end time before the start time,
/// naming the 1-based line.
pub fn parse_labels(text: &str, sample_rate: f64) -> Result<Vec<Label>, DetectionError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    if lines.len() % 2 != 0 {
        return Err(DetectionError::MalformedLabelFile(format!(
            "{} lines, expected two lines per label",
            lines.len()
        )));
    }

    let mut labels = Vec::with_capacity(lines.len() / 2);
    for (pair, chunk) in lines.chunks(2).enumerate() {
        let time_line = 2 * pair + 1;
        let freq_line = time_line + 1;

        let fields: Vec<&str> = chunk[0].split('\t').collect();
        if fields.len() != 3 {
            return Err(DetectionError::MalformedLabelFile(format!(
                "line {}: expected 3 tab-separated columns, found {}",
                time_line,
                fields.len()
            )));
        }
        let start_time = parse_number(fields[0], time_line, "start time")?;
        let end_time = parse_number(fields[1], time_line, "end time")?;
        if end_time < start_time {
            return Err(DetectionError::MalformedLabelFile(format!(
                "line {}: end time {} before start time {}",
                time_line, end_time, start_time
            )));
        }

        let mut freq_fields: Vec<&str> = chunk[1].split('\t').collect();
        if freq_fields.first().map(|f| f.trim()) == Some(FREQUENCY_MARKER) {
            freq_fields.remove(0);
        }
        if freq_fields.len() != 2 {
            return Err(DetectionError::MalformedLabelFile(format!(
                "line {}: expected 2 frequency columns, found {}",
                freq_line,
                freq_fields.len()
            )));
        }
        let start_frequency = parse_number(freq_fields[0], freq_line, "start frequency")?;
        let end_frequency = parse_number(freq_fields[1], freq_line, "end frequency")?;

        labels.push(Label {
            start_time,
            end_time,
            label: fields[2].to_string(),
            start_frequency,
            end_frequency,
            start_index: time_to_index(start_time, sample_rate),
            stop_index: time_to_index(end_time, sample_rate),
        });
    }

    Ok(labels)
}

fn write_text(path: &Path, text: &str) -> Result<(), DetectionError> {
    std::fs::write(path, text)
        .map_err(|e| DetectionError::IoFailure(format!("{}: {}", path.display(), e)))
}

/// Write labels with their own tags and frequencies
pub fn write_labels(path: impl AsRef<Path>, labels: &[Label]) -> Result<(), DetectionError> {
    write_text(path.as_ref(), &format_labels(labels))
}

/// Write labels as detector output
pub fn write_detected_labels(
    path: impl AsRef<Path>,
    labels: &[Label],
) -> Result<(), DetectionError> {
    write_text(path.as_ref(), &format_detected_labels(labels))
}

/// Read a label file, deriving indices at `sample_rate`
pub fn read_labels(path: impl AsRef<Path>, sample_rate: f64) -> Result<Vec<Label>, DetectionError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| DetectionError::IoFailure(format!("{}: {}", path.display(), e)))?;
    log::debug!("Reading labels from {}", path.display());
    parse_labels(&text, sample_rate)
}
