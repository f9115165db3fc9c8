//! `;`-delimited manifest tables.
//!
//! Three tables flow between stages:
//! - the segment manifest (`FILE;SEG`), appended to while cutting,
//! - the classified-segment table (`FILE;SEG;<class column>;DURATION;...`),
//!   written by the external classifier and read by the summarizer,
//! - the summary manifest (`FILE;SEG;CLASS;DURATION;TIMELINE`).
//!
//! Fields are never quoted. Unknown columns are carried through untouched.

use thiserror::Error;

use crate::recording::RecordingId;
use crate::segment::{ClassLabel, ClassifiedSegment, Segment};
use crate::timeline::TimelineEntry;

pub const DELIMITER: char = ';';
pub const FILE_COLUMN: &str = "FILE";
pub const SEG_COLUMN: &str = "SEG";
pub const CLASS_COLUMN: &str = "CLASS";
pub const DURATION_COLUMN: &str = "DURATION";
pub const TIMELINE_COLUMN: &str = "TIMELINE";
/// Class column written by the classifier when none is configured.
pub const DEFAULT_CLASS_COLUMN: &str = "CLASS_1";

/// Manifest parsing errors. Line numbers are 1-based and count the header.
#[derive(Debug, Error, PartialEq)]
pub enum ManifestError {
    #[error("Table has no header line")]
    Empty,

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid duration '{value}'")]
    InvalidDuration { line: usize, value: String },
}

/// A header plus rows of string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DelimitedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Parse a table. Blank lines are skipped; the first non-blank line is the header.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or(ManifestError::Empty)?;
        let mut table = Self::new(split_fields(header));

        for (line_no, line) in lines {
            let fields: Vec<String> = split_fields(line);
            if fields.len() != table.headers.len() {
                return Err(ManifestError::RaggedRow {
                    line: line_no,
                    expected: table.headers.len(),
                    found: fields.len(),
                });
            }
            table.rows.push(fields);
        }

        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, ManifestError> {
        self.column(name)
            .ok_or_else(|| ManifestError::MissingColumn(name.to_string()))
    }

    /// Index of `name`, appending an empty column if it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), ManifestError> {
        if row.len() != self.headers.len() {
            return Err(ManifestError::RaggedRow {
                line: self.rows.len() + 2,
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value.into();
        }
    }

    /// Render with a trailing newline after every line.
    pub fn render(&self) -> String {
        let mut out = join_fields(&self.headers);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&join_fields(row));
            out.push('\n');
        }
        out
    }
}

/// One `FILE;SEG` row of the segment manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentManifestRow {
    pub file: RecordingId,
    pub seg: String,
}

impl SegmentManifestRow {
    pub const HEADER: &'static str = "FILE;SEG";

    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            file: segment.recording.clone(),
            seg: segment.name.clone(),
        }
    }

    /// Single line without the trailing newline.
    pub fn render(&self) -> String {
        format!("{}{}{}", self.file, DELIMITER, self.seg)
    }

    /// Read all rows of a segment manifest.
    pub fn parse_all(text: &str) -> Result<Vec<Self>, ManifestError> {
        let table = DelimitedTable::parse(text)?;
        let file_col = table.require_column(FILE_COLUMN)?;
        let seg_col = table.require_column(SEG_COLUMN)?;

        Ok(table
            .rows()
            .iter()
            .map(|row| Self {
                file: RecordingId::from_string(row[file_col].clone()),
                seg: row[seg_col].clone(),
            })
            .collect())
    }
}

/// One row of the summary manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryManifestRow {
    pub file: RecordingId,
    pub seg: String,
    pub class: ClassLabel,
    pub duration: f64,
    pub timeline: f64,
}

impl SummaryManifestRow {
    pub const HEADERS: [&'static str; 5] = [
        FILE_COLUMN,
        SEG_COLUMN,
        CLASS_COLUMN,
        DURATION_COLUMN,
        TIMELINE_COLUMN,
    ];

    pub fn from_entry(entry: &TimelineEntry) -> Self {
        Self {
            file: entry.segment.recording.clone(),
            seg: entry.segment.name.clone(),
            class: entry.segment.class.clone(),
            duration: entry.segment.duration,
            timeline: entry.offset,
        }
    }

    /// Build the whole summary manifest for a timeline.
    pub fn table(entries: &[TimelineEntry]) -> DelimitedTable {
        let mut table = DelimitedTable::new(Self::HEADERS);
        for entry in entries {
            let row = Self::from_entry(entry);
            table.rows.push(vec![
                row.file.to_string(),
                row.seg,
                row.class.to_string(),
                format_decimal(row.duration),
                format_decimal(row.timeline),
            ]);
        }
        table
    }
}

/// Read classified segments, taking labels from `class_column`.
///
/// Empty class or duration cells become `None`. A missing `DURATION`
/// column is treated as all durations missing.
pub fn classified_segments(
    table: &DelimitedTable,
    class_column: &str,
) -> Result<Vec<ClassifiedSegment>, ManifestError> {
    let file_col = table.require_column(FILE_COLUMN)?;
    let seg_col = table.require_column(SEG_COLUMN)?;
    let class_col = table.require_column(class_column)?;
    let duration_col = table.column(DURATION_COLUMN);

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<ClassifiedSegment, ManifestError> {
            let class = non_empty(&row[class_col]).map(ClassLabel::from);
            let duration = match duration_col.and_then(|c| non_empty(&row[c])) {
                Some(value) => Some(parse_duration(value).ok_or_else(|| {
                    ManifestError::InvalidDuration {
                        line: i + 2,
                        value: value.to_string(),
                    }
                })?),
                None => None,
            };

            Ok(ClassifiedSegment::new(
                row[file_col].clone(),
                row[seg_col].clone(),
                class,
                duration,
            ))
        })
        .collect()
}

/// Seconds with at most millisecond precision and no trailing zeros.
pub fn format_decimal(value: f64) -> String {
    let s = format!("{:.3}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn parse_duration(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(DELIMITER).map(|f| f.trim().to_string()).collect()
}

fn join_fields(fields: &[String]) -> String {
    fields.join(&DELIMITER.to_string())
}
